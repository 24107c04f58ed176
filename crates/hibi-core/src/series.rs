//! Recurring task series: expansion planning, scope resolution and the
//! series index.
//!
//! Everything here is pure. The repository loads the affected records, asks
//! these functions which ids to touch and then writes inside a transaction.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Days, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{DeleteMode, EditScope, NewTaskData, Task, TaskEdit};
use crate::validation::{normalize_description, validate_title, ValidationError};

/// Members generated after the head; a fresh series spans 30 calendar days.
pub const SERIES_MEMBER_COUNT: u64 = 29;

/// Head-or-own id of a record. Same as [`Task::series_id`].
pub fn resolve_series_id(task: &Task) -> Uuid {
    task.series_id()
}

/// Builds the head and its members for a new recurring task.
///
/// The head comes first, followed by the members in due-date order. Nothing
/// is returned unless the title and start date are valid.
pub fn plan_series(data: &NewTaskData, created_at: DateTime<Utc>) -> Result<Vec<Task>, CoreError> {
    validate_title(&data.title)?;
    let start = data.due_date.ok_or(ValidationError::MissingStartDate)?;
    let description = normalize_description(data.description.clone());

    let head = Task {
        id: Uuid::now_v7(),
        owner_id: data.owner_id,
        title: data.title.clone(),
        description: description.clone(),
        due_date: Some(start),
        done: false,
        completed_at: None,
        is_repeating: true,
        parent_id: None,
        created_at,
        last_reminder_sent_at: None,
    };

    let mut records = Vec::with_capacity(SERIES_MEMBER_COUNT as usize + 1);
    for offset in 1..=SERIES_MEMBER_COUNT {
        let due_date = start.checked_add_days(Days::new(offset)).ok_or_else(|| {
            CoreError::InvalidInput(format!("Series starting {} runs past the calendar", start))
        })?;
        records.push(Task {
            id: Uuid::now_v7(),
            due_date: Some(due_date),
            is_repeating: false,
            parent_id: Some(head.id),
            ..head.clone()
        });
    }
    records.insert(0, head);
    Ok(records)
}

fn in_series(task: &Task, series_id: Uuid) -> bool {
    task.id == series_id || task.parent_id == Some(series_id)
}

fn due_on_or_after(task: &Task, target: &Task) -> bool {
    // Absent dates order before every date, so an undated target reaches the
    // whole series.
    task.due_date >= target.due_date
}

/// Ids an edit with `scope` has to update, given the records loaded for the
/// target's series.
pub fn select_edit_targets(records: &[Task], target: &Task, scope: EditScope) -> Vec<Uuid> {
    let series_id = target.series_id();
    match scope {
        EditScope::Single => vec![target.id],
        EditScope::All => records
            .iter()
            .filter(|t| in_series(t, series_id))
            .map(|t| t.id)
            .collect(),
        EditScope::FutureFromThis => records
            .iter()
            .filter(|t| in_series(t, series_id) && due_on_or_after(t, target))
            .map(|t| t.id)
            .collect(),
    }
}

/// Ids a delete with `mode` has to remove.
pub fn select_delete_targets(records: &[Task], target: &Task, mode: DeleteMode) -> Vec<Uuid> {
    let series_id = target.series_id();
    match mode {
        DeleteMode::Single => vec![target.id],
        DeleteMode::All => records
            .iter()
            .filter(|t| in_series(t, series_id))
            .map(|t| t.id)
            .collect(),
        DeleteMode::Future => records
            .iter()
            .filter(|t| in_series(t, series_id) && due_on_or_after(t, target))
            .map(|t| t.id)
            .collect(),
    }
}

/// Resolves the due-date part of an edit.
///
/// Returns the date to write, if any. Changing the date of a head or member,
/// or changing it with a propagated scope, is refused.
pub fn resolve_due_date_change(
    target: &Task,
    edit: &TaskEdit,
    scope: EditScope,
) -> Result<Option<Option<NaiveDate>>, CoreError> {
    let requested = match edit.due_date {
        Some(requested) if requested != target.due_date => requested,
        _ => return Ok(None),
    };

    if scope != EditScope::Single {
        return Err(CoreError::InvalidInput(
            "Due dates can only be changed one task at a time".to_string(),
        ));
    }
    if target.is_date_locked() {
        return Err(CoreError::InvalidInput(
            "Due dates of recurring tasks are managed by their series".to_string(),
        ));
    }
    Ok(Some(requested))
}

/// `series id -> member ids` index over one snapshot of records.
#[derive(Debug, Clone, Default)]
pub struct SeriesIndex {
    ids: HashSet<Uuid>,
    members: HashMap<Uuid, Vec<Uuid>>,
    /// Missing parent ids in first-seen order
    orphaned: Vec<Uuid>,
}

impl SeriesIndex {
    pub fn build(tasks: &[Task]) -> Self {
        let ids: HashSet<Uuid> = tasks.iter().map(|t| t.id).collect();
        let mut members: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let mut orphaned = Vec::new();

        for task in tasks {
            if let Some(parent_id) = task.parent_id {
                let entry = members.entry(parent_id).or_default();
                if entry.is_empty() && !ids.contains(&parent_id) {
                    orphaned.push(parent_id);
                }
                entry.push(task.id);
            }
        }

        Self { ids, members, orphaned }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    /// Member ids of a series, in snapshot order. Empty for standalone tasks.
    pub fn members_of(&self, series_id: Uuid) -> &[Uuid] {
        self.members.get(&series_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of records in the series, head included when it still exists.
    pub fn series_len(&self, series_id: Uuid) -> usize {
        self.members_of(series_id).len() + usize::from(self.contains(series_id))
    }

    pub fn is_orphan(&self, task: &Task) -> bool {
        task.parent_id.is_some_and(|p| !self.contains(p))
    }

    /// Series ids whose head no longer exists.
    pub fn orphaned_series(&self) -> &[Uuid] {
        &self.orphaned
    }
}
