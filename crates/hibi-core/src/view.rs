//! Task list view derivation.
//!
//! [`build_view`] turns the flat record set of one snapshot into top-level
//! rows: standalone tasks, series heads with their members, and one ghost row
//! per series whose head no longer exists. It is a pure function of its
//! inputs.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Task;

/// Independent toggles, combined with a logical AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilters {
    /// Drop units in which every record is done
    pub hide_done: bool,
    /// Keep only series (heads and ghosts)
    pub only_repeating: bool,
    /// Drop series (heads and ghosts)
    pub hide_repeating: bool,
    /// Keep only units without a due date
    pub only_no_due_date: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Title,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Date => write!(f, "date"),
            SortKey::Title => write!(f, "title"),
        }
    }
}

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" | "due" => Ok(SortKey::Date),
            "title" | "name" => Ok(SortKey::Title),
            _ => Err(ParseSortKeyError(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid sort key: {0}")]
pub struct ParseSortKeyError(String);

/// A top-level row of the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRow {
    Standalone(Task),
    SeriesHead { head: Task, members: Vec<Task> },
    /// Members whose head is gone, grouped under the missing head's id
    OrphanGhost { series_id: Uuid, members: Vec<Task> },
}

impl TaskRow {
    /// The standalone/head id, or the missing head's id for a ghost.
    pub fn key(&self) -> Uuid {
        match self {
            TaskRow::Standalone(task) => task.id,
            TaskRow::SeriesHead { head, .. } => head.id,
            TaskRow::OrphanGhost { series_id, .. } => *series_id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            TaskRow::Standalone(task) => &task.title,
            TaskRow::SeriesHead { head, .. } => &head.title,
            TaskRow::OrphanGhost { members, .. } => earliest_member(members)
                .map(|t| t.title.as_str())
                .unwrap_or_default(),
        }
    }

    /// Anchor date used for sorting and the no-due-date filter. A ghost is
    /// anchored on its earliest member.
    pub fn due_date(&self) -> Option<NaiveDate> {
        match self {
            TaskRow::Standalone(task) => task.due_date,
            TaskRow::SeriesHead { head, .. } => head.due_date,
            TaskRow::OrphanGhost { members, .. } => members.iter().filter_map(|t| t.due_date).min(),
        }
    }

    pub fn members(&self) -> &[Task] {
        match self {
            TaskRow::Standalone(_) => &[],
            TaskRow::SeriesHead { members, .. } | TaskRow::OrphanGhost { members, .. } => members,
        }
    }

    /// True when every record of the unit is done.
    pub fn is_done(&self) -> bool {
        match self {
            TaskRow::Standalone(task) => task.done,
            TaskRow::SeriesHead { head, members } => head.done && members.iter().all(|t| t.done),
            TaskRow::OrphanGhost { members, .. } => members.iter().all(|t| t.done),
        }
    }

    pub fn is_repeating(&self) -> bool {
        !matches!(self, TaskRow::Standalone(_))
    }

    /// Records in the unit, head included.
    pub fn len(&self) -> usize {
        match self {
            TaskRow::Standalone(_) => 1,
            TaskRow::SeriesHead { members, .. } => members.len() + 1,
            TaskRow::OrphanGhost { members, .. } => members.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn members_mut(&mut self) -> Option<&mut Vec<Task>> {
        match self {
            TaskRow::Standalone(_) => None,
            TaskRow::SeriesHead { members, .. } | TaskRow::OrphanGhost { members, .. } => Some(members),
        }
    }
}

fn earliest_member(members: &[Task]) -> Option<&Task> {
    members.iter().min_by_key(|t| (t.due_date.is_none(), t.due_date))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskView {
    pub rows: Vec<TaskRow>,
}

impl TaskView {
    /// `parent id -> ordered members` for every visible series row.
    pub fn children_by_parent(&self) -> BTreeMap<Uuid, &[Task]> {
        self.rows
            .iter()
            .filter(|row| row.is_repeating())
            .map(|row| (row.key(), row.members()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn task_count(&self) -> usize {
        self.rows.iter().map(TaskRow::len).sum()
    }
}

/// Title ordering for a UI locale.
///
/// Titles are compared on a folded primary key (case, Latin diacritics,
/// full-width forms and the locale's equivalent letters), with the raw text
/// as tie-breaker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleCollator {
    locale: Option<String>,
}

impl TitleCollator {
    pub fn new(locale: impl Into<String>) -> Self {
        Self { locale: Some(locale.into()) }
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    fn language(&self) -> &str {
        self.locale
            .as_deref()
            .and_then(|l| l.split(['-', '_']).next())
            .unwrap_or("")
    }

    fn fold(&self, title: &str) -> String {
        let language = self.language();
        let mut folded = String::with_capacity(title.len());
        let chars = title
            .trim()
            .chars()
            .map(|c| match c {
                // Full-width ASCII variants
                '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
                // Katakana sorts with hiragana
                '\u{30A1}'..='\u{30F6}' if language == "ja" => char::from_u32(c as u32 - 0x60).unwrap_or(c),
                'ё' | 'Ё' if language == "ru" => 'е',
                _ => c,
            })
            .flat_map(char::to_lowercase);

        for c in chars {
            if ('\u{0300}'..='\u{036F}').contains(&c) {
                continue;
            }
            match latin_base(c) {
                Some(base) => folded.push_str(base),
                None => folded.push(c),
            }
        }
        folded
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.fold(a).cmp(&self.fold(b)).then_with(|| a.cmp(b))
    }
}

/// Base letters for the lowercase Latin-1 and Latin Extended-A forms.
fn latin_base(c: char) -> Option<&'static str> {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ð' | 'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĳ' => "ij",
        'ĵ' => "j",
        'ķ' | 'ĸ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' | 'ŉ' | 'ŋ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' | 'ſ' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(base)
}

fn compare_due(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn keep(row: &TaskRow, filters: &ViewFilters) -> bool {
    if filters.hide_done && row.is_done() {
        return false;
    }
    if filters.hide_repeating && row.is_repeating() {
        return false;
    }
    if filters.only_repeating && !row.is_repeating() {
        return false;
    }
    if filters.only_no_due_date && row.due_date().is_some() {
        return false;
    }
    true
}

/// Derives the list view of `tasks` (in snapshot order).
pub fn build_view(
    tasks: &[Task],
    filters: &ViewFilters,
    sort: SortKey,
    collator: &TitleCollator,
) -> TaskView {
    let ids: HashSet<Uuid> = tasks.iter().map(|t| t.id).collect();
    let mut children: HashMap<Uuid, Vec<Task>> = HashMap::new();
    for task in tasks {
        if let Some(parent_id) = task.parent_id {
            children.entry(parent_id).or_default().push(task.clone());
        }
    }

    let mut rows = Vec::new();
    let mut ghosts_emitted = HashSet::new();
    for task in tasks {
        match task.parent_id {
            None => {
                let members = children.remove(&task.id);
                let row = match members {
                    Some(members) => TaskRow::SeriesHead { head: task.clone(), members },
                    None if task.is_repeating => TaskRow::SeriesHead {
                        head: task.clone(),
                        members: Vec::new(),
                    },
                    None => TaskRow::Standalone(task.clone()),
                };
                rows.push(row);
            }
            Some(parent_id) if !ids.contains(&parent_id) && ghosts_emitted.insert(parent_id) => {
                rows.push(TaskRow::OrphanGhost {
                    series_id: parent_id,
                    members: children.remove(&parent_id).unwrap_or_default(),
                });
            }
            Some(_) => {}
        }
    }

    rows.retain(|row| keep(row, filters));

    for row in rows.iter_mut() {
        if let Some(members) = row.members_mut() {
            members.sort_by(|a, b| a.done.cmp(&b.done).then_with(|| a.due_date.cmp(&b.due_date)));
        }
    }

    rows.sort_by(|a, b| {
        a.is_done().cmp(&b.is_done()).then_with(|| match sort {
            SortKey::Date => compare_due(a.due_date(), b.due_date()),
            SortKey::Title => collator.compare(a.title(), b.title()),
        })
    });

    TaskView { rows }
}
