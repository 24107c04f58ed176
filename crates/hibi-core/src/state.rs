//! Application state driven by immutable task snapshots.
//!
//! The store hands out whole snapshots; [`AppState`] replaces its snapshot
//! wholesale and rebuilds the [`SeriesIndex`] each time, so there is exactly
//! one current record set at any moment. [`TaskFeed`] publishes snapshots over
//! a `watch` channel: receivers only ever observe the latest one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::Task;
use crate::repository::TaskRepository;
use crate::series::SeriesIndex;
use crate::view::{build_view, SortKey, TaskView, TitleCollator, ViewFilters};

/// All tasks of one owner, in creation order, as read at `taken_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub owner_id: Uuid,
    pub tasks: Vec<Task>,
    pub taken_at: DateTime<Utc>,
}

impl TaskSnapshot {
    pub fn empty(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            tasks: Vec::new(),
            taken_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    snapshot: Arc<TaskSnapshot>,
    index: SeriesIndex,
}

impl AppState {
    pub fn new(snapshot: Arc<TaskSnapshot>) -> Self {
        let index = SeriesIndex::build(&snapshot.tasks);
        Self { snapshot, index }
    }

    /// Swaps in a newer snapshot. Older snapshots are ignored.
    pub fn replace(&mut self, snapshot: Arc<TaskSnapshot>) -> bool {
        if snapshot.owner_id != self.snapshot.owner_id || snapshot.taken_at < self.snapshot.taken_at {
            tracing::debug!(taken_at = %snapshot.taken_at, "ignoring stale snapshot");
            return false;
        }
        self.index = SeriesIndex::build(&snapshot.tasks);
        self.snapshot = snapshot;
        true
    }

    pub fn snapshot(&self) -> &TaskSnapshot {
        &self.snapshot
    }

    pub fn tasks(&self) -> &[Task] {
        &self.snapshot.tasks
    }

    pub fn index(&self) -> &SeriesIndex {
        &self.index
    }

    pub fn find(&self, id: Uuid) -> Option<&Task> {
        self.snapshot.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks whose id starts with `prefix` (hyphenated lowercase form).
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<&Task> {
        let prefix = prefix.to_lowercase();
        self.snapshot
            .tasks
            .iter()
            .filter(|t| t.id.to_string().starts_with(&prefix))
            .collect()
    }

    /// Records sharing `task`'s series, in snapshot order.
    pub fn series_of(&self, task: &Task) -> Vec<&Task> {
        let series_id = task.series_id();
        self.snapshot
            .tasks
            .iter()
            .filter(|t| t.id == series_id || t.parent_id == Some(series_id))
            .collect()
    }

    pub fn view(&self, filters: &ViewFilters, sort: SortKey, collator: &TitleCollator) -> TaskView {
        build_view(&self.snapshot.tasks, filters, sort, collator)
    }
}

/// Latest-snapshot channel for one owner.
#[derive(Debug)]
pub struct TaskFeed {
    owner_id: Uuid,
    sender: watch::Sender<Arc<TaskSnapshot>>,
}

impl TaskFeed {
    pub fn new(owner_id: Uuid) -> Self {
        let (sender, _) = watch::channel(Arc::new(TaskSnapshot::empty(owner_id)));
        Self { owner_id, sender }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<TaskSnapshot>> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> Arc<TaskSnapshot> {
        self.sender.borrow().clone()
    }

    /// Reads a fresh snapshot and publishes it in place of the previous one.
    pub async fn refresh<R>(&self, repo: &R) -> Result<Arc<TaskSnapshot>, CoreError>
    where
        R: TaskRepository + Sync + ?Sized,
    {
        let snapshot = Arc::new(repo.snapshot(self.owner_id).await?);
        tracing::debug!(owner = %self.owner_id, tasks = snapshot.tasks.len(), "publishing snapshot");
        self.sender.send_replace(snapshot.clone());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn snapshot(owner_id: Uuid, tasks: Vec<Task>, taken_at: DateTime<Utc>) -> Arc<TaskSnapshot> {
        Arc::new(TaskSnapshot { owner_id, tasks, taken_at })
    }

    #[test]
    fn test_replace_rebuilds_index() {
        let owner = Uuid::now_v7();
        let head = Task {
            owner_id: owner,
            is_repeating: true,
            ..Default::default()
        };
        let member = Task {
            owner_id: owner,
            parent_id: Some(head.id),
            ..Default::default()
        };
        let now = Utc::now();

        let mut state = AppState::new(snapshot(owner, vec![head.clone(), member.clone()], now));
        assert_eq!(state.index().series_len(head.id), 2);
        assert_eq!(state.series_of(&member).len(), 2);

        assert!(state.replace(snapshot(owner, vec![member.clone()], now + Duration::seconds(1))));
        assert_eq!(state.index().orphaned_series(), &[head.id]);
        assert!(state.find(head.id).is_none());
    }

    #[test]
    fn test_stale_or_foreign_snapshots_are_ignored() {
        let owner = Uuid::now_v7();
        let now = Utc::now();
        let mut state = AppState::new(snapshot(owner, vec![Task::default()], now));

        assert!(!state.replace(snapshot(owner, vec![], now - Duration::seconds(5))));
        assert!(!state.replace(snapshot(Uuid::now_v7(), vec![], now + Duration::seconds(5))));
        assert_eq!(state.tasks().len(), 1);
    }

    #[test]
    fn test_find_by_prefix() {
        let task = Task::default();
        let state = AppState::new(snapshot(task.owner_id, vec![task.clone()], Utc::now()));
        let prefix = task.id.to_string()[..6].to_uppercase();
        assert_eq!(state.find_by_prefix(&prefix).len(), 1);
        assert!(state.find_by_prefix("zz").is_empty());
    }
}
