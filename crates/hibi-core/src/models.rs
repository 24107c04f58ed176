use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// A single record of the `tasks` table.
///
/// A record with `is_repeating = true` and no `parent_id` is the head of a
/// series; a record with a `parent_id` is a series member. Members whose head
/// has been deleted are orphans and stay valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub done: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_repeating: bool,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Stamped by the reminder job only
    pub last_reminder_sent_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Id of the series this record belongs to: its head's id, or its own id
    /// when it is a head or a standalone task.
    pub fn series_id(&self) -> Uuid {
        self.parent_id.unwrap_or(self.id)
    }

    pub fn is_series_head(&self) -> bool {
        self.is_repeating && self.parent_id.is_none()
    }

    pub fn is_series_member(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Due dates of heads and members are managed by the series.
    pub fn is_date_locked(&self) -> bool {
        self.is_series_head() || self.is_series_member()
    }
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7(),
            owner_id: Uuid::nil(),
            title: String::new(),
            description: None,
            due_date: None,
            done: false,
            completed_at: None,
            is_repeating: false,
            parent_id: None,
            created_at: Utc::now(),
            last_reminder_sent_at: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewTaskData {
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Requested changes for `edit_task`.
///
/// `due_date` follows the usual double-option convention: `None` leaves the
/// date alone, `Some(None)` clears it, `Some(Some(d))` sets it.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
}

/// Scope for edits on tasks that belong to a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditScope {
    /// Only the selected record
    #[default]
    Single,
    /// The selected record and every series record due on or after it
    FutureFromThis,
    /// Every record of the series
    All,
}

impl std::fmt::Display for EditScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditScope::Single => write!(f, "single"),
            EditScope::FutureFromThis => write!(f, "future"),
            EditScope::All => write!(f, "all"),
        }
    }
}

impl FromStr for EditScope {
    type Err = ParseEditScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "this" => Ok(EditScope::Single),
            "future" | "this_and_future" => Ok(EditScope::FutureFromThis),
            "all" | "series" => Ok(EditScope::All),
            _ => Err(ParseEditScopeError(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid edit scope: {0}")]
pub struct ParseEditScopeError(String);

/// Breadth of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    #[default]
    Single,
    Future,
    All,
}

impl std::fmt::Display for DeleteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteMode::Single => write!(f, "single"),
            DeleteMode::Future => write!(f, "future"),
            DeleteMode::All => write!(f, "all"),
        }
    }
}

impl FromStr for DeleteMode {
    type Err = ParseDeleteModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "this" => Ok(DeleteMode::Single),
            "future" => Ok(DeleteMode::Future),
            "all" | "series" => Ok(DeleteMode::All),
            _ => Err(ParseDeleteModeError(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid delete mode: {0}")]
pub struct ParseDeleteModeError(String);

// ============================================================================
// Users and reminder outbox
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub favorite_quote: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewUserData {
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileData {
    pub display_name: Option<Option<String>>,
    pub avatar: Option<Option<String>>,
    pub favorite_quote: Option<Option<String>>,
}

/// A composed reminder digest waiting for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OutboxMessage {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub to_address: String,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Store tuning passed to `SqliteRepository::new`.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Records per committed delete batch
    pub delete_batch_size: usize,
    /// Minimum time between two reminders for the same task
    pub reminder_interval: chrono::Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            delete_batch_size: 500,
            reminder_interval: chrono::Duration::hours(crate::reminder::DEFAULT_REMINDER_INTERVAL_HOURS),
        }
    }
}
