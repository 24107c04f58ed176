//! # Hibi Core Library
//!
//! Storage and domain logic for the hibi day planner: plain tasks, recurring
//! task series, derived list views and reminder digests.
//!
//! ## Features
//!
//! - **Recurring Series**: A repeating task is stored as a head record plus
//!   29 member records, one per following day. Edits and deletes propagate
//!   across a series with an explicit scope.
//! - **Derived Views**: Filtered and sorted rows grouped by series, including
//!   ghost rows for members whose head is gone
//! - **Snapshot State**: Whole-snapshot replacement with a rebuilt series index
//! - **Reminder Digests**: One queued digest per owner for overdue and undated work
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`repository`]: Data access layer with Repository pattern
//! - [`series`]: Series expansion and scope resolution
//! - [`view`]: Filter/sort derivation of list rows
//! - [`state`]: Snapshot-driven application state
//! - [`reminder`]: Reminder digest planning
//! - [`weather`]: Forecast parsing and the umbrella alert
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use hibi_core::{
//!     db,
//!     models::{DeleteMode, NewTaskData, StoreConfig},
//!     repository::{SeriesRepository, SqliteRepository},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hibi_core::error::CoreError> {
//!     let pool = db::establish_connection("tasks.db").await?;
//!     let repo = SqliteRepository::new(pool, StoreConfig::default());
//!
//!     let head = repo
//!         .create_series(NewTaskData {
//!             title: "Water the plants".to_string(),
//!             due_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 1),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     let deleted = repo.delete_task(head.id, DeleteMode::All).await?;
//!     println!("Removed {} records", deleted);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod reminder;
pub mod repository;
pub mod series;
pub mod state;
pub mod timezone;
pub mod validation;
pub mod view;
pub mod weather;
