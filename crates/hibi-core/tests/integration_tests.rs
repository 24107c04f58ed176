use chrono::{Duration, NaiveDate, TimeZone, Utc};
use hibi_core::db::establish_connection;
use hibi_core::error::CoreError;
use hibi_core::models::*;
use hibi_core::repository::{
    ReminderRepository, SeriesRepository, SqliteRepository, TaskRepository, UserRepository,
};
use hibi_core::state::{AppState, TaskFeed};
use hibi_core::validation::ValidationError;
use hibi_core::view::{build_view, SortKey, TaskRow, TitleCollator, ViewFilters};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

/// Helper function to create a test database
async fn setup_test_db_with(config: StoreConfig) -> (SqliteRepository, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = establish_connection(&db_path.to_string_lossy())
        .await
        .expect("Failed to establish test database connection");

    (SqliteRepository::new(pool, config), temp_dir)
}

async fn setup_test_db() -> (SqliteRepository, TempDir) {
    setup_test_db_with(StoreConfig::default()).await
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn create_test_series(repo: &SqliteRepository, owner_id: Uuid, title: &str, start: NaiveDate) -> Task {
    repo.create_series(NewTaskData {
        owner_id,
        title: title.to_string(),
        description: Some(format!("Series: {}", title)),
        due_date: Some(start),
    })
    .await
    .expect("Failed to create test series")
}

async fn create_test_task(repo: &SqliteRepository, owner_id: Uuid, title: &str, due: Option<NaiveDate>) -> Task {
    repo.add_task(NewTaskData {
        owner_id,
        title: title.to_string(),
        description: None,
        due_date: due,
    })
    .await
    .expect("Failed to create test task")
}

#[tokio::test]
async fn test_series_expansion_creates_thirty_consecutive_records() {
    let (repo, _temp_dir) = setup_test_db().await;
    let owner = Uuid::now_v7();

    let head = create_test_series(&repo, owner, "Stretch", date(2025, 1, 30)).await;
    assert!(head.is_series_head());
    assert_eq!(head.due_date, Some(date(2025, 1, 30)));

    let records = repo.find_series_records(head.id).await.unwrap();
    assert_eq!(records.len(), 30);
    assert_eq!(records[0].id, head.id);

    for (offset, record) in records.iter().enumerate() {
        assert_eq!(record.due_date, Some(date(2025, 1, 30) + Duration::days(offset as i64)));
        assert_eq!(record.title, "Stretch");
        assert!(!record.done);
        if offset > 0 {
            assert_eq!(record.parent_id, Some(head.id));
            assert!(!record.is_repeating);
        }
    }
    // Crosses the month boundary
    assert_eq!(records[29].due_date, Some(date(2025, 2, 28)));
}

#[tokio::test]
async fn test_series_without_start_date_writes_nothing() {
    let (repo, _temp_dir) = setup_test_db().await;
    let owner = Uuid::now_v7();

    let result = repo
        .create_series(NewTaskData {
            owner_id: owner,
            title: "No date".to_string(),
            ..Default::default()
        })
        .await;

    assert!(matches!(
        result,
        Err(CoreError::Validation(ValidationError::MissingStartDate))
    ));
    assert!(repo.find_tasks_by_owner(owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_title_is_rejected() {
    let (repo, _temp_dir) = setup_test_db().await;

    let result = repo
        .add_task(NewTaskData {
            title: "   ".to_string(),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(CoreError::Validation(ValidationError::EmptyTitle))));
}

#[tokio::test]
async fn test_edit_all_updates_every_record_but_keeps_dates() {
    let (repo, _temp_dir) = setup_test_db().await;
    let owner = Uuid::now_v7();
    let head = create_test_series(&repo, owner, "Read", date(2025, 3, 1)).await;
    let before = repo.find_series_records(head.id).await.unwrap();

    let member = &before[10];
    let updated = repo
        .edit_task(
            member.id,
            TaskEdit {
                title: "Read 20 pages".to_string(),
                description: Some("  ".to_string()),
                due_date: None,
            },
            EditScope::All,
        )
        .await
        .unwrap();
    assert_eq!(updated.len(), 30);

    let after = repo.find_series_records(head.id).await.unwrap();
    for (old, new) in before.iter().zip(after.iter()) {
        assert_eq!(new.title, "Read 20 pages");
        assert_eq!(new.description, None);
        assert_eq!(new.due_date, old.due_date);
    }
}

#[tokio::test]
async fn test_edit_future_from_member() {
    let (repo, _temp_dir) = setup_test_db().await;
    let owner = Uuid::now_v7();
    let head = create_test_series(&repo, owner, "Run", date(2025, 5, 1)).await;
    let records = repo.find_series_records(head.id).await.unwrap();

    let target = &records[20];
    let updated = repo
        .edit_task(
            target.id,
            TaskEdit {
                title: "Run 5k".to_string(),
                description: None,
                due_date: Some(target.due_date),
            },
            EditScope::FutureFromThis,
        )
        .await
        .unwrap();
    assert_eq!(updated.len(), 10);

    let after = repo.find_series_records(head.id).await.unwrap();
    let renamed = after.iter().filter(|t| t.title == "Run 5k").count();
    assert_eq!(renamed, 10);
    assert!(after[..20].iter().all(|t| t.title == "Run"));
}

#[tokio::test]
async fn test_due_date_change_on_series_record_is_rejected() {
    let (repo, _temp_dir) = setup_test_db().await;
    let owner = Uuid::now_v7();
    let head = create_test_series(&repo, owner, "Journal", date(2025, 6, 1)).await;

    let result = repo
        .edit_task(
            head.id,
            TaskEdit {
                title: "Journal".to_string(),
                description: None,
                due_date: Some(Some(date(2025, 7, 1))),
            },
            EditScope::Single,
        )
        .await;
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));

    let unchanged = repo.find_task_by_id(head.id).await.unwrap().unwrap();
    assert_eq!(unchanged.due_date, Some(date(2025, 6, 1)));
}

#[tokio::test]
async fn test_standalone_edit_can_clear_due_date() {
    let (repo, _temp_dir) = setup_test_db().await;
    let owner = Uuid::now_v7();
    let task = create_test_task(&repo, owner, "Pay rent", Some(date(2025, 1, 5))).await;

    let updated = repo
        .edit_task(
            task.id,
            TaskEdit {
                title: "Pay rent".to_string(),
                description: Some("Transfer".to_string()),
                due_date: Some(None),
            },
            EditScope::Single,
        )
        .await
        .unwrap();

    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].due_date, None);
    assert_eq!(updated[0].description.as_deref(), Some("Transfer"));
}

#[tokio::test]
async fn test_edit_missing_task_is_not_found() {
    let (repo, _temp_dir) = setup_test_db().await;
    let result = repo
        .edit_task(
            Uuid::now_v7(),
            TaskEdit {
                title: "Ghost".to_string(),
                ..Default::default()
            },
            EditScope::All,
        )
        .await;
    assert!(matches!(result, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_all_removes_series() {
    let (repo, _temp_dir) = setup_test_db().await;
    let owner = Uuid::now_v7();
    let head = create_test_series(&repo, owner, "Meditate", date(2025, 2, 1)).await;
    let keeper = create_test_task(&repo, owner, "Unrelated", None).await;

    let records = repo.find_series_records(head.id).await.unwrap();
    let deleted = repo.delete_task(records[5].id, DeleteMode::All).await.unwrap();
    assert_eq!(deleted, 30);

    let remaining = repo.find_tasks_by_owner(owner).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keeper.id);
}

#[tokio::test]
async fn test_delete_future_keeps_earlier_records() {
    let (repo, _temp_dir) = setup_test_db().await;
    let owner = Uuid::now_v7();
    let head = create_test_series(&repo, owner, "Walk", date(2025, 4, 1)).await;
    let records = repo.find_series_records(head.id).await.unwrap();

    let deleted = repo.delete_task(records[25].id, DeleteMode::Future).await.unwrap();
    assert_eq!(deleted, 5);
    assert_eq!(repo.find_series_records(head.id).await.unwrap().len(), 25);
}

#[tokio::test]
async fn test_deleting_head_leaves_orphans_and_one_ghost_row() {
    let (repo, _temp_dir) = setup_test_db().await;
    let owner = Uuid::now_v7();
    let head = create_test_series(&repo, owner, "Floss", date(2025, 8, 1)).await;

    let deleted = repo.delete_task(head.id, DeleteMode::Single).await.unwrap();
    assert_eq!(deleted, 1);

    let tasks = repo.find_tasks_by_owner(owner).await.unwrap();
    assert_eq!(tasks.len(), 29);
    assert!(tasks.iter().all(|t| t.parent_id == Some(head.id)));

    let view = build_view(&tasks, &ViewFilters::default(), SortKey::Date, &TitleCollator::default());
    assert_eq!(view.rows.len(), 1);
    match &view.rows[0] {
        TaskRow::OrphanGhost { series_id, members } => {
            assert_eq!(*series_id, head.id);
            assert_eq!(members.len(), 29);
        }
        other => panic!("expected ghost row, got {:?}", other),
    }

    // Orphans can still be removed as a series through any member.
    let deleted = repo.delete_task(tasks[3].id, DeleteMode::All).await.unwrap();
    assert_eq!(deleted, 29);
}

#[tokio::test]
async fn test_delete_runs_in_small_batches() {
    let (repo, _temp_dir) = setup_test_db_with(StoreConfig {
        delete_batch_size: 7,
        ..Default::default()
    })
    .await;
    let owner = Uuid::now_v7();
    let head = create_test_series(&repo, owner, "Water plants", date(2025, 9, 1)).await;

    let deleted = repo.delete_task(head.id, DeleteMode::All).await.unwrap();
    assert_eq!(deleted, 30);
    assert!(repo.find_series_records(head.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_missing_task_is_not_found() {
    let (repo, _temp_dir) = setup_test_db().await;
    let result = repo.delete_task(Uuid::now_v7(), DeleteMode::Single).await;
    assert!(matches!(result, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_toggle_done_sets_and_clears_completion() {
    let (repo, _temp_dir) = setup_test_db().await;
    let owner = Uuid::now_v7();
    let task = create_test_task(&repo, owner, "Call mom", None).await;

    let done = repo.toggle_done(task.id).await.unwrap();
    assert!(done.done);
    assert!(done.completed_at.is_some());

    let reopened = repo.toggle_done(task.id).await.unwrap();
    assert!(!reopened.done);
    assert!(reopened.completed_at.is_none());
}

#[tokio::test]
async fn test_snapshot_feed_drives_app_state() {
    let (repo, _temp_dir) = setup_test_db().await;
    let owner = Uuid::now_v7();
    let feed = TaskFeed::new(owner);
    let mut receiver = feed.subscribe();
    let mut state = AppState::new(feed.current());
    assert!(state.tasks().is_empty());

    create_test_task(&repo, owner, "Buy milk", Some(date(2025, 1, 2))).await;
    create_test_series(&repo, owner, "Stretch", date(2025, 1, 1)).await;
    create_test_task(&repo, Uuid::now_v7(), "Someone else's", None).await;

    feed.refresh(&repo).await.unwrap();
    assert!(receiver.has_changed().unwrap());
    let latest = receiver.borrow_and_update().clone();
    assert!(state.replace(latest));

    assert_eq!(state.tasks().len(), 31);
    let view = state.view(&ViewFilters::default(), SortKey::Date, &TitleCollator::default());
    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[0].title(), "Stretch");
    assert_eq!(view.task_count(), 31);

    let stale = Arc::new(hibi_core::state::TaskSnapshot {
        owner_id: owner,
        tasks: Vec::new(),
        taken_at: Utc::now() - Duration::hours(1),
    });
    assert!(!state.replace(stale));
    assert_eq!(state.tasks().len(), 31);
}

#[tokio::test]
async fn test_reminders_are_queued_and_throttled() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = repo
        .add_user(NewUserData {
            email: "Aiko@Example.com".to_string(),
            display_name: Some("Aiko".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(user.email, "aiko@example.com");

    let today = date(2025, 3, 10);
    let overdue = create_test_task(&repo, user.id, "File taxes", Some(date(2025, 3, 1))).await;
    let undated = create_test_task(&repo, user.id, "Sort photos", None).await;
    create_test_task(&repo, user.id, "Future thing", Some(date(2025, 3, 20))).await;
    let finished = create_test_task(&repo, user.id, "Old thing", Some(date(2025, 2, 1))).await;
    repo.toggle_done(finished.id).await.unwrap();
    // No profile for this owner
    create_test_task(&repo, Uuid::now_v7(), "Stray", None).await;

    let now = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
    let pending = repo.pending_reminders(today, now).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert!(repo.find_outbox(None).await.unwrap().is_empty());

    let sent = repo.run_reminders(today, now).await.unwrap();
    assert_eq!(sent, pending);
    let ids: Vec<Uuid> = sent[0].task_ids().collect();
    assert_eq!(ids, vec![overdue.id, undated.id]);

    let outbox = repo.find_outbox(Some(user.id)).await.unwrap();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].to_address, "aiko@example.com");
    assert_eq!(outbox[0].subject, "Action needed: 2 open tasks");

    let stamped = repo.find_task_by_id(overdue.id).await.unwrap().unwrap();
    assert_eq!(stamped.last_reminder_sent_at, Some(now));

    // Inside the interval nothing is due again
    let soon = now + Duration::hours(59);
    assert!(repo.run_reminders(today, soon).await.unwrap().is_empty());

    let later = now + Duration::hours(60);
    assert_eq!(repo.run_reminders(today, later).await.unwrap().len(), 1);
    assert_eq!(repo.find_outbox(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_profile_update_and_delete() {
    let (repo, _temp_dir) = setup_test_db_with(StoreConfig {
        delete_batch_size: 4,
        ..Default::default()
    })
    .await;
    let user = repo
        .add_user(NewUserData {
            email: "ivan@example.ru".to_string(),
            display_name: None,
        })
        .await
        .unwrap();

    let duplicate = repo
        .add_user(NewUserData {
            email: "IVAN@example.ru".to_string(),
            display_name: None,
        })
        .await;
    assert!(matches!(duplicate, Err(CoreError::InvalidInput(_))));

    let updated = repo
        .update_profile(
            user.id,
            UpdateProfileData {
                display_name: Some(Some("Ivan".to_string())),
                favorite_quote: Some(Some("Тише едешь - дальше будешь".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.display_name.as_deref(), Some("Ivan"));
    assert!(updated.avatar.is_none());

    let too_long = repo
        .update_profile(
            user.id,
            UpdateProfileData {
                display_name: Some(Some("x".repeat(51))),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(
        too_long,
        Err(CoreError::Validation(ValidationError::DisplayNameTooLong))
    ));

    create_test_series(&repo, user.id, "Duolingo", date(2025, 1, 1)).await;
    create_test_task(&repo, user.id, "Passport", None).await;

    let deleted = repo.delete_user(user.id).await.unwrap();
    assert_eq!(deleted, 31);
    assert!(repo.find_user_by_id(user.id).await.unwrap().is_none());
    assert!(repo.find_tasks_by_owner(user.id).await.unwrap().is_empty());
    assert!(matches!(repo.delete_user(user.id).await, Err(CoreError::NotFound(_))));
}
