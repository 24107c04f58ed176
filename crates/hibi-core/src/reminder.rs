//! Reminder digests for overdue and undated tasks.
//!
//! [`plan_reminders`] decides who gets a digest and what it lists; the
//! repository writes the digests to the outbox and stamps the included tasks.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{Task, UserProfile};

pub const DEFAULT_REMINDER_INTERVAL_HOURS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub task_id: Uuid,
    pub title: String,
    pub due_date: Option<NaiveDate>,
}

/// One digest per owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderDigest {
    pub owner_id: Uuid,
    pub to_address: String,
    pub items: Vec<ReminderItem>,
}

impl ReminderDigest {
    pub fn subject(&self) -> String {
        let count = self.items.len();
        format!(
            "Action needed: {} open task{}",
            count,
            if count == 1 { "" } else { "s" }
        )
    }

    pub fn body(&self) -> String {
        let mut body = String::from("Hello,\n\nThe following tasks still need your attention:\n");
        for item in &self.items {
            let due = item
                .due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "none".to_string());
            body.push_str(&format!("- {} (due {})\n", item.title, due));
        }
        body
    }

    pub fn task_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.items.iter().map(|i| i.task_id)
    }
}

/// Open and either past due or undated.
pub fn is_reminder_candidate(task: &Task, today: NaiveDate) -> bool {
    !task.done && task.due_date.map_or(true, |due| due < today)
}

/// Never reminded, or last reminded at least `interval` ago.
pub fn is_reminder_due(task: &Task, now: DateTime<Utc>, interval: Duration) -> bool {
    task.last_reminder_sent_at
        .map_or(true, |sent| now.signed_duration_since(sent) >= interval)
}

/// Groups eligible tasks into one digest per owner.
///
/// Owners without a profile are skipped. Digests come out in the order their
/// owners first appear in `tasks`.
pub fn plan_reminders(
    tasks: &[Task],
    users: &[UserProfile],
    today: NaiveDate,
    now: DateTime<Utc>,
    interval: Duration,
) -> Vec<ReminderDigest> {
    let emails: HashMap<Uuid, &str> = users.iter().map(|u| (u.id, u.email.as_str())).collect();
    let mut digests: Vec<ReminderDigest> = Vec::new();
    let mut slots: HashMap<Uuid, usize> = HashMap::new();

    for task in tasks {
        if !is_reminder_candidate(task, today) || !is_reminder_due(task, now, interval) {
            continue;
        }
        let Some(email) = emails.get(&task.owner_id) else {
            tracing::debug!(owner = %task.owner_id, "no profile for task owner, skipping");
            continue;
        };
        let slot = *slots.entry(task.owner_id).or_insert_with(|| {
            digests.push(ReminderDigest {
                owner_id: task.owner_id,
                to_address: email.to_string(),
                items: Vec::new(),
            });
            digests.len() - 1
        });
        digests[slot].items.push(ReminderItem {
            task_id: task.id,
            title: task.title.clone(),
            due_date: task.due_date,
        });
    }

    digests
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn user(email: &str) -> UserProfile {
        UserProfile {
            id: Uuid::now_v7(),
            email: email.to_string(),
            display_name: None,
            avatar: None,
            favorite_quote: None,
            created_at: Utc::now(),
        }
    }

    fn open_task(owner: &UserProfile, title: &str, due: Option<NaiveDate>) -> Task {
        Task {
            owner_id: owner.id,
            title: title.to_string(),
            due_date: due,
            ..Default::default()
        }
    }

    #[test]
    fn test_candidates() {
        let today = date(2025, 4, 10);
        let owner = user("a@example.com");

        assert!(is_reminder_candidate(&open_task(&owner, "late", Some(date(2025, 4, 9))), today));
        assert!(is_reminder_candidate(&open_task(&owner, "undated", None), today));
        assert!(!is_reminder_candidate(&open_task(&owner, "today", Some(today)), today));

        let mut done = open_task(&owner, "done", Some(date(2025, 1, 1)));
        done.done = true;
        assert!(!is_reminder_candidate(&done, today));
    }

    #[test]
    fn test_interval_boundary() {
        let now = Utc::now();
        let interval = Duration::hours(DEFAULT_REMINDER_INTERVAL_HOURS);
        let mut task = Task::default();
        assert!(is_reminder_due(&task, now, interval));

        task.last_reminder_sent_at = Some(now - Duration::hours(59));
        assert!(!is_reminder_due(&task, now, interval));

        task.last_reminder_sent_at = Some(now - Duration::hours(60));
        assert!(is_reminder_due(&task, now, interval));
    }

    #[test]
    fn test_plan_groups_by_owner() {
        let today = date(2025, 4, 10);
        let now = Utc::now();
        let alice = user("alice@example.com");
        let bob = user("bob@example.com");
        let ghost_owner = user("nobody@example.com");

        let mut recently_reminded = open_task(&bob, "Already nagged", None);
        recently_reminded.last_reminder_sent_at = Some(now - Duration::hours(1));

        let tasks = vec![
            open_task(&alice, "File taxes", Some(date(2025, 4, 1))),
            open_task(&bob, "Call mom", None),
            open_task(&alice, "Fix bike", None),
            recently_reminded,
            open_task(&alice, "Future", Some(date(2025, 5, 1))),
            open_task(&ghost_owner, "Orphaned owner", None),
        ];

        let digests = plan_reminders(
            &tasks,
            &[alice.clone(), bob.clone()],
            today,
            now,
            Duration::hours(DEFAULT_REMINDER_INTERVAL_HOURS),
        );

        assert_eq!(digests.len(), 2);
        assert_eq!(digests[0].to_address, "alice@example.com");
        assert_eq!(digests[0].items.len(), 2);
        assert_eq!(digests[0].subject(), "Action needed: 2 open tasks");
        assert!(digests[0].body().contains("- File taxes (due 2025-04-01)"));
        assert!(digests[0].body().contains("- Fix bike (due none)"));

        assert_eq!(digests[1].owner_id, bob.id);
        assert_eq!(digests[1].subject(), "Action needed: 1 open task");
        assert_eq!(digests[1].task_ids().collect::<Vec<_>>(), vec![tasks[1].id]);
    }
}
