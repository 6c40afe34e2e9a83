//! Mission data structures.
//!
//! This module defines the `Task` struct (a "mission") with its owned
//! sub-tasks, recurrence configuration and notification records, plus the
//! typed `NewTask` input used to create one. Timestamps are Unix epoch
//! milliseconds.

use chrono::{Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A mission with its status flags and optional project/recurrence data.
///
/// At most one of `completed`, `is_cancelled` and `is_postponed` is true; the
/// transitions in [`crate::lifecycle`] are the only code that flips them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub is_cancelled: bool,
    #[serde(default)]
    pub is_postponed: bool,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_tasks: Option<Vec<SubTask>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Vec<TaskNotification>>,
}

impl Task {
    /// Sub-tasks in order, empty when the mission has none.
    pub fn subtasks(&self) -> &[SubTask] {
        self.sub_tasks.as_deref().unwrap_or(&[])
    }

    pub fn notification_list(&self) -> &[TaskNotification] {
        self.notifications.as_deref().unwrap_or(&[])
    }
}

/// A step of a project mission. Owned by its parent, no lifecycle of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTask {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
}

/// Stored description of how a mission repeats. Nothing schedules from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceConfig {
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarters: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<i64>,
}

impl RecurrenceConfig {
    /// Build a recurrence, keeping weekdays (0-6) only for weekly and quarters
    /// (1-4) only for quarterly frequencies.
    pub fn new(
        frequency: Frequency,
        days_of_week: Vec<u8>,
        quarters: Vec<u8>,
        end_date: Option<i64>,
    ) -> Self {
        let days_of_week = (frequency == Frequency::Weekly)
            .then(|| clean_set(days_of_week, 0..=6));
        let quarters = (frequency == Frequency::Quarterly).then(|| clean_set(quarters, 1..=4));
        RecurrenceConfig {
            frequency,
            days_of_week,
            quarters,
            end_date,
        }
    }

    /// Short French summary, e.g. "Hebdo (L, M, V)".
    pub fn summary(&self) -> String {
        const DAYS: [&str; 7] = ["L", "M", "M", "J", "V", "S", "D"];
        match self.frequency {
            Frequency::Daily => "Quotidien".to_string(),
            Frequency::Weekly => match self.days_of_week.as_deref() {
                Some(days) if !days.is_empty() => {
                    let names: Vec<&str> = days
                        .iter()
                        .filter_map(|&d| DAYS.get(d as usize).copied())
                        .collect();
                    format!("Hebdo ({})", names.join(", "))
                }
                _ => "Hebdo".to_string(),
            },
            Frequency::Monthly => "Mensuel".to_string(),
            Frequency::Quarterly => match self.quarters.as_deref() {
                Some(qs) if !qs.is_empty() => {
                    let names: Vec<String> = qs.iter().map(|q| format!("Q{q}")).collect();
                    format!("Trimestriel ({})", names.join(", "))
                }
                _ => "Trimestriel".to_string(),
            },
            Frequency::Yearly => "Annuel".to_string(),
        }
    }
}

fn clean_set(mut values: Vec<u8>, range: std::ops::RangeInclusive<u8>) -> Vec<u8> {
    values.retain(|v| range.contains(v));
    values.sort_unstable();
    values.dedup();
    values
}

/// A reminder record attached to a mission. Nothing delivers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNotification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_timestamp: Option<i64>,
    pub label: String,
}

impl TaskNotification {
    /// "1 jour avant" preset.
    pub fn one_day_before() -> Self {
        Self::offset(1440)
    }

    /// "1 heure avant" preset.
    pub fn one_hour_before() -> Self {
        Self::offset(60)
    }

    /// Reminder `minutes` before the due date.
    pub fn offset(minutes: i64) -> Self {
        let label = match minutes {
            1440 => "1 jour avant".to_string(),
            60 => "1 heure avant".to_string(),
            m if m % 1440 == 0 => format!("{} jours avant", m / 1440),
            m if m % 60 == 0 => format!("{} heures avant", m / 60),
            m => format!("{m} min avant"),
        };
        TaskNotification {
            id: short_id(),
            kind: NotificationKind::Offset,
            offset_minutes: Some(minutes),
            custom_timestamp: None,
            label,
        }
    }

    /// Reminder at an absolute instant, labelled like "05 mars 14:30".
    pub fn custom(timestamp: i64) -> Self {
        let label = Local
            .timestamp_millis_opt(timestamp)
            .single()
            .map(|dt| dt.format("%d %b %H:%M").to_string())
            .unwrap_or_else(|| timestamp.to_string());
        TaskNotification {
            id: short_id(),
            kind: NotificationKind::Custom,
            offset_minutes: None,
            custom_timestamp: Some(timestamp),
            label,
        }
    }

    /// Instant the reminder is meant for, given the mission's due date.
    pub fn fires_at(&self, due_date: Option<i64>) -> Option<i64> {
        match self.kind {
            NotificationKind::Offset => {
                Some(due_date? - self.offset_minutes.unwrap_or(0) * 60_000)
            }
            NotificationKind::Custom => self.custom_timestamp,
        }
    }
}

/// Typed input for creating a mission, as collected by a form or command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: Category,
    pub due_date: Option<i64>,
    pub employee_id: Option<String>,
    pub sub_tasks: Vec<NewSubTask>,
    pub recurrence: Option<RecurrenceConfig>,
    pub notifications: Vec<TaskNotification>,
}

impl NewTask {
    /// A plain TACHE with the given title, as produced by voice capture.
    pub fn quick(title: &str, priority: Priority) -> Self {
        NewTask {
            title: title.to_string(),
            priority,
            ..NewTask::default()
        }
    }
}

/// A sub-task line entered while creating a project mission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSubTask {
    pub title: String,
    pub due_date: Option<i64>,
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Short random identifier, in the spirit of the base-36 ids the app always used.
pub fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..9].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_reads_original_storage_shape() {
        let raw = r#"{
            "id": "k3j9x2abc",
            "title": "Appeler le plombier",
            "description": "",
            "priority": "URGENT",
            "category": "TACHE",
            "completed": false,
            "createdAt": 1700000000000,
            "accountId": "acc_perso",
            "icon": "📝"
        }"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.priority, Priority::Urgent);
        assert!(!task.is_cancelled);
        assert!(!task.is_postponed);
        assert!(task.subtasks().is_empty());

        let written = serde_json::to_value(&task).unwrap();
        assert_eq!(written["createdAt"], 1700000000000i64);
        assert_eq!(written["isCancelled"], false);
        assert!(written.get("employeeId").is_none());
    }

    #[test]
    fn recurrence_keeps_only_relevant_sets() {
        let weekly = RecurrenceConfig::new(Frequency::Weekly, vec![4, 0, 9, 4], vec![1], None);
        assert_eq!(weekly.days_of_week, Some(vec![0, 4]));
        assert_eq!(weekly.quarters, None);
        assert_eq!(weekly.summary(), "Hebdo (L, V)");

        let quarterly = RecurrenceConfig::new(Frequency::Quarterly, vec![1], vec![4, 0, 2], None);
        assert_eq!(quarterly.days_of_week, None);
        assert_eq!(quarterly.quarters, Some(vec![2, 4]));

        let daily = RecurrenceConfig::new(Frequency::Daily, vec![1, 2], vec![3], None);
        assert_eq!(daily.days_of_week, None);
        assert_eq!(daily.quarters, None);
    }

    #[test]
    fn notification_presets_and_trigger_instants() {
        let day = TaskNotification::one_day_before();
        assert_eq!(day.label, "1 jour avant");
        assert_eq!(day.fires_at(Some(100_000_000)), Some(100_000_000 - 1440 * 60_000));
        assert_eq!(day.fires_at(None), None);

        let hour = TaskNotification::one_hour_before();
        assert_eq!(hour.label, "1 heure avant");

        let custom = TaskNotification::custom(1_700_000_000_000);
        assert_eq!(custom.kind, NotificationKind::Custom);
        assert_eq!(custom.fires_at(None), Some(1_700_000_000_000));

        let raw = serde_json::to_value(&custom).unwrap();
        assert_eq!(raw["type"], "CUSTOM");
    }
}
