use serde::{Deserialize, Serialize};

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Execution queue a schedule is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueName {
    /// Regular, user-visible schedules.
    #[default]
    Main,
    /// One-shot schedules created to run a script immediately.
    Preview,
}

impl QueueName {
    /// Wire name of the queue.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueName::Main => "main",
            QueueName::Preview => "preview",
        }
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// A user-authored script.
///
/// `id` is `None` until the script has been persisted once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: String,
    /// Editor-computed optimisation hints, forwarded to the server as-is.
    #[serde(default = "empty_object")]
    pub optimisations: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

impl Script {
    /// A new, unsaved script with no title and no optimisation hints.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: None,
            code: code.into(),
            title: String::new(),
            optimisations: empty_object(),
        }
    }

    /// Address an existing script; saving then updates instead of creating.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Replace the optimisation hints.
    pub fn with_optimisations(mut self, optimisations: serde_json::Value) -> Self {
        self.optimisations = optimisations;
        self
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Trigger configuration that makes the runner execute a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub script_id: String,
    #[serde(default)]
    pub queue_name: QueueName,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default)]
    pub recurrence: Option<String>,
    #[serde(default)]
    pub start_time: Option<Timestamp>,
}

impl Schedule {
    /// A one-shot preview schedule. Never paused, never recurring.
    pub fn preview(script_id: impl Into<String>) -> Self {
        Self {
            id: None,
            script_id: script_id.into(),
            queue_name: QueueName::Preview,
            is_paused: false,
            recurrence: None,
            start_time: None,
        }
    }

    /// A schedule on the main queue with no recurrence yet.
    pub fn main(script_id: impl Into<String>) -> Self {
        Self {
            queue_name: QueueName::Main,
            ..Self::preview(script_id)
        }
    }

    /// Set the recurrence rule (cron-style string).
    pub fn with_recurrence(mut self, recurrence: impl Into<String>) -> Self {
        self.recurrence = Some(recurrence.into());
        self
    }

    /// Set the first time the schedule fires.
    pub fn with_start_time(mut self, start_time: Timestamp) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Set whether the schedule is paused.
    pub fn paused(mut self, is_paused: bool) -> Self {
        self.is_paused = is_paused;
        self
    }
}

// ---------------------------------------------------------------------------
// Routine
// ---------------------------------------------------------------------------

/// One execution instance spawned by a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    #[serde(default)]
    pub schedule_id: Option<String>,
    /// Full log so far. Each fetch replaces the previous value.
    #[serde(default)]
    pub runner_log: String,
    #[serde(default)]
    pub is_completed: bool,
}

/// Body of `GET /routines/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineStatus {
    #[serde(default)]
    pub runner_log: String,
    #[serde(default)]
    pub is_completed: bool,
}

/// Body of `GET /routines`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutineList {
    #[serde(default)]
    pub data: Vec<Routine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_schedule_is_on_preview_queue() {
        let schedule = Schedule::preview("s1");
        assert_eq!(schedule.queue_name, QueueName::Preview);
        assert_eq!(schedule.script_id, "s1");
        assert!(!schedule.is_paused);
        assert!(schedule.recurrence.is_none());
        assert!(schedule.start_time.is_none());
    }

    #[test]
    fn main_schedule_keeps_defaults() {
        let schedule = Schedule::main("s1").with_recurrence("0 * * * *").paused(true);
        assert_eq!(schedule.queue_name, QueueName::Main);
        assert_eq!(schedule.recurrence.as_deref(), Some("0 * * * *"));
        assert!(schedule.is_paused);
    }

    #[test]
    fn queue_name_serializes_lowercase() {
        assert_eq!(serde_json::to_value(QueueName::Preview).unwrap(), "preview");
        assert_eq!(QueueName::Main.to_string(), "main");
    }

    #[test]
    fn routine_status_tolerates_missing_fields() {
        let status: RoutineStatus = serde_json::from_str(r#"{"is_completed": true}"#).unwrap();
        assert!(status.is_completed);
        assert_eq!(status.runner_log, "");
    }

    #[test]
    fn routine_list_parses_data_envelope() {
        let list: RoutineList =
            serde_json::from_str(r#"{"data": [{"id": "r1", "schedule_id": "sch1"}]}"#).unwrap();
        assert_eq!(list.data.len(), 1);
        assert_eq!(list.data[0].id, "r1");
        assert_eq!(list.data[0].schedule_id.as_deref(), Some("sch1"));
    }

    #[test]
    fn script_from_server_defaults_optimisations() {
        let script: Script = serde_json::from_str(r#"{"id": "s1", "code": "print(1)"}"#).unwrap();
        assert_eq!(script.id.as_deref(), Some("s1"));
        assert!(script.optimisations.is_object());
    }
}
