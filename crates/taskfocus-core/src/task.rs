//! Task records as exchanged with the task service.
//!
//! Tasks are owned by the remote service. A session only ever holds a local
//! copy, and merges the service's answer into it after a successful write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Expired,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Expired => "Expired",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    /// Accepts the wire spelling as well as CLI-friendly forms
    /// (`in-progress`, `in_progress`, any case).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "inprogress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            "expired" => Ok(TaskStatus::Expired),
            _ => Err(format!(
                "Invalid task status: '{s}'. Use todo, in-progress, completed or expired."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Estimated effort in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dued_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            description: None,
            priority: None,
            estimated_time: None,
            opened_at: None,
            dued_at: None,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == TaskStatus::InProgress
    }

    /// Merge the service's copy of this task into the local one.
    ///
    /// Fields the service left empty keep their local value. Returns `false`
    /// (and changes nothing) when `remote` describes a different task.
    pub fn merge(&mut self, remote: Task) -> bool {
        if remote.id != self.id {
            return false;
        }
        self.status = remote.status;
        if !remote.name.is_empty() {
            self.name = remote.name;
        }
        if remote.description.is_some() {
            self.description = remote.description;
        }
        if remote.priority.is_some() {
            self.priority = remote.priority;
        }
        if remote.estimated_time.is_some() {
            self.estimated_time = remote.estimated_time;
        }
        if remote.opened_at.is_some() {
            self.opened_at = remote.opened_at;
        }
        if remote.dued_at.is_some() {
            self.dued_at = remote.dued_at;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_service_spelling() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let parsed: TaskStatus = serde_json::from_str("\"Expired\"").unwrap();
        assert_eq!(parsed, TaskStatus::Expired);
    }

    #[test]
    fn status_parses_cli_forms() {
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("In Progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("TODO".parse::<TaskStatus>().unwrap(), TaskStatus::Todo);
        assert!("paused".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn task_deserializes_service_payload() {
        let json = r#"{
            "id": "t1",
            "name": "Read chapter 3",
            "status": "Todo",
            "priority": "High",
            "createdBy": "u1",
            "opened_at": "2025-01-05T19:01:00.000Z",
            "dued_at": "2025-01-05T21:00:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "t1");
        assert_eq!(task.priority, Some(Priority::High));
        assert!(task.opened_at.is_some());
        assert!(task.description.is_none());
    }

    #[test]
    fn merge_keeps_local_fields_the_service_omitted() {
        let mut local = Task::new("t1", "Essay", TaskStatus::Todo);
        local.description = Some("draft".into());

        let remote = Task::new("t1", "", TaskStatus::InProgress);
        assert!(local.merge(remote));
        assert_eq!(local.status, TaskStatus::InProgress);
        assert_eq!(local.name, "Essay");
        assert_eq!(local.description.as_deref(), Some("draft"));
    }

    #[test]
    fn merge_ignores_other_tasks() {
        let mut local = Task::new("t1", "Essay", TaskStatus::Todo);
        assert!(!local.merge(Task::new("t2", "Other", TaskStatus::Completed)));
        assert_eq!(local.status, TaskStatus::Todo);
    }
}
