//! Host-side descriptors consumed by the formatter
//!
//! These mirror the parts of the host's play, task and result objects that
//! are actually read when rendering. Everything else the host knows about a
//! task is irrelevant here and is ignored on deserialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A task result payload: arbitrary module output plus host bookkeeping keys
pub type Payload = Map<String, Value>;

/// A single task as the host describes it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Task name as written in the play (may be empty)
    #[serde(default)]
    pub name: String,
    /// Module identifier, e.g. `command` or `ansible.builtin.shell`
    pub action: String,
    /// Module arguments, in the order they were written
    #[serde(default)]
    pub args: Map<String, Value>,
    /// Whether the task suppresses sensitive output
    #[serde(default)]
    pub no_log: bool,
}

impl TaskDescriptor {
    /// Name shown in banners: the trimmed task name, or the action when unnamed
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            self.action.trim()
        } else {
            name
        }
    }
}

/// A play: a name and its blocks of tasks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayDescriptor {
    /// Play name (may be empty)
    #[serde(default)]
    pub name: String,
    /// Task blocks, in play order
    #[serde(default)]
    pub tasks: Vec<Vec<TaskDescriptor>>,
}

impl PlayDescriptor {
    /// Number of tasks in the first block, 0 for a play without blocks
    #[must_use]
    pub fn first_block_len(&self) -> usize {
        self.tasks.first().map_or(0, Vec::len)
    }
}

/// The outcome of running one task on one host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Inventory name of the host the task ran on
    #[serde(default)]
    pub host: String,
    /// The task that produced this result
    pub task: TaskDescriptor,
    /// Raw result payload
    #[serde(default)]
    pub payload: Payload,
}

/// Final status of a task on a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task succeeded
    Ok,
    /// Task failed
    Failed,
    /// Task was skipped by a conditional
    Skipped,
    /// Host could not be reached
    Unreachable,
}

impl TaskStatus {
    /// Banner label for this status
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
            Self::Unreachable => "UNREACHABLE",
        }
    }
}

/// Status of a single loop item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Item succeeded
    Ok,
    /// Item failed
    Failed,
    /// Item was skipped
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name_trims() {
        let task = TaskDescriptor {
            name: "  Install packages \n".to_string(),
            action: "apt".to_string(),
            ..Default::default()
        };
        assert_eq!(task.display_name(), "Install packages");
    }

    #[test]
    fn test_display_name_falls_back_to_action() {
        let task = TaskDescriptor {
            name: "   ".to_string(),
            action: "ansible.builtin.ping".to_string(),
            ..Default::default()
        };
        assert_eq!(task.display_name(), "ansible.builtin.ping");
    }

    #[test]
    fn test_task_defaults_on_deserialize() {
        let task: TaskDescriptor = serde_json::from_value(json!({"action": "ping"})).unwrap();
        assert_eq!(task.name, "");
        assert!(task.args.is_empty());
        assert!(!task.no_log);
    }

    #[test]
    fn test_task_args_keep_written_order() {
        let task: TaskDescriptor = serde_json::from_str(
            r#"{"action": "copy", "args": {"src": "a", "dest": "b", "mode": "0644"}}"#,
        )
        .unwrap();
        let keys: Vec<&str> = task.args.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["src", "dest", "mode"]);
    }

    #[test]
    fn test_first_block_len() {
        let play: PlayDescriptor = serde_json::from_value(json!({
            "name": "site",
            "tasks": [
                [{"action": "ping"}, {"action": "setup"}, {"action": "command"}],
                [{"action": "debug"}]
            ]
        }))
        .unwrap();
        assert_eq!(play.first_block_len(), 3);
    }

    #[test]
    fn test_first_block_len_without_blocks() {
        assert_eq!(PlayDescriptor::default().first_block_len(), 0);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(TaskStatus::Ok.label(), "OK");
        assert_eq!(TaskStatus::Failed.label(), "FAILED");
        assert_eq!(TaskStatus::Skipped.label(), "SKIPPED");
        assert_eq!(TaskStatus::Unreachable.label(), "UNREACHABLE");
    }

    #[test]
    fn test_status_deserializes_lowercase() {
        let status: TaskStatus = serde_json::from_str("\"unreachable\"").unwrap();
        assert_eq!(status, TaskStatus::Unreachable);
        let item: ItemStatus = serde_json::from_str("\"skipped\"").unwrap();
        assert_eq!(item, ItemStatus::Skipped);
    }
}
