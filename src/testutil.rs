//! Shared test utilities
//!
//! Builders for host descriptors used across test modules. Only compiled in
//! test builds.

use serde_json::Value;

use crate::event::model::{Payload, PlayDescriptor, TaskDescriptor, TaskResult};

/// Turn a `json!({...})` literal into a payload. Panics on non-objects.
#[must_use]
pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A task with a name and action and nothing else
#[must_use]
pub fn make_task(name: &str, action: &str) -> TaskDescriptor {
    TaskDescriptor {
        name: name.to_string(),
        action: action.to_string(),
        ..Default::default()
    }
}

/// A play whose blocks hold the given numbers of `ping` tasks
#[must_use]
pub fn make_play(name: &str, block_sizes: &[usize]) -> PlayDescriptor {
    PlayDescriptor {
        name: name.to_string(),
        tasks: block_sizes
            .iter()
            .map(|&n| (1..=n).map(|i| make_task(&format!("task {i}"), "ping")).collect())
            .collect(),
    }
}

/// A result for `task` on `host` carrying the given payload
#[must_use]
pub fn make_result(host: &str, task: TaskDescriptor, result: Value) -> TaskResult {
    TaskResult {
        host: host.to_string(),
        task,
        payload: payload(result),
    }
}
