//! Newline-delimited JSON lifecycle events
//!
//! The host emits one JSON object per line, tagged by an `event` field.
//! Each line is parsed into a [`HostEvent`] for dispatch to the formatter.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::model::{ItemStatus, PlayDescriptor, TaskDescriptor, TaskResult, TaskStatus};

/// A lifecycle notification from the host runtime
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// A play is starting
    PlayStart {
        /// The play being started
        play: PlayDescriptor,
    },
    /// A task is about to run
    TaskStart {
        /// The task
        task: TaskDescriptor,
        /// Whether the task carries a conditional
        #[serde(default)]
        is_conditional: bool,
    },
    /// A task started on a specific host
    RunnerStart {
        /// Inventory host name
        #[serde(default)]
        host: String,
        /// The task
        task: TaskDescriptor,
    },
    /// A task finished on a host
    RunnerResult {
        /// How it finished
        status: TaskStatus,
        /// The result
        result: TaskResult,
    },
    /// A single loop item finished
    ItemResult {
        /// How the item finished
        status: ItemStatus,
        /// The item result
        result: TaskResult,
    },
    /// Any event this formatter has no hook for
    #[serde(other)]
    Unknown,
}

/// Parse a single line of the event stream.
///
/// Returns `Ok(None)` for blank lines. Lines that are not JSON, lack an
/// `event` tag, or carry a malformed body are errors.
pub fn parse_event(line: &str) -> Result<Option<HostEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(line).context("Event is not valid JSON")?;
    let kind = value
        .get("event")
        .and_then(Value::as_str)
        .context("Event has no 'event' field")?
        .to_string();

    let event: HostEvent =
        serde_json::from_value(value).with_context(|| format!("Malformed '{kind}' event"))?;

    if event == HostEvent::Unknown {
        tracing::debug!(event = %kind, "ignoring unhandled host event");
    }

    Ok(Some(event))
}
