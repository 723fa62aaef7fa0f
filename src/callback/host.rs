//! Host collaborators
//!
//! The pieces of rendering the formatter leaves to the host runtime's
//! stock output: exception and warning surfacing, result cleanup, the play
//! banner, and loop-item lines. [`DefaultHost`] reproduces the host's
//! default stdout behaviour; embedders can supply their own [`Host`].

use serde_json::Value;

use super::render::{dump_result, is_no_log, is_truthy, play_banner, value_text};
use crate::cli::display::OutputSink;
use crate::config::Palette;
use crate::event::model::{ItemStatus, Payload, PlayDescriptor, TaskResult};

/// Actions treated as the debug module
const DEBUG_ACTIONS: [&str; 2] = ["debug", "ansible.builtin.debug"];

/// Keys a debug result with `msg` keeps
const DEBUG_MSG_KEYS: [&str; 4] = ["msg", "exception", "warnings", "deprecations"];

/// Keys hidden from debug output
const HIDE_IN_DEBUG: [&str; 5] = ["changed", "failed", "skipped", "invocation", "skip_reason"];

/// Verbosity at which tracebacks and invocations are shown in full
const FULL_DETAIL_VERBOSITY: u8 = 3;

/// Rendering behaviour supplied by the host runtime
pub trait Host {
    /// Announce a new play
    fn play_start(&self, play: &PlayDescriptor, out: &mut dyn OutputSink);

    /// Surface an `exception` entry of the payload
    fn handle_exception(&self, payload: &mut Payload, out: &mut dyn OutputSink);

    /// Surface (and consume) `warnings` and `deprecations`
    fn handle_warnings(&self, payload: &mut Payload, out: &mut dyn OutputSink);

    /// Drop keys that are noise for the given action
    fn clean_results(&self, payload: &mut Payload, action: &str);

    /// Render one loop-item result
    fn item_result(&self, status: ItemStatus, result: &TaskResult, out: &mut dyn OutputSink);
}

/// The host's stock rendering
#[derive(Debug, Clone, Default)]
pub struct DefaultHost {
    palette: Palette,
    verbosity: u8,
}

impl DefaultHost {
    /// Create a host renderer with the given colors and verbosity
    #[must_use]
    pub const fn new(palette: Palette, verbosity: u8) -> Self {
        Self { palette, verbosity }
    }

    fn run_is_verbose(&self, payload: &Payload) -> bool {
        self.verbosity > 0
            || payload
                .get("_ansible_verbose_always")
                .is_some_and(is_truthy)
    }

    /// Item dump: compact unless very verbose, `invocation` only at full detail
    fn dump(&self, payload: &Payload) -> String {
        let mut payload = payload.clone();
        if self.verbosity < FULL_DETAIL_VERBOSITY {
            payload.remove("invocation");
        }
        let pretty = self.verbosity >= FULL_DETAIL_VERBOSITY
            || payload
                .get("_ansible_verbose_always")
                .is_some_and(is_truthy);
        dump_result(&payload, pretty)
    }
}

/// Label of a loop item: `_ansible_item_label`, else `item`
fn item_label(payload: &Payload) -> String {
    if is_no_log(payload) {
        return "(censored due to no_log)".to_string();
    }
    payload
        .get("_ansible_item_label")
        .or_else(|| payload.get("item"))
        .map_or_else(|| "None".to_string(), value_text)
}

fn deprecation_text(entry: &Value) -> String {
    match entry {
        Value::Object(map) => {
            let msg = map.get("msg").map(value_text).unwrap_or_default();
            match map.get("version").filter(|v| is_truthy(v)) {
                Some(version) => format!(
                    "{msg}. This feature will be removed in version {}.",
                    value_text(version)
                ),
                None => msg,
            }
        }
        other => value_text(other),
    }
}

fn entries(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

impl Host for DefaultHost {
    fn play_start(&self, play: &PlayDescriptor, out: &mut dyn OutputSink) {
        out.display(&play_banner(&play.name), None);
    }

    fn handle_exception(&self, payload: &mut Payload, out: &mut dyn OutputSink) {
        let Some(exception) = payload.get("exception") else {
            return;
        };
        let traceback = value_text(exception);

        // The short form leaves the traceback in the payload.
        let msg = if self.verbosity < FULL_DETAIL_VERBOSITY {
            let error = traceback.trim().lines().last().unwrap_or_default();
            format!(
                "An exception occurred during task execution. To see the full traceback, use -vvv. The error was: {error}"
            )
        } else {
            payload.remove("exception");
            format!("The full traceback is:\n{traceback}")
        };
        out.display(&msg, self.palette.error);
    }

    fn handle_warnings(&self, payload: &mut Payload, out: &mut dyn OutputSink) {
        if let Some(warnings) = payload.remove("warnings") {
            for warning in entries(warnings) {
                out.warning(
                    &format!("[WARNING]: {}", value_text(&warning)),
                    self.palette.warn,
                );
            }
        }
        if let Some(deprecations) = payload.remove("deprecations") {
            for entry in entries(deprecations) {
                out.warning(
                    &format!("[DEPRECATION WARNING]: {}", deprecation_text(&entry)),
                    self.palette.deprecate,
                );
            }
        }
    }

    fn clean_results(&self, payload: &mut Payload, action: &str) {
        if !DEBUG_ACTIONS.contains(&action) {
            return;
        }
        if payload.contains_key("msg") {
            payload.retain(|key, _| DEBUG_MSG_KEYS.contains(&key.as_str()) || key.starts_with('_'));
        } else {
            for key in HIDE_IN_DEBUG {
                payload.remove(key);
            }
        }
    }

    fn item_result(&self, status: ItemStatus, result: &TaskResult, out: &mut dyn OutputSink) {
        let mut payload = result.payload.clone();
        self.clean_results(&mut payload, &result.task.action);

        let host = &result.host;
        let label = item_label(&result.payload);
        let verbose = self.run_is_verbose(&payload);

        let (msg, color) = match status {
            ItemStatus::Ok => {
                let (word, color) = if payload.get("changed").is_some_and(is_truthy) {
                    ("changed", self.palette.changed)
                } else {
                    ("ok", self.palette.ok)
                };
                let mut msg = format!("{word}: [{host}] => (item={label})");
                if verbose {
                    msg.push_str(&format!(" => {}", self.dump(&payload)));
                }
                (msg, color)
            }
            ItemStatus::Failed => {
                if !is_no_log(&payload) {
                    self.handle_exception(&mut payload, out);
                    self.handle_warnings(&mut payload, out);
                }
                (
                    format!("failed: [{host}] (item={label}) => {}", self.dump(&payload)),
                    self.palette.error,
                )
            }
            ItemStatus::Skipped => {
                let mut msg = format!("skipping: [{host}] => (item={label})");
                if verbose {
                    msg.push_str(&format!(" => {}", self.dump(&payload)));
                }
                (msg, self.palette.skip)
            }
        };
        out.display(&msg, color);
    }
}
