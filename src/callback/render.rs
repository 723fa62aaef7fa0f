//! Rendering helpers
//!
//! Free functions behind the formatter: banners, argument suffixes, elapsed
//! time, payload sanitization, command output and key-sorted dumps.

use std::collections::BTreeMap;
use std::io;
use std::time::Duration;

use colored::Color;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::{Map, Value};

use crate::cli::display::OutputSink;
use crate::event::model::{Payload, TaskDescriptor};

/// Prefix of host bookkeeping keys in a result payload
pub const INTERNAL_KEY_PREFIX: &str = "_ansible_";

/// Payload flag marking a result as sensitive
pub const NO_LOG_KEY: &str = "_ansible_no_log";

/// Text shown in place of a sensitive result
pub const CENSORED_MESSAGE: &str =
    "The output has been hidden due to the fact that 'no_log: true' was specified for this result";

/// Actions whose output is rendered as a shell transcript
pub const COMMAND_ACTIONS: [&str; 4] = [
    "command",
    "shell",
    "ansible.builtin.command",
    "ansible.builtin.shell",
];

const BANNER_WIDTH: usize = 79;

/// How command output is framed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// `$ cmd` prompt line
    #[default]
    Console,
    /// `::group::cmd` / `::endgroup::` folding markers for CI log viewers
    CiGroups,
}

impl OutputMode {
    /// CI mode when `var` is set to a non-empty value
    #[must_use]
    pub fn from_env(var: &str) -> Self {
        match std::env::var_os(var) {
            Some(v) if !v.is_empty() => Self::CiGroups,
            _ => Self::Console,
        }
    }
}

/// Result of [`sanitize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitized {
    /// The payload was sensitive; only this text may be shown
    Censored(String),
    /// The payload with bookkeeping keys removed
    Payload(Payload),
}

/// Loose truthiness, matching how the host tests optional fields
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Whether the payload carries a true no-log flag
#[must_use]
pub fn is_no_log(payload: &Payload) -> bool {
    payload.get(NO_LOG_KEY).is_some_and(is_truthy)
}

/// Text form of a value: strings raw, argv lists space-joined, everything else as JSON
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

/// Remove every `_ansible_*` key, descending into nested objects and lists
pub fn strip_internal_keys(payload: &mut Payload) {
    payload.retain(|key, _| !key.starts_with(INTERNAL_KEY_PREFIX));
    for value in payload.values_mut() {
        strip_value(value);
    }
}

fn strip_value(value: &mut Value) {
    match value {
        Value::Object(map) => strip_internal_keys(map),
        Value::Array(items) => items.iter_mut().for_each(strip_value),
        _ => {}
    }
}

/// Replace a sensitive payload with the censorship marker, otherwise return
/// a copy without bookkeeping keys.
#[must_use]
pub fn sanitize(payload: &Payload) -> Sanitized {
    if is_no_log(payload) {
        return Sanitized::Censored(CENSORED_MESSAGE.to_string());
    }

    let mut cleaned = payload.clone();
    strip_internal_keys(&mut cleaned);
    Sanitized::Payload(cleaned)
}

/// ` key=value, key=value` suffix for the banner, or empty.
///
/// Empty for no-log tasks and when `show_args` is off.
#[must_use]
pub fn format_args(task: &TaskDescriptor, show_args: bool) -> String {
    if task.no_log || !show_args {
        return String::new();
    }

    let joined = task
        .args
        .iter()
        .map(|(k, v)| format!("{k}={}", value_text(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(" {joined}")
}

/// Whole seconds, e.g. `3s`
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.0}s", elapsed.as_secs_f64())
}

/// Task banner: `\n[STATUS] index/total name args (Ns)`.
///
/// `status` is passed already colored.
#[must_use]
pub fn task_banner(
    status: &str,
    index: usize,
    total: usize,
    task: &TaskDescriptor,
    show_args: bool,
    elapsed: Duration,
) -> String {
    format!(
        "\n[{status}] {index}/{total} {}{} ({})",
        task.display_name(),
        format_args(task, show_args),
        format_elapsed(elapsed)
    )
}

/// `\nPLAY [name] ****` padded to the banner width
#[must_use]
pub fn play_banner(name: &str) -> String {
    let name = name.trim();
    let msg = if name.is_empty() {
        "PLAY".to_string()
    } else {
        format!("PLAY [{name}]")
    };
    let stars = BANNER_WIDTH.saturating_sub(msg.chars().count()).max(3);
    format!("\n{msg} {}", "*".repeat(stars))
}

/// Whether `action` gets shell-transcript rendering
#[must_use]
pub fn is_command_action(action: &str) -> bool {
    COMMAND_ACTIONS.contains(&action)
}

/// Print a command transcript: the command line, then stdout, then stderr.
///
/// Does nothing when the payload has no `cmd`.
pub fn display_cmd_output(
    out: &mut dyn OutputSink,
    payload: &Payload,
    mode: OutputMode,
    error_color: Option<Color>,
) {
    let Some(cmd) = payload.get("cmd").filter(|v| is_truthy(v)) else {
        return;
    };
    let cmd = value_text(cmd);

    match mode {
        OutputMode::CiGroups => out.display(&format!("::group::{cmd}"), None),
        OutputMode::Console => out.display(&format!("$ {cmd}"), None),
    }

    if let Some(stdout) = payload.get("stdout").filter(|v| is_truthy(v)) {
        out.display(&value_text(stdout), None);
    }
    if let Some(stderr) = payload.get("stderr").filter(|v| is_truthy(v)) {
        out.display(&value_text(stderr), error_color);
    }

    if mode == OutputMode::CiGroups {
        out.display("::endgroup::", None);
    }
}

/// Single-line JSON with `", "` and `": "` separators
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn write_sorted<F: Formatter>(payload: &Payload, formatter: F) -> String {
    let sorted = sort_keys(&Value::Object(payload.clone()));
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if sorted.serialize(&mut ser).is_err() {
        return sorted.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| sorted.to_string())
}

/// Pretty JSON with 4-space indentation and keys sorted at every level
#[must_use]
pub fn dump_sorted(payload: &Payload) -> String {
    write_sorted(payload, PrettyFormatter::with_indent(b"    "))
}

/// One-line JSON, keys sorted at every level, e.g. `{"a": 1, "b": [1, 2]}`
#[must_use]
pub fn dump_compact(payload: &Payload) -> String {
    write_sorted(payload, SpacedFormatter)
}

/// Dump a payload for display, honouring no-log. `pretty` selects
/// [`dump_sorted`] over [`dump_compact`].
#[must_use]
pub fn dump_result(payload: &Payload, pretty: bool) -> String {
    let cleaned = match sanitize(payload) {
        Sanitized::Censored(msg) => {
            let mut marker = Map::new();
            marker.insert("censored".to_string(), Value::String(msg));
            marker
        }
        Sanitized::Payload(cleaned) => cleaned,
    };
    if pretty {
        dump_sorted(&cleaned)
    } else {
        dump_compact(&cleaned)
    }
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(
                ordered
                    .into_iter()
                    .map(|(k, v)| (k.clone(), v))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
