//! taskfmt - task result formatter
//!
//! Renders an automation runtime's task results for the terminal: numbered
//! banners with elapsed time, shell transcripts with CI folding markers,
//! censored sensitive results, and key-sorted dumps of everything else.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

pub mod callback;
pub mod cli;
pub mod config;
pub mod event;

#[cfg(test)]
mod testutil;

// Re-export commonly used types
pub use callback::{DefaultHost, FormatterOptions, Host, OutputMode, ResultFormatter};
pub use cli::{BufferSink, Console, OutputSink};
pub use config::{DisplayConfig, Palette};
pub use event::{parse_event, HostEvent, PlayDescriptor, TaskDescriptor, TaskResult, TaskStatus};
