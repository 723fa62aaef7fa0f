//! Result formatting callbacks
//!
//! The formatter, the host collaborators it delegates to, and the rendering
//! helpers they share.

pub mod formatter;
pub mod host;
pub mod render;

pub use formatter::{FormatterOptions, ResultFormatter};
pub use host::{DefaultHost, Host};
pub use render::{sanitize, OutputMode, Sanitized, CENSORED_MESSAGE};
