//! CLI output
//!
//! Terminal sinks for formatter output.

pub mod display;

pub use display::stringc;
pub use display::BufferSink;
pub use display::Console;
pub use display::Line;
pub use display::OutputSink;
