//! Console output sink
//!
//! Everything the formatter prints goes through an [`OutputSink`]: a
//! message plus an optional color. [`Console`] writes to the terminal,
//! [`BufferSink`] keeps the lines in memory.

use colored::{Color, Colorize};

/// Destination for rendered text
pub trait OutputSink {
    /// Print a message to regular output
    fn display(&mut self, msg: &str, color: Option<Color>);

    /// Print a warning. Defaults to regular output.
    fn warning(&mut self, msg: &str, color: Option<Color>) {
        self.display(msg, color);
    }
}

impl<T: OutputSink + ?Sized> OutputSink for &mut T {
    fn display(&mut self, msg: &str, color: Option<Color>) {
        (**self).display(msg, color);
    }

    fn warning(&mut self, msg: &str, color: Option<Color>) {
        (**self).warning(msg, color);
    }
}

/// Wrap `text` in the given color, or return it untouched for `None`
#[must_use]
pub fn stringc(text: &str, color: Option<Color>) -> String {
    match color {
        Some(color) => text.color(color).to_string(),
        None => text.to_string(),
    }
}

/// Writes messages to stdout and warnings to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl OutputSink for Console {
    fn display(&mut self, msg: &str, color: Option<Color>) {
        println!("{}", stringc(msg, color));
    }

    fn warning(&mut self, msg: &str, color: Option<Color>) {
        eprintln!("{}", stringc(msg, color));
    }
}

/// One captured message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Message text, uncolored
    pub text: String,
    /// Requested color
    pub color: Option<Color>,
    /// Whether it was sent as a warning
    pub stderr: bool,
}

/// Collects messages in memory instead of printing them
#[derive(Debug, Default, Clone)]
pub struct BufferSink {
    lines: Vec<Line>,
}

impl BufferSink {
    /// Create an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured messages, oldest first
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Captured messages joined the way a terminal would show them
    #[must_use]
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drop everything captured so far
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl OutputSink for BufferSink {
    fn display(&mut self, msg: &str, color: Option<Color>) {
        self.lines.push(Line {
            text: msg.to_string(),
            color,
            stderr: false,
        });
    }

    fn warning(&mut self, msg: &str, color: Option<Color>) {
        self.lines.push(Line {
            text: msg.to_string(),
            color,
            stderr: true,
        });
    }
}
