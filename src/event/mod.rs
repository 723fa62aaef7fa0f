//! Host lifecycle events
//!
//! Descriptors for plays, tasks and results, and the line-oriented event
//! stream the CLI reads them from.

pub mod model;
pub mod stream;

pub use model::{ItemStatus, Payload, PlayDescriptor, TaskDescriptor, TaskResult, TaskStatus};
pub use stream::{parse_event, HostEvent};
