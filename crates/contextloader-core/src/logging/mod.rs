//! Logging seam
//!
//! Components take an `Arc<dyn Logger>` and use the `log_*!` macros.
//! Hosts pick the sink: `TracingLogger` for the CLI, `NoOpLogger` or
//! `RecordingLogger` in tests, `ConsoleLogger` for plain stderr.

mod traits;
mod noop;
mod console;
mod tracing_logger;

pub use traits::{LogLevel, Logger};
pub use noop::{NoOpLogger, RecordingLogger};
pub use console::ConsoleLogger;
pub use tracing_logger::TracingLogger;
