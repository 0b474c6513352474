//! Logging abstractions
//!
//! The host owns the process's output streams, so every component logs through an
//! injected `Logger` instead of writing to stdout directly.

mod traits;
mod noop;
mod console;
mod memory;

pub use traits::{Logger, LogLevel, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use memory::{MemoryLogger, LogRecord};
