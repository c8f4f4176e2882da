//! Audit log sinks for API calls
//!
//! - [`MemoryApiLog`]: bounded in-process buffer of recent entries
//! - [`TracingApiLogSink`]: forwards entries as `tracing` events

pub mod memory;
pub mod tracing_sink;

pub use memory::MemoryApiLog;
pub use tracing_sink::TracingApiLogSink;
