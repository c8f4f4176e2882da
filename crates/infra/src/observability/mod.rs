//! Observability: tracing subscriber installation

pub mod logging;

pub use logging::{init_tracing, LogFormat};
