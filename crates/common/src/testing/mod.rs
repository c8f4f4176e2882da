//! Testing utilities
//!
//! - **[`time`]**: deterministic clock and a sleeper that records instead of
//!   waiting

pub mod time;

pub use time::{MockClock, RecordingSleeper};
