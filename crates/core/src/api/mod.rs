//! API client boundary: ports and response payload helpers

pub mod payload;
pub mod ports;
