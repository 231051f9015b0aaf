//! Logging setup for Hermes services.

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{fields, init_logging, LogConfig};
