//! Telemetry error type.

use thiserror::Error;

/// Result alias for telemetry setup.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Errors raised while initializing telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Logging could not be initialized.
    #[error("logging initialization failed: {0}")]
    LoggingInit(String),
}
