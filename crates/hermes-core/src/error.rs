//! Error types for Hermes.
//!
//! [`HermesError`] is the single failure type that flows through the
//! middleware chain. Expected request outcomes (validation failure, admission
//! rejection, deadline expiry) and genuine faults share the taxonomy but are
//! distinct variants, so recovery stages can match on kind instead of parsing
//! messages.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias using [`HermesError`].
pub type HermesResult<T> = Result<T, HermesError>;

/// Machine-readable error kinds, one per [`HermesError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No route matched the request.
    NotFound,
    /// Structured input failed construction or validation.
    Validation,
    /// The request body could not be parsed at all.
    BadBody,
    /// Missing or invalid credentials.
    Unauthorized,
    /// Concurrency capacity exhausted past the wait budget.
    AdmissionRejected,
    /// The request deadline elapsed.
    DeadlineExceeded,
    /// A downstream service failed (5xx or transport error).
    Upstream,
    /// Startup wiring error, e.g. an unregistered service name.
    Configuration,
    /// Unclassified server fault.
    Internal,
}

impl ErrorKind {
    /// Returns the HTTP status code this kind maps to.
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadBody => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::AdmissionRejected => StatusCode::SERVICE_UNAVAILABLE,
            Self::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream => StatusCode::BAD_GATEWAY,
            Self::Configuration | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable error code string.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::BadBody => "BAD_BODY",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::AdmissionRejected => "ADMISSION_REJECTED",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::Upstream => "UPSTREAM_FAILURE",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Standard error type for Hermes.
///
/// Application handlers return `HermesError` for declared failures; the
/// dispatcher translates each variant into a response with the status code
/// from [`ErrorKind::status_code`]. Anything that reaches the boundary as
/// [`HermesError::Internal`] is logged and rendered without internal detail.
///
/// # Example
///
/// ```
/// use hermes_core::{HermesError, HermesResult};
///
/// fn find_item(id: &str) -> HermesResult<String> {
///     if id.is_empty() {
///         return Err(HermesError::not_found("no such item"));
///     }
///     Ok(id.to_string())
/// }
/// ```
#[derive(Error, Debug)]
pub enum HermesError {
    /// No route matched the request.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Structured input failed validation.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// Field-specific validation errors.
        #[source]
        field_errors: Option<FieldErrors>,
    },

    /// The request body could not be parsed.
    #[error("Bad body: {message}")]
    BadBody {
        /// Human-readable error message.
        message: String,
    },

    /// Missing or invalid credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Human-readable error message.
        message: String,
    },

    /// Concurrency capacity exhausted past the wait budget.
    #[error("Admission rejected: {message}")]
    AdmissionRejected {
        /// Human-readable error message.
        message: String,
        /// Seconds the caller should wait before retrying.
        retry_after_seconds: u64,
    },

    /// The request deadline elapsed.
    #[error("Deadline exceeded: {message}")]
    DeadlineExceeded {
        /// Human-readable error message.
        message: String,
    },

    /// A downstream service failed.
    #[error("Upstream failure: {message}")]
    Upstream {
        /// Human-readable error message.
        message: String,
        /// The name of the failing service, when known.
        service: Option<String>,
    },

    /// Startup wiring error, e.g. an unregistered service name.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Human-readable error message.
        message: String,
    },

    /// Unclassified server fault. The source is logged, never serialized.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message (not exposed to clients).
        message: String,
        /// The underlying error, for diagnostics only.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl HermesError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a validation error without field detail.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Creates a validation error carrying field-level errors.
    #[must_use]
    pub fn validation_with_fields(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    /// Creates a bad-body error for an unparseable request payload.
    #[must_use]
    pub fn bad_body(message: impl Into<String>) -> Self {
        Self::BadBody {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates an admission-rejected error with a retry hint.
    #[must_use]
    pub fn admission_rejected(retry_after_seconds: u64) -> Self {
        Self::AdmissionRejected {
            message: "service at capacity".to_string(),
            retry_after_seconds,
        }
    }

    /// Creates a deadline-exceeded error.
    #[must_use]
    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::DeadlineExceeded {
            message: message.into(),
        }
    }

    /// Creates an upstream failure naming the failing service.
    #[must_use]
    pub fn upstream(message: impl Into<String>, service: Option<impl Into<String>>) -> Self {
        Self::Upstream {
            message: message.into(),
            service: service.map(Into::into),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error wrapping a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::BadBody { .. } => ErrorKind::BadBody,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::AdmissionRejected { .. } => ErrorKind::AdmissionRejected,
            Self::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    /// Converts this error into a serializable envelope.
    ///
    /// Internal faults are rendered with a fixed public message; their real
    /// message and source stay in the logs.
    #[must_use]
    pub fn to_envelope(&self, trace_id: Option<&str>) -> ErrorEnvelope {
        let message = match self {
            Self::Internal { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        };
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.kind().code().to_string(),
                message,
                details: self.error_details(),
            },
            trace_id: trace_id.map(ToString::to_string),
        }
    }

    /// Returns variant-specific detail for the envelope.
    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation {
                field_errors: Some(errors),
                ..
            } => serde_json::to_value(errors).ok(),
            Self::AdmissionRejected {
                retry_after_seconds,
                ..
            } => Some(serde_json::json!({
                "retry_after_seconds": retry_after_seconds
            })),
            Self::Upstream {
                service: Some(svc), ..
            } => Some(serde_json::json!({ "service": svc })),
            _ => None,
        }
    }
}

/// Field-specific validation errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Error)]
#[error("Field validation errors")]
pub struct FieldErrors {
    /// Map of field path to list of error messages.
    pub fields: HashMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates a new empty `FieldErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns `true` if there are no field errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Serializable error envelope for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The trace ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
