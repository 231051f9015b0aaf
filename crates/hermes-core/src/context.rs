//! Per-request context: trace identity, deadline budget, and the span log.
//!
//! A [`RequestContext`] lives for exactly one request, including every
//! outbound call that request triggers. The trace ID is shared across hops;
//! the span ID is fresh for this hop.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Identity shared across all hops of one end-to-end request.
///
/// Inbound trace IDs are forwarded verbatim, so the inner representation is
/// a string rather than a parsed UUID: an upstream written in another stack
/// may send identifiers Hermes did not mint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    /// Mints a new trace ID using UUID v7 (time-ordered).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the trace ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TraceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TraceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity unique to a single hop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpanId(String);

impl SpanId {
    /// Mints a new span ID using UUID v7.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the span ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry in the outbound-call span log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanRecord {
    /// Logical name of the called service.
    pub service: String,
    /// Path of the outbound call.
    pub path: String,
    /// HTTP method of the outbound call.
    pub method: String,
    /// Wall-clock time the call took.
    pub elapsed: Duration,
    /// Resulting status code, or 0 when no status was produced.
    pub status: u16,
}

/// Per-request context that flows through the middleware chain.
///
/// Cloning is cheap and all clones share the same span log, so the service
/// client can append telemetry while middleware holds its own handle.
///
/// # Example
///
/// ```
/// use hermes_core::RequestContext;
/// use std::time::Duration;
///
/// let ctx = RequestContext::new("catalog", Duration::from_secs(30));
/// assert!(!ctx.is_expired());
/// assert!(ctx.remaining() <= Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Trace identity, reused across hops.
    trace_id: TraceId,
    /// This hop's span identity, always freshly minted.
    span_id: SpanId,
    /// Name of the service processing the request.
    service_name: String,
    /// When the request started processing.
    started_at: Instant,
    /// Absolute deadline for this request and all its outbound calls.
    deadline: Instant,
    /// Append-only log of outbound-call spans, shared across clones.
    spans: Arc<Mutex<Vec<SpanRecord>>>,
}

impl RequestContext {
    /// Creates a context with a freshly minted trace ID and a deadline of
    /// now plus `budget`.
    #[must_use]
    pub fn new(service_name: impl Into<String>, budget: Duration) -> Self {
        let now = Instant::now();
        Self {
            trace_id: TraceId::generate(),
            span_id: SpanId::generate(),
            service_name: service_name.into(),
            started_at: now,
            deadline: now + budget,
            spans: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a context reusing the given inbound trace ID.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = trace_id;
        self
    }

    /// Returns a context with an explicit absolute deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = deadline;
        self
    }

    /// Returns the trace ID.
    #[must_use]
    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    /// Returns this hop's span ID.
    #[must_use]
    pub fn span_id(&self) -> &SpanId {
        &self.span_id
    }

    /// Returns the owning service's name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the absolute deadline.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Returns the remaining deadline budget, clamped at zero.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Returns `true` once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Appends a span record to the outbound-call log.
    pub fn record_span(&self, span: SpanRecord) {
        self.spans.lock().push(span);
    }

    /// Returns a snapshot of the span log.
    #[must_use]
    pub fn spans(&self) -> Vec<SpanRecord> {
        self.spans.lock().clone()
    }
}
