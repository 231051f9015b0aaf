//! Core types for the Hermes service framework.
//!
//! This crate defines the shapes every other Hermes crate agrees on:
//!
//! - [`Request`] and [`Response`]: the transport-agnostic request/response
//!   pair produced and consumed by the wire adapter
//! - [`RequestContext`]: trace identity, deadline budget, and the
//!   outbound-call span log for one request
//! - [`HermesError`]: the error taxonomy with status mapping and a
//!   serializable envelope

mod context;
mod error;
mod request;
mod response;

pub use context::{RequestContext, SpanId, SpanRecord, TraceId};
pub use error::{
    ErrorDetail, ErrorEnvelope, ErrorKind, FieldErrors, HermesError, HermesResult,
};
pub use request::{Request, RequestBuilder};
pub use response::Response;
