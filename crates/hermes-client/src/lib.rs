//! Outbound service calls for Hermes.
//!
//! The pieces fit together as: a [`ServiceRegistry`] maps logical names to
//! base URLs, a [`Transport`] puts requests on the wire, and a
//! [`ServiceClient`] ties both to one request's trace identity and
//! deadline budget.
//!
//! # Example
//!
//! ```no_run
//! use hermes_client::{ReqwestTransport, ServiceClient, ServiceRegistry};
//! use hermes_core::RequestContext;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> hermes_core::HermesResult<()> {
//! let mut registry = ServiceRegistry::new();
//! registry.register("billing", "http://billing.internal:8080");
//!
//! let context = RequestContext::new("catalog", Duration::from_secs(30));
//! let client = ServiceClient::new(
//!     context,
//!     Arc::new(registry),
//!     Arc::new(ReqwestTransport::new()),
//! );
//! let response = client.get("billing", "/invoices/42").await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod registry;
mod transport;

pub use client::{headers, ServiceClient};
pub use registry::ServiceRegistry;
pub use transport::{
    BoxFuture, OutboundRequest, OutboundResponse, ReqwestTransport, Transport, TransportError,
};
