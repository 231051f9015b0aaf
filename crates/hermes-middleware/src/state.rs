//! Mutable per-request state threaded through the chain.

use hermes_client::ServiceClient;
use hermes_core::RequestContext;
use hermes_db::Session;
use std::sync::Arc;

/// Per-request slots populated by the built-in stages.
///
/// The request itself stays an immutable value; everything a stage attaches
/// for later stages or the handler lives here. Slots hold cheaply cloneable
/// handles so the terminal handler closure can take its own copies.
#[derive(Default)]
pub struct RequestState {
    context: Option<RequestContext>,
    client: Option<ServiceClient>,
    session: Option<Arc<dyn Session>>,
}

impl RequestState {
    /// Creates an empty state; stages fill the slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the request context.
    pub fn set_context(&mut self, context: RequestContext) {
        self.context = Some(context);
    }

    /// Returns the request context, if the context stage has run.
    #[must_use]
    pub fn context(&self) -> Option<&RequestContext> {
        self.context.as_ref()
    }

    /// Attaches the outbound service client.
    pub fn set_client(&mut self, client: ServiceClient) {
        self.client = Some(client);
    }

    /// Returns the outbound service client, if attached.
    #[must_use]
    pub fn client(&self) -> Option<&ServiceClient> {
        self.client.as_ref()
    }

    /// Attaches the persistence session.
    pub fn set_session(&mut self, session: Arc<dyn Session>) {
        self.session = Some(session);
    }

    /// Returns the persistence session, if the session stage has run.
    #[must_use]
    pub fn session(&self) -> Option<Arc<dyn Session>> {
        self.session.clone()
    }

    /// Detaches the persistence session once it is closed.
    pub fn clear_session(&mut self) {
        self.session = None;
    }
}

impl std::fmt::Debug for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestState")
            .field("context", &self.context)
            .field("has_client", &self.client.is_some())
            .field("has_session", &self.session.is_some())
            .finish()
    }
}
