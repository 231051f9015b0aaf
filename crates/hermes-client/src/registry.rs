//! Named-service registry.
//!
//! Handlers call downstream services by logical name; the registry maps
//! those names to base URLs at startup. Resolution of an unknown name is a
//! wiring mistake, surfaced as a configuration error rather than an
//! upstream failure.

use hermes_core::{HermesError, HermesResult};
use std::collections::HashMap;

/// Maps logical service names to base URLs.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, String>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` under `base_url`.
    ///
    /// Trailing slashes are trimmed so request paths join cleanly.
    /// Re-registering a name replaces the previous URL.
    pub fn register(&mut self, name: impl Into<String>, base_url: impl Into<String>) {
        let base_url: String = base_url.into();
        self.services
            .insert(name.into(), base_url.trim_end_matches('/').to_string());
    }

    /// Resolves `name` to its base URL.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the name was never registered.
    pub fn resolve(&self, name: &str) -> HermesResult<&str> {
        self.services.get(name).map(String::as_str).ok_or_else(|| {
            HermesError::configuration(format!("service '{name}' is not registered"))
        })
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::ErrorKind;

    #[test]
    fn test_register_and_resolve() {
        let mut registry = ServiceRegistry::new();
        registry.register("billing", "http://billing.internal:8080");
        assert_eq!(
            registry.resolve("billing").unwrap(),
            "http://billing.internal:8080"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let mut registry = ServiceRegistry::new();
        registry.register("billing", "http://billing.internal/");
        assert_eq!(registry.resolve("billing").unwrap(), "http://billing.internal");
    }

    #[test]
    fn test_unknown_service_is_configuration_error() {
        let registry = ServiceRegistry::new();
        let err = registry.resolve("missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_re_register_replaces() {
        let mut registry = ServiceRegistry::new();
        registry.register("billing", "http://old");
        registry.register("billing", "http://new");
        assert_eq!(registry.resolve("billing").unwrap(), "http://new");
        assert_eq!(registry.len(), 1);
    }
}
