//! Main configuration types.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Complete Hermes service configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from defaults, a
/// file, and environment variables in that order.
///
/// # Example
///
/// ```
/// use hermes_config::HermesConfig;
///
/// let config = HermesConfig::default();
/// assert_eq!(config.admission.capacity, 100);
/// assert_eq!(config.deadline_budget_ms, 30_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HermesConfig {
    /// Logical name of this service, stamped on every request context.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Admission control settings.
    #[serde(default)]
    pub admission: AdmissionConfig,

    /// Per-request deadline budget in milliseconds, covering the handler
    /// and all its outbound calls.
    #[serde(default = "default_deadline_budget_ms")]
    pub deadline_budget_ms: u64,

    /// Downstream services, logical name to base URL.
    #[serde(default)]
    pub services: HashMap<String, String>,
}

/// Admission control settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AdmissionConfig {
    /// Maximum number of concurrently admitted requests.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// How long an over-capacity request may wait for admission, in
    /// milliseconds, before being rejected.
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
}

fn default_service_name() -> String {
    "hermes".to_string()
}

const fn default_deadline_budget_ms() -> u64 {
    30_000
}

const fn default_capacity() -> usize {
    100
}

const fn default_max_wait_ms() -> u64 {
    100
}

impl Default for HermesConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            admission: AdmissionConfig::default(),
            deadline_budget_ms: default_deadline_budget_ms(),
            services: HashMap::new(),
        }
    }
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            max_wait_ms: default_max_wait_ms(),
        }
    }
}

impl HermesConfig {
    /// Returns the deadline budget as a [`Duration`].
    #[must_use]
    pub const fn deadline_budget(&self) -> Duration {
        Duration::from_millis(self.deadline_budget_ms)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the service name is empty,
    /// the admission capacity is zero, or the deadline budget is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "service_name",
                "must not be empty",
            ));
        }
        if self.admission.capacity == 0 {
            return Err(ConfigError::invalid_value(
                "admission.capacity",
                "must be at least 1",
            ));
        }
        if self.deadline_budget_ms == 0 {
            return Err(ConfigError::invalid_value(
                "deadline_budget_ms",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

impl AdmissionConfig {
    /// Returns the admission wait budget as a [`Duration`].
    #[must_use]
    pub const fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}
