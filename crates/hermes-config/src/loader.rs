//! Layered configuration loading.
//!
//! Later layers override earlier ones: built-in defaults, then an optional
//! file (TOML or JSON by extension), then environment variables.

use crate::{ConfigError, HermesConfig};
use std::env;
use std::fs;
use std::path::Path;

/// Loads a [`HermesConfig`] in layers.
///
/// # Example
///
/// ```no_run
/// use hermes_config::ConfigLoader;
///
/// # fn main() -> Result<(), hermes_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("hermes.toml")?
///     .with_env_prefix("HERMES")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: HermesConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Creates a loader starting from built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlays configuration from a TOML (`.toml`) or JSON (`.json`) file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable, has an
    /// unsupported extension, or fails to parse.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        if !path.exists() {
            return Err(ConfigError::FileNotFound { path: display });
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;

        self.config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })?,
            Some("json") => serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })?,
            _ => {
                return Err(ConfigError::Parse {
                    path: display,
                    message: "unsupported extension, expected .toml or .json".to_string(),
                })
            }
        };
        Ok(self)
    }

    /// Enables environment overrides with the given prefix.
    ///
    /// Recognized variables, for prefix `HERMES`: `HERMES_SERVICE_NAME`,
    /// `HERMES_ADMISSION_CAPACITY`, `HERMES_ADMISSION_MAX_WAIT_MS`, and
    /// `HERMES_DEADLINE_BUDGET_MS`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Applies environment overrides, validates, and returns the config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparseable environment
    /// values or out-of-range settings.
    pub fn load(mut self) -> Result<HermesConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            apply_env(&mut self.config, &prefix)?;
        }
        self.config.validate()?;
        Ok(self.config)
    }
}

fn apply_env(config: &mut HermesConfig, prefix: &str) -> Result<(), ConfigError> {
    if let Ok(value) = env::var(format!("{prefix}_SERVICE_NAME")) {
        config.service_name = value;
    }
    if let Some(value) = parse_env(prefix, "ADMISSION_CAPACITY", "admission.capacity")? {
        config.admission.capacity = value;
    }
    if let Some(value) = parse_env(prefix, "ADMISSION_MAX_WAIT_MS", "admission.max_wait_ms")? {
        config.admission.max_wait_ms = value;
    }
    if let Some(value) = parse_env(prefix, "DEADLINE_BUDGET_MS", "deadline_budget_ms")? {
        config.deadline_budget_ms = value;
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(
    prefix: &str,
    suffix: &str,
    field: &str,
) -> Result<Option<T>, ConfigError> {
    match env::var(format!("{prefix}_{suffix}")) {
        Ok(raw) => raw.parse().map(Some).map_err(|_| {
            ConfigError::invalid_value(field, format!("cannot parse '{raw}' as a number"))
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_load() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, HermesConfig::default());
    }

    #[test]
    fn test_toml_file_overlays_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "service_name = \"catalog\"\n[admission]\ncapacity = 4\nmax_wait_ms = 250"
        )
        .unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.service_name, "catalog");
        assert_eq!(config.admission.capacity, 4);
        assert_eq!(config.admission.max_wait_ms, 250);
    }

    #[test]
    fn test_json_file_supported() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "{}", r#"{"service_name": "orders"}"#).unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.service_name, "orders");
    }

    #[test]
    fn test_missing_file_errors() {
        let result = ConfigLoader::new().with_file("/nonexistent/hermes.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_env_overrides_file() {
        // Process-wide env var, so use a name no other test touches.
        std::env::set_var("HERMES_LOADER_TEST_ADMISSION_CAPACITY", "7");
        let config = ConfigLoader::new()
            .with_env_prefix("HERMES_LOADER_TEST")
            .load()
            .unwrap();
        std::env::remove_var("HERMES_LOADER_TEST_ADMISSION_CAPACITY");

        assert_eq!(config.admission.capacity, 7);
    }

    #[test]
    fn test_bad_env_value_errors() {
        std::env::set_var("HERMES_BAD_ENV_TEST_DEADLINE_BUDGET_MS", "soon");
        let result = ConfigLoader::new()
            .with_env_prefix("HERMES_BAD_ENV_TEST")
            .load();
        std::env::remove_var("HERMES_BAD_ENV_TEST_DEADLINE_BUDGET_MS");

        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
