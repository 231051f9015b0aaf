//! Typed configuration for Hermes services.
//!
//! Configuration loads in layers: built-in defaults, an optional TOML or
//! JSON file, then environment variables. [`HermesConfig`] is the root
//! type; [`ConfigLoader`] does the layering.

mod config;
mod error;
mod loader;

pub use config::{AdmissionConfig, HermesConfig};
pub use error::ConfigError;
pub use loader::ConfigLoader;
