//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic ones. Validation is a pure
//! function over the parsed config and reports every problem it finds, not
//! just the first.

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in the configuration.
pub type ValidationError = String;

/// Validate the full configuration, collecting all errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        errors.push("at least one backend must be configured".to_string());
    }

    let mut names = HashSet::new();
    for backend in &config.backends {
        if !names.insert(backend.name.as_str()) {
            errors.push(format!("duplicate backend name '{}'", backend.name));
        }
        if backend.address.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "backend '{}': invalid address '{}'",
                backend.name, backend.address
            ));
        }
        if backend.weight == 0 {
            errors.push(format!("backend '{}': weight must be positive", backend.name));
        }
        if let Some(path) = &backend.check_path {
            if !path.starts_with('/') {
                errors.push(format!(
                    "backend '{}': check_path must start with '/'",
                    backend.name
                ));
            }
        }
        if backend.check_interval_secs == Some(0) {
            errors.push(format!(
                "backend '{}': check_interval_secs must be positive",
                backend.name
            ));
        }
        if backend.check_timeout_secs == Some(0) {
            errors.push(format!(
                "backend '{}': check_timeout_secs must be positive",
                backend.name
            ));
        }
    }

    if config.health_check.interval_secs == 0 {
        errors.push("health_check.interval_secs must be positive".to_string());
    }
    if config.health_check.timeout_secs == 0 {
        errors.push("health_check.timeout_secs must be positive".to_string());
    }
    if !config.health_check.path.starts_with('/') {
        errors.push("health_check.path must start with '/'".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
