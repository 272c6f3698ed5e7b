//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable carrying the Printful bearer token.
pub const API_KEY_ENV_VAR: &str = "PRINTFUL_API_KEY";
/// Environment variable for the `X-PF-Language` header.
pub const LANGUAGE_ENV_VAR: &str = "PRINTFUL_LANGUAGE";
/// Environment variable for the `X-PF-Store-Id` header.
pub const STORE_ID_ENV_VAR: &str = "PRINTFUL_STORE_ID";
/// Environment variable selecting the product catalog scope.
pub const CATALOG_SCOPE_ENV_VAR: &str = "PRINTFUL_CATALOG_SCOPE";
/// Environment variable overriding the listener address.
pub const BIND_ADDRESS_ENV_VAR: &str = "GATEWAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    load_config_with(path, |var| std::env::var(var).ok())
}

/// `load_config` with the environment supplied by `lookup`.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment-provided settings on top of file configuration.
///
/// `lookup` abstracts the environment so callers (and tests) control it.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(API_KEY_ENV_VAR) {
        config.upstream.api_key = Some(key);
    }
    if let Some(language) = lookup(LANGUAGE_ENV_VAR).filter(|v| !v.is_empty()) {
        config.upstream.language = Some(language);
    }
    if let Some(store_id) = lookup(STORE_ID_ENV_VAR).filter(|v| !v.is_empty()) {
        config.upstream.store_id = Some(store_id);
    }
    if let Some(scope) = lookup(CATALOG_SCOPE_ENV_VAR) {
        config.upstream.catalog_scope = scope.parse().map_err(|reason| ConfigError::Env {
            var: CATALOG_SCOPE_ENV_VAR,
            reason,
        })?;
    }
    if let Some(addr) = lookup(BIND_ADDRESS_ENV_VAR) {
        config.listener.bind_address = addr;
    }
    Ok(())
}
