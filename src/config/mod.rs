//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the payment
//! verifier. Configuration includes the gateway connection (base URL, secret
//! key, timeout) and API server settings (host, port, CORS origins).
//!
//! Values are resolved in this order, later sources winning:
//! 1. Built-in defaults
//! 2. Optional TOML file (`config/payment_verifier.toml` or the path in
//!    `PAYMENT_VERIFIER_CONFIG_PATH`)
//! 3. Environment variables (`PAYSTACK_SECRET_KEY`, `PORT`, `ALLOWED_ORIGINS`, ...)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::VerifyError;

/// Environment variable holding an explicit config file path.
pub const CONFIG_PATH_ENV: &str = "PAYMENT_VERIFIER_CONFIG_PATH";
/// Config file used when no explicit path is given. Optional.
pub const DEFAULT_CONFIG_PATH: &str = "config/payment_verifier.toml";

pub const ENV_SECRET_KEY: &str = "PAYSTACK_SECRET_KEY";
pub const ENV_BASE_URL: &str = "PAYSTACK_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "PAYSTACK_TIMEOUT_MS";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";

const DEFAULT_BASE_URL: &str = "https://api.paystack.co";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Payment gateway connection settings
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// API server configuration (host, port, CORS settings)
    #[serde(default)]
    pub api: ApiConfig,
}

/// Connection settings for the Paystack API.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the gateway API (no trailing path)
    pub base_url: String,
    /// Secret API key sent as a bearer token. Required to verify anything.
    pub secret_key: Option<String>,
    /// Timeout for a single verification call in milliseconds
    pub timeout_ms: u64,
}

/// API server configuration for external communication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Host address to bind the API server to
    pub host: String,
    /// Port number to bind the API server to
    pub port: u16,
    /// Allowed CORS origins; a single `"*"` entry allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            secret_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
        }
    }
}

// The secret key must never reach the logs.
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl ApiConfig {
    /// Whether the CORS allow-list accepts any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Loads configuration from the optional TOML file and the process environment.
    ///
    /// A missing default config file is fine (environment-only deployments);
    /// a missing file named explicitly through `PAYMENT_VERIFIER_CONFIG_PATH`
    /// is an error.
    ///
    /// The secret key is NOT required here. Callers decide whether its
    /// absence is fatal (server) or a per-request error (function).
    ///
    /// # Returns
    ///
    /// - `Ok(Config)` - Successfully loaded and validated configuration
    /// - `Err(anyhow::Error)` - Unreadable file, bad value, or failed validation
    pub fn load() -> Result<Self> {
        let explicit_path = std::env::var(CONFIG_PATH_ENV).ok();
        let config_path = explicit_path
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if std::path::Path::new(&config_path).exists() {
            Self::from_file(&config_path)?
        } else if explicit_path.is_some() {
            anyhow::bail!(
                "Configuration file '{}' not found. Copy config/payment_verifier.template.toml \
                 or unset {} to configure from the environment only.",
                config_path,
                CONFIG_PATH_ENV
            );
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML config file. Missing sections and fields take their defaults.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file '{}'", path))
    }

    /// Applies environment overrides using `lookup` to read variables.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(secret) = get(ENV_SECRET_KEY) {
            self.gateway.secret_key = Some(secret.trim().to_string());
        }
        if let Some(base_url) = get(ENV_BASE_URL) {
            self.gateway.base_url = base_url.trim().to_string();
        }
        if let Some(timeout) = get(ENV_TIMEOUT_MS) {
            self.gateway.timeout_ms = timeout
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: '{}'", ENV_TIMEOUT_MS, timeout))?;
        }
        if let Some(host) = get(ENV_HOST) {
            self.api.host = host.trim().to_string();
        }
        if let Some(port) = get(ENV_PORT) {
            self.api.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: '{}'", ENV_PORT, port))?;
        }
        if let Some(origins) = lookup(ENV_ALLOWED_ORIGINS) {
            self.api.cors_origins = parse_origins(&origins);
        }
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// This function ensures that:
    /// - The gateway base URL is an absolute http(s) URL
    /// - The gateway timeout is non-zero
    /// - At least one CORS origin is configured
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.gateway.base_url)
            .with_context(|| format!("Invalid gateway base_url '{}'", self.gateway.base_url))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            anyhow::bail!(
                "Configuration error: gateway base_url must use http or https (got '{}')",
                base.scheme()
            );
        }
        if base.cannot_be_a_base() {
            anyhow::bail!(
                "Configuration error: gateway base_url '{}' cannot be used as a base URL",
                self.gateway.base_url
            );
        }

        if self.gateway.timeout_ms == 0 {
            anyhow::bail!("Configuration error: gateway timeout_ms must be greater than zero");
        }

        if self.api.cors_origins.is_empty() {
            anyhow::bail!("Configuration error: api.cors_origins must list at least one origin or \"*\"");
        }
        for origin in self.api.cors_origins.iter().filter(|origin| origin.as_str() != "*") {
            validate_origin(origin)?;
        }

        Ok(())
    }

    /// Returns the configured secret key, or `VerifyError::MissingSecret`.
    pub fn require_secret(&self) -> std::result::Result<&str, VerifyError> {
        self.gateway
            .secret_key
            .as_deref()
            .map(str::trim)
            .filter(|secret| !secret.is_empty())
            .ok_or(VerifyError::MissingSecret)
    }
}

/// Validates a CORS origin of the form `scheme://host[:port]`.
///
/// Paths, trailing slashes and explicit default ports are rejected so the
/// value matches the browser's `Origin` header byte for byte.
fn validate_origin(origin: &str) -> Result<()> {
    let parsed = url::Url::parse(origin)
        .with_context(|| format!("Configuration error: invalid CORS origin '{}'", origin))?;
    let serialized = parsed.origin().ascii_serialization();
    if serialized != origin {
        anyhow::bail!(
            "Configuration error: CORS origin '{}' must be of the form scheme://host[:port] (did you mean '{}'?)",
            origin,
            serialized
        );
    }
    Ok(())
}

/// Parses a comma-separated origin list.
///
/// Entries are trimmed and empty entries dropped. An empty list falls back to
/// the wildcard, matching an unset variable.
pub fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}
