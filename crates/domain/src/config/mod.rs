mod auth;
mod broker;
mod cookie;
mod observability;
mod server;

pub use auth::*;
pub use broker::*;
pub use cookie::*;
pub use observability::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The whole `config.toml`.  Both the gateway and the session service read
/// the same file; each only looks at the sections it needs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session_service: SessionServiceConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cookie: CookieConfig,
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl ConfigError {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.  The signing secret
    /// itself is checked when the session service boots, since it usually
    /// lives in the environment rather than in this file.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError::error("server.port", "port must be greater than 0"));
        }
        if self.server.host.is_empty() {
            errors.push(ConfigError::error("server.host", "host must not be empty"));
        }
        if self.auth.port == 0 {
            errors.push(ConfigError::error("auth.port", "port must be greater than 0"));
        }
        if self.auth.issuer.is_empty() {
            errors.push(ConfigError::error("auth.issuer", "issuer must not be empty"));
        }
        if self.auth.token_ttl_hours == 0 {
            errors.push(ConfigError::error(
                "auth.token_ttl_hours",
                "token lifetime must be at least one hour",
            ));
        } else if self.auth.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            errors.push(ConfigError::error(
                "auth.token_ttl_hours",
                format!("token lifetime must not exceed {MAX_TOKEN_TTL_HOURS} hours"),
            ));
        }

        // Verification sits on the hot path of every request.
        if self.session_service.verify_timeout_ms == 0 {
            errors.push(ConfigError::error(
                "session_service.verify_timeout_ms",
                "verify timeout must be greater than 0",
            ));
        } else if self.session_service.verify_timeout_ms >= 10_000 {
            errors.push(ConfigError::warning(
                "session_service.verify_timeout_ms",
                "verify timeout should stay in single-digit seconds",
            ));
        }
        if self.session_service.call_timeout_ms == 0 {
            errors.push(ConfigError::error(
                "session_service.call_timeout_ms",
                "call timeout must be greater than 0",
            ));
        }
        if let Some(url) = &self.session_service.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(ConfigError::error(
                    "session_service.url",
                    "url must start with http:// or https://",
                ));
            }
        }

        if self.cookie.name.is_empty() {
            errors.push(ConfigError::error("cookie.name", "cookie name must not be empty"));
        }
        if !self.cookie.path.starts_with('/') {
            errors.push(ConfigError::error("cookie.path", "cookie path must start with '/'"));
        }
        if !self.cookie.secure {
            errors.push(ConfigError::warning(
                "cookie.secure",
                "session cookie will be sent over plain HTTP (development only)",
            ));
        }
        if !self.cookie.http_only {
            errors.push(ConfigError::warning(
                "cookie.http_only",
                "session cookie is readable from browser scripts",
            ));
        }

        if self.broker.base_url.is_empty() {
            errors.push(ConfigError::error("broker.base_url", "base_url must not be empty"));
        }
        if self.broker.timeout_ms == 0 {
            errors.push(ConfigError::error(
                "broker.timeout_ms",
                "timeout must be greater than 0",
            ));
        }

        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError::warning(
                "server.cors.allowed_origins",
                "wildcard \"*\" cannot be combined with cookie credentials",
            ));
        }

        errors
    }
}
