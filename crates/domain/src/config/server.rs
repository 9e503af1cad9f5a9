use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Gateway server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_8080")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".into(),
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed for CORS.  The session cookie needs credentialed
    /// requests, so `["*"]` is rejected at runtime in favour of the
    /// localhost defaults.
    #[serde(default = "d_cors_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: d_cors_origins(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session service client (gateway side of the RPC boundary)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How the gateway reaches the session manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionServiceConfig {
    /// Base URL of the session service (e.g. `http://127.0.0.1:50051`).
    /// When `None`, the gateway embeds an in-process session manager,
    /// which is only suitable for single-process development setups.
    #[serde(default)]
    pub url: Option<String>,
    /// Timeout for `VerifySession`, which runs on every inbound request.
    #[serde(default = "d_verify_timeout_ms")]
    pub verify_timeout_ms: u64,
    /// Timeout for `CreateSession` and `DestroySession`.
    #[serde(default = "d_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

impl Default for SessionServiceConfig {
    fn default() -> Self {
        Self {
            url: None,
            verify_timeout_ms: d_verify_timeout_ms(),
            call_timeout_ms: d_call_timeout_ms(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_8080() -> u16 {
    8080
}
fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:*".into(),
        "http://127.0.0.1:*".into(),
    ]
}
fn d_verify_timeout_ms() -> u64 {
    2_000
}
fn d_call_timeout_ms() -> u64 {
    10_000
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_empty_toml_uses_all_defaults() {
        let cfg: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.cors.allowed_origins.len(), 2);
    }

    #[test]
    fn session_service_defaults_to_embedded() {
        let cfg: SessionServiceConfig = toml::from_str("").unwrap();
        assert!(cfg.url.is_none());
        assert_eq!(cfg.verify_timeout_ms, 2_000);
        assert_eq!(cfg.call_timeout_ms, 10_000);
    }

    #[test]
    fn session_service_parses_remote_url() {
        let toml_str = r#"
            url = "http://auth.internal:50051"
            verify_timeout_ms = 1500
        "#;
        let cfg: SessionServiceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.url.as_deref(), Some("http://auth.internal:50051"));
        assert_eq!(cfg.verify_timeout_ms, 1500);
        assert_eq!(cfg.call_timeout_ms, 10_000);
    }
}
