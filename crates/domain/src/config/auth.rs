use std::fmt;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session service (auth)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Longest accepted session token lifetime (one year).
pub const MAX_TOKEN_TTL_HOURS: u32 = 8760;

/// Settings for the session manager service: where it listens, how it
/// signs session tokens, and how the RPC surface is protected.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "d_50051")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    /// Environment variable holding the HMAC signing secret.
    #[serde(default = "d_secret_env")]
    pub secret_env: String,
    /// Inline signing secret.  Takes precedence over `secret_env`; prefer
    /// the env var outside of tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Session token lifetime in hours.
    #[serde(default = "d_ttl_hours")]
    pub token_ttl_hours: u32,
    /// `iss` claim written into and required from every session token.
    #[serde(default = "d_issuer")]
    pub issuer: String,
    /// Environment variable holding the internal bearer token that guards
    /// the RPC routes.  Unset or empty disables the check (dev mode).
    #[serde(default = "d_rpc_token_env")]
    pub rpc_token_env: String,
    /// When set, bundles older than the token lifetime are purged on this
    /// interval.  No live token can still reference them.
    #[serde(default)]
    pub sweep_interval_secs: Option<u64>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("port", &self.port)
            .field("host", &self.host)
            .field("secret_env", &self.secret_env)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("issuer", &self.issuer)
            .field("rpc_token_env", &self.rpc_token_env)
            .field("sweep_interval_secs", &self.sweep_interval_secs)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            port: 50051,
            host: d_host(),
            secret_env: d_secret_env(),
            secret: None,
            token_ttl_hours: d_ttl_hours(),
            issuer: d_issuer(),
            rpc_token_env: d_rpc_token_env(),
            sweep_interval_secs: None,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_50051() -> u16 {
    50051
}
fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_secret_env() -> String {
    "TG_SESSION_SECRET".into()
}
fn d_ttl_hours() -> u32 {
    24
}
fn d_issuer() -> String {
    "tradegate-auth-service".into()
}
fn d_rpc_token_env() -> String {
    "TG_RPC_TOKEN".into()
}
