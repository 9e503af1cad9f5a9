use serde::{Deserialize, Serialize};

/// Attributes of the browser cookie that carries the session token.
///
/// Only the transport layer interprets these; the session core never
/// looks at them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    #[serde(default = "d_name")]
    pub name: String,
    #[serde(default = "d_max_age")]
    pub max_age_secs: i64,
    #[serde(default = "d_path")]
    pub path: String,
    /// Empty for host-only cookies (localhost).
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default = "d_true")]
    pub secure: bool,
    #[serde(default = "d_true")]
    pub http_only: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: d_name(),
            max_age_secs: d_max_age(),
            path: d_path(),
            domain: None,
            secure: true,
            http_only: true,
        }
    }
}

fn d_name() -> String {
    "user_session_token".into()
}
fn d_max_age() -> i64 {
    24 * 60 * 60
}
fn d_path() -> String {
    "/".into()
}
fn d_true() -> bool {
    true
}
