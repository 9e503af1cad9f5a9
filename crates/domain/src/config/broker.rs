use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Upstream brokerage (Angel One SmartAPI)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Environment variable holding the `X-PrivateKey` API key.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_user_type")]
    pub user_type: String,
    #[serde(default = "d_source_id")]
    pub source_id: String,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
    /// Sent as `X-MACAddress` when set.  Browsers never expose a MAC, so
    /// this is a deployment-wide value.
    #[serde(default)]
    pub mac_address: Option<String>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            api_key_env: d_api_key_env(),
            user_type: d_user_type(),
            source_id: d_source_id(),
            timeout_ms: d_timeout_ms(),
            mac_address: None,
        }
    }
}

fn d_base_url() -> String {
    "https://apiconnect.angelone.in/rest/secure/angelbroking".into()
}
fn d_api_key_env() -> String {
    "ANGELONE_API_KEY".into()
}
fn d_user_type() -> String {
    "USER".into()
}
fn d_source_id() -> String {
    "WEB".into()
}
fn d_timeout_ms() -> u64 {
    10_000
}
