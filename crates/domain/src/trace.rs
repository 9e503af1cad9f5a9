use serde::Serialize;

/// Structured trace events emitted across all tradegate crates.
///
/// Events never carry credential material or session identifiers; the
/// per-session `correlation_id` is the only join key.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionCreated {
        correlation_id: String,
        has_refresh_token: bool,
    },
    SessionVerified {
        outcome: String,
        correlation_id: Option<String>,
    },
    SessionDestroyed {
        correlation_id: Option<String>,
        existed: bool,
    },
    SessionsPurged {
        removed: usize,
        remaining: usize,
    },
    UpstreamCall {
        endpoint: String,
        status: u16,
        duration_ms: u64,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "tg_event");
    }
}
