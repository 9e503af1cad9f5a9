//! JSON wire contract between the gateway and the session service.
//!
//! All calls are `POST` with a JSON body; failures come back as
//! [`RpcErrorBody`] with a 4xx/5xx status.

use serde::{Deserialize, Serialize};

use tg_domain::UpstreamCredentials;

use crate::verdict::{VerdictKind, VerificationVerdict};

pub const CREATE_PATH: &str = "/rpc/v1/sessions/create";
pub const VERIFY_PATH: &str = "/rpc/v1/sessions/verify";
pub const DESTROY_PATH: &str = "/rpc/v1/sessions/destroy";

#[derive(Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub primary_token: String,
    pub secondary_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl std::fmt::Debug for CreateSessionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateSessionRequest").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifySessionRequest {
    #[serde(default)]
    pub session_token: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct VerifySessionResponse {
    pub verified: bool,
    /// `[primary, secondary, refresh]` when verified, empty otherwise.
    #[serde(default)]
    pub credentials: Vec<String>,
    pub verdict: VerdictKind,
}

impl VerifySessionResponse {
    /// Credentials of a verified response.  A response that claims to be
    /// verified but carries a bad credential array yields `None`.
    pub fn into_credentials(self) -> Option<UpstreamCredentials> {
        if !self.verified || self.verdict != VerdictKind::Verified {
            return None;
        }
        UpstreamCredentials::from_wire(self.credentials)
    }
}

impl From<VerificationVerdict> for VerifySessionResponse {
    fn from(verdict: VerificationVerdict) -> Self {
        let kind = verdict.kind();
        match verdict {
            VerificationVerdict::Verified(bundle) => Self {
                verified: true,
                credentials: bundle.credentials().into_wire(),
                verdict: kind,
            },
            _ => Self {
                verified: false,
                credentials: Vec::new(),
                verdict: kind,
            },
        }
    }
}

impl std::fmt::Debug for VerifySessionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifySessionResponse")
            .field("verified", &self.verified)
            .field("verdict", &self.verdict)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestroySessionRequest {
    #[serde(default)]
    pub session_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestroySessionResponse {}

/// Error body returned by the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorBody {
    pub error: String,
    /// `invalid_argument`, `unavailable` or `unauthenticated`.
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CredentialStore;

    #[test]
    fn verified_response_carries_triple() {
        let store = CredentialStore::new();
        let stored = store.put("J1", "F1", "R1").unwrap();
        let bundle = store.get(&stored.id).unwrap();

        let resp = VerifySessionResponse::from(VerificationVerdict::Verified(bundle));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["verified"], true);
        assert_eq!(json["credentials"], serde_json::json!(["J1", "F1", "R1"]));
        assert_eq!(json["verdict"], "verified");

        let creds = resp.into_credentials().unwrap();
        assert_eq!(creds, UpstreamCredentials::new("J1", "F1", "R1"));
    }

    #[test]
    fn unverified_response_has_empty_credentials() {
        let resp = VerifySessionResponse::from(VerificationVerdict::SessionNotFound);
        assert!(!resp.verified);
        assert!(resp.credentials.is_empty());
        assert_eq!(resp.verdict, VerdictKind::SessionNotFound);
        assert!(resp.into_credentials().is_none());
    }

    #[test]
    fn inconsistent_response_is_not_trusted() {
        let resp = VerifySessionResponse {
            verified: true,
            credentials: vec!["only-one".into()],
            verdict: VerdictKind::Verified,
        };
        assert!(resp.into_credentials().is_none());

        let resp = VerifySessionResponse {
            verified: true,
            credentials: vec!["a".into(), "b".into(), "c".into()],
            verdict: VerdictKind::Expired,
        };
        assert!(resp.into_credentials().is_none());
    }

    #[test]
    fn create_request_defaults_refresh_token() {
        let req: CreateSessionRequest =
            serde_json::from_str(r#"{"primary_token":"a","secondary_token":"b"}"#).unwrap();
        assert_eq!(req.refresh_token, "");
    }
}
