//! Per-request session verification.
//!
//! Runs before every `/api` handler and only classifies: it reads the
//! session cookie, asks the session service for a verdict and attaches a
//! [`SessionContext`] to the request.  Rejecting unverified callers is the
//! job of the [`VerifiedSession`](super::context::VerifiedSession) extractor,
//! so login and status routes stay reachable.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use tg_domain::UpstreamCredentials;
use tg_sessions::protocol::VerifySessionRequest;
use tg_sessions::VerdictKind;

use crate::state::AppState;

use super::cookies;

/// Gateway-side classification of the session evidence on one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    NoToken,
    Malformed,
    Expired,
    SessionNotFound,
    /// The session service could not be reached or gave an unusable answer.
    TransportError,
    Verified,
}

impl AuthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoToken => "no_token",
            Self::Malformed => "malformed",
            Self::Expired => "expired",
            Self::SessionNotFound => "session_not_found",
            Self::TransportError => "transport_error",
            Self::Verified => "verified",
        }
    }

    /// The token is known to be useless; the browser should drop it.
    pub fn clears_cookie(self) -> bool {
        matches!(self, Self::Expired | Self::SessionNotFound)
    }
}

impl From<VerdictKind> for AuthStatus {
    fn from(kind: VerdictKind) -> Self {
        match kind {
            VerdictKind::NoToken => Self::NoToken,
            VerdictKind::Malformed => Self::Malformed,
            VerdictKind::Expired => Self::Expired,
            VerdictKind::SessionNotFound => Self::SessionNotFound,
            VerdictKind::Verified => Self::Verified,
        }
    }
}

impl std::fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request-scoped result of verification, stored as a request extension.
///
/// `credentials` is `Some` exactly when `status` is `Verified`.
#[derive(Clone)]
pub struct SessionContext {
    pub status: AuthStatus,
    pub token: Option<String>,
    pub credentials: Option<UpstreamCredentials>,
}

impl SessionContext {
    pub fn unverified(status: AuthStatus, token: Option<String>) -> Self {
        Self {
            status,
            token,
            credentials: None,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.status == AuthStatus::Verified && self.credentials.is_some()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("status", &self.status)
            .field("token_present", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

/// Attach via `axum::middleware::from_fn_with_state`.
pub async fn verify_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let cookie_cfg = &state.config.cookie;
    let token = jar
        .get(&cookie_cfg.name)
        .map(|c| c.value().to_owned())
        .filter(|t| !t.is_empty());

    let context = match token {
        None => SessionContext::unverified(AuthStatus::NoToken, None),
        Some(token) => classify(&state, token).await,
    };
    let status = context.status;
    tracing::debug!(status = %status, path = %req.uri().path(), "session verified");

    req.extensions_mut().insert(context);
    let response = next.run(req).await;

    // A handler that issued or cleared the cookie itself wins.
    if status.clears_cookie() && !cookies::sets_cookie(response.headers(), &cookie_cfg.name) {
        let jar = CookieJar::new().add(cookies::clear_session_cookie(cookie_cfg));
        return (jar, response).into_response();
    }
    response
}

async fn classify(state: &AppState, token: String) -> SessionContext {
    let req = VerifySessionRequest {
        session_token: token.clone(),
    };
    match state.sessions.verify_session(req).await {
        Ok(resp) => {
            let status = AuthStatus::from(resp.verdict);
            if status != AuthStatus::Verified {
                return SessionContext::unverified(status, Some(token));
            }
            match resp.into_credentials() {
                Some(credentials) => SessionContext {
                    status,
                    token: Some(token),
                    credentials: Some(credentials),
                },
                None => {
                    tracing::warn!("session service reported verified without usable credentials");
                    SessionContext::unverified(AuthStatus::TransportError, Some(token))
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "session verification failed; treating as unverified");
            SessionContext::unverified(AuthStatus::TransportError, Some(token))
        }
    }
}
