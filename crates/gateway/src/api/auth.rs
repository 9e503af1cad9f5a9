//! Login, logout and session status.
//!
//! All three are public: they must work whatever the middleware verdict.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use tg_domain::error::Error;
use tg_sessions::protocol::{CreateSessionRequest, DestroySessionRequest};

use crate::state::AppState;

use super::context::ClientOrigin;
use super::cookies;
use super::verify::SessionContext;

#[derive(Deserialize)]
pub struct LoginPayload {
    pub jwt_token: String,
    pub feed_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogoutPayload {
    #[serde(default)]
    pub client_code: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/login
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Park the broker tokens with the session service and hand the browser a
/// session cookie.  A previous session, verified or not, is simply replaced.
pub async fn login(
    State(state): State<AppState>,
    session: SessionContext,
    jar: CookieJar,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Response {
    tracing::debug!(status = %session.status, "login requested");

    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "invalid login payload",
                    "details": rejection.body_text(),
                })),
            )
                .into_response();
        }
    };

    let req = CreateSessionRequest {
        primary_token: payload.jwt_token,
        secondary_token: payload.feed_token,
        refresh_token: payload.refresh_token,
    };

    match state.sessions.create_session(req).await {
        Ok(resp) => {
            let jar = jar.add(cookies::session_cookie(&state.config.cookie, &resp.session_token));
            tracing::info!("login successful, session cookie set");
            (
                jar,
                Json(serde_json::json!({
                    "message": "login successful",
                    "user_token_status": "set",
                })),
            )
                .into_response()
        }
        Err(Error::InvalidArgument(msg)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "invalid login payload",
                "details": msg,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "session creation failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "error": "session service unavailable, try again",
                })),
            )
                .into_response()
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/auth_status
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn auth_status(session: SessionContext) -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "current authentication status",
        "middleware_verdict": session.status.as_str(),
        "user_token_present": session.token.is_some(),
    }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/logout
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Best-effort upstream logout, then revoke the session and clear the
/// cookie.  Always answers 200: from the browser's point of view the
/// session is gone either way.
pub async fn logout(
    State(state): State<AppState>,
    session: SessionContext,
    ClientOrigin(origin): ClientOrigin,
    jar: CookieJar,
    payload: Option<Json<LogoutPayload>>,
) -> Response {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let client_code = payload.client_code.filter(|c| !c.is_empty());

    let mut upstream_logout = None;
    if let (Some(credentials), Some(code)) = (&session.credentials, &client_code) {
        if session.is_verified() {
            let resp = state.broker.logout(credentials, &origin, code).await;
            if !resp.status {
                tracing::warn!(
                    errorcode = %resp.errorcode,
                    message = %resp.message,
                    "upstream logout failed; revoking session anyway"
                );
            }
            upstream_logout = Some(resp.status);
        }
    }

    if let Some(token) = session.token {
        let req = DestroySessionRequest {
            session_token: token,
        };
        if let Err(e) = state.sessions.destroy_session(req).await {
            tracing::warn!(error = %e, "session revocation failed");
        }
    }

    let jar = jar.add(cookies::clear_session_cookie(&state.config.cookie));
    (
        jar,
        Json(serde_json::json!({
            "message": "logged out",
            "upstream_logout": upstream_logout,
        })),
    )
        .into_response()
}
