//! Internal bearer-token check on the RPC routes.
//!
//! The expected token is read once at startup (env var named by
//! `auth.rpc_token_env`) and only its SHA-256 digest is kept.  When the env
//! var is unset or empty the routes are open, which is only acceptable when
//! the service listens on loopback.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use tg_sessions::protocol::RpcErrorBody;

use super::server::RpcState;

/// Attach via `axum::middleware::from_fn_with_state`.
pub async fn require_rpc_token(
    State(state): State<RpcState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let expected_hash = match &state.rpc_token_hash {
        Some(h) => h,
        None => return next.run(req).await,
    };

    let provided = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    // Fixed-length digests keep the comparison independent of token length.
    let provided_hash = Sha256::digest(provided.as_bytes());

    if !bool::from(provided_hash.ct_eq(expected_hash.as_slice())) {
        tracing::warn!("rejected RPC call with invalid or missing bearer token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(RpcErrorBody {
                error: "invalid or missing RPC token".into(),
                code: "unauthenticated".into(),
            }),
        )
            .into_response();
    }

    next.run(req).await
}

/// Digest of the token in `env_var`, or `None` (open routes) when unset.
pub fn token_hash_from_env(env_var: &str) -> Option<Vec<u8>> {
    match std::env::var(env_var).ok().filter(|t| !t.is_empty()) {
        Some(token) => {
            tracing::info!(source = %format!("env:{env_var}"), "RPC bearer-token auth enabled");
            Some(Sha256::digest(token.as_bytes()).to_vec())
        }
        None => {
            tracing::warn!("RPC bearer-token auth DISABLED; set {env_var} to protect the session service");
            None
        }
    }
}
