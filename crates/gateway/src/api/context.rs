//! Extractors over the per-request session context.

use std::net::SocketAddr;

use async_trait::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::Json;

use tg_broker::RequestOrigin;
use tg_domain::UpstreamCredentials;

use super::verify::{AuthStatus, SessionContext};

/// The verification result for this request.  Routes mounted outside the
/// verification middleware see `NoToken`.
#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .unwrap_or_else(|| SessionContext::unverified(AuthStatus::NoToken, None)))
    }
}

/// Gate for protected handlers: only a `Verified` session gets through.
///
/// Every other status, including `TransportError`, is answered with 401.
pub struct VerifiedSession {
    pub credentials: UpstreamCredentials,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for VerifiedSession {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = parts.extensions.get::<SessionContext>();
        match context.and_then(|c| c.credentials.clone().filter(|_| c.is_verified())) {
            Some(credentials) => Ok(VerifiedSession { credentials }),
            None => {
                let status = context.map_or(AuthStatus::NoToken, |c| c.status);
                tracing::debug!(status = %status, path = %parts.uri.path(), "access denied");
                Err((
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({
                        "error": "authentication required",
                        "status": status.as_str(),
                    })),
                ))
            }
        }
    }
}

/// Caller addresses forwarded to the broker.
///
/// The local address is the TCP peer (or `X-Real-IP` behind a proxy); the
/// public address is the first `X-Forwarded-For` hop, falling back to the
/// local one.
pub struct ClientOrigin(pub RequestOrigin);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientOrigin {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };

        let local = header("x-real-ip").or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });
        let public = header("x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|hop| hop.trim().to_owned()))
            .filter(|hop| !hop.is_empty())
            .or_else(|| local.clone());

        Ok(ClientOrigin(RequestOrigin {
            client_local_ip: local,
            client_public_ip: public,
        }))
    }
}
