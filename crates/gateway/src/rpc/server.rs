//! Session manager RPC server (`tradegate auth-service`).

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use tg_domain::error::Error;
use tg_sessions::protocol::{
    CreateSessionRequest, CreateSessionResponse, DestroySessionRequest, DestroySessionResponse,
    RpcErrorBody, VerifySessionRequest, VerifySessionResponse, CREATE_PATH, DESTROY_PATH,
    VERIFY_PATH,
};
use tg_sessions::SessionService;

use super::guard;

#[derive(Clone)]
pub struct RpcState {
    pub service: Arc<dyn SessionService>,
    /// SHA-256 of the internal bearer token; `None` leaves the routes open.
    pub rpc_token_hash: Option<Vec<u8>>,
}

/// `/health` is public; the session routes sit behind the bearer guard.
pub fn router(state: RpcState) -> Router<RpcState> {
    let sessions = Router::new()
        .route(CREATE_PATH, post(create_session))
        .route(VERIFY_PATH, post(verify_session))
        .route(DESTROY_PATH, post(destroy_session))
        .route_layer(middleware::from_fn_with_state(
            state,
            guard::require_rpc_token,
        ));

    Router::new()
        .route("/health", get(crate::api::health::health))
        .merge(sessions)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct RpcError {
    status: StatusCode,
    body: RpcErrorBody,
}

impl RpcError {
    fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: RpcErrorBody {
                error: message.into(),
                code: "invalid_argument".into(),
            },
        }
    }
}

impl From<Error> for RpcError {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidArgument(msg) => Self::invalid_argument(msg),
            other => {
                tracing::error!(error = %other, "session service fault");
                Self {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: RpcErrorBody {
                        error: other.to_string(),
                        code: "unavailable".into(),
                    },
                }
            }
        }
    }
}

impl From<JsonRejection> for RpcError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_argument(rejection.body_text())
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

type RpcResult<T> = Result<Json<T>, RpcError>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Handlers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

async fn create_session(
    State(state): State<RpcState>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> RpcResult<CreateSessionResponse> {
    let Json(req) = payload?;
    let resp = state.service.create_session(req).await?;
    Ok(Json(resp))
}

async fn verify_session(
    State(state): State<RpcState>,
    payload: Result<Json<VerifySessionRequest>, JsonRejection>,
) -> RpcResult<VerifySessionResponse> {
    let Json(req) = payload?;
    let resp = state.service.verify_session(req).await?;
    Ok(Json(resp))
}

async fn destroy_session(
    State(state): State<RpcState>,
    payload: Result<Json<DestroySessionRequest>, JsonRejection>,
) -> RpcResult<DestroySessionResponse> {
    let Json(req) = payload?;
    let resp = state.service.destroy_session(req).await?;
    Ok(Json(resp))
}
