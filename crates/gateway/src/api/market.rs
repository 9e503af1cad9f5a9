use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{Json, Response};

use tg_broker::MarketDataRequest;

use crate::state::AppState;

use super::context::{ClientOrigin, VerifiedSession};
use super::{bad_payload, broker_reply};

/// POST /api/market/ltp
pub async fn ltp(
    State(state): State<AppState>,
    session: VerifiedSession,
    ClientOrigin(origin): ClientOrigin,
    payload: Result<Json<MarketDataRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_payload(rejection),
    };
    broker_reply(state.broker.ltp(&session.credentials, &origin, &req).await)
}

/// POST /api/market/quote (full mode, with depth)
pub async fn quote(
    State(state): State<AppState>,
    session: VerifiedSession,
    ClientOrigin(origin): ClientOrigin,
    payload: Result<Json<MarketDataRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_payload(rejection),
    };
    broker_reply(
        state
            .broker
            .full_quote(&session.credentials, &origin, &req)
            .await,
    )
}
