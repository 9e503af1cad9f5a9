//! Order placement, cancellation and the order book.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{Json, Response};

use tg_broker::{CancelOrderRequest, PlaceOrderRequest};

use crate::state::AppState;

use super::context::{ClientOrigin, VerifiedSession};
use super::{bad_payload, broker_reply};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/orders/place
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn place_order(
    State(state): State<AppState>,
    session: VerifiedSession,
    ClientOrigin(origin): ClientOrigin,
    payload: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Response {
    let Json(order) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_payload(rejection),
    };
    tracing::info!(
        tradingsymbol = %order.tradingsymbol,
        transactiontype = %order.transactiontype,
        quantity = order.quantity,
        "placing order"
    );
    broker_reply(
        state
            .broker
            .place_order(&session.credentials, &origin, &order)
            .await,
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/orders/cancel
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn cancel_order(
    State(state): State<AppState>,
    session: VerifiedSession,
    ClientOrigin(origin): ClientOrigin,
    payload: Result<Json<CancelOrderRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_payload(rejection),
    };
    broker_reply(
        state
            .broker
            .cancel_order(&session.credentials, &origin, &req)
            .await,
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/orders/book
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn order_book(
    State(state): State<AppState>,
    session: VerifiedSession,
    ClientOrigin(origin): ClientOrigin,
) -> Response {
    broker_reply(state.broker.order_book(&session.credentials, &origin).await)
}
