pub mod auth;
pub mod context;
pub mod cookies;
pub mod health;
pub mod market;
pub mod orders;
pub mod portfolio;
pub mod profile;
pub mod verify;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use tg_broker::normalize::MISSING_ARGUMENT;
use tg_broker::BrokerResponse;

use crate::state::AppState;

/// Build the gateway router.
///
/// Every `/api` route runs behind the session verification middleware.
/// Login, logout and status are reachable without a session; the broker
/// routes reject unverified callers through the `VerifiedSession`
/// extractor.
pub fn router(state: AppState) -> Router<AppState> {
    let api = Router::new()
        // Session
        .route("/login", post(auth::login))
        .route("/auth_status", get(auth::auth_status))
        .route("/logout", post(auth::logout))
        // Broker
        .route("/profile", get(profile::get_profile))
        .route("/orders/place", post(orders::place_order))
        .route("/orders/cancel", post(orders::cancel_order))
        .route("/orders/book", get(orders::order_book))
        .route("/portfolio/holdings", get(portfolio::holdings))
        .route("/market/ltp", post(market::ltp))
        .route("/market/quote", post(market::quote))
        .route_layer(middleware::from_fn_with_state(
            state,
            verify::verify_session,
        ));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
}

/// Map a broker envelope onto an HTTP status: 200 on success, 400 when the
/// request was refused before reaching upstream, 502 otherwise.  The
/// envelope is always the body.
pub(crate) fn broker_reply<T: Serialize>(resp: BrokerResponse<T>) -> Response {
    let status = if resp.status {
        StatusCode::OK
    } else if resp.errorcode == MISSING_ARGUMENT {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, Json(resp)).into_response()
}

pub(crate) fn bad_payload(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": "invalid request payload",
            "details": rejection.body_text(),
        })),
    )
        .into_response()
}
