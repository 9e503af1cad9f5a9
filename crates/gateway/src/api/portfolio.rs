use axum::extract::State;
use axum::response::Response;

use crate::state::AppState;

use super::broker_reply;
use super::context::{ClientOrigin, VerifiedSession};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/portfolio/holdings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn holdings(
    State(state): State<AppState>,
    session: VerifiedSession,
    ClientOrigin(origin): ClientOrigin,
) -> Response {
    broker_reply(state.broker.holdings(&session.credentials, &origin).await)
}
