use axum::extract::State;
use axum::response::Response;

use crate::state::AppState;

use super::broker_reply;
use super::context::{ClientOrigin, VerifiedSession};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/profile
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_profile(
    State(state): State<AppState>,
    session: VerifiedSession,
    ClientOrigin(origin): ClientOrigin,
) -> Response {
    broker_reply(state.broker.profile(&session.credentials, &origin).await)
}
