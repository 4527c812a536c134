use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use super::{session_id, AppState};
use crate::services::presentation::ControlSnapshot;

/// GET /session: current state of the caller's upload control.
pub async fn snapshot(State(state): State<AppState>, headers: HeaderMap) -> Json<ControlSnapshot> {
    let control = state.controls.control_for(session_id(&headers));
    Json(control.snapshot())
}

/// POST /session/reset: back to idle; a running analysis is discarded.
pub async fn reset(State(state): State<AppState>, headers: HeaderMap) -> Json<ControlSnapshot> {
    let control = state.controls.control_for(session_id(&headers));
    control.reset();
    Json(control.snapshot())
}
