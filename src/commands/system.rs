use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub gemini_configured: bool,
    pub model: String,
    pub max_upload_bytes: usize,
    pub uptime_seconds: u64,
}

/// GET /status: service configuration summary
pub async fn get_system_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        gemini_configured: state.settings.gemini_configured(),
        model: state.settings.gemini_model.clone(),
        max_upload_bytes: state.settings.max_upload_bytes,
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
