use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use super::error::ApiError;
use super::{session_id, AppState};
use crate::services::analysis::SubmitOutcome;
use crate::services::report::AnalysisReport;
use crate::services::upload::{InputError, Upload};

/// Multipart field the browser client sends the photo in.
const REPORT_FIELD: &str = "report";

/// POST /analyze: analyze one blood report photo.
///
/// Single-flight applies per `x-session-id`. A client that omits the header
/// gets a fresh control on every request, so its uploads are never
/// deduplicated against each other.
pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Arc<AnalysisReport>>, ApiError> {
    let upload = read_report_field(multipart, state.settings.max_upload_bytes).await?;
    let control = state.controls.control_for(session_id(&headers));

    match state.analyzer.submit(&control, upload).await {
        SubmitOutcome::Completed(report) => Ok(Json(report)),
        SubmitOutcome::Ignored => Err(ApiError::InFlight),
        SubmitOutcome::Rejected(err) => Err(err.into()),
        SubmitOutcome::Failed(err) => Err(err.into()),
        SubmitOutcome::Superseded => Err(ApiError::Superseded),
    }
}

async fn read_report_field(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(REPORT_FIELD) {
            continue;
        }

        let mime_type = field.content_type().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?;

        let upload = Upload::new(bytes.to_vec(), mime_type);
        return Ok(match file_name {
            Some(name) => upload.with_file_name(name),
            None => upload,
        });
    }

    Err(InputError::MissingFile.into())
}

/// The body limit cuts oversized uploads off mid-stream; report those as
/// too large rather than as a malformed form.
fn multipart_error(err: MultipartError, max_bytes: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return InputError::TooLarge { limit_bytes: max_bytes }.into();
    }
    ApiError::BadMultipart(err.body_text())
}
