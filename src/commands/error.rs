use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::analysis::AnalysisError;
use crate::services::upload::InputError;

/// Body shape the browser client reads on failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Input(#[from] InputError),
    #[error("An analysis is already in progress.")]
    InFlight,
    #[error("This analysis was replaced by a newer submission.")]
    Superseded,
    #[error("{}", .0.user_message())]
    Analysis(#[from] AnalysisError),
    #[error("Failed to read upload: {0}")]
    BadMultipart(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Input(InputError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Input(_) | ApiError::BadMultipart(_) => StatusCode::BAD_REQUEST,
            ApiError::InFlight | ApiError::Superseded => StatusCode::CONFLICT,
            ApiError::Analysis(err) if err.is_rate_limited() => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
