use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::gemini::{GatewayError, ModelGateway, ANALYSIS_PROMPT};
use super::normalizer::{self, ValidationError};
use super::parser::{self, ParseError};
use super::presentation::{BeginOutcome, UploadControl, GENERIC_FAILURE};
use super::report::AnalysisReport;
use super::upload::{InputError, Upload};

pub const RATE_LIMITED_MESSAGE: &str =
    "Google Quota limit reached. Please wait a bit and try again.";

/// Why an accepted upload did not produce a report.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl AnalysisError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AnalysisError::Gateway(err) if err.is_rate_limited())
    }

    /// Short, non-technical message for the user.
    pub fn user_message(&self) -> &'static str {
        if self.is_rate_limited() {
            RATE_LIMITED_MESSAGE
        } else {
            GENERIC_FAILURE
        }
    }
}

/// Result of one pass through the inbound boundary.
#[derive(Debug)]
pub enum SubmitOutcome {
    Completed(Arc<AnalysisReport>),
    /// Another submission on the same control was still running.
    Ignored,
    Rejected(InputError),
    Failed(AnalysisError),
    /// The control was reset or resubmitted while this one ran.
    Superseded,
}

/// Gateway -> parser -> normalizer pipeline.
pub struct Analyzer {
    gateway: Arc<dyn ModelGateway>,
}

impl Analyzer {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    /// Run one upload through the model and validate what comes back.
    pub async fn analyze(&self, upload: &Upload) -> Result<AnalysisReport, AnalysisError> {
        let image_base64 = BASE64.encode(&upload.bytes);
        let mime_type = upload.essence();

        let raw = self
            .gateway
            .request_analysis(&image_base64, &mime_type, ANALYSIS_PROMPT)
            .await?;

        let parsed = parser::parse(&raw).inspect_err(|e| {
            log::warn!("Unparsable model output: {}", e);
        })?;

        Ok(normalizer::normalize(&parsed)?)
    }

    /// Drive `control` through one submission of `upload`.
    pub async fn submit(&self, control: &UploadControl, upload: Upload) -> SubmitOutcome {
        let submission = match control.begin(&upload) {
            BeginOutcome::Started(submission) => submission,
            BeginOutcome::InFlight => {
                log::info!("Submission ignored: analysis already in progress");
                return SubmitOutcome::Ignored;
            }
            BeginOutcome::Rejected(err) => {
                log::info!("Upload rejected: {:?}", err);
                return SubmitOutcome::Rejected(err);
            }
        };

        let token = submission.token();
        log::info!(
            "Submission {} started ({} bytes, {})",
            token,
            upload.bytes.len(),
            upload.essence()
        );

        match self.analyze(&upload).await {
            Ok(report) => {
                let report = Arc::new(report);
                if submission.succeed(Arc::clone(&report)) {
                    log::info!(
                        "Submission {} succeeded with {} biomarkers",
                        token,
                        report.biomarkers().len()
                    );
                    SubmitOutcome::Completed(report)
                } else {
                    SubmitOutcome::Superseded
                }
            }
            Err(err) => {
                match &err {
                    AnalysisError::Gateway(e) if e.is_rate_limited() => {
                        log::warn!("Submission {} rate limited: {}", token, e)
                    }
                    AnalysisError::Gateway(e) => log::error!("Submission {} gateway error: {}", token, e),
                    AnalysisError::Parse(_) => log::warn!("Submission {} returned non-JSON output", token),
                    AnalysisError::Validation(e) => {
                        log::warn!("Submission {} failed validation: {}", token, e)
                    }
                }
                if submission.fail(err.user_message()) {
                    SubmitOutcome::Failed(err)
                } else {
                    SubmitOutcome::Superseded
                }
            }
        }
    }
}
