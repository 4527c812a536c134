// Upload-control lifecycle: Idle -> Submitting -> Success | Failed.
//
// One control per user session. At most one submission is in flight per
// control; results are applied only if their token is still the current one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use uuid::Uuid;

use super::report::AnalysisReport;
use super::upload::{InputError, Upload};

pub const IDLE_LABEL: &str = "Choose File";
pub const BUSY_LABEL: &str = "Processing...";

/// Message used when a submission ends without an explicit outcome.
pub const GENERIC_FAILURE: &str = "Analysis failed. Please try again.";

/// Tracked sessions before controls that are not busy get evicted.
const MAX_TRACKED_SESSIONS: usize = 1024;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "phase", content = "detail", rename_all = "lowercase")]
pub enum PresentationState {
    Idle,
    Submitting,
    Success(Arc<AnalysisReport>),
    Failed(String),
}

impl PresentationState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, PresentationState::Submitting)
    }
}

/// Enabled flag and label of the submit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmitAffordance {
    pub enabled: bool,
    pub label: &'static str,
}

impl SubmitAffordance {
    const READY: Self = Self { enabled: true, label: IDLE_LABEL };
    const BUSY: Self = Self { enabled: false, label: BUSY_LABEL };
}

/// Identity of one submission, used to discard stale results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SubmissionToken(Uuid);

impl SubmissionToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubmissionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSnapshot {
    pub state: PresentationState,
    pub affordance: SubmitAffordance,
    pub affordance_toggles: u64,
    pub notice: Option<String>,
}

#[derive(Debug)]
struct ControlInner {
    state: PresentationState,
    affordance: SubmitAffordance,
    affordance_toggles: u64,
    notice: Option<String>,
    current: Option<SubmissionToken>,
    max_upload_bytes: usize,
}

impl ControlInner {
    fn set_affordance(&mut self, affordance: SubmitAffordance) {
        if self.affordance != affordance {
            self.affordance = affordance;
            self.affordance_toggles += 1;
        }
    }
}

pub enum BeginOutcome {
    Started(Submission),
    /// A submission is already running; the attempt was dropped.
    InFlight,
    Rejected(InputError),
}

/// Clonable handle to one upload control.
#[derive(Debug, Clone)]
pub struct UploadControl {
    inner: Arc<Mutex<ControlInner>>,
}

impl UploadControl {
    pub fn new(max_upload_bytes: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ControlInner {
                state: PresentationState::Idle,
                affordance: SubmitAffordance::READY,
                affordance_toggles: 0,
                notice: None,
                current: None,
                max_upload_bytes,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControlInner> {
        // State stays consistent across a panic: every write is a single assignment.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Try to start a submission for `upload`.
    pub fn begin(&self, upload: &Upload) -> BeginOutcome {
        let mut inner = self.lock();

        if inner.state.is_submitting() {
            return BeginOutcome::InFlight;
        }

        if let Err(err) = upload.check(inner.max_upload_bytes) {
            inner.notice = Some(err.to_string());
            return BeginOutcome::Rejected(err);
        }

        let token = SubmissionToken::new();
        inner.state = PresentationState::Submitting;
        inner.notice = None;
        inner.current = Some(token);
        inner.set_affordance(SubmitAffordance::BUSY);

        BeginOutcome::Started(Submission {
            control: self.clone(),
            token,
            settled: false,
        })
    }

    /// Back to `Idle`. Any in-flight submission becomes stale.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.state = PresentationState::Idle;
        inner.notice = None;
        inner.current = None;
        inner.set_affordance(SubmitAffordance::READY);
    }

    pub fn snapshot(&self) -> ControlSnapshot {
        let inner = self.lock();
        ControlSnapshot {
            state: inner.state.clone(),
            affordance: inner.affordance,
            affordance_toggles: inner.affordance_toggles,
            notice: inner.notice.clone(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.lock().state.is_submitting()
    }

    fn settle(&self, token: SubmissionToken, state: PresentationState) -> bool {
        let mut inner = self.lock();
        if inner.current != Some(token) {
            log::debug!("Discarding stale result for submission {}", token);
            return false;
        }
        inner.state = state;
        inner.current = None;
        inner.set_affordance(SubmitAffordance::READY);
        true
    }
}

/// An in-flight submission. Settling it (or dropping it unsettled) leaves
/// `Submitting` and re-enables the control exactly once.
#[derive(Debug)]
pub struct Submission {
    control: UploadControl,
    token: SubmissionToken,
    settled: bool,
}

impl Submission {
    pub fn token(&self) -> SubmissionToken {
        self.token
    }

    /// Returns false if the submission was superseded and the report dropped.
    pub fn succeed(mut self, report: Arc<AnalysisReport>) -> bool {
        self.settled = true;
        self.control
            .settle(self.token, PresentationState::Success(report))
    }

    /// Returns false if the submission was superseded.
    pub fn fail(mut self, message: impl Into<String>) -> bool {
        self.settled = true;
        self.control
            .settle(self.token, PresentationState::Failed(message.into()))
    }
}

impl Drop for Submission {
    fn drop(&mut self) {
        if !self.settled {
            log::warn!("Submission {} ended without a result", self.token);
            self.control
                .settle(self.token, PresentationState::Failed(GENERIC_FAILURE.to_string()));
        }
    }
}

/// Upload controls keyed by client session id.
#[derive(Debug)]
pub struct ControlRegistry {
    controls: Mutex<HashMap<String, UploadControl>>,
    max_upload_bytes: usize,
}

impl ControlRegistry {
    pub fn new(max_upload_bytes: usize) -> Self {
        Self {
            controls: Mutex::new(HashMap::new()),
            max_upload_bytes,
        }
    }

    /// The session's control, created on first use. `None` gets a private,
    /// untracked control.
    pub fn control_for(&self, session: Option<&str>) -> UploadControl {
        let Some(session) = session else {
            return UploadControl::new(self.max_upload_bytes);
        };

        let mut controls = self.controls.lock().unwrap_or_else(|p| p.into_inner());
        if controls.len() >= MAX_TRACKED_SESSIONS && !controls.contains_key(session) {
            controls.retain(|_, control| control.is_busy());
        }
        controls
            .entry(session.to_string())
            .or_insert_with(|| UploadControl::new(self.max_upload_bytes))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.controls.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
