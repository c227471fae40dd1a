use std::sync::Arc;

use facefind_common::{CapturedImage, RecognitionResult};
use serde::Serialize;

pub const CAMERA_DENIED_NOTICE: &str = "Camera access denied";
pub const CAPTURE_FAILED_NOTICE: &str = "Could not capture a photo. Please try again.";

/// The single authoritative phase of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    #[default]
    Idle,
    CapturingMedia,
    Processing,
    Results,
    NoMatches,
    Error,
}

impl WorkflowState {
    /// Results, NoMatches or Error.
    pub fn is_outcome(&self) -> bool {
        matches!(
            self,
            WorkflowState::Results | WorkflowState::NoMatches | WorkflowState::Error
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::CapturingMedia => "capturing_media",
            WorkflowState::Processing => "processing",
            WorkflowState::Results => "results",
            WorkflowState::NoMatches => "no_matches",
            WorkflowState::Error => "error",
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the workflow knows at one instant. Transitions replace it
/// whole; nothing mutates it in place.
#[derive(Debug, Clone, Default)]
pub struct WorkflowRecord {
    pub state: WorkflowState,
    /// Live preview is up and a still can be taken.
    pub camera_ready: bool,
    pub captured: Option<Arc<CapturedImage>>,
    /// Id of the submission currently in `Processing`, if any.
    pub submission: Option<u64>,
    /// Submissions started so far; survives reset so ids never repeat.
    pub submissions: u64,
    /// Percentage in `[0, 100]`.
    pub progress: u8,
    pub result: Option<RecognitionResult>,
    pub error: Option<String>,
    /// Index into `result.photo_urls` shown full-screen.
    pub selected_photo: Option<usize>,
    /// Blocking message the user has to acknowledge.
    pub notice: Option<String>,
}

impl WorkflowRecord {
    /// Fresh `Idle` record that keeps the submission counter.
    pub fn reset_from(previous: &WorkflowRecord) -> Self {
        Self {
            submissions: previous.submissions,
            ..Self::default()
        }
    }

    pub fn photo_urls(&self) -> &[String] {
        self.result
            .as_ref()
            .map(|r| r.photo_urls.as_slice())
            .unwrap_or_default()
    }

    pub fn selected_photo_url(&self) -> Option<&str> {
        self.selected_photo
            .and_then(|i| self.photo_urls().get(i))
            .map(String::as_str)
    }
}
