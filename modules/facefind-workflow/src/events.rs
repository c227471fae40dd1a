use std::sync::Arc;

use facefind_common::{CapturedImage, RecognitionResult};
use facefind_engine::EventLike;
use serde::Serialize;

/// How the user closed the full-size photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissVia {
    CloseButton,
    Backdrop,
}

/// Everything that can happen to the workflow: user actions, hardware
/// callbacks, and network completions.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    CameraRequested,
    CameraReady,
    CameraDenied { reason: String },
    CaptureRequested,
    CaptureCancelled,
    CaptureFailed { reason: String },
    StillCaptured { image: Arc<CapturedImage> },
    FileAccepted { image: Arc<CapturedImage> },
    ProgressTicked { submission: u64, percent: u8 },
    RecognitionSucceeded { submission: u64, result: RecognitionResult },
    RecognitionFailed { submission: u64, message: String },
    ResetRequested,
    PhotoOpened { index: usize },
    PhotoClosed { via: DismissVia },
    NoticeDismissed,
}

impl EventLike for WorkflowEvent {
    fn event_type_str(&self) -> String {
        let name = match self {
            WorkflowEvent::CameraRequested => "camera_requested",
            WorkflowEvent::CameraReady => "camera_ready",
            WorkflowEvent::CameraDenied { .. } => "camera_denied",
            WorkflowEvent::CaptureRequested => "capture_requested",
            WorkflowEvent::CaptureCancelled => "capture_cancelled",
            WorkflowEvent::CaptureFailed { .. } => "capture_failed",
            WorkflowEvent::StillCaptured { .. } => "still_captured",
            WorkflowEvent::FileAccepted { .. } => "file_accepted",
            WorkflowEvent::ProgressTicked { .. } => "progress_ticked",
            WorkflowEvent::RecognitionSucceeded { .. } => "recognition_succeeded",
            WorkflowEvent::RecognitionFailed { .. } => "recognition_failed",
            WorkflowEvent::ResetRequested => "reset_requested",
            WorkflowEvent::PhotoOpened { .. } => "photo_opened",
            WorkflowEvent::PhotoClosed { .. } => "photo_closed",
            WorkflowEvent::NoticeDismissed => "notice_dismissed",
        };
        format!("workflow:{name}")
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to serialize workflow event");
            serde_json::Value::Null
        })
    }
}

/// Side effects a transition asks for. Carried out by `EffectRouter`.
#[derive(Debug)]
pub enum WorkflowIntent {
    OpenCamera,
    CaptureStill,
    /// Stop every camera track. Idempotent.
    StopCamera,
    SubmitRecognition {
        submission: u64,
        image: Arc<CapturedImage>,
    },
    /// Release the local preview of an image that is being replaced or
    /// discarded.
    RevokePreview { image: Arc<CapturedImage> },
}
