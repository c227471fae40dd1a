//! Pure workflow transitions.
//!
//! `(record, event) -> (next record, intents)`. Events that make no sense in
//! the current state leave the record untouched.

use std::sync::Arc;

use facefind_common::CapturedImage;
use facefind_engine::{EventLike, Reducer, Transition};

use crate::events::{WorkflowEvent, WorkflowIntent};
use crate::state::{WorkflowRecord, WorkflowState, CAMERA_DENIED_NOTICE, CAPTURE_FAILED_NOTICE};

type Next = Transition<WorkflowRecord, WorkflowIntent>;

pub struct WorkflowReducer;

impl Reducer<WorkflowEvent, WorkflowRecord> for WorkflowReducer {
    type Intent = WorkflowIntent;

    fn reduce(&self, record: &WorkflowRecord, event: &WorkflowEvent) -> Next {
        use WorkflowEvent as E;
        use WorkflowState as S;

        match (record.state, event) {
            // --- camera -----------------------------------------------------
            (S::Idle, E::CameraRequested) => {
                let next = WorkflowRecord {
                    state: S::CapturingMedia,
                    camera_ready: false,
                    notice: None,
                    ..record.clone()
                };
                Transition::to(next).with(WorkflowIntent::OpenCamera)
            }
            (S::CapturingMedia, E::CameraReady) => Transition::to(WorkflowRecord {
                camera_ready: true,
                ..record.clone()
            }),
            (S::CapturingMedia, E::CaptureRequested) if record.camera_ready => {
                Transition::unchanged(record).with(WorkflowIntent::CaptureStill)
            }
            (S::CapturingMedia, E::CaptureCancelled) => {
                Transition::to(back_to_idle(record, None)).with(WorkflowIntent::StopCamera)
            }
            (S::CapturingMedia, E::CameraDenied { .. }) => {
                Transition::to(back_to_idle(record, Some(CAMERA_DENIED_NOTICE)))
                    .with(WorkflowIntent::StopCamera)
            }
            (S::CapturingMedia, E::CaptureFailed { .. }) => {
                Transition::to(back_to_idle(record, Some(CAPTURE_FAILED_NOTICE)))
                    .with(WorkflowIntent::StopCamera)
            }
            (S::CapturingMedia, E::StillCaptured { image }) => {
                start_processing(record, image).with_first(WorkflowIntent::StopCamera)
            }

            // --- upload -----------------------------------------------------
            (S::Idle, E::FileAccepted { image }) => start_processing(record, image),

            // --- processing -------------------------------------------------
            (S::Processing, E::ProgressTicked { submission, percent })
                if record.submission == Some(*submission) =>
            {
                let progress = (*percent).min(100).max(record.progress);
                Transition::to(WorkflowRecord {
                    progress,
                    ..record.clone()
                })
            }
            (S::Processing, E::RecognitionSucceeded { submission, result })
                if record.submission == Some(*submission) =>
            {
                let next = if result.has_photos() {
                    WorkflowRecord {
                        state: S::Results,
                        progress: 100,
                        result: Some(result.clone()),
                        ..record.clone()
                    }
                } else {
                    WorkflowRecord {
                        state: S::NoMatches,
                        progress: 100,
                        result: None,
                        ..record.clone()
                    }
                };
                Transition::to(next)
            }
            (S::Processing, E::RecognitionFailed { submission, message })
                if record.submission == Some(*submission) =>
            {
                Transition::to(WorkflowRecord {
                    state: S::Error,
                    progress: 100,
                    error: Some(message.clone()),
                    ..record.clone()
                })
            }

            // --- outcomes ---------------------------------------------------
            (S::Results, E::PhotoOpened { index }) if *index < record.photo_urls().len() => {
                Transition::to(WorkflowRecord {
                    selected_photo: Some(*index),
                    ..record.clone()
                })
            }
            (S::Results, E::PhotoClosed { .. }) => Transition::to(WorkflowRecord {
                selected_photo: None,
                ..record.clone()
            }),
            (S::Idle | S::Results | S::NoMatches | S::Error, E::ResetRequested) => {
                let next = WorkflowRecord::reset_from(record);
                Transition::to(next).with_all(revoke(record.captured.as_ref()))
            }

            // --- anywhere ---------------------------------------------------
            (_, E::NoticeDismissed) => Transition::to(WorkflowRecord {
                notice: None,
                ..record.clone()
            }),

            // An image that arrived too late to be used still has to be released.
            (_, E::StillCaptured { image } | E::FileAccepted { image }) => {
                tracing::warn!(state = %record.state, "Discarding image outside capture");
                Transition::unchanged(record).with_all(revoke(Some(image)))
            }
            (state, event) => {
                tracing::debug!(%state, event = %event.event_type_str(), "Ignoring event");
                Transition::unchanged(record)
            }
        }
    }
}

/// Enter `Processing` with a new image and a fresh submission id. Any earlier
/// image's preview is released.
fn start_processing(record: &WorkflowRecord, image: &Arc<CapturedImage>) -> Next {
    let submission = record.submissions + 1;
    let next = WorkflowRecord {
        state: WorkflowState::Processing,
        camera_ready: false,
        captured: Some(Arc::clone(image)),
        submission: Some(submission),
        submissions: submission,
        progress: 0,
        result: None,
        error: None,
        selected_photo: None,
        notice: None,
    };

    let stale = record
        .captured
        .as_ref()
        .filter(|old| !Arc::ptr_eq(old, image));
    Transition::to(next)
        .with_all(revoke(stale))
        .with(WorkflowIntent::SubmitRecognition {
            submission,
            image: Arc::clone(image),
        })
}

fn back_to_idle(record: &WorkflowRecord, notice: Option<&str>) -> WorkflowRecord {
    WorkflowRecord {
        state: WorkflowState::Idle,
        camera_ready: false,
        notice: notice.map(String::from),
        ..record.clone()
    }
}

fn revoke(image: Option<&Arc<CapturedImage>>) -> Option<WorkflowIntent> {
    image.map(|image| WorkflowIntent::RevokePreview {
        image: Arc::clone(image),
    })
}

trait WithFirst<I> {
    fn with_first(self, intent: I) -> Self;
}

impl<S, I> WithFirst<I> for Transition<S, I> {
    fn with_first(mut self, intent: I) -> Self {
        self.intents.insert(0, intent);
        self
    }
}
