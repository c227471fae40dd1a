//! Carries out workflow intents against the camera and the recognition
//! service.
//!
//! Camera effects run inline and answer with child events. A recognition
//! submission runs as a background task whose progress and completion come
//! back through the controller's inbox, tagged with the submission id.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use async_trait::async_trait;
use facefind_engine::Router;
use facefind_media::MediaCaptureSession;
use recognition_client::{ProgressSink, RecognitionRequest, Recognizer};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::{WorkflowEvent, WorkflowIntent};
use crate::state::WorkflowRecord;

/// Everything the router needs to touch the outside world.
pub struct WorkflowDeps {
    pub(crate) session: tokio::sync::Mutex<MediaCaptureSession>,
    pub(crate) recognizer: Arc<dyn Recognizer>,
    pub(crate) inbox: mpsc::UnboundedSender<WorkflowEvent>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl WorkflowDeps {
    pub fn new(
        session: MediaCaptureSession,
        recognizer: Arc<dyn Recognizer>,
        inbox: mpsc::UnboundedSender<WorkflowEvent>,
    ) -> Self {
        Self {
            session: tokio::sync::Mutex::new(session),
            recognizer,
            inbox,
            in_flight: Mutex::new(None),
        }
    }

    /// True while a submission task has not yet finished.
    pub fn has_in_flight(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Drop any running submission. Its completion will never be delivered.
    pub fn abandon_in_flight(&self) {
        let task = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            if !task.is_finished() {
                tracing::info!("Abandoning in-flight recognition");
            }
            task.abort();
        }
    }

    fn track(&self, task: JoinHandle<()>) {
        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

impl Drop for WorkflowDeps {
    fn drop(&mut self) {
        self.abandon_in_flight();
    }
}

/// Forwards ticker values into the inbox as `ProgressTicked`.
struct ChannelProgress {
    submission: u64,
    inbox: mpsc::UnboundedSender<WorkflowEvent>,
}

impl ProgressSink for ChannelProgress {
    fn report(&self, percent: u8) {
        let _ = self.inbox.send(WorkflowEvent::ProgressTicked {
            submission: self.submission,
            percent,
        });
    }
}

pub struct EffectRouter;

#[async_trait]
impl Router<WorkflowEvent, WorkflowRecord, WorkflowIntent, WorkflowDeps> for EffectRouter {
    async fn route(
        &self,
        intent: WorkflowIntent,
        _record: &WorkflowRecord,
        deps: &WorkflowDeps,
    ) -> Result<Vec<WorkflowEvent>> {
        match intent {
            WorkflowIntent::OpenCamera => {
                let mut session = deps.session.lock().await;
                match session.open().await {
                    Ok(()) => Ok(vec![WorkflowEvent::CameraReady]),
                    Err(e) => {
                        tracing::warn!(error = %e, "Camera unavailable");
                        Ok(vec![WorkflowEvent::CameraDenied {
                            reason: e.to_string(),
                        }])
                    }
                }
            }

            WorkflowIntent::CaptureStill => {
                let mut session = deps.session.lock().await;
                match session.capture_still().await {
                    Ok(image) => Ok(vec![WorkflowEvent::StillCaptured {
                        image: Arc::new(image),
                    }]),
                    Err(e) => {
                        tracing::warn!(error = %e, "Still capture failed");
                        Ok(vec![WorkflowEvent::CaptureFailed {
                            reason: e.to_string(),
                        }])
                    }
                }
            }

            WorkflowIntent::StopCamera => {
                deps.session.lock().await.cancel();
                Ok(vec![])
            }

            WorkflowIntent::SubmitRecognition { submission, image } => {
                let recognizer = Arc::clone(&deps.recognizer);
                let inbox = deps.inbox.clone();
                let progress: Arc<dyn ProgressSink> = Arc::new(ChannelProgress {
                    submission,
                    inbox: inbox.clone(),
                });

                tracing::info!(submission, bytes = image.len(), "Starting recognition");
                let task = tokio::spawn(async move {
                    let request = RecognitionRequest::new(image);
                    let event = match recognizer.recognize(request, progress).await {
                        Ok(result) => WorkflowEvent::RecognitionSucceeded { submission, result },
                        Err(e) => WorkflowEvent::RecognitionFailed {
                            submission,
                            message: e.user_message(),
                        },
                    };
                    if inbox.send(event).is_err() {
                        tracing::debug!(submission, "Workflow gone before recognition finished");
                    }
                });
                deps.track(task);
                Ok(vec![])
            }

            WorkflowIntent::RevokePreview { image } => {
                if image.revoke() {
                    tracing::debug!(origin = ?image.origin(), "Released image preview");
                }
                Ok(vec![])
            }
        }
    }
}
