//! The single owner of a workflow instance.

use std::sync::Arc;

use anyhow::{bail, Result};
use facefind_engine::{Engine, EventSink, TracingSink};
use facefind_media::{validate, CameraDevice, MediaCaptureSession, SelectedFile};
use recognition_client::Recognizer;
use tokio::sync::mpsc;

use crate::events::{DismissVia, WorkflowEvent};
use crate::presenter::{present, Screen};
use crate::reducer::WorkflowReducer;
use crate::router::{EffectRouter, WorkflowDeps};
use crate::state::{WorkflowRecord, WorkflowState};

type WorkflowEngine<P> =
    Engine<WorkflowEvent, WorkflowRecord, WorkflowDeps, WorkflowReducer, EffectRouter, P>;

/// Drives one capture-and-recognition workflow.
///
/// User actions are methods; background completions (progress ticks and the
/// recognition outcome) queue up in an inbox and are applied by [`pump`].
/// Dropping the controller abandons any in-flight submission and releases
/// the camera.
///
/// [`pump`]: WorkflowController::pump
pub struct WorkflowController<P: EventSink = TracingSink> {
    engine: WorkflowEngine<P>,
    record: WorkflowRecord,
    deps: WorkflowDeps,
    inbox: mpsc::UnboundedReceiver<WorkflowEvent>,
}

impl WorkflowController<TracingSink> {
    pub fn new(camera: Arc<dyn CameraDevice>, recognizer: Arc<dyn Recognizer>) -> Self {
        Self::with_sink(camera, recognizer, TracingSink::new())
    }
}

impl<P: EventSink> WorkflowController<P> {
    pub fn with_sink(
        camera: Arc<dyn CameraDevice>,
        recognizer: Arc<dyn Recognizer>,
        sink: P,
    ) -> Self {
        let (tx, inbox) = mpsc::unbounded_channel();
        let deps = WorkflowDeps::new(MediaCaptureSession::new(camera), recognizer, tx);
        Self {
            engine: Engine::new(WorkflowReducer, EffectRouter, sink),
            record: WorkflowRecord::default(),
            deps,
            inbox,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.record.state
    }

    pub fn record(&self) -> &WorkflowRecord {
        &self.record
    }

    pub fn screen(&self) -> Screen {
        present(&self.record)
    }

    pub fn sink(&self) -> &P {
        self.engine.sink()
    }

    /// Open the front camera. Returns once the stream is ready or refused.
    pub async fn start_camera(&mut self) -> Result<()> {
        self.dispatch(WorkflowEvent::CameraRequested).await
    }

    /// Take the still and start recognition. Ignored until the camera is ready.
    pub async fn capture(&mut self) -> Result<()> {
        self.dispatch(WorkflowEvent::CaptureRequested).await
    }

    pub async fn cancel_camera(&mut self) -> Result<()> {
        self.dispatch(WorkflowEvent::CaptureCancelled).await
    }

    /// Accept a user-selected file. An oversized file is rejected here with
    /// [`facefind_media::InputError::FileTooLarge`] and never reaches the
    /// workflow.
    pub async fn select_file(&mut self, file: SelectedFile) -> Result<()> {
        validate(&file)?;
        if self.record.state != WorkflowState::Idle {
            bail!("Cannot select a file while {}", self.record.state);
        }
        let image = file.read().await?;
        self.dispatch(WorkflowEvent::FileAccepted {
            image: Arc::new(image),
        })
        .await
    }

    /// Back to `Idle` from an outcome. Ignored while capturing or processing.
    pub async fn reset(&mut self) -> Result<()> {
        self.dispatch(WorkflowEvent::ResetRequested).await
    }

    pub async fn open_photo(&mut self, index: usize) -> Result<()> {
        self.dispatch(WorkflowEvent::PhotoOpened { index }).await
    }

    pub async fn close_photo(&mut self, via: DismissVia) -> Result<()> {
        self.dispatch(WorkflowEvent::PhotoClosed { via }).await
    }

    pub async fn dismiss_notice(&mut self) -> Result<()> {
        self.dispatch(WorkflowEvent::NoticeDismissed).await
    }

    /// Apply the next background event. Waits for one only while a
    /// submission is still running. Returns `false` when there was nothing to
    /// apply.
    pub async fn pump(&mut self) -> Result<bool> {
        let event = match self.inbox.try_recv() {
            Ok(event) => event,
            Err(_) if self.deps.has_in_flight() => match self.inbox.recv().await {
                Some(event) => event,
                None => return Ok(false),
            },
            // The task may have finished between the first look and now.
            Err(_) => match self.inbox.try_recv() {
                Ok(event) => event,
                Err(_) => return Ok(false),
            },
        };
        self.dispatch(event).await?;
        Ok(true)
    }

    /// Pump until the workflow leaves `Processing`.
    pub async fn wait_for_outcome(&mut self) -> Result<WorkflowState> {
        while self.record.state == WorkflowState::Processing {
            if !self.pump().await? {
                bail!("Recognition ended without an outcome");
            }
        }
        Ok(self.record.state)
    }

    async fn dispatch(&mut self, event: WorkflowEvent) -> Result<()> {
        self.engine
            .dispatch(event, &mut self.record, &self.deps)
            .await
    }
}
