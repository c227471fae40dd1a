//! In-memory camera for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{MediaError, Result};
use crate::stream::{CameraDevice, MediaStream, RgbFrame, StreamConstraints};

#[derive(Debug, Clone)]
pub enum FakeBehavior {
    /// Grant a stream producing frames of this size.
    Grant { width: u32, height: u32 },
    /// Refuse the stream, as a denied permission prompt would.
    Deny(String),
    /// Grant the stream, then fail before the first frame.
    FailReady,
    /// Grant the stream but never deliver a first frame.
    Stall,
    /// Become ready, then lose the device when the still is taken.
    FailCapture,
}

/// Counters shared by a fake camera and every stream it hands out.
#[derive(Debug, Default)]
pub struct CameraStats {
    requested: AtomicUsize,
    stopped: AtomicUsize,
    live: AtomicUsize,
}

impl CameraStats {
    pub fn requested(&self) -> usize {
        self.requested.load(Ordering::SeqCst)
    }

    /// Number of streams whose tracks were stopped.
    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Streams currently holding the hardware.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

pub struct FakeCamera {
    behavior: FakeBehavior,
    stats: Arc<CameraStats>,
}

impl FakeCamera {
    pub fn granting() -> Self {
        Self::new(FakeBehavior::Grant {
            width: 64,
            height: 48,
        })
    }

    pub fn denying() -> Self {
        Self::new(FakeBehavior::Deny("Permission denied".into()))
    }

    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            stats: Arc::new(CameraStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<CameraStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl CameraDevice for FakeCamera {
    async fn request_stream(&self, constraints: &StreamConstraints) -> Result<Box<dyn MediaStream>> {
        self.stats.requested.fetch_add(1, Ordering::SeqCst);

        let (width, height) = match &self.behavior {
            FakeBehavior::Deny(reason) => return Err(MediaError::MediaAccessDenied(reason.clone())),
            FakeBehavior::Grant { width, height } => (*width, *height),
            _ => (constraints.ideal_width, constraints.ideal_height),
        };

        self.stats.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            stats: Arc::clone(&self.stats),
            behavior: self.behavior.clone(),
            width,
            height,
            stopped: false,
        }))
    }
}

struct FakeStream {
    stats: Arc<CameraStats>,
    behavior: FakeBehavior,
    width: u32,
    height: u32,
    stopped: bool,
}

#[async_trait]
impl MediaStream for FakeStream {
    async fn ready(&mut self) -> Result<()> {
        match self.behavior {
            FakeBehavior::FailReady => {
                Err(MediaError::MediaAccessDenied("device disconnected".into()))
            }
            FakeBehavior::Stall => std::future::pending().await,
            _ => Ok(()),
        }
    }

    async fn current_frame(&mut self) -> Result<Arc<RgbFrame>> {
        if self.stopped {
            return Err(MediaError::NotReady);
        }
        if matches!(self.behavior, FakeBehavior::FailCapture) {
            return Err(MediaError::MediaAccessDenied("device disconnected".into()));
        }
        let data = (0..self.width * self.height)
            .flat_map(|i| {
                let v = (i % 256) as u8;
                [v, v.wrapping_mul(2), 255 - v]
            })
            .collect();
        Ok(Arc::new(RgbFrame {
            width: self.width,
            height: self.height,
            data,
        }))
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.stats.stopped.fetch_add(1, Ordering::SeqCst);
            self.stats.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        !self.stopped
    }
}

impl Drop for FakeStream {
    fn drop(&mut self) {
        self.stop();
    }
}
