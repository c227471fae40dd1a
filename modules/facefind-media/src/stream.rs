//! Camera device seam.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    Environment,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

/// What to ask the camera for. Width and height are ideals, not minimums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub facing: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl StreamConstraints {
    /// Front camera at 1280x720.
    pub fn front_camera() -> Self {
        Self {
            facing: FacingMode::User,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// One decoded video frame, packed RGB24.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// A live video stream. Implementations must release the hardware both on
/// `stop` and when dropped.
#[async_trait]
pub trait MediaStream: Send {
    /// Resolves once the first frame is available.
    async fn ready(&mut self) -> Result<()>;

    /// The most recent frame.
    async fn current_frame(&mut self) -> Result<Arc<RgbFrame>>;

    /// Stop every track. Safe to call repeatedly.
    fn stop(&mut self);

    fn is_live(&self) -> bool;
}

/// Grants video streams.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Fails with `MediaAccessDenied` when permission is refused or the
    /// hardware is unavailable.
    async fn request_stream(&self, constraints: &StreamConstraints) -> Result<Box<dyn MediaStream>>;
}
