//! One camera session: grant, preview, a single still, release.

use std::sync::Arc;
use std::time::Duration;

use facefind_common::CapturedImage;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::error::{MediaError, Result};
use crate::stream::{CameraDevice, MediaStream, RgbFrame, StreamConstraints};

pub const JPEG_QUALITY: u8 = 95;

/// How long a granted stream may take to deliver its first frame.
pub const READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Owns at most one live stream. Every path that ends the session (capture,
/// cancel, drop) stops the stream exactly once.
pub struct MediaCaptureSession {
    device: Arc<dyn CameraDevice>,
    constraints: StreamConstraints,
    stream: Option<Box<dyn MediaStream>>,
    ready: bool,
}

impl MediaCaptureSession {
    pub fn new(device: Arc<dyn CameraDevice>) -> Self {
        Self {
            device,
            constraints: StreamConstraints::front_camera(),
            stream: None,
            ready: false,
        }
    }

    /// Request the stream and wait for its first frame. A session that is
    /// already open is left as is.
    pub async fn open(&mut self) -> Result<()> {
        if self.stream.is_some() {
            tracing::debug!("Camera session already open");
            return Ok(());
        }

        tracing::info!(
            facing = self.constraints.facing.as_str(),
            width = self.constraints.ideal_width,
            height = self.constraints.ideal_height,
            "Requesting camera stream"
        );

        let mut stream = self
            .device
            .request_stream(&self.constraints)
            .await
            .map_err(denied)?;

        let ready = match tokio::time::timeout(READY_TIMEOUT, stream.ready()).await {
            Ok(ready) => ready,
            Err(_) => Err(MediaError::MediaAccessDenied(format!(
                "no frame from camera within {}s",
                READY_TIMEOUT.as_secs()
            ))),
        };
        if let Err(e) = ready {
            stream.stop();
            return Err(denied(e));
        }

        self.stream = Some(stream);
        self.ready = true;
        tracing::info!("Camera stream ready");
        Ok(())
    }

    /// Grab the current frame as a JPEG still and end the session.
    pub async fn capture_still(&mut self) -> Result<CapturedImage> {
        if !self.ready {
            return Err(MediaError::NotReady);
        }
        let stream = self.stream.as_mut().ok_or(MediaError::NotReady)?;

        let frame = stream.current_frame().await;
        self.release();
        let frame = frame.map_err(denied)?;

        let jpeg = encode_jpeg(&frame, JPEG_QUALITY)?;
        tracing::info!(
            width = frame.width,
            height = frame.height,
            bytes = jpeg.len(),
            "Captured still"
        );
        CapturedImage::from_camera(jpeg).map_err(|e| MediaError::Encode(e.to_string()))
    }

    /// Stop the stream without producing an image.
    pub fn cancel(&mut self) {
        if self.stream.is_some() {
            tracing::info!("Camera capture cancelled");
        }
        self.release();
    }

    pub fn is_active(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_live())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    fn release(&mut self) {
        self.ready = false;
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }
}

impl Drop for MediaCaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}

/// Hardware failures surface as denial; readiness errors pass through.
fn denied(err: MediaError) -> MediaError {
    match err {
        MediaError::MediaAccessDenied(_) | MediaError::NotReady => err,
        MediaError::Encode(reason) => MediaError::MediaAccessDenied(reason),
    }
}

pub(crate) fn encode_jpeg(frame: &RgbFrame, quality: u8) -> Result<Vec<u8>> {
    let expected = frame.width as usize * frame.height as usize * 3;
    if frame.data.len() != expected {
        return Err(MediaError::Encode(format!(
            "frame is {} bytes, expected {expected} for {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode(&frame.data, frame.width, frame.height, ExtendedColorType::Rgb8)
        .map_err(|e| MediaError::Encode(e.to_string()))?;
    Ok(jpeg)
}
