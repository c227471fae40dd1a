pub mod error;
pub mod ffmpeg;
pub mod input;
pub mod session;
pub mod stream;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::{InputError, MediaError, Result};
pub use ffmpeg::FfmpegCamera;
pub use input::{validate, SelectedFile, MAX_UPLOAD_BYTES};
pub use session::{MediaCaptureSession, JPEG_QUALITY, READY_TIMEOUT};
pub use stream::{CameraDevice, FacingMode, MediaStream, RgbFrame, StreamConstraints};
