//! ffmpeg-backed camera.
//!
//! Spawns ffmpeg reading the configured device and decoding to raw RGB24 on
//! stdout. A reader task keeps only the latest frame so a still always shows
//! what the camera sees now, not what was buffered in the pipe.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use facefind_common::Config;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{MediaError, Result};
use crate::stream::{CameraDevice, MediaStream, RgbFrame, StreamConstraints};

type LatestFrame = Option<Arc<RgbFrame>>;

pub struct FfmpegCamera {
    ffmpeg: String,
    device: String,
    input_format: String,
}

impl FfmpegCamera {
    pub fn new(device: &str, input_format: &str) -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            device: device.to_string(),
            input_format: input_format.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.camera_device, &config.camera_format).with_binary(&config.ffmpeg_bin)
    }

    pub fn with_binary(mut self, ffmpeg: &str) -> Self {
        self.ffmpeg = ffmpeg.to_string();
        self
    }

    fn command(&self, constraints: &StreamConstraints) -> Command {
        let (w, h) = (constraints.ideal_width, constraints.ideal_height);
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-f")
            .arg(&self.input_format)
            .arg("-video_size")
            .arg(format!("{w}x{h}"))
            .arg("-i")
            .arg(&self.device)
            .arg("-vf")
            .arg(format!("scale={w}:{h}"))
            .arg("-pix_fmt")
            .arg("rgb24")
            .arg("-f")
            .arg("rawvideo")
            .arg("-");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl CameraDevice for FfmpegCamera {
    async fn request_stream(&self, constraints: &StreamConstraints) -> Result<Box<dyn MediaStream>> {
        let mut child = self.command(constraints).spawn().map_err(|e| {
            MediaError::MediaAccessDenied(format!("failed to start {}: {e}", self.ffmpeg))
        })?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            let _ = child.start_kill();
            return Err(MediaError::MediaAccessDenied(
                "ffmpeg pipes unavailable".to_string(),
            ));
        };

        tracing::debug!(device = %self.device, format = %self.input_format, "ffmpeg camera started");

        let (tx, frames) = watch::channel(None);
        let reader = tokio::spawn(read_frames(
            stdout,
            constraints.ideal_width,
            constraints.ideal_height,
            tx,
        ));
        let stderr = tokio::spawn(read_stderr(stderr));

        Ok(Box::new(FfmpegStream {
            child,
            frames,
            reader: Some(reader),
            stderr: Some(stderr),
            stopped: false,
        }))
    }
}

struct FfmpegStream {
    child: Child,
    frames: watch::Receiver<LatestFrame>,
    reader: Option<JoinHandle<()>>,
    stderr: Option<JoinHandle<String>>,
    stopped: bool,
}

impl FfmpegStream {
    /// Whatever ffmpeg printed before it died, if it has finished writing.
    async fn failure_detail(&mut self) -> String {
        let Some(task) = self.stderr.take() else {
            return String::new();
        };
        match tokio::time::timeout(Duration::from_secs(1), task).await {
            Ok(Ok(text)) => text.trim().to_string(),
            _ => String::new(),
        }
    }
}

#[async_trait]
impl MediaStream for FfmpegStream {
    async fn ready(&mut self) -> Result<()> {
        let first_frame = self.frames.wait_for(|frame| frame.is_some()).await.is_ok();
        if first_frame {
            return Ok(());
        }
        let detail = self.failure_detail().await;
        self.stop();
        let reason = if detail.is_empty() {
            "camera stream ended before the first frame".to_string()
        } else {
            detail
        };
        Err(MediaError::MediaAccessDenied(reason))
    }

    async fn current_frame(&mut self) -> Result<Arc<RgbFrame>> {
        if self.stopped {
            return Err(MediaError::NotReady);
        }
        if self.frames.has_changed().is_err() {
            return Err(MediaError::MediaAccessDenied(
                "camera stream ended".to_string(),
            ));
        }
        self.frames.borrow_and_update().clone().ok_or(MediaError::NotReady)
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if let Some(stderr) = self.stderr.take() {
            stderr.abort();
        }
        if let Err(e) = self.child.start_kill() {
            tracing::debug!(error = %e, "ffmpeg already exited");
        }
        tracing::debug!("Camera stream stopped");
    }

    fn is_live(&self) -> bool {
        !self.stopped
    }
}

impl Drop for FfmpegStream {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn read_frames(
    mut stdout: ChildStdout,
    width: u32,
    height: u32,
    tx: watch::Sender<LatestFrame>,
) {
    let frame_len = width as usize * height as usize * 3;
    loop {
        let mut data = vec![0u8; frame_len];
        if let Err(e) = stdout.read_exact(&mut data).await {
            tracing::debug!(error = %e, "Camera frame stream closed");
            break;
        }
        if tx.send(Some(Arc::new(RgbFrame { width, height, data }))).is_err() {
            break;
        }
    }
}

async fn read_stderr(mut stderr: ChildStderr) -> String {
    let mut text = String::new();
    let _ = stderr.read_to_string(&mut text).await;
    text
}
