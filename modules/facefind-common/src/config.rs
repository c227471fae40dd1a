use std::env;

/// Default base URL of the recognition service.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default path of the recognition endpoint under the base URL.
pub const DEFAULT_RECOGNIZE_PATH: &str = "/api/v1/recognize-face";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // Recognition service
    pub api_url: String,
    pub recognize_path: String,
    pub api_token: Option<String>,

    // Camera
    pub camera_device: String,
    pub camera_format: String,
    pub ffmpeg_bin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            recognize_path: DEFAULT_RECOGNIZE_PATH.to_string(),
            api_token: None,
            camera_device: "/dev/video0".to_string(),
            camera_format: "v4l2".to_string(),
            ffmpeg_bin: "ffmpeg".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    /// Every value has a default, so this never fails.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            api_url: get("FACEFIND_API_URL").unwrap_or(defaults.api_url),
            recognize_path: get("FACEFIND_RECOGNIZE_PATH").unwrap_or(defaults.recognize_path),
            api_token: get("FACEFIND_API_TOKEN"),
            camera_device: get("FACEFIND_CAMERA_DEVICE").unwrap_or(defaults.camera_device),
            camera_format: get("FACEFIND_CAMERA_FORMAT").unwrap_or(defaults.camera_format),
            ffmpeg_bin: get("FACEFIND_FFMPEG").unwrap_or(defaults.ffmpeg_bin),
        }
    }

    /// Full URL of the recognition endpoint.
    pub fn recognize_url(&self) -> String {
        let base = self.api_url.trim_end_matches('/');
        let path = self.recognize_path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    pub fn log_redacted(&self) {
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => {
                    let head: String = v.chars().take(4).collect();
                    format!("{}...({} chars)", head, v.chars().count())
                }
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  FACEFIND_API_URL: {}", self.api_url);
        tracing::info!("  FACEFIND_RECOGNIZE_PATH: {}", self.recognize_path);
        tracing::info!("  FACEFIND_API_TOKEN: {}", preview_opt(&self.api_token));
        tracing::info!("  FACEFIND_CAMERA_DEVICE: {}", self.camera_device);
        tracing::info!("  FACEFIND_CAMERA_FORMAT: {}", self.camera_format);
        tracing::info!("  FACEFIND_FFMPEG: {}", self.ffmpeg_bin);
    }
}
