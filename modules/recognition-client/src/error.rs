use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecognitionError>;

/// Shown when the service rejects the request without saying why.
pub const FALLBACK_API_MESSAGE: &str = "Processing failed";

/// Shown for transport and parse failures.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl RecognitionError {
    /// The human-readable message surfaced in the error view.
    pub fn user_message(&self) -> String {
        match self {
            RecognitionError::Api { message, .. } => message.clone(),
            RecognitionError::Network(_) | RecognitionError::Parse(_) => FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for RecognitionError {
    fn from(err: reqwest::Error) -> Self {
        RecognitionError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for RecognitionError {
    fn from(err: serde_json::Error) -> Self {
        RecognitionError::Parse(err.to_string())
    }
}
