use thiserror::Error;

pub type Result<T> = std::result::Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    /// Permission refused or the device failed.
    #[error("Camera access denied: {0}")]
    MediaAccessDenied(String),

    /// Capture attempted before the stream reported ready.
    #[error("Camera is not ready")]
    NotReady,

    #[error("Failed to encode still: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("File size must be less than 10MB")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Not an image file: {0}")]
    UnsupportedType(String),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}
