//! User-supplied files.

use std::path::{Path, PathBuf};

use facefind_common::CapturedImage;
use image::ImageFormat;

use crate::error::InputError;

/// Largest accepted upload: 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A file the user picked. Only image types get this far; the size has not
/// been checked yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    path: PathBuf,
    size: u64,
    content_type: String,
}

impl SelectedFile {
    pub fn new(path: PathBuf, size: u64, content_type: impl Into<String>) -> Self {
        Self {
            path,
            size,
            content_type: content_type.into(),
        }
    }

    /// Pick a file from disk. Rejects anything whose extension is not a known
    /// image format, mirroring an `image/*` picker filter.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path)
            .map_err(|_| InputError::UnsupportedType(path.display().to_string()))?;

        let path = tokio::fs::canonicalize(path).await?;
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(InputError::UnsupportedType(path.display().to_string()));
        }

        Ok(Self::new(path, metadata.len(), format.to_mime_type()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Load the bytes. Call only after `validate` accepted the file.
    pub async fn read(self) -> Result<CapturedImage, InputError> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(CapturedImage::from_upload(self.path, bytes, self.content_type))
    }
}

/// Size gate applied before a file enters the workflow.
pub fn validate(file: &SelectedFile) -> Result<(), InputError> {
    if file.size > MAX_UPLOAD_BYTES {
        tracing::info!(
            path = %file.path.display(),
            size = file.size,
            limit = MAX_UPLOAD_BYTES,
            "Rejected oversized upload"
        );
        return Err(InputError::FileTooLarge {
            size: file.size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use facefind_common::ImageOrigin;
    use std::io::Write;

    #[test]
    fn exactly_ten_mib_is_accepted() {
        let file = SelectedFile::new(PathBuf::from("me.jpg"), MAX_UPLOAD_BYTES, "image/jpeg");
        assert!(validate(&file).is_ok());
    }

    #[test]
    fn one_byte_over_is_rejected() {
        let file = SelectedFile::new(
            PathBuf::from("me.jpg"),
            MAX_UPLOAD_BYTES + 1,
            "image/jpeg",
        );
        let err = validate(&file).unwrap_err();
        assert!(matches!(
            err,
            InputError::FileTooLarge { size, limit } if size == MAX_UPLOAD_BYTES + 1 && limit == MAX_UPLOAD_BYTES
        ));
        assert_eq!(err.to_string(), "File size must be less than 10MB");
    }

    #[tokio::test]
    async fn from_path_reads_size_and_mime() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&[0u8; 321]).unwrap();

        let selected = SelectedFile::from_path(file.path()).await.unwrap();
        assert_eq!(selected.size(), 321);
        assert_eq!(selected.content_type(), "image/png");

        let image = selected.read().await.unwrap();
        assert_eq!(image.len(), 321);
        assert_eq!(image.origin(), ImageOrigin::Upload);
    }

    #[tokio::test]
    async fn non_image_extension_is_filtered_out() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let err = SelectedFile::from_path(file.path()).await.unwrap_err();
        assert!(matches!(err, InputError::UnsupportedType(_)));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let err = SelectedFile::from_path("/nonexistent/facefind/me.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::Io(_)));
    }

    #[tokio::test]
    async fn oversized_file_on_disk_is_rejected_without_reading() {
        let file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.as_file().set_len(MAX_UPLOAD_BYTES + 1).unwrap();

        let selected = SelectedFile::from_path(file.path()).await.unwrap();
        assert!(matches!(
            validate(&selected),
            Err(InputError::FileTooLarge { .. })
        ));
    }
}
