//! Still images submitted for recognition.
//!
//! A [`CapturedImage`] pairs the encoded bytes with a locally viewable
//! `file://` reference. Camera stills own a temporary file that is deleted on
//! revocation; uploads point at the user's file, which is never deleted.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Serialize, Serializer};
use tempfile::NamedTempFile;

/// Where a still image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOrigin {
    Camera,
    Upload,
}

#[derive(Debug)]
enum LocalPreview {
    /// Temp file written for a camera still. Dropping it deletes the file.
    Owned(NamedTempFile),
    /// The user's own file. Revocation only forgets the reference.
    Borrowed(PathBuf),
}

impl LocalPreview {
    fn path(&self) -> &Path {
        match self {
            LocalPreview::Owned(file) => file.path(),
            LocalPreview::Borrowed(path) => path,
        }
    }
}

/// An immutable image payload plus a revocable local preview reference.
#[derive(Debug)]
pub struct CapturedImage {
    bytes: Vec<u8>,
    content_type: String,
    origin: ImageOrigin,
    preview: Mutex<Option<LocalPreview>>,
}

impl CapturedImage {
    /// Wrap a JPEG still from the camera, writing it to a temp file so it can
    /// be viewed locally while the search runs.
    pub fn from_camera(jpeg: Vec<u8>) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("facefind-capture-")
            .suffix(".jpg")
            .tempfile()?;
        file.write_all(&jpeg)?;
        file.flush()?;

        Ok(Self {
            bytes: jpeg,
            content_type: "image/jpeg".to_string(),
            origin: ImageOrigin::Camera,
            preview: Mutex::new(Some(LocalPreview::Owned(file))),
        })
    }

    /// Wrap the contents of a user-selected file.
    pub fn from_upload(path: PathBuf, bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            origin: ImageOrigin::Upload,
            preview: Mutex::new(Some(LocalPreview::Borrowed(path))),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn origin(&self) -> ImageOrigin {
        self.origin
    }

    /// Filesystem path of the preview, or `None` once revoked.
    pub fn preview_path(&self) -> Option<PathBuf> {
        self.lock_preview()
            .as_ref()
            .map(|preview| preview.path().to_path_buf())
    }

    /// `file://` URI of the preview, or `None` once revoked.
    pub fn preview_uri(&self) -> Option<String> {
        let path = self.preview_path()?;
        let uri = match url::Url::from_file_path(&path) {
            Ok(url) => url.to_string(),
            Err(()) => format!("file://{}", path.display()),
        };
        Some(uri)
    }

    /// Release the local preview. Returns `true` if this call released it,
    /// `false` if it was already revoked.
    pub fn revoke(&self) -> bool {
        let released = self.lock_preview().take();
        match released {
            Some(LocalPreview::Owned(file)) => {
                let path = file.path().to_path_buf();
                if let Err(e) = file.close() {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to delete capture preview");
                }
                true
            }
            Some(LocalPreview::Borrowed(_)) => true,
            None => false,
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.lock_preview().is_none()
    }

    fn lock_preview(&self) -> std::sync::MutexGuard<'_, Option<LocalPreview>> {
        self.preview.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Journal form: metadata only, never the image bytes.
impl Serialize for CapturedImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Summary<'a> {
            origin: ImageOrigin,
            content_type: &'a str,
            bytes: usize,
            preview_uri: Option<String>,
        }

        Summary {
            origin: self.origin,
            content_type: &self.content_type,
            bytes: self.bytes.len(),
            preview_uri: self.preview_uri(),
        }
        .serialize(serializer)
    }
}
