//! Team logo uploads

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::validation::{FieldError, ValidationErrors, ValidationKind};
use crate::domain::DomainError;

/// Largest accepted logo, in bytes (50 KiB)
pub const MAX_LOGO_BYTES: usize = 50 * 1024;

/// Raw logo as submitted by a client
#[derive(Clone, PartialEq, Eq)]
pub struct LogoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl LogoUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Lower-cased extension of the submitted file name
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

impl std::fmt::Debug for LogoUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogoUpload")
            .field("file_name", &self.file_name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Checks the logo is an image no larger than [`MAX_LOGO_BYTES`]
pub fn validate_logo(upload: &LogoUpload) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    let is_image = mime_guess::from_path(&upload.file_name)
        .first()
        .map(|m| m.type_() == mime_guess::mime::IMAGE)
        .unwrap_or(false);

    if !is_image {
        errors.push(FieldError::new(
            "logo",
            ValidationKind::InvalidFormat,
            "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
        ));
    }

    if upload.size() > MAX_LOGO_BYTES {
        errors.push(FieldError::new(
            "logo",
            ValidationKind::SizeExceeded,
            "Image size should not exceed 50KB.",
        ));
    }

    errors
}

/// Persists logo bytes and hands back an opaque reference
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LogoStore: Send + Sync {
    /// Stores a validated upload
    async fn save(&self, upload: &LogoUpload) -> Result<String, DomainError>;

    /// Removes a previously stored logo; unknown references are ignored
    async fn remove(&self, logo_ref: &str) -> Result<(), DomainError>;
}
