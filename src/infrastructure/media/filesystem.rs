//! Logo storage on the local filesystem
//!
//! Logos live under `<root>/logos/` with a generated file name; the team
//! keeps the path relative to the media root as its logo reference.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::team::{LogoStore, LogoUpload};
use crate::domain::DomainError;

const LOGO_DIR: &str = "logos";

#[derive(Debug, Clone)]
pub struct FilesystemLogoStore {
    root: PathBuf,
}

impl FilesystemLogoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, logo_ref: &str) -> Result<PathBuf, DomainError> {
        let relative = Path::new(logo_ref);
        let inside_logos = relative.starts_with(LOGO_DIR)
            && relative
                .components()
                .all(|c| matches!(c, std::path::Component::Normal(_)));

        if !inside_logos {
            return Err(DomainError::invalid_format(format!(
                "Invalid logo reference: '{}'",
                logo_ref
            )));
        }

        Ok(self.root.join(relative))
    }
}

pub(crate) fn logo_ref_for(upload: &LogoUpload) -> String {
    match upload.extension() {
        Some(ext) => format!("{}/{}.{}", LOGO_DIR, Uuid::new_v4(), ext),
        None => format!("{}/{}", LOGO_DIR, Uuid::new_v4()),
    }
}

fn io_error(context: &str) -> impl FnOnce(std::io::Error) -> DomainError + '_ {
    move |e| DomainError::storage(format!("{}: {}", context, e))
}

#[async_trait]
impl LogoStore for FilesystemLogoStore {
    async fn save(&self, upload: &LogoUpload) -> Result<String, DomainError> {
        let logo_ref = logo_ref_for(upload);
        let path = self.root.join(&logo_ref);
        let dir = self.root.join(LOGO_DIR);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(io_error("Failed to create logo directory"))?;

        // Written next to the target and renamed so readers never see a partial file
        let tmp = dir.join(format!(".{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&tmp, &upload.bytes)
            .await
            .map_err(io_error("Failed to write logo"))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(io_error("Failed to store logo"))?;

        info!(logo = %logo_ref, size = upload.size(), "Stored team logo");
        Ok(logo_ref)
    }

    async fn remove(&self, logo_ref: &str) -> Result<(), DomainError> {
        let path = self.resolve(logo_ref)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(logo = %logo_ref, "Removed team logo");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("Failed to remove logo")(e)),
        }
    }
}
