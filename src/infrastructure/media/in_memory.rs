//! In-memory logo storage

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::filesystem::logo_ref_for;
use crate::domain::team::{LogoStore, LogoUpload};
use crate::domain::DomainError;

/// Keeps logo bytes in a map keyed by logo reference
#[derive(Debug, Default)]
pub struct InMemoryLogoStore {
    logos: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryLogoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, logo_ref: &str) -> Option<Vec<u8>> {
        self.logos.read().ok()?.get(logo_ref).cloned()
    }

    pub fn len(&self) -> usize {
        self.logos.read().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LogoStore for InMemoryLogoStore {
    async fn save(&self, upload: &LogoUpload) -> Result<String, DomainError> {
        let logo_ref = logo_ref_for(upload);
        self.logos
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?
            .insert(logo_ref.clone(), upload.bytes.clone());

        Ok(logo_ref)
    }

    async fn remove(&self, logo_ref: &str) -> Result<(), DomainError> {
        self.logos
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?
            .remove(logo_ref);

        Ok(())
    }
}
