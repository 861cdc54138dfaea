//! Racing Manager
//!
//! Teams, drivers and races with:
//! - Field validation collected per request
//! - Deletion guards over team, driver and race relationships
//! - Name-based lookup of teams and drivers
//! - In-memory and PostgreSQL storage behind one set of repositories

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::state::AppState;
use domain::SystemClock;
use infrastructure::media::FilesystemLogoStore;
use infrastructure::storage::StorageFactory;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage_config = config.storage_config()?;
    info!("Storage backend: {}", storage_config.storage_type());

    let repositories = StorageFactory::create(&storage_config).await?;
    let logos = FilesystemLogoStore::new(&config.media.root);
    info!(root = %config.media.root.display(), "Team logos stored on disk");

    Ok(AppState::new(
        repositories,
        Arc::new(logos),
        Arc::new(SystemClock),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::StorageType;

    #[tokio::test]
    async fn test_default_state_uses_memory_storage() {
        let state = create_app_state().await.unwrap();
        assert_eq!(state.repositories.storage_type(), StorageType::InMemory);
    }
}
