//! Storage factory for runtime backend selection

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::domain::driver::DriverRepository;
use crate::domain::race::RaceRepository;
use crate::domain::registration::RegistrationRepository;
use crate::domain::team::TeamRepository;
use crate::domain::DomainError;
use crate::infrastructure::driver::{InMemoryDriverRepository, PostgresDriverRepository};
use crate::infrastructure::race::{InMemoryRaceRepository, PostgresRaceRepository};
use crate::infrastructure::registration::{
    InMemoryRegistrationRepository, PostgresRegistrationRepository,
};
use crate::infrastructure::team::{InMemoryTeamRepository, PostgresTeamRepository};

use super::in_memory::InMemoryDatabase;
use super::migrations::run_storage_migrations;
use super::postgres::{connect, storage_error, PostgresConfig};

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InMemory => write!(f, "memory"),
            Self::Postgres => write!(f, "postgres"),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-memory storage configuration
    InMemory,
    /// PostgreSQL storage configuration
    Postgres(PostgresConfig),
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn postgres(config: PostgresConfig) -> Self {
        Self::Postgres(config)
    }

    pub fn postgres_url(url: impl Into<String>) -> Self {
        Self::Postgres(PostgresConfig::new(url))
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// One repository per record kind, all backed by the same store
#[derive(Clone)]
pub struct Repositories {
    pub teams: Arc<dyn TeamRepository>,
    pub drivers: Arc<dyn DriverRepository>,
    pub races: Arc<dyn RaceRepository>,
    pub registrations: Arc<dyn RegistrationRepository>,
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    InMemory(Arc<InMemoryDatabase>),
    Postgres(PgPool),
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories")
            .field("storage_type", &self.storage_type())
            .finish_non_exhaustive()
    }
}

impl Repositories {
    /// Repositories sharing a fresh in-memory database
    pub fn in_memory() -> Self {
        Self::with_database(Arc::new(InMemoryDatabase::new()))
    }

    pub fn with_database(db: Arc<InMemoryDatabase>) -> Self {
        Self {
            teams: Arc::new(InMemoryTeamRepository::new(db.clone())),
            drivers: Arc::new(InMemoryDriverRepository::new(db.clone())),
            races: Arc::new(InMemoryRaceRepository::new(db.clone())),
            registrations: Arc::new(InMemoryRegistrationRepository::new(db.clone())),
            backend: Backend::InMemory(db),
        }
    }

    /// Repositories sharing one PostgreSQL pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            teams: Arc::new(PostgresTeamRepository::new(pool.clone())),
            drivers: Arc::new(PostgresDriverRepository::new(pool.clone())),
            races: Arc::new(PostgresRaceRepository::new(pool.clone())),
            registrations: Arc::new(PostgresRegistrationRepository::new(pool.clone())),
            backend: Backend::Postgres(pool),
        }
    }

    pub fn storage_type(&self) -> StorageType {
        match self.backend {
            Backend::InMemory(_) => StorageType::InMemory,
            Backend::Postgres(_) => StorageType::Postgres,
        }
    }

    /// Checks that the backing store answers
    pub async fn ping(&self) -> Result<(), DomainError> {
        match &self.backend {
            Backend::InMemory(db) => db.read().map(|_| ()),
            Backend::Postgres(pool) => sqlx::query("SELECT 1")
                .execute(pool)
                .await
                .map(|_| ())
                .map_err(storage_error("Database ping failed")),
        }
    }
}

/// Factory for creating the repositories of the configured backend
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Connects to the configured store; PostgreSQL schemas are migrated first
    pub async fn create(config: &StorageConfig) -> Result<Repositories, DomainError> {
        match config {
            StorageConfig::InMemory => {
                info!("Using in-memory storage");
                Ok(Repositories::in_memory())
            }
            StorageConfig::Postgres(pg_config) => {
                info!(
                    max_connections = pg_config.max_connections,
                    "Using PostgreSQL storage"
                );
                let pool = connect(pg_config).await?;
                run_storage_migrations(&pool).await?;
                Ok(Repositories::postgres(pool))
            }
        }
    }
}
