//! Storage infrastructure - database backends shared by the repositories

mod factory;
mod in_memory;
pub mod migrations;
mod postgres;

pub use factory::{Repositories, StorageConfig, StorageFactory, StorageType};
pub use in_memory::{InMemoryDatabase, Tables};
pub use migrations::{
    revert_latest_migration, run_storage_migrations, Migration, PostgresMigrator,
};
pub use postgres::{connect, PostgresConfig};

pub(crate) use postgres::{column, is_foreign_key_violation, is_unique_violation, storage_error};
