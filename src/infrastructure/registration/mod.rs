//! Registration infrastructure implementations

mod in_memory_repository;
mod postgres_repository;

pub use in_memory_repository::InMemoryRegistrationRepository;
pub use postgres_repository::PostgresRegistrationRepository;
