//! Race infrastructure implementations

mod in_memory_repository;
mod postgres_repository;
mod service;

pub use in_memory_repository::InMemoryRaceRepository;
pub use postgres_repository::PostgresRaceRepository;
pub use service::{CreateRaceRequest, RaceService, UpdateRaceRequest};
