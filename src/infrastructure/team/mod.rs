//! Team infrastructure implementations

mod in_memory_repository;
mod postgres_repository;
mod service;

pub use in_memory_repository::InMemoryTeamRepository;
pub use postgres_repository::PostgresTeamRepository;
pub use service::{CreateTeamRequest, TeamService, UpdateTeamRequest};

pub(crate) use service::resolve_driver_team;
