//! Driver infrastructure implementations

mod in_memory_repository;
mod postgres_repository;
mod resolution;
mod service;

pub use in_memory_repository::InMemoryDriverRepository;
pub use postgres_repository::PostgresDriverRepository;
pub use resolution::{resolve_driver_by_name, resolve_driver_names, ResolvedNames};
pub use service::{CreateDriverRequest, DriverService, UpdateDriverRequest};
