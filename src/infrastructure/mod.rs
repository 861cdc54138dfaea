//! Infrastructure layer: stores, services and runtime plumbing

pub mod driver;
pub mod logging;
pub mod media;
pub mod observability;
pub mod race;
pub mod registration;
pub mod storage;
pub mod team;
