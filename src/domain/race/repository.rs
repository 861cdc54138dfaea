//! Race repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{Race, RaceDraft, RaceId};
use crate::domain::deletion::{DeletionOutcome, References};
use crate::domain::DomainError;

/// Repository for managing races
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RaceRepository: Send + Sync {
    async fn get(&self, id: RaceId) -> Result<Option<Race>, DomainError>;

    /// Races with the given ids that exist, in id order
    async fn get_many(&self, ids: &[RaceId]) -> Result<Vec<Race>, DomainError>;

    /// All races ordered by race date
    async fn list(&self) -> Result<Vec<Race>, DomainError>;

    async fn create(&self, draft: RaceDraft) -> Result<Race, DomainError>;

    async fn update(&self, race: Race) -> Result<Race, DomainError>;

    /// Number of drivers registered for the race
    async fn references(&self, id: RaceId) -> Result<References, DomainError>;

    /// Guarded delete: refuses while any driver is registered
    async fn delete(&self, id: RaceId) -> Result<DeletionOutcome, DomainError>;
}
