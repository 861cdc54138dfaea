//! Team repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{Team, TeamDraft, TeamId};
use crate::domain::deletion::{DeletionOutcome, References};
use crate::domain::DomainError;

/// Repository for managing teams
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Get a team by ID
    async fn get(&self, id: TeamId) -> Result<Option<Team>, DomainError>;

    /// Get a team by its exact display name
    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, DomainError>;

    /// Whether another team already uses `name`
    async fn name_taken(&self, name: &str, exclude: Option<TeamId>) -> Result<bool, DomainError>;

    /// List all teams ordered by name
    async fn list(&self) -> Result<Vec<Team>, DomainError>;

    /// Persist a new team; a clashing name fails with `DuplicateEntity`
    async fn create(&self, draft: TeamDraft, logo: String) -> Result<Team, DomainError>;

    /// Update an existing team
    async fn update(&self, team: Team) -> Result<Team, DomainError>;

    /// Owned drivers and the registrations they hold
    async fn references(&self, id: TeamId) -> Result<References, DomainError>;

    /// Guarded delete: refuses while any owned driver is registered,
    /// otherwise removes the team and its drivers atomically
    async fn delete(&self, id: TeamId) -> Result<DeletionOutcome, DomainError>;
}
