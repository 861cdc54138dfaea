//! Driver repository trait

use async_trait::async_trait;
use chrono::NaiveDate;

#[cfg(test)]
use mockall::automock;

use super::entity::{Driver, DriverDraft, DriverId};
use crate::domain::deletion::{DeletionOutcome, References};
use crate::domain::team::TeamId;
use crate::domain::DomainError;

/// Repository for managing drivers
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn get(&self, id: DriverId) -> Result<Option<Driver>, DomainError>;

    /// Drivers with the given ids that exist, in id order
    async fn get_many(&self, ids: &[DriverId]) -> Result<Vec<Driver>, DomainError>;

    /// All drivers ordered by id
    async fn list(&self) -> Result<Vec<Driver>, DomainError>;

    async fn list_by_team(&self, team_id: TeamId) -> Result<Vec<Driver>, DomainError>;

    /// Every driver whose first and last name match exactly, in id order
    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Vec<Driver>, DomainError>;

    /// Whether another driver has the same (first name, last name, dob)
    async fn identity_taken(
        &self,
        first_name: &str,
        last_name: &str,
        dob: NaiveDate,
        exclude: Option<DriverId>,
    ) -> Result<bool, DomainError>;

    /// Persist a new driver; a clashing identity fails with `DuplicateEntity`
    async fn create(&self, draft: DriverDraft) -> Result<Driver, DomainError>;

    async fn update(&self, driver: Driver) -> Result<Driver, DomainError>;

    /// Number of races the driver is registered for
    async fn references(&self, id: DriverId) -> Result<References, DomainError>;

    /// Guarded delete: refuses while the driver holds any registration
    async fn delete(&self, id: DriverId) -> Result<DeletionOutcome, DomainError>;
}
