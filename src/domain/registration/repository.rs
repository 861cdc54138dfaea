//! Registration repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::diff::RegistrationDiff;
use crate::domain::driver::DriverId;
use crate::domain::race::RaceId;
use crate::domain::DomainError;

/// Repository for the driver/race join
///
/// Every mutation runs atomically and fails with `NotFound` when the race,
/// or any of the drivers/races named, does not exist.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Drivers registered for a race, in id order
    async fn drivers_for_race(&self, race_id: RaceId) -> Result<Vec<DriverId>, DomainError>;

    /// Races a driver is registered for, in id order
    async fn races_for_driver(&self, driver_id: DriverId) -> Result<Vec<RaceId>, DomainError>;

    /// Adds pairs for the given drivers, keeping existing ones; returns the
    /// drivers that were newly registered
    async fn register(
        &self,
        race_id: RaceId,
        driver_ids: &[DriverId],
    ) -> Result<Vec<DriverId>, DomainError>;

    /// Makes the race's driver set exactly `driver_ids`
    async fn replace_for_race(
        &self,
        race_id: RaceId,
        driver_ids: &[DriverId],
    ) -> Result<RegistrationDiff<DriverId>, DomainError>;

    /// Makes the driver's race set exactly `race_ids`
    async fn replace_for_driver(
        &self,
        driver_id: DriverId,
        race_ids: &[RaceId],
    ) -> Result<RegistrationDiff<RaceId>, DomainError>;
}
