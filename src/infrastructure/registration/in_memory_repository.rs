//! In-memory registration repository

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::driver::DriverId;
use crate::domain::race::RaceId;
use crate::domain::registration::{RegistrationDiff, RegistrationRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::{InMemoryDatabase, Tables};

#[derive(Debug, Clone)]
pub struct InMemoryRegistrationRepository {
    db: Arc<InMemoryDatabase>,
}

impl InMemoryRegistrationRepository {
    pub fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }
}

fn require_race(tables: &Tables, race_id: RaceId) -> Result<(), DomainError> {
    if tables.races.contains_key(&race_id) {
        Ok(())
    } else {
        Err(DomainError::not_found(format!("Race '{}' not found", race_id)))
    }
}

fn require_driver(tables: &Tables, driver_id: DriverId) -> Result<(), DomainError> {
    if tables.drivers.contains_key(&driver_id) {
        Ok(())
    } else {
        Err(DomainError::not_found(format!(
            "Driver '{}' not found",
            driver_id
        )))
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryRegistrationRepository {
    async fn drivers_for_race(&self, race_id: RaceId) -> Result<Vec<DriverId>, DomainError> {
        Ok(self.db.read()?.drivers_for_race(race_id))
    }

    async fn races_for_driver(&self, driver_id: DriverId) -> Result<Vec<RaceId>, DomainError> {
        Ok(self.db.read()?.races_for_driver(driver_id))
    }

    async fn register(
        &self,
        race_id: RaceId,
        driver_ids: &[DriverId],
    ) -> Result<Vec<DriverId>, DomainError> {
        let mut tables = self.db.write()?;
        require_race(&tables, race_id)?;
        for driver_id in driver_ids {
            require_driver(&tables, *driver_id)?;
        }

        let current = tables.drivers_for_race(race_id);
        let mut desired = current.clone();
        desired.extend_from_slice(driver_ids);

        let diff = RegistrationDiff::between(&current, &desired);
        for driver_id in &diff.added {
            tables.registrations.insert((race_id, *driver_id));
        }

        Ok(diff.added)
    }

    async fn replace_for_race(
        &self,
        race_id: RaceId,
        driver_ids: &[DriverId],
    ) -> Result<RegistrationDiff<DriverId>, DomainError> {
        let mut tables = self.db.write()?;
        require_race(&tables, race_id)?;
        for driver_id in driver_ids {
            require_driver(&tables, *driver_id)?;
        }

        let diff = RegistrationDiff::between(&tables.drivers_for_race(race_id), driver_ids);
        for driver_id in &diff.removed {
            tables.registrations.remove(&(race_id, *driver_id));
        }
        for driver_id in &diff.added {
            tables.registrations.insert((race_id, *driver_id));
        }

        Ok(diff)
    }

    async fn replace_for_driver(
        &self,
        driver_id: DriverId,
        race_ids: &[RaceId],
    ) -> Result<RegistrationDiff<RaceId>, DomainError> {
        let mut tables = self.db.write()?;
        require_driver(&tables, driver_id)?;
        for race_id in race_ids {
            require_race(&tables, *race_id)?;
        }

        let diff = RegistrationDiff::between(&tables.races_for_driver(driver_id), race_ids);
        for race_id in &diff.removed {
            tables.registrations.remove(&(*race_id, driver_id));
        }
        for race_id in &diff.added {
            tables.registrations.insert((*race_id, driver_id));
        }

        Ok(diff)
    }
}
