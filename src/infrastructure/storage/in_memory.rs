//! In-memory racing database
//!
//! All tables sit behind one lock so a guarded delete or a registration
//! replace observes and mutates a single consistent snapshot. Data is lost
//! when the process terminates.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::driver::{Driver, DriverId};
use crate::domain::race::{Race, RaceId};
use crate::domain::team::{Team, TeamId};
use crate::domain::{DomainError, References};

#[derive(Debug, Default)]
pub struct Tables {
    pub teams: BTreeMap<TeamId, Team>,
    pub drivers: BTreeMap<DriverId, Driver>,
    pub races: BTreeMap<RaceId, Race>,
    /// Registration pairs keyed race-first
    pub registrations: BTreeSet<(RaceId, DriverId)>,
    last_team_id: i64,
    last_driver_id: i64,
    last_race_id: i64,
}

impl Tables {
    pub fn next_team_id(&mut self) -> TeamId {
        self.last_team_id += 1;
        TeamId::new(self.last_team_id)
    }

    pub fn next_driver_id(&mut self) -> DriverId {
        self.last_driver_id += 1;
        DriverId::new(self.last_driver_id)
    }

    pub fn next_race_id(&mut self) -> RaceId {
        self.last_race_id += 1;
        RaceId::new(self.last_race_id)
    }

    pub fn drivers_for_race(&self, race_id: RaceId) -> Vec<DriverId> {
        self.registrations
            .range((race_id, DriverId::new(i64::MIN))..=(race_id, DriverId::new(i64::MAX)))
            .map(|(_, driver_id)| *driver_id)
            .collect()
    }

    pub fn races_for_driver(&self, driver_id: DriverId) -> Vec<RaceId> {
        self.registrations
            .iter()
            .filter(|(_, d)| *d == driver_id)
            .map(|(race_id, _)| *race_id)
            .collect()
    }

    pub fn team_drivers(&self, team_id: TeamId) -> Vec<DriverId> {
        self.drivers
            .values()
            .filter(|d| d.team_id() == Some(team_id))
            .map(|d| d.id())
            .collect()
    }

    pub fn team_references(&self, team_id: TeamId) -> References {
        let drivers = self.team_drivers(team_id);
        let registrations = drivers
            .iter()
            .map(|d| self.races_for_driver(*d).len())
            .sum();

        References {
            owned_drivers: drivers.len(),
            registrations,
        }
    }
}

/// Shared handle used by every in-memory repository
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    tables: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, DomainError> {
        self.tables
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, DomainError> {
        self.tables
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }
}
