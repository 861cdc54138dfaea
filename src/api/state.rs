//! Application state for shared services

use std::sync::Arc;

use crate::domain::{Clock, LogoStore};
use crate::infrastructure::driver::DriverService;
use crate::infrastructure::race::RaceService;
use crate::infrastructure::storage::Repositories;
use crate::infrastructure::team::TeamService;

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub team_service: Arc<TeamService>,
    pub driver_service: Arc<DriverService>,
    pub race_service: Arc<RaceService>,
    pub repositories: Repositories,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("repositories", &self.repositories)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wires every service onto one set of repositories
    pub fn new(repositories: Repositories, logos: Arc<dyn LogoStore>, clock: Arc<dyn Clock>) -> Self {
        let team_service = TeamService::new(
            repositories.teams.clone(),
            repositories.drivers.clone(),
            logos,
        );
        let driver_service = DriverService::new(
            repositories.drivers.clone(),
            repositories.teams.clone(),
            repositories.races.clone(),
            repositories.registrations.clone(),
        );
        let race_service = RaceService::new(
            repositories.races.clone(),
            repositories.drivers.clone(),
            repositories.registrations.clone(),
            clock,
        );

        Self {
            team_service: Arc::new(team_service),
            driver_service: Arc::new(driver_service),
            race_service: Arc::new(race_service),
            repositories,
        }
    }
}
