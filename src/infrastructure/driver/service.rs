//! Driver service for driver management

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::resolution::resolve_driver_by_name;
use crate::domain::deletion::{check_deletable, DeletionOutcome, EntityKind};
use crate::domain::driver::{
    duplicate_driver_error, validate_driver, Driver, DriverDraft, DriverId, DriverRepository,
};
use crate::domain::race::{Race, RaceId, RaceRepository};
use crate::domain::registration::{RegistrationDiff, RegistrationRepository};
use crate::domain::team::{Team, TeamRepository};
use crate::domain::validation::{FieldError, ValidationErrors, ValidationKind, ValidationMode};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_deletion;
use crate::infrastructure::team::resolve_driver_team;

/// Request for creating a new driver; the team is given by name
#[derive(Debug, Clone)]
pub struct CreateDriverRequest {
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub team: Option<String>,
}

/// Request for updating a driver; absent fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateDriverRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub team: Option<String>,
}

/// Driver service for managing drivers and their race registrations
pub struct DriverService {
    drivers: Arc<dyn DriverRepository>,
    teams: Arc<dyn TeamRepository>,
    races: Arc<dyn RaceRepository>,
    registrations: Arc<dyn RegistrationRepository>,
}

impl std::fmt::Debug for DriverService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverService").finish_non_exhaustive()
    }
}

fn driver_not_found(id: DriverId) -> DomainError {
    DomainError::not_found(format!("Driver '{}' not found", id))
}

impl DriverService {
    pub fn new(
        drivers: Arc<dyn DriverRepository>,
        teams: Arc<dyn TeamRepository>,
        races: Arc<dyn RaceRepository>,
        registrations: Arc<dyn RegistrationRepository>,
    ) -> Self {
        Self {
            drivers,
            teams,
            races,
            registrations,
        }
    }

    /// Field rules plus the (first name, last name, dob) uniqueness check
    pub async fn validate(
        &self,
        draft: &DriverDraft,
        mode: ValidationMode<DriverId>,
    ) -> Result<(), DomainError> {
        self.collect_errors(draft, mode)
            .await?
            .into_result()
            .map_err(DomainError::from)
    }

    async fn collect_errors(
        &self,
        draft: &DriverDraft,
        mode: ValidationMode<DriverId>,
    ) -> Result<ValidationErrors, DomainError> {
        let mut errors = validate_driver(draft);

        if self
            .drivers
            .identity_taken(
                &draft.first_name,
                &draft.last_name,
                draft.dob,
                mode.excluded().copied(),
            )
            .await?
        {
            errors.push(duplicate_driver_error());
        }

        Ok(errors)
    }

    /// Create a new driver
    pub async fn create(&self, request: CreateDriverRequest) -> Result<Driver, DomainError> {
        info!(
            first_name = %request.first_name,
            last_name = %request.last_name,
            "Creating driver"
        );

        let mut draft = DriverDraft::new(request.first_name, request.last_name, request.dob);
        let mut errors = self.collect_errors(&draft, ValidationMode::Create).await?;

        match resolve_driver_team(self.teams.as_ref(), request.team.as_deref()).await? {
            Ok(team_id) => draft.team_id = team_id,
            Err(e) => errors.push(e),
        }

        errors.into_result()?;
        self.drivers.create(draft).await
    }

    /// Get a driver by ID
    pub async fn get(&self, id: DriverId) -> Result<Driver, DomainError> {
        debug!(id = %id, "Getting driver");
        self.drivers.get(id).await?.ok_or_else(|| driver_not_found(id))
    }

    /// List all drivers
    pub async fn list(&self) -> Result<Vec<Driver>, DomainError> {
        self.drivers.list().await
    }

    /// The team a driver belongs to, if any
    pub async fn team(&self, driver: &Driver) -> Result<Option<Team>, DomainError> {
        match driver.team_id() {
            Some(team_id) => self.teams.get(team_id).await,
            None => Ok(None),
        }
    }

    /// Races the driver is registered for
    pub async fn races(&self, id: DriverId) -> Result<Vec<Race>, DomainError> {
        let race_ids = self.registrations.races_for_driver(id).await?;
        self.races.get_many(&race_ids).await
    }

    /// "Track on date" labels of the driver's races
    pub async fn race_labels(&self, id: DriverId) -> Result<Vec<String>, DomainError> {
        Ok(self.races(id).await?.iter().map(Race::label).collect())
    }

    /// Update a driver
    pub async fn update(
        &self,
        id: DriverId,
        request: UpdateDriverRequest,
    ) -> Result<Driver, DomainError> {
        info!(id = %id, "Updating driver");

        let mut driver = self.get(id).await?;
        let mut draft = driver.to_draft();

        if let Some(first_name) = request.first_name {
            draft.first_name = first_name;
        }
        if let Some(last_name) = request.last_name {
            draft.last_name = last_name;
        }
        if let Some(dob) = request.dob {
            draft.dob = dob;
        }

        let mut errors = self.collect_errors(&draft, ValidationMode::Update(id)).await?;

        if request.team.is_some() {
            match resolve_driver_team(self.teams.as_ref(), request.team.as_deref()).await? {
                Ok(team_id) => draft.team_id = team_id,
                Err(e) => errors.push(e),
            }
        }

        errors.into_result()?;

        driver.apply(draft);
        self.drivers.update(driver).await
    }

    /// Makes the driver's registrations exactly `race_ids`
    pub async fn set_races(
        &self,
        id: DriverId,
        race_ids: &[RaceId],
    ) -> Result<RegistrationDiff<RaceId>, DomainError> {
        info!(id = %id, races = race_ids.len(), "Setting driver races");

        self.get(id).await?;

        let known = self.races.get_many(race_ids).await?;
        let mut errors = ValidationErrors::new();
        for race_id in race_ids {
            if !known.iter().any(|r| r.id() == *race_id) {
                errors.push(FieldError::new(
                    "races",
                    ValidationKind::NotFound,
                    format!("Race '{}' not found.", race_id),
                ));
            }
        }
        errors.into_result()?;

        let diff = self.registrations.replace_for_driver(id, race_ids).await?;
        debug!(
            id = %id,
            added = diff.added.len(),
            removed = diff.removed.len(),
            "Driver races replaced"
        );
        Ok(diff)
    }

    /// Evaluates the deletion guard without changing anything
    pub async fn can_delete(&self, id: DriverId) -> Result<(), DomainError> {
        self.get(id).await?;
        let refs = self.drivers.references(id).await?;
        check_deletable(EntityKind::Driver, &refs)
    }

    /// Delete a driver that holds no registration
    pub async fn delete(&self, id: DriverId) -> Result<DeletionOutcome, DomainError> {
        info!(id = %id, "Deleting driver");

        let outcome = self.drivers.delete(id).await.inspect_err(|e| {
            if e.is_referential_conflict() {
                warn!(id = %id, "Driver deletion refused: {}", e.message());
                record_deletion(EntityKind::Driver, false);
            }
        })?;

        record_deletion(EntityKind::Driver, true);
        Ok(outcome)
    }

    /// Finds the single driver with the given "First Last" name
    pub async fn resolve_by_name(&self, full_name: &str) -> Result<Driver, DomainError> {
        resolve_driver_by_name(self.drivers.as_ref(), full_name).await
    }
}
