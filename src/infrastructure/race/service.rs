//! Race service for race management and driver registration

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::clock::Clock;
use crate::domain::deletion::{check_deletable, DeletionOutcome, EntityKind};
use crate::domain::driver::{Driver, DriverId, DriverRepository};
use crate::domain::race::{validate_race, Race, RaceDraft, RaceId, RaceRepository};
use crate::domain::registration::{RegistrationDiff, RegistrationRepository};
use crate::domain::validation::{FieldError, ValidationErrors, ValidationKind, ValidationMode};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_deletion;
use crate::infrastructure::driver::resolve_driver_names;

/// Request for creating a new race; drivers are given by "First Last" name
#[derive(Debug, Clone)]
pub struct CreateRaceRequest {
    pub track_name: String,
    pub track_location: String,
    pub race_date: NaiveDate,
    pub registration_closure_date: Option<NaiveDate>,
    pub registered_drivers: Vec<String>,
}

/// Request for updating a race; absent fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateRaceRequest {
    pub track_name: Option<String>,
    pub track_location: Option<String>,
    pub race_date: Option<NaiveDate>,
    pub registration_closure_date: Option<NaiveDate>,
    pub registered_drivers: Option<Vec<String>>,
}

const REGISTERED_DRIVERS: &str = "registered_drivers";
const DRIVERS: &str = "drivers";

/// Race service for managing races and their registered drivers
pub struct RaceService {
    races: Arc<dyn RaceRepository>,
    drivers: Arc<dyn DriverRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RaceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaceService")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

fn race_not_found(id: RaceId) -> DomainError {
    DomainError::not_found(format!("Race '{}' not found", id))
}

impl RaceService {
    pub fn new(
        races: Arc<dyn RaceRepository>,
        drivers: Arc<dyn DriverRepository>,
        registrations: Arc<dyn RegistrationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            races,
            drivers,
            registrations,
            clock,
        }
    }

    /// Field and date rules, evaluated against the clock's current date
    pub fn validate(&self, draft: &RaceDraft, mode: ValidationMode<RaceId>) -> Result<(), DomainError> {
        let today = self.clock.today();
        debug!(race = ?mode.excluded(), %today, "Validating race");
        validate_race(draft, today)
            .into_result()
            .map_err(DomainError::from)
    }

    /// Create a new race, registering the named drivers
    pub async fn create(&self, request: CreateRaceRequest) -> Result<Race, DomainError> {
        info!(track = %request.track_name, date = %request.race_date, "Creating race");

        let mut draft = RaceDraft::new(request.track_name, request.track_location, request.race_date);
        draft.registration_closure_date = request.registration_closure_date;

        let mut errors = validate_race(&draft, self.clock.today());
        let resolved =
            resolve_driver_names(self.drivers.as_ref(), &request.registered_drivers, REGISTERED_DRIVERS)
                .await?;
        errors.extend(resolved.errors);
        errors.into_result()?;

        let race = self.races.create(draft).await?;

        if !resolved.drivers.is_empty() {
            let ids: Vec<DriverId> = resolved.drivers.iter().map(|(_, d)| d.id()).collect();
            if let Err(e) = self.registrations.replace_for_race(race.id(), &ids).await {
                // A driver vanished between resolution and registration
                if let Err(cleanup) = self.races.delete(race.id()).await {
                    warn!(id = %race.id(), error = %cleanup, "Failed to roll back race creation");
                }
                return Err(e);
            }
        }

        Ok(race)
    }

    /// Get a race by ID
    pub async fn get(&self, id: RaceId) -> Result<Race, DomainError> {
        debug!(id = %id, "Getting race");
        self.races.get(id).await?.ok_or_else(|| race_not_found(id))
    }

    /// List all races ordered by date
    pub async fn list(&self) -> Result<Vec<Race>, DomainError> {
        self.races.list().await
    }

    /// Drivers registered for a race
    pub async fn drivers(&self, id: RaceId) -> Result<Vec<Driver>, DomainError> {
        let driver_ids = self.registrations.drivers_for_race(id).await?;
        self.drivers.get_many(&driver_ids).await
    }

    /// "First Last" names of the race's registered drivers
    pub async fn driver_names(&self, id: RaceId) -> Result<Vec<String>, DomainError> {
        Ok(self.drivers(id).await?.iter().map(Driver::full_name).collect())
    }

    /// Update a race; a given driver list replaces the registrations
    pub async fn update(&self, id: RaceId, request: UpdateRaceRequest) -> Result<Race, DomainError> {
        info!(id = %id, "Updating race");

        let mut race = self.get(id).await?;
        let mut draft = race.to_draft();

        if let Some(track_name) = request.track_name {
            draft.track_name = track_name;
        }
        if let Some(track_location) = request.track_location {
            draft.track_location = track_location;
        }
        if let Some(race_date) = request.race_date {
            draft.race_date = race_date;
        }
        if let Some(closure) = request.registration_closure_date {
            draft.registration_closure_date = Some(closure);
        }

        let mut errors = validate_race(&draft, self.clock.today());
        let driver_ids = match &request.registered_drivers {
            Some(names) => {
                let resolved =
                    resolve_driver_names(self.drivers.as_ref(), names, REGISTERED_DRIVERS).await?;
                errors.extend(resolved.errors);
                Some(
                    resolved
                        .drivers
                        .iter()
                        .map(|(_, d)| d.id())
                        .collect::<Vec<_>>(),
                )
            }
            None => None,
        };
        errors.into_result()?;

        let previous = race.clone();
        race.apply(draft);
        let race = self.races.update(race).await?;

        if let Some(ids) = driver_ids {
            if let Err(e) = self.registrations.replace_for_race(id, &ids).await {
                // Registrations are untouched on failure; put the fields back too
                if let Err(restore) = self.races.update(previous).await {
                    warn!(id = %id, error = %restore, "Failed to roll back race update");
                }
                return Err(e);
            }
        }

        Ok(race)
    }

    /// Resolves names for registration, rejecting drivers already on the race
    ///
    /// Every name is checked; lookup failures and already-registered drivers
    /// are reported together, the latter as one `AlreadyRegistered` entry.
    pub async fn resolve_drivers_for_race(
        &self,
        id: RaceId,
        names: &[String],
    ) -> Result<Vec<Driver>, DomainError> {
        self.get(id).await?;

        let resolved = resolve_driver_names(self.drivers.as_ref(), names, DRIVERS).await?;
        let registered = self.registrations.drivers_for_race(id).await?;

        let mut errors = resolved.errors;
        let (conflicts, drivers): (Vec<_>, Vec<_>) = resolved
            .drivers
            .into_iter()
            .partition(|(_, d)| registered.contains(&d.id()));

        if !conflicts.is_empty() {
            let names: Vec<String> = conflicts.into_iter().map(|(name, _)| name).collect();
            errors.push(already_registered(&names));
        }

        errors.into_result()?;
        Ok(drivers.into_iter().map(|(_, d)| d).collect())
    }

    /// Registers the named drivers; existing registrations are kept
    pub async fn add_drivers(&self, id: RaceId, names: &[String]) -> Result<Vec<Driver>, DomainError> {
        info!(id = %id, count = names.len(), "Adding drivers to race");

        let drivers = self.resolve_drivers_for_race(id, names).await?;
        let ids: Vec<DriverId> = drivers.iter().map(Driver::id).collect();
        let added = self.registrations.register(id, &ids).await?;

        Ok(drivers
            .into_iter()
            .filter(|d| added.contains(&d.id()))
            .collect())
    }

    /// Makes the race's registered drivers exactly `driver_ids`
    pub async fn set_drivers(
        &self,
        id: RaceId,
        driver_ids: &[DriverId],
    ) -> Result<RegistrationDiff<DriverId>, DomainError> {
        info!(id = %id, drivers = driver_ids.len(), "Setting race drivers");

        self.get(id).await?;

        let known = self.drivers.get_many(driver_ids).await?;
        let mut errors = ValidationErrors::new();
        for driver_id in driver_ids {
            if !known.iter().any(|d| d.id() == *driver_id) {
                errors.push(FieldError::new(
                    DRIVERS,
                    ValidationKind::NotFound,
                    format!("Driver '{}' not found.", driver_id),
                ));
            }
        }
        errors.into_result()?;

        self.registrations.replace_for_race(id, driver_ids).await
    }

    /// Evaluates the deletion guard without changing anything
    pub async fn can_delete(&self, id: RaceId) -> Result<(), DomainError> {
        self.get(id).await?;
        let refs = self.races.references(id).await?;
        check_deletable(EntityKind::Race, &refs)
    }

    /// Delete a race with no registered drivers
    pub async fn delete(&self, id: RaceId) -> Result<DeletionOutcome, DomainError> {
        info!(id = %id, "Deleting race");

        let outcome = self.races.delete(id).await.inspect_err(|e| {
            if e.is_referential_conflict() {
                warn!(id = %id, "Race deletion refused: {}", e.message());
                record_deletion(EntityKind::Race, false);
            }
        })?;

        record_deletion(EntityKind::Race, true);
        Ok(outcome)
    }
}

fn already_registered(names: &[String]) -> FieldError {
    FieldError::new(
        DRIVERS,
        ValidationKind::AlreadyRegistered,
        format!(
            "Driver(s) {} already registered for the race !",
            names.join(", ")
        ),
    )
}
