//! Team service for team management

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::deletion::{check_deletable, DeletionOutcome, EntityKind};
use crate::domain::driver::{Driver, DriverRepository};
use crate::domain::team::{
    duplicate_name_error, validate_logo, validate_team, LogoStore, LogoUpload, Team, TeamDraft,
    TeamId, TeamRepository,
};
use crate::domain::validation::{FieldError, ValidationKind, ValidationMode};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_deletion;

/// Request for creating a new team
#[derive(Debug, Clone)]
pub struct CreateTeamRequest {
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub logo: Option<LogoUpload>,
}

/// Request for updating a team; absent fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub logo: Option<LogoUpload>,
}

/// Team service for managing teams
pub struct TeamService {
    teams: Arc<dyn TeamRepository>,
    drivers: Arc<dyn DriverRepository>,
    logos: Arc<dyn LogoStore>,
}

impl std::fmt::Debug for TeamService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamService").finish_non_exhaustive()
    }
}

fn team_not_found(id: TeamId) -> DomainError {
    DomainError::not_found(format!("Team '{}' not found", id))
}

impl TeamService {
    pub fn new(
        teams: Arc<dyn TeamRepository>,
        drivers: Arc<dyn DriverRepository>,
        logos: Arc<dyn LogoStore>,
    ) -> Self {
        Self {
            teams,
            drivers,
            logos,
        }
    }

    /// Runs every write-time rule for a team
    ///
    /// A logo is required on create; on update `None` keeps the stored one.
    pub async fn validate(
        &self,
        draft: &TeamDraft,
        logo: Option<&LogoUpload>,
        mode: ValidationMode<TeamId>,
    ) -> Result<(), DomainError> {
        let mut errors = validate_team(draft);

        match logo {
            Some(upload) => errors.extend(validate_logo(upload)),
            None if mode.is_create() => errors.push(FieldError::new(
                "logo",
                ValidationKind::Required,
                "No file was submitted.",
            )),
            None => {}
        }

        if !draft.name.trim().is_empty()
            && self
                .teams
                .name_taken(&draft.name, mode.excluded().copied())
                .await?
        {
            errors.push(duplicate_name_error());
        }

        errors.into_result().map_err(DomainError::from)
    }

    /// Create a new team
    pub async fn create(&self, request: CreateTeamRequest) -> Result<Team, DomainError> {
        info!(name = %request.name, "Creating team");

        let mut draft = TeamDraft::new(request.name.trim(), request.location.trim());
        draft.description = request.description;

        self.validate(&draft, request.logo.as_ref(), ValidationMode::Create)
            .await?;

        let upload = request
            .logo
            .ok_or_else(|| DomainError::internal("Validated team without a logo"))?;
        let logo_ref = self.logos.save(&upload).await?;

        match self.teams.create(draft, logo_ref.clone()).await {
            Ok(team) => Ok(team),
            Err(e) => {
                self.discard_logo(&logo_ref).await;
                Err(e)
            }
        }
    }

    /// Get a team by ID
    pub async fn get(&self, id: TeamId) -> Result<Team, DomainError> {
        debug!(id = %id, "Getting team");
        self.teams.get(id).await?.ok_or_else(|| team_not_found(id))
    }

    /// List all teams ordered by name
    pub async fn list(&self) -> Result<Vec<Team>, DomainError> {
        self.teams.list().await
    }

    /// Drivers owned by a team
    pub async fn drivers(&self, id: TeamId) -> Result<Vec<Driver>, DomainError> {
        self.drivers.list_by_team(id).await
    }

    /// Update a team
    pub async fn update(&self, id: TeamId, request: UpdateTeamRequest) -> Result<Team, DomainError> {
        info!(id = %id, "Updating team");

        let mut team = self.get(id).await?;
        let mut draft = team.to_draft();

        if let Some(name) = request.name {
            draft.name = name.trim().to_string();
        }
        if let Some(location) = request.location {
            draft.location = location.trim().to_string();
        }
        if let Some(description) = request.description {
            draft.description = Some(description);
        }

        self.validate(&draft, request.logo.as_ref(), ValidationMode::Update(id))
            .await?;

        team.apply(draft);

        let new_logo = match &request.logo {
            Some(upload) => Some(self.logos.save(upload).await?),
            None => None,
        };
        let old_logo = new_logo.as_ref().map(|logo| team.replace_logo(logo.clone()));

        match self.teams.update(team).await {
            Ok(team) => {
                if let Some(old) = old_logo {
                    self.discard_logo(&old).await;
                }
                Ok(team)
            }
            Err(e) => {
                if let Some(new) = new_logo {
                    self.discard_logo(&new).await;
                }
                Err(e)
            }
        }
    }

    /// Evaluates the deletion guard without changing anything
    pub async fn can_delete(&self, id: TeamId) -> Result<(), DomainError> {
        self.get(id).await?;
        let refs = self.teams.references(id).await?;
        check_deletable(EntityKind::Team, &refs)
    }

    /// Delete a team and the drivers it owns
    pub async fn delete(&self, id: TeamId) -> Result<DeletionOutcome, DomainError> {
        info!(id = %id, "Deleting team");

        let team = self.get(id).await?;

        let outcome = match self.teams.delete(id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_referential_conflict() {
                    warn!(id = %id, "Team deletion refused: {}", e.message());
                    record_deletion(EntityKind::Team, false);
                }
                return Err(e);
            }
        };

        self.discard_logo(team.logo()).await;
        record_deletion(EntityKind::Team, true);

        info!(
            id = %id,
            cascaded_drivers = outcome.cascaded_drivers,
            "Team deleted"
        );
        Ok(outcome)
    }

    /// Finds a team by its exact name
    pub async fn resolve_by_name(&self, name: &str) -> Result<Team, DomainError> {
        self.teams
            .find_by_name(name.trim())
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", name)))
    }

    /// Logo files are not transactional; a leftover file is only logged
    async fn discard_logo(&self, logo_ref: &str) {
        if let Err(e) = self.logos.remove(logo_ref).await {
            warn!(logo = %logo_ref, error = %e, "Failed to remove team logo");
        }
    }
}

/// Resolves the team a driver write refers to, as a field error on `team`
pub(crate) async fn resolve_driver_team(
    teams: &dyn TeamRepository,
    name: Option<&str>,
) -> Result<Result<Option<TeamId>, FieldError>, DomainError> {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(Ok(None));
    };

    Ok(match teams.find_by_name(name).await? {
        Some(team) => Ok(Some(team.id())),
        None => Err(FieldError::new(
            "team",
            ValidationKind::NotFound,
            "Team with this name does not exist.",
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::driver::DriverDraft;
    use crate::domain::race::RaceId;
    use crate::domain::team::{MockLogoStore, MockTeamRepository};
    use crate::infrastructure::driver::InMemoryDriverRepository;
    use crate::infrastructure::media::InMemoryLogoStore;
    use crate::infrastructure::storage::InMemoryDatabase;
    use crate::infrastructure::team::InMemoryTeamRepository;
    use chrono::NaiveDate;

    struct Fixture {
        db: Arc<InMemoryDatabase>,
        logos: Arc<InMemoryLogoStore>,
        service: TeamService,
    }

    fn create_service() -> Fixture {
        let db = Arc::new(InMemoryDatabase::new());
        let logos = Arc::new(InMemoryLogoStore::new());
        let service = TeamService::new(
            Arc::new(InMemoryTeamRepository::new(db.clone())),
            Arc::new(InMemoryDriverRepository::new(db.clone())),
            logos.clone(),
        );

        Fixture { db, logos, service }
    }

    fn logo(size: usize) -> Option<LogoUpload> {
        Some(LogoUpload::new("logo.png", vec![0; size]))
    }

    fn request(name: &str) -> CreateTeamRequest {
        CreateTeamRequest {
            name: name.to_string(),
            location: "Maranello".to_string(),
            description: None,
            logo: logo(128),
        }
    }

    fn add_driver(db: &InMemoryDatabase, team_id: TeamId) -> crate::domain::DriverId {
        let mut tables = db.write().unwrap();
        let id = tables.next_driver_id();
        let dob = NaiveDate::from_ymd_opt(1997, 10, 16).unwrap();
        let draft = DriverDraft::new("Charles", format!("Leclerc{}", id), dob).with_team(team_id);
        tables.drivers.insert(id, Driver::from_draft(id, draft));
        id
    }

    #[tokio::test]
    async fn test_create_team() {
        let f = create_service();

        let team = f.service.create(request("Ferrari")).await.unwrap();

        assert_eq!(team.name(), "Ferrari");
        assert!(f.logos.get(team.logo()).is_some());
    }

    #[tokio::test]
    async fn test_create_requires_logo() {
        let f = create_service();
        let mut req = request("Ferrari");
        req.logo = None;

        let err = f.service.create(req).await.unwrap_err();
        assert!(err.validation_errors().unwrap().has("logo", ValidationKind::Required));
    }

    #[tokio::test]
    async fn test_logo_size_boundary() {
        let f = create_service();

        let mut req = request("Exact");
        req.logo = logo(50 * 1024);
        assert!(f.service.create(req).await.is_ok());

        let mut req = request("Over");
        req.logo = logo(50 * 1024 + 1);
        let err = f.service.create(req).await.unwrap_err();
        assert!(err
            .validation_errors()
            .unwrap()
            .has("logo", ValidationKind::SizeExceeded));
        assert_eq!(f.logos.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_a_field_error() {
        let f = create_service();
        f.service.create(request("Ferrari")).await.unwrap();

        let err = f.service.create(request("Ferrari")).await.unwrap_err();
        assert!(err
            .validation_errors()
            .unwrap()
            .has("name", ValidationKind::DuplicateEntity));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_logo() {
        let f = create_service();
        let team = f.service.create(request("Ferrari")).await.unwrap();

        let updated = f
            .service
            .update(
                team.id(),
                UpdateTeamRequest {
                    description: Some("Scuderia".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name(), "Ferrari");
        assert_eq!(updated.description(), Some("Scuderia"));
        assert_eq!(updated.logo(), team.logo());
    }

    #[tokio::test]
    async fn test_update_replaces_logo() {
        let f = create_service();
        let team = f.service.create(request("Ferrari")).await.unwrap();

        let updated = f
            .service
            .update(
                team.id(),
                UpdateTeamRequest {
                    logo: Some(LogoUpload::new("new.jpg", vec![1])),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_ne!(updated.logo(), team.logo());
        assert!(f.logos.get(team.logo()).is_none());
        assert_eq!(f.logos.get(updated.logo()), Some(vec![1]));
    }

    #[tokio::test]
    async fn test_update_may_keep_own_name() {
        let f = create_service();
        let team = f.service.create(request("Ferrari")).await.unwrap();

        let result = f
            .service
            .update(
                team.id(),
                UpdateTeamRequest {
                    name: Some("Ferrari".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_can_delete_is_repeatable() {
        let f = create_service();
        let team = f.service.create(request("Ferrari")).await.unwrap();

        for _ in 0..3 {
            f.service.can_delete(team.id()).await.unwrap();
        }
        assert!(f.service.get(team.id()).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_cascades_drivers_and_logo() {
        let f = create_service();
        let team = f.service.create(request("Ferrari")).await.unwrap();
        add_driver(&f.db, team.id());

        f.service.can_delete(team.id()).await.unwrap();
        let outcome = f.service.delete(team.id()).await.unwrap();

        assert_eq!(outcome.cascaded_drivers, 1);
        assert!(f.db.read().unwrap().drivers.is_empty());
        assert!(f.logos.is_empty());
    }

    #[tokio::test]
    async fn test_delete_blocked_by_registered_driver() {
        let f = create_service();
        let team = f.service.create(request("Ferrari")).await.unwrap();
        let driver_id = add_driver(&f.db, team.id());
        f.db.write()
            .unwrap()
            .registrations
            .insert((RaceId::new(1), driver_id));

        assert!(f.service.can_delete(team.id()).await.unwrap_err().is_referential_conflict());
        assert!(f.service.delete(team.id()).await.unwrap_err().is_referential_conflict());
        assert_eq!(f.logos.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_by_name() {
        let f = create_service();
        let team = f.service.create(request("Ferrari")).await.unwrap();

        assert_eq!(f.service.resolve_by_name("Ferrari").await.unwrap(), team);
        assert!(f.service.resolve_by_name("ferrari").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_failed_insert_discards_saved_logo() {
        let mut teams = MockTeamRepository::new();
        teams.expect_name_taken().returning(|_, _| Ok(false));
        teams
            .expect_create()
            .returning(|_, _| Err(DomainError::duplicate("Team with name 'Ferrari' already exists")));

        let mut logos = MockLogoStore::new();
        logos
            .expect_save()
            .times(1)
            .returning(|_| Ok("logos/x.png".to_string()));
        logos
            .expect_remove()
            .withf(|logo_ref| logo_ref == "logos/x.png")
            .times(1)
            .returning(|_| Ok(()));

        let db = Arc::new(InMemoryDatabase::new());
        let service = TeamService::new(
            Arc::new(teams),
            Arc::new(InMemoryDriverRepository::new(db)),
            Arc::new(logos),
        );

        let err = service.create(request("Ferrari")).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateEntity { .. }));
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let mut teams = MockTeamRepository::new();
        teams
            .expect_get()
            .returning(|_| Err(DomainError::storage("connection reset")));

        let db = Arc::new(InMemoryDatabase::new());
        let service = TeamService::new(
            Arc::new(teams),
            Arc::new(InMemoryDriverRepository::new(db)),
            Arc::new(InMemoryLogoStore::new()),
        );

        let err = service.delete(TeamId::new(1)).await.unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_resolve_driver_team() {
        let f = create_service();
        let team = f.service.create(request("Ferrari")).await.unwrap();
        let repo = InMemoryTeamRepository::new(f.db.clone());

        assert_eq!(
            resolve_driver_team(&repo, Some("Ferrari")).await.unwrap(),
            Ok(Some(team.id()))
        );
        assert_eq!(resolve_driver_team(&repo, None).await.unwrap(), Ok(None));

        let err = resolve_driver_team(&repo, Some("Minardi"))
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(err.field, "team");
        assert_eq!(err.kind, ValidationKind::NotFound);
    }

    #[tokio::test]
    async fn test_team_names_are_stored_trimmed() {
        let f = create_service();
        let team = f.service.create(request(" Ferrari ")).await.unwrap();
        assert_eq!(team.name(), "Ferrari");

        let repo = InMemoryTeamRepository::new(f.db.clone());
        assert_eq!(
            resolve_driver_team(&repo, Some(" Ferrari")).await.unwrap(),
            Ok(Some(team.id()))
        );

        let renamed = f
            .service
            .update(
                team.id(),
                UpdateTeamRequest {
                    name: Some("Scuderia Ferrari  ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name(), "Scuderia Ferrari");
    }
}
