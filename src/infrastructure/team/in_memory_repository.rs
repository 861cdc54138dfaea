//! In-memory team repository

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::deletion::{check_deletable, DeletionOutcome, EntityKind, References};
use crate::domain::team::{Team, TeamDraft, TeamId, TeamRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::{InMemoryDatabase, Tables};

#[derive(Debug, Clone)]
pub struct InMemoryTeamRepository {
    db: Arc<InMemoryDatabase>,
}

impl InMemoryTeamRepository {
    pub fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }
}

fn name_clash(tables: &Tables, name: &str, exclude: Option<TeamId>) -> bool {
    tables
        .teams
        .values()
        .any(|t| t.name() == name && Some(t.id()) != exclude)
}

fn duplicate_name(name: &str) -> DomainError {
    DomainError::duplicate(format!("Team with name '{}' already exists", name))
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn get(&self, id: TeamId) -> Result<Option<Team>, DomainError> {
        Ok(self.db.read()?.teams.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, DomainError> {
        let tables = self.db.read()?;
        Ok(tables.teams.values().find(|t| t.name() == name).cloned())
    }

    async fn name_taken(&self, name: &str, exclude: Option<TeamId>) -> Result<bool, DomainError> {
        let tables = self.db.read()?;
        Ok(name_clash(&tables, name, exclude))
    }

    async fn list(&self) -> Result<Vec<Team>, DomainError> {
        let mut teams: Vec<Team> = self.db.read()?.teams.values().cloned().collect();
        teams.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(teams)
    }

    async fn create(&self, draft: TeamDraft, logo: String) -> Result<Team, DomainError> {
        let mut tables = self.db.write()?;

        if name_clash(&tables, &draft.name, None) {
            return Err(duplicate_name(&draft.name));
        }

        let id = tables.next_team_id();
        let team = Team::from_draft(id, draft, logo);
        tables.teams.insert(id, team.clone());

        Ok(team)
    }

    async fn update(&self, team: Team) -> Result<Team, DomainError> {
        let mut tables = self.db.write()?;

        if !tables.teams.contains_key(&team.id()) {
            return Err(DomainError::not_found(format!(
                "Team '{}' not found",
                team.id()
            )));
        }

        if name_clash(&tables, team.name(), Some(team.id())) {
            return Err(duplicate_name(team.name()));
        }

        tables.teams.insert(team.id(), team.clone());
        Ok(team)
    }

    async fn references(&self, id: TeamId) -> Result<References, DomainError> {
        Ok(self.db.read()?.team_references(id))
    }

    async fn delete(&self, id: TeamId) -> Result<DeletionOutcome, DomainError> {
        let mut tables = self.db.write()?;

        if !tables.teams.contains_key(&id) {
            return Err(DomainError::not_found(format!("Team '{}' not found", id)));
        }

        check_deletable(EntityKind::Team, &tables.team_references(id))?;

        let drivers = tables.team_drivers(id);
        for driver_id in &drivers {
            tables.drivers.remove(driver_id);
        }
        tables.teams.remove(&id);

        Ok(DeletionOutcome::new(EntityKind::Team, id.value()).with_cascaded_drivers(drivers.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::driver::{Driver, DriverDraft};
    use crate::domain::race::RaceId;
    use chrono::NaiveDate;

    fn create_repo() -> (Arc<InMemoryDatabase>, InMemoryTeamRepository) {
        let db = Arc::new(InMemoryDatabase::new());
        (db.clone(), InMemoryTeamRepository::new(db))
    }

    fn add_driver(db: &InMemoryDatabase, team_id: TeamId, first: &str) -> crate::domain::DriverId {
        let mut tables = db.write().unwrap();
        let id = tables.next_driver_id();
        let dob = NaiveDate::from_ymd_opt(1990, 3, 3).unwrap();
        let draft = DriverDraft::new(first, "Driver", dob).with_team(team_id);
        tables.drivers.insert(id, Driver::from_draft(id, draft));
        id
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_, repo) = create_repo();
        let team = repo
            .create(TeamDraft::new("Red Bull", "Milton Keynes"), "logos/rb.png".into())
            .await
            .unwrap();

        assert_eq!(team.id().value(), 1);

        let fetched = repo.get(team.id()).await.unwrap().unwrap();
        assert_eq!(fetched.name(), "Red Bull");

        let by_name = repo.find_by_name("Red Bull").await.unwrap();
        assert_eq!(by_name, Some(team));
        assert!(repo.find_by_name("red bull").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_name() {
        let (_, repo) = create_repo();
        repo.create(TeamDraft::new("Haas", "Kannapolis"), "a.png".into())
            .await
            .unwrap();

        let result = repo
            .create(TeamDraft::new("Haas", "Banbury"), "b.png".into())
            .await;
        assert!(matches!(result, Err(DomainError::DuplicateEntity { .. })));
    }

    #[tokio::test]
    async fn test_update_rename_clash() {
        let (_, repo) = create_repo();
        repo.create(TeamDraft::new("A", "x"), "a.png".into()).await.unwrap();
        let mut b = repo.create(TeamDraft::new("B", "y"), "b.png".into()).await.unwrap();

        let mut draft = b.to_draft();
        draft.name = "A".to_string();
        b.apply(draft);

        assert!(repo.update(b.clone()).await.is_err());
        assert!(repo.name_taken("A", Some(b.id())).await.unwrap());
        assert!(!repo.name_taken("B", Some(b.id())).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let (_, repo) = create_repo();
        repo.create(TeamDraft::new("Sauber", "Hinwil"), "s.png".into()).await.unwrap();
        repo.create(TeamDraft::new("Alpine", "Enstone"), "a.png".into()).await.unwrap();

        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["Alpine", "Sauber"]);
    }

    #[tokio::test]
    async fn test_delete_cascades_unregistered_drivers() {
        let (db, repo) = create_repo();
        let team = repo
            .create(TeamDraft::new("Williams", "Grove"), "w.png".into())
            .await
            .unwrap();
        add_driver(&db, team.id(), "Alex");
        add_driver(&db, team.id(), "Logan");

        let outcome = repo.delete(team.id()).await.unwrap();

        assert_eq!(outcome.cascaded_drivers, 2);
        assert!(db.read().unwrap().drivers.is_empty());
        assert!(repo.get(team.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_blocked_by_registration() {
        let (db, repo) = create_repo();
        let team = repo
            .create(TeamDraft::new("Mercedes", "Brackley"), "m.png".into())
            .await
            .unwrap();
        let driver_id = add_driver(&db, team.id(), "George");
        db.write()
            .unwrap()
            .registrations
            .insert((RaceId::new(1), driver_id));

        let err = repo.delete(team.id()).await.unwrap_err();
        assert!(err.is_referential_conflict());
        assert!(repo.get(team.id()).await.unwrap().is_some());
        assert_eq!(db.read().unwrap().drivers.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_team() {
        let (_, repo) = create_repo();
        assert!(repo.delete(TeamId::new(5)).await.unwrap_err().is_not_found());
    }
}
