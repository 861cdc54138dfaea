//! In-memory driver repository

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::deletion::{check_deletable, DeletionOutcome, EntityKind, References};
use crate::domain::driver::{Driver, DriverDraft, DriverId, DriverRepository};
use crate::domain::team::TeamId;
use crate::domain::DomainError;
use crate::infrastructure::storage::{InMemoryDatabase, Tables};

#[derive(Debug, Clone)]
pub struct InMemoryDriverRepository {
    db: Arc<InMemoryDatabase>,
}

impl InMemoryDriverRepository {
    pub fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }
}

fn identity_clash(
    tables: &Tables,
    first_name: &str,
    last_name: &str,
    dob: NaiveDate,
    exclude: Option<DriverId>,
) -> bool {
    tables.drivers.values().any(|d| {
        d.first_name() == first_name
            && d.last_name() == last_name
            && d.dob() == dob
            && Some(d.id()) != exclude
    })
}

/// Rejects writes that would break the stored invariants
fn check_write(tables: &Tables, draft: &DriverDraft, exclude: Option<DriverId>) -> Result<(), DomainError> {
    if identity_clash(tables, &draft.first_name, &draft.last_name, draft.dob, exclude) {
        return Err(DomainError::duplicate("Driver already exists"));
    }

    if let Some(team_id) = draft.team_id {
        if !tables.teams.contains_key(&team_id) {
            return Err(DomainError::not_found(format!("Team '{}' not found", team_id)));
        }
    }

    Ok(())
}

#[async_trait]
impl DriverRepository for InMemoryDriverRepository {
    async fn get(&self, id: DriverId) -> Result<Option<Driver>, DomainError> {
        Ok(self.db.read()?.drivers.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[DriverId]) -> Result<Vec<Driver>, DomainError> {
        let tables = self.db.read()?;
        Ok(tables
            .drivers
            .values()
            .filter(|d| ids.contains(&d.id()))
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<Driver>, DomainError> {
        Ok(self.db.read()?.drivers.values().cloned().collect())
    }

    async fn list_by_team(&self, team_id: TeamId) -> Result<Vec<Driver>, DomainError> {
        let tables = self.db.read()?;
        Ok(tables
            .drivers
            .values()
            .filter(|d| d.team_id() == Some(team_id))
            .cloned()
            .collect())
    }

    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Vec<Driver>, DomainError> {
        let tables = self.db.read()?;
        Ok(tables
            .drivers
            .values()
            .filter(|d| d.first_name() == first_name && d.last_name() == last_name)
            .cloned()
            .collect())
    }

    async fn identity_taken(
        &self,
        first_name: &str,
        last_name: &str,
        dob: NaiveDate,
        exclude: Option<DriverId>,
    ) -> Result<bool, DomainError> {
        let tables = self.db.read()?;
        Ok(identity_clash(
            &tables,
            first_name,
            last_name,
            dob,
            exclude,
        ))
    }

    async fn create(&self, draft: DriverDraft) -> Result<Driver, DomainError> {
        let mut tables = self.db.write()?;
        check_write(&tables, &draft, None)?;

        let id = tables.next_driver_id();
        let driver = Driver::from_draft(id, draft);
        tables.drivers.insert(id, driver.clone());

        Ok(driver)
    }

    async fn update(&self, driver: Driver) -> Result<Driver, DomainError> {
        let mut tables = self.db.write()?;

        if !tables.drivers.contains_key(&driver.id()) {
            return Err(DomainError::not_found(format!(
                "Driver '{}' not found",
                driver.id()
            )));
        }

        check_write(&tables, &driver.to_draft(), Some(driver.id()))?;
        tables.drivers.insert(driver.id(), driver.clone());

        Ok(driver)
    }

    async fn references(&self, id: DriverId) -> Result<References, DomainError> {
        let tables = self.db.read()?;
        Ok(References::registrations(tables.races_for_driver(id).len()))
    }

    async fn delete(&self, id: DriverId) -> Result<DeletionOutcome, DomainError> {
        let mut tables = self.db.write()?;

        if !tables.drivers.contains_key(&id) {
            return Err(DomainError::not_found(format!("Driver '{}' not found", id)));
        }

        let refs = References::registrations(tables.races_for_driver(id).len());
        check_deletable(EntityKind::Driver, &refs)?;

        tables.drivers.remove(&id);
        Ok(DeletionOutcome::new(EntityKind::Driver, id.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::race::RaceId;

    fn create_repo() -> (Arc<InMemoryDatabase>, InMemoryDriverRepository) {
        let db = Arc::new(InMemoryDatabase::new());
        (db.clone(), InMemoryDriverRepository::new(db))
    }

    fn dob(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_by_name() {
        let (_, repo) = create_repo();
        let lewis = repo
            .create(DriverDraft::new("Lewis", "Hamilton", dob(1985)))
            .await
            .unwrap();
        repo.create(DriverDraft::new("Lewis", "Hamilton", dob(1990)))
            .await
            .unwrap();

        let matches = repo.find_by_name("Lewis", "Hamilton").await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0], lewis);

        assert!(repo.find_by_name("Lewis", "hamilton").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_identity_rejected() {
        let (_, repo) = create_repo();
        repo.create(DriverDraft::new("Max", "Verstappen", dob(1997)))
            .await
            .unwrap();

        let result = repo
            .create(DriverDraft::new("Max", "Verstappen", dob(1997)))
            .await;
        assert!(matches!(result, Err(DomainError::DuplicateEntity { .. })));
        assert!(repo
            .identity_taken("Max", "Verstappen", dob(1997), None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_keeps_own_identity() {
        let (_, repo) = create_repo();
        let mut driver = repo
            .create(DriverDraft::new("Oscar", "Piastri", dob(2000)))
            .await
            .unwrap();

        assert!(!repo
            .identity_taken("Oscar", "Piastri", dob(2000), Some(driver.id()))
            .await
            .unwrap());

        let mut draft = driver.to_draft();
        draft.dob = dob(1999);
        driver.apply(draft);
        let updated = repo.update(driver).await.unwrap();
        assert_eq!(updated.dob(), dob(1999));
    }

    #[tokio::test]
    async fn test_create_with_unknown_team() {
        let (_, repo) = create_repo();
        let draft = DriverDraft::new("Yuki", "Tsunoda", dob(2000)).with_team(TeamId::new(99));
        assert!(repo.create(draft).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_guard() {
        let (db, repo) = create_repo();
        let driver = repo
            .create(DriverDraft::new("Lando", "Norris", dob(1999)))
            .await
            .unwrap();
        db.write()
            .unwrap()
            .registrations
            .insert((RaceId::new(1), driver.id()));

        assert_eq!(repo.references(driver.id()).await.unwrap().registrations, 1);
        assert!(repo
            .delete(driver.id())
            .await
            .unwrap_err()
            .is_referential_conflict());

        db.write().unwrap().registrations.clear();
        let outcome = repo.delete(driver.id()).await.unwrap();
        assert_eq!(outcome.kind, EntityKind::Driver);
        assert!(repo.get(driver.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_many_skips_unknown_ids() {
        let (_, repo) = create_repo();
        let a = repo
            .create(DriverDraft::new("A", "One", dob(1990)))
            .await
            .unwrap();

        let found = repo
            .get_many(&[a.id(), DriverId::new(42)])
            .await
            .unwrap();
        assert_eq!(found, vec![a]);
    }
}
