//! In-memory race repository

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::deletion::{check_deletable, DeletionOutcome, EntityKind, References};
use crate::domain::race::{Race, RaceDraft, RaceId, RaceRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::InMemoryDatabase;

#[derive(Debug, Clone)]
pub struct InMemoryRaceRepository {
    db: Arc<InMemoryDatabase>,
}

impl InMemoryRaceRepository {
    pub fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RaceRepository for InMemoryRaceRepository {
    async fn get(&self, id: RaceId) -> Result<Option<Race>, DomainError> {
        Ok(self.db.read()?.races.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[RaceId]) -> Result<Vec<Race>, DomainError> {
        let tables = self.db.read()?;
        Ok(tables
            .races
            .values()
            .filter(|r| ids.contains(&r.id()))
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<Race>, DomainError> {
        let mut races: Vec<Race> = self.db.read()?.races.values().cloned().collect();
        races.sort_by_key(|r| (r.race_date(), r.id()));
        Ok(races)
    }

    async fn create(&self, draft: RaceDraft) -> Result<Race, DomainError> {
        let mut tables = self.db.write()?;
        let id = tables.next_race_id();
        let race = Race::from_draft(id, draft);
        tables.races.insert(id, race.clone());

        Ok(race)
    }

    async fn update(&self, race: Race) -> Result<Race, DomainError> {
        let mut tables = self.db.write()?;

        match tables.races.get_mut(&race.id()) {
            Some(stored) => {
                *stored = race.clone();
                Ok(race)
            }
            None => Err(DomainError::not_found(format!(
                "Race '{}' not found",
                race.id()
            ))),
        }
    }

    async fn references(&self, id: RaceId) -> Result<References, DomainError> {
        let tables = self.db.read()?;
        Ok(References::registrations(tables.drivers_for_race(id).len()))
    }

    async fn delete(&self, id: RaceId) -> Result<DeletionOutcome, DomainError> {
        let mut tables = self.db.write()?;

        if !tables.races.contains_key(&id) {
            return Err(DomainError::not_found(format!("Race '{}' not found", id)));
        }

        let refs = References::registrations(tables.drivers_for_race(id).len());
        check_deletable(EntityKind::Race, &refs)?;

        tables.races.remove(&id);
        Ok(DeletionOutcome::new(EntityKind::Race, id.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::driver::DriverId;
    use chrono::NaiveDate;

    fn create_repo() -> (Arc<InMemoryDatabase>, InMemoryRaceRepository) {
        let db = Arc::new(InMemoryDatabase::new());
        (db.clone(), InMemoryRaceRepository::new(db))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_list_ordered_by_date() {
        let (_, repo) = create_repo();
        repo.create(RaceDraft::new("Suzuka", "Japan", date(2031, 4, 6)))
            .await
            .unwrap();
        repo.create(RaceDraft::new("Bahrain", "Sakhir", date(2031, 3, 2)))
            .await
            .unwrap();

        let tracks: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .iter()
            .map(|r| r.track_name().to_string())
            .collect();
        assert_eq!(tracks, vec!["Bahrain", "Suzuka"]);
    }

    #[tokio::test]
    async fn test_update_missing_race() {
        let (_, repo) = create_repo();
        let race = Race::from_draft(
            RaceId::new(3),
            RaceDraft::new("Spa", "Belgium", date(2031, 7, 27)),
        );
        assert!(repo.update(race).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_guard() {
        let (db, repo) = create_repo();
        let race = repo
            .create(RaceDraft::new("Imola", "Italy", date(2031, 5, 18)))
            .await
            .unwrap();
        db.write()
            .unwrap()
            .registrations
            .insert((race.id(), DriverId::new(1)));

        let err = repo.delete(race.id()).await.unwrap_err();
        assert!(err.is_referential_conflict());
        assert!(err.to_string().ends_with("Cannot delete race with registered drivers"));

        db.write().unwrap().registrations.clear();
        repo.delete(race.id()).await.unwrap();
        assert!(repo.get(race.id()).await.unwrap().is_none());
    }
}
