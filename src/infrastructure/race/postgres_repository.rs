//! PostgreSQL race repository implementation

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool};

use crate::domain::deletion::{check_deletable, DeletionOutcome, EntityKind, References};
use crate::domain::race::{Race, RaceDraft, RaceId, RaceRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::{column, storage_error};

const RACE_COLUMNS: &str = "id, track_name, track_location, race_date, registration_closure_date";

/// PostgreSQL implementation of RaceRepository
#[derive(Debug, Clone)]
pub struct PostgresRaceRepository {
    pool: PgPool,
}

impl PostgresRaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_race(row: &PgRow) -> Result<Race, DomainError> {
    let draft = RaceDraft {
        track_name: column(row, "track_name")?,
        track_location: column(row, "track_location")?,
        race_date: column(row, "race_date")?,
        registration_closure_date: column(row, "registration_closure_date")?,
    };

    Ok(Race::from_draft(RaceId::new(column(row, "id")?), draft))
}

#[async_trait]
impl RaceRepository for PostgresRaceRepository {
    async fn get(&self, id: RaceId) -> Result<Option<Race>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM races WHERE id = $1", RACE_COLUMNS))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to get race"))?;

        row.as_ref().map(row_to_race).transpose()
    }

    async fn get_many(&self, ids: &[RaceId]) -> Result<Vec<Race>, DomainError> {
        let ids: Vec<i64> = ids.iter().map(|id| id.value()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {} FROM races WHERE id = ANY($1) ORDER BY id",
            RACE_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("Failed to get races"))?;

        rows.iter().map(row_to_race).collect()
    }

    async fn list(&self) -> Result<Vec<Race>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM races ORDER BY race_date, id",
            RACE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("Failed to list races"))?;

        rows.iter().map(row_to_race).collect()
    }

    async fn create(&self, draft: RaceDraft) -> Result<Race, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO races (track_name, track_location, race_date, registration_closure_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&draft.track_name)
        .bind(&draft.track_location)
        .bind(draft.race_date)
        .bind(draft.registration_closure_date)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error("Failed to create race"))?;

        Ok(Race::from_draft(RaceId::new(id), draft))
    }

    async fn update(&self, race: Race) -> Result<Race, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE races
            SET track_name = $2, track_location = $3, race_date = $4,
                registration_closure_date = $5
            WHERE id = $1
            "#,
        )
        .bind(race.id().value())
        .bind(race.track_name())
        .bind(race.track_location())
        .bind(race.race_date())
        .bind(race.registration_closure_date())
        .execute(&self.pool)
        .await
        .map_err(storage_error("Failed to update race"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Race '{}' not found",
                race.id()
            )));
        }

        Ok(race)
    }

    async fn references(&self, id: RaceId) -> Result<References, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM driver_races WHERE race_id = $1")
            .bind(id.value())
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error("Failed to count race registrations"))?;

        Ok(References::registrations(count as usize))
    }

    async fn delete(&self, id: RaceId) -> Result<DeletionOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_error("Failed to begin transaction"))?;

        let locked: Option<i64> = sqlx::query_scalar("SELECT id FROM races WHERE id = $1 FOR UPDATE")
            .bind(id.value())
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error("Failed to lock race"))?;

        if locked.is_none() {
            return Err(DomainError::not_found(format!("Race '{}' not found", id)));
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM driver_races WHERE race_id = $1")
            .bind(id.value())
            .fetch_one(&mut *tx)
            .await
            .map_err(storage_error("Failed to count race registrations"))?;

        check_deletable(EntityKind::Race, &References::registrations(count as usize))?;

        sqlx::query("DELETE FROM races WHERE id = $1")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(storage_error("Failed to delete race"))?;

        tx.commit()
            .await
            .map_err(storage_error("Failed to commit race deletion"))?;

        Ok(DeletionOutcome::new(EntityKind::Race, id.value()))
    }
}
