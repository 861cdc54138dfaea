//! PostgreSQL driver repository implementation

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgRow, PgPool};

use crate::domain::deletion::{check_deletable, DeletionOutcome, EntityKind, References};
use crate::domain::driver::{Driver, DriverDraft, DriverId, DriverRepository};
use crate::domain::team::TeamId;
use crate::domain::DomainError;
use crate::infrastructure::storage::{
    column, is_foreign_key_violation, is_unique_violation, storage_error,
};

const DRIVER_COLUMNS: &str = "id, first_name, last_name, dob, team_id";

/// PostgreSQL implementation of DriverRepository
#[derive(Debug, Clone)]
pub struct PostgresDriverRepository {
    pool: PgPool,
}

impl PostgresDriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_driver(row: &PgRow) -> Result<Driver, DomainError> {
    let team_id: Option<i64> = column(row, "team_id")?;
    let draft = DriverDraft {
        first_name: column(row, "first_name")?,
        last_name: column(row, "last_name")?,
        dob: column(row, "dob")?,
        team_id: team_id.map(TeamId::new),
    };

    Ok(Driver::from_draft(DriverId::new(column(row, "id")?), draft))
}

fn write_error(draft: &DriverDraft) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e| {
        if is_unique_violation(&e) {
            DomainError::duplicate("Driver already exists")
        } else if is_foreign_key_violation(&e) {
            let team = draft.team_id.map(|id| id.to_string()).unwrap_or_default();
            DomainError::not_found(format!("Team '{}' not found", team))
        } else {
            DomainError::storage(format!("Failed to save driver: {}", e))
        }
    }
}

#[async_trait]
impl DriverRepository for PostgresDriverRepository {
    async fn get(&self, id: DriverId) -> Result<Option<Driver>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM drivers WHERE id = $1",
            DRIVER_COLUMNS
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("Failed to get driver"))?;

        row.as_ref().map(row_to_driver).transpose()
    }

    async fn get_many(&self, ids: &[DriverId]) -> Result<Vec<Driver>, DomainError> {
        let ids: Vec<i64> = ids.iter().map(|id| id.value()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {} FROM drivers WHERE id = ANY($1) ORDER BY id",
            DRIVER_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("Failed to get drivers"))?;

        rows.iter().map(row_to_driver).collect()
    }

    async fn list(&self) -> Result<Vec<Driver>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM drivers ORDER BY id",
            DRIVER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("Failed to list drivers"))?;

        rows.iter().map(row_to_driver).collect()
    }

    async fn list_by_team(&self, team_id: TeamId) -> Result<Vec<Driver>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM drivers WHERE team_id = $1 ORDER BY id",
            DRIVER_COLUMNS
        ))
        .bind(team_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("Failed to list team drivers"))?;

        rows.iter().map(row_to_driver).collect()
    }

    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Vec<Driver>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM drivers WHERE first_name = $1 AND last_name = $2 ORDER BY id",
            DRIVER_COLUMNS
        ))
        .bind(first_name)
        .bind(last_name)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("Failed to find driver by name"))?;

        rows.iter().map(row_to_driver).collect()
    }

    async fn identity_taken(
        &self,
        first_name: &str,
        last_name: &str,
        dob: NaiveDate,
        exclude: Option<DriverId>,
    ) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM drivers
                WHERE first_name = $1 AND last_name = $2 AND dob = $3
                  AND ($4::BIGINT IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(dob)
        .bind(exclude.map(|id| id.value()))
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error("Failed to check driver identity"))
    }

    async fn create(&self, draft: DriverDraft) -> Result<Driver, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO drivers (first_name, last_name, dob, team_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(draft.dob)
        .bind(draft.team_id.map(|id| id.value()))
        .fetch_one(&self.pool)
        .await
        .map_err(write_error(&draft))?;

        Ok(Driver::from_draft(DriverId::new(id), draft))
    }

    async fn update(&self, driver: Driver) -> Result<Driver, DomainError> {
        let draft = driver.to_draft();
        let result = sqlx::query(
            r#"
            UPDATE drivers
            SET first_name = $2, last_name = $3, dob = $4, team_id = $5
            WHERE id = $1
            "#,
        )
        .bind(driver.id().value())
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(draft.dob)
        .bind(draft.team_id.map(|id| id.value()))
        .execute(&self.pool)
        .await
        .map_err(write_error(&draft))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Driver '{}' not found",
                driver.id()
            )));
        }

        Ok(driver)
    }

    async fn references(&self, id: DriverId) -> Result<References, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM driver_races WHERE driver_id = $1")
            .bind(id.value())
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error("Failed to count driver registrations"))?;

        Ok(References::registrations(count as usize))
    }

    async fn delete(&self, id: DriverId) -> Result<DeletionOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_error("Failed to begin transaction"))?;

        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM drivers WHERE id = $1 FOR UPDATE")
                .bind(id.value())
                .fetch_optional(&mut *tx)
                .await
                .map_err(storage_error("Failed to lock driver"))?;

        if locked.is_none() {
            return Err(DomainError::not_found(format!("Driver '{}' not found", id)));
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM driver_races WHERE driver_id = $1")
            .bind(id.value())
            .fetch_one(&mut *tx)
            .await
            .map_err(storage_error("Failed to count driver registrations"))?;

        check_deletable(EntityKind::Driver, &References::registrations(count as usize))?;

        sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(storage_error("Failed to delete driver"))?;

        tx.commit()
            .await
            .map_err(storage_error("Failed to commit driver deletion"))?;

        Ok(DeletionOutcome::new(EntityKind::Driver, id.value()))
    }
}
