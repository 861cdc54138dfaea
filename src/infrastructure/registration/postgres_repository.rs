//! PostgreSQL registration repository implementation
//!
//! Writers take `FOR SHARE` on the race and driver rows they touch. Deletes
//! take `FOR UPDATE` on the same rows, so a guard and a registration write
//! never interleave.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::driver::DriverId;
use crate::domain::race::RaceId;
use crate::domain::registration::{RegistrationDiff, RegistrationRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::storage_error;

/// PostgreSQL implementation of RegistrationRepository
#[derive(Debug, Clone)]
pub struct PostgresRegistrationRepository {
    pool: PgPool,
}

impl PostgresRegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(storage_error("Failed to begin transaction"))
    }
}

fn raw_ids<I: IntoIterator<Item = i64>>(ids: I) -> Vec<i64> {
    ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Locks rows of `table` for share; fails with `NotFound` naming the first missing id
async fn share_rows(
    tx: &mut Transaction<'static, Postgres>,
    table: &'static str,
    label: &str,
    ids: &[i64],
) -> Result<(), DomainError> {
    if ids.is_empty() {
        return Ok(());
    }

    let found: Vec<i64> = sqlx::query_scalar(&format!(
        "SELECT id FROM {} WHERE id = ANY($1) ORDER BY id FOR SHARE",
        table
    ))
    .bind(ids)
    .fetch_all(&mut **tx)
    .await
    .map_err(storage_error("Failed to lock registration rows"))?;

    match ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(DomainError::not_found(format!(
            "{} '{}' not found",
            label, missing
        ))),
        None => Ok(()),
    }
}

async fn race_driver_ids(
    tx: &mut Transaction<'static, Postgres>,
    race_id: i64,
) -> Result<Vec<i64>, DomainError> {
    sqlx::query_scalar("SELECT driver_id FROM driver_races WHERE race_id = $1 ORDER BY driver_id")
        .bind(race_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(storage_error("Failed to read race registrations"))
}

async fn insert_pairs(
    tx: &mut Transaction<'static, Postgres>,
    race_ids: &[i64],
    driver_ids: &[i64],
) -> Result<(), DomainError> {
    if race_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO driver_races (race_id, driver_id)
        SELECT * FROM UNNEST($1::BIGINT[], $2::BIGINT[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(race_ids)
    .bind(driver_ids)
    .execute(&mut **tx)
    .await
    .map_err(storage_error("Failed to insert registrations"))?;

    Ok(())
}

#[async_trait]
impl RegistrationRepository for PostgresRegistrationRepository {
    async fn drivers_for_race(&self, race_id: RaceId) -> Result<Vec<DriverId>, DomainError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT driver_id FROM driver_races WHERE race_id = $1 ORDER BY driver_id",
        )
        .bind(race_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("Failed to read race registrations"))?;

        Ok(ids.into_iter().map(DriverId::new).collect())
    }

    async fn races_for_driver(&self, driver_id: DriverId) -> Result<Vec<RaceId>, DomainError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT race_id FROM driver_races WHERE driver_id = $1 ORDER BY race_id",
        )
        .bind(driver_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("Failed to read driver registrations"))?;

        Ok(ids.into_iter().map(RaceId::new).collect())
    }

    async fn register(
        &self,
        race_id: RaceId,
        driver_ids: &[DriverId],
    ) -> Result<Vec<DriverId>, DomainError> {
        let mut tx = self.begin().await?;
        let drivers = raw_ids(driver_ids.iter().map(|id| id.value()));

        share_rows(&mut tx, "races", "Race", &[race_id.value()]).await?;
        share_rows(&mut tx, "drivers", "Driver", &drivers).await?;

        let current = race_driver_ids(&mut tx, race_id.value()).await?;
        let added: Vec<i64> = drivers
            .into_iter()
            .filter(|id| !current.contains(id))
            .collect();

        insert_pairs(&mut tx, &vec![race_id.value(); added.len()], &added).await?;

        tx.commit()
            .await
            .map_err(storage_error("Failed to commit registrations"))?;

        Ok(added.into_iter().map(DriverId::new).collect())
    }

    async fn replace_for_race(
        &self,
        race_id: RaceId,
        driver_ids: &[DriverId],
    ) -> Result<RegistrationDiff<DriverId>, DomainError> {
        let mut tx = self.begin().await?;
        let drivers = raw_ids(driver_ids.iter().map(|id| id.value()));

        share_rows(&mut tx, "races", "Race", &[race_id.value()]).await?;
        share_rows(&mut tx, "drivers", "Driver", &drivers).await?;

        let current: Vec<DriverId> = race_driver_ids(&mut tx, race_id.value())
            .await?
            .into_iter()
            .map(DriverId::new)
            .collect();
        let diff = RegistrationDiff::between(&current, driver_ids);

        let removed = raw_ids(diff.removed.iter().map(|id| id.value()));
        if !removed.is_empty() {
            sqlx::query("DELETE FROM driver_races WHERE race_id = $1 AND driver_id = ANY($2)")
                .bind(race_id.value())
                .bind(&removed)
                .execute(&mut *tx)
                .await
                .map_err(storage_error("Failed to remove registrations"))?;
        }

        let added = raw_ids(diff.added.iter().map(|id| id.value()));
        insert_pairs(&mut tx, &vec![race_id.value(); added.len()], &added).await?;

        tx.commit()
            .await
            .map_err(storage_error("Failed to commit registrations"))?;

        Ok(diff)
    }

    async fn replace_for_driver(
        &self,
        driver_id: DriverId,
        race_ids: &[RaceId],
    ) -> Result<RegistrationDiff<RaceId>, DomainError> {
        let mut tx = self.begin().await?;
        let races = raw_ids(race_ids.iter().map(|id| id.value()));

        share_rows(&mut tx, "drivers", "Driver", &[driver_id.value()]).await?;
        share_rows(&mut tx, "races", "Race", &races).await?;

        let current: Vec<i64> = sqlx::query_scalar(
            "SELECT race_id FROM driver_races WHERE driver_id = $1 ORDER BY race_id",
        )
        .bind(driver_id.value())
        .fetch_all(&mut *tx)
        .await
        .map_err(storage_error("Failed to read driver registrations"))?;

        let current: Vec<RaceId> = current.into_iter().map(RaceId::new).collect();
        let diff = RegistrationDiff::between(&current, race_ids);

        let removed = raw_ids(diff.removed.iter().map(|id| id.value()));
        if !removed.is_empty() {
            sqlx::query("DELETE FROM driver_races WHERE driver_id = $1 AND race_id = ANY($2)")
                .bind(driver_id.value())
                .bind(&removed)
                .execute(&mut *tx)
                .await
                .map_err(storage_error("Failed to remove registrations"))?;
        }

        let added = raw_ids(diff.added.iter().map(|id| id.value()));
        insert_pairs(&mut tx, &added, &vec![driver_id.value(); added.len()]).await?;

        tx.commit()
            .await
            .map_err(storage_error("Failed to commit registrations"))?;

        Ok(diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_ids_sorted_and_deduped() {
        assert_eq!(raw_ids([3, 1, 3, 2]), vec![1, 2, 3]);
        assert!(raw_ids(Vec::<i64>::new()).is_empty());
    }
}
