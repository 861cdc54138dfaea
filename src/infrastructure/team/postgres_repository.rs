//! PostgreSQL team repository implementation

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool};

use crate::domain::deletion::{check_deletable, DeletionOutcome, EntityKind, References};
use crate::domain::team::{Team, TeamDraft, TeamId, TeamRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::{column, is_unique_violation, storage_error};

const TEAM_COLUMNS: &str = "id, name, location, logo, description";

/// PostgreSQL implementation of TeamRepository
#[derive(Debug, Clone)]
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_team(row: &PgRow) -> Result<Team, DomainError> {
    let draft = TeamDraft {
        name: column(row, "name")?,
        location: column(row, "location")?,
        description: column(row, "description")?,
    };
    let logo: String = column(row, "logo")?;

    Ok(Team::from_draft(TeamId::new(column(row, "id")?), draft, logo))
}

fn write_error(name: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e| {
        if is_unique_violation(&e) {
            DomainError::duplicate(format!("Team with name '{}' already exists", name))
        } else {
            DomainError::storage(format!("Failed to save team: {}", e))
        }
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn get(&self, id: TeamId) -> Result<Option<Team>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM teams WHERE id = $1", TEAM_COLUMNS))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to get team"))?;

        row.as_ref().map(row_to_team).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM teams WHERE name = $1", TEAM_COLUMNS))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to get team by name"))?;

        row.as_ref().map(row_to_team).transpose()
    }

    async fn name_taken(&self, name: &str, exclude: Option<TeamId>) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM teams WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude.map(|id| id.value()))
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error("Failed to check team name"))
    }

    async fn list(&self) -> Result<Vec<Team>, DomainError> {
        let rows = sqlx::query(&format!("SELECT {} FROM teams ORDER BY name", TEAM_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Failed to list teams"))?;

        rows.iter().map(row_to_team).collect()
    }

    async fn create(&self, draft: TeamDraft, logo: String) -> Result<Team, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO teams (name, location, logo, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.location)
        .bind(&logo)
        .bind(&draft.description)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error(&draft.name))?;

        Ok(Team::from_draft(TeamId::new(id), draft, logo))
    }

    async fn update(&self, team: Team) -> Result<Team, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE teams
            SET name = $2, location = $3, logo = $4, description = $5
            WHERE id = $1
            "#,
        )
        .bind(team.id().value())
        .bind(team.name())
        .bind(team.location())
        .bind(team.logo())
        .bind(team.description())
        .execute(&self.pool)
        .await
        .map_err(write_error(team.name()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Team '{}' not found",
                team.id()
            )));
        }

        Ok(team)
    }

    async fn references(&self, id: TeamId) -> Result<References, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM drivers WHERE team_id = $1) AS owned_drivers,
                (SELECT COUNT(*) FROM driver_races dr
                    JOIN drivers d ON d.id = dr.driver_id
                    WHERE d.team_id = $1) AS registrations
            "#,
        )
        .bind(id.value())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error("Failed to count team references"))?;

        let owned: i64 = column(&row, "owned_drivers")?;
        let registrations: i64 = column(&row, "registrations")?;

        Ok(References {
            owned_drivers: owned as usize,
            registrations: registrations as usize,
        })
    }

    async fn delete(&self, id: TeamId) -> Result<DeletionOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_error("Failed to begin transaction"))?;

        let locked: Option<i64> = sqlx::query_scalar("SELECT id FROM teams WHERE id = $1 FOR UPDATE")
            .bind(id.value())
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error("Failed to lock team"))?;

        if locked.is_none() {
            return Err(DomainError::not_found(format!("Team '{}' not found", id)));
        }

        // Registration writers take FOR SHARE on driver rows, so they wait for us
        let drivers: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM drivers WHERE team_id = $1 FOR UPDATE")
                .bind(id.value())
                .fetch_all(&mut *tx)
                .await
                .map_err(storage_error("Failed to lock team drivers"))?;

        let registrations: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM driver_races WHERE driver_id = ANY($1)")
                .bind(&drivers)
                .fetch_one(&mut *tx)
                .await
                .map_err(storage_error("Failed to count registrations"))?;

        check_deletable(
            EntityKind::Team,
            &References {
                owned_drivers: drivers.len(),
                registrations: registrations as usize,
            },
        )?;

        // drivers.team_id cascades
        sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(storage_error("Failed to delete team"))?;

        tx.commit()
            .await
            .map_err(storage_error("Failed to commit team deletion"))?;

        Ok(DeletionOutcome::new(EntityKind::Team, id.value()).with_cascaded_drivers(drivers.len()))
    }
}
