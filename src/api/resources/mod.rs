//! REST endpoints for teams, drivers and races

pub mod drivers;
pub mod races;
pub mod teams;

use axum::{
    routing::{get, post, put},
    Router,
};
use serde::Serialize;

use super::state::AppState;
use crate::domain::{DeletionOutcome, DomainError, EntityKind};

/// Body returned by a delete that went through
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub kind: EntityKind,
    pub id: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub cascaded_drivers: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl From<DeletionOutcome> for DeleteResponse {
    fn from(outcome: DeletionOutcome) -> Self {
        Self {
            deleted: true,
            kind: outcome.kind,
            id: outcome.id,
            cascaded_drivers: outcome.cascaded_drivers,
        }
    }
}

/// Answer of a deletion guard dry run
#[derive(Debug, Clone, Serialize)]
pub struct DeletableResponse {
    pub deletable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DeletableResponse {
    /// A refusal is an answer, not an error; anything else propagates
    fn from_check(check: Result<(), DomainError>) -> Result<Self, DomainError> {
        match check {
            Ok(()) => Ok(Self {
                deletable: true,
                reason: None,
            }),
            Err(e) if e.is_referential_conflict() => Ok(Self {
                deletable: false,
                reason: Some(e.message()),
            }),
            Err(e) => Err(e),
        }
    }
}

/// Create the `/api` router
pub fn create_resource_router() -> Router<AppState> {
    Router::new()
        // Teams
        .route("/teams", get(teams::list_teams).post(teams::create_team))
        .route(
            "/teams/{team_id}",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        .route("/teams/{team_id}/deletable", get(teams::team_deletable))
        // Drivers
        .route("/drivers", get(drivers::list_drivers).post(drivers::create_driver))
        .route(
            "/drivers/{driver_id}",
            get(drivers::get_driver)
                .put(drivers::update_driver)
                .delete(drivers::delete_driver),
        )
        .route("/drivers/{driver_id}/deletable", get(drivers::driver_deletable))
        .route("/drivers/{driver_id}/races", put(drivers::set_driver_races))
        // Races
        .route("/races", get(races::list_races).post(races::create_race))
        .route(
            "/races/{race_id}",
            get(races::get_race)
                .put(races::update_race)
                .delete(races::delete_race),
        )
        .route("/races/{race_id}/deletable", get(races::race_deletable))
        .route(
            "/races/{race_id}/drivers",
            post(races::add_race_drivers).put(races::set_race_drivers),
        )
}
