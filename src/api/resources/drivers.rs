//! Driver endpoints

use axum::extract::{Path, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DeletableResponse, DeleteResponse};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{Driver, DriverId, RaceId};
use crate::infrastructure::driver::{CreateDriverRequest, UpdateDriverRequest};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDriverApiRequest {
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    /// Team name
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateDriverApiRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub team: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetDriverRacesRequest {
    pub races: Vec<RaceId>,
}

/// Driver with team name and "track on date" race labels
#[derive(Debug, Clone, Serialize)]
pub struct DriverResponse {
    pub id: DriverId,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub dob: NaiveDate,
    pub team: Option<String>,
    pub races: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListDriversResponse {
    pub drivers: Vec<DriverResponse>,
    pub total: usize,
}

async fn driver_response(state: &AppState, driver: &Driver) -> Result<DriverResponse, ApiError> {
    let team = state.driver_service.team(driver).await?;
    let races = state.driver_service.race_labels(driver.id()).await?;

    Ok(DriverResponse {
        id: driver.id(),
        first_name: driver.first_name().to_string(),
        last_name: driver.last_name().to_string(),
        full_name: driver.full_name(),
        dob: driver.dob(),
        team: team.map(|t| t.name().to_string()),
        races,
    })
}

/// GET /api/drivers
pub async fn list_drivers(
    State(state): State<AppState>,
) -> Result<Json<ListDriversResponse>, ApiError> {
    debug!("Listing drivers");

    let drivers = state.driver_service.list().await?;
    let mut responses = Vec::with_capacity(drivers.len());
    for driver in &drivers {
        responses.push(driver_response(&state, driver).await?);
    }

    Ok(Json(ListDriversResponse {
        total: responses.len(),
        drivers: responses,
    }))
}

/// POST /api/drivers
pub async fn create_driver(
    State(state): State<AppState>,
    Json(request): Json<CreateDriverApiRequest>,
) -> Result<Json<DriverResponse>, ApiError> {
    let driver = state
        .driver_service
        .create(CreateDriverRequest {
            first_name: request.first_name,
            last_name: request.last_name,
            dob: request.dob,
            team: request.team,
        })
        .await?;

    Ok(Json(driver_response(&state, &driver).await?))
}

/// GET /api/drivers/{driver_id}
pub async fn get_driver(
    State(state): State<AppState>,
    Path(driver_id): Path<i64>,
) -> Result<Json<DriverResponse>, ApiError> {
    let driver = state.driver_service.get(DriverId::new(driver_id)).await?;
    Ok(Json(driver_response(&state, &driver).await?))
}

/// PUT /api/drivers/{driver_id}
pub async fn update_driver(
    State(state): State<AppState>,
    Path(driver_id): Path<i64>,
    Json(request): Json<UpdateDriverApiRequest>,
) -> Result<Json<DriverResponse>, ApiError> {
    let driver = state
        .driver_service
        .update(
            DriverId::new(driver_id),
            UpdateDriverRequest {
                first_name: request.first_name,
                last_name: request.last_name,
                dob: request.dob,
                team: request.team,
            },
        )
        .await?;

    Ok(Json(driver_response(&state, &driver).await?))
}

/// PUT /api/drivers/{driver_id}/races
pub async fn set_driver_races(
    State(state): State<AppState>,
    Path(driver_id): Path<i64>,
    Json(request): Json<SetDriverRacesRequest>,
) -> Result<Json<DriverResponse>, ApiError> {
    let id = DriverId::new(driver_id);
    state.driver_service.set_races(id, &request.races).await?;

    let driver = state.driver_service.get(id).await?;
    Ok(Json(driver_response(&state, &driver).await?))
}

/// DELETE /api/drivers/{driver_id}
pub async fn delete_driver(
    State(state): State<AppState>,
    Path(driver_id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let outcome = state.driver_service.delete(DriverId::new(driver_id)).await?;
    Ok(Json(DeleteResponse::from(outcome)))
}

/// GET /api/drivers/{driver_id}/deletable
pub async fn driver_deletable(
    State(state): State<AppState>,
    Path(driver_id): Path<i64>,
) -> Result<Json<DeletableResponse>, ApiError> {
    let check = state.driver_service.can_delete(DriverId::new(driver_id)).await;
    Ok(Json(DeletableResponse::from_check(check)?))
}
