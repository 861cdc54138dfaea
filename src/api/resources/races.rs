//! Race endpoints

use axum::extract::{Path, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DeletableResponse, DeleteResponse};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{DriverId, Race, RaceId};
use crate::infrastructure::race::{CreateRaceRequest, UpdateRaceRequest};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRaceApiRequest {
    pub track_name: String,
    pub track_location: String,
    pub race_date: NaiveDate,
    #[serde(default)]
    pub registration_closure_date: Option<NaiveDate>,
    /// "First Last" driver names
    #[serde(default)]
    pub registered_drivers: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateRaceApiRequest {
    pub track_name: Option<String>,
    pub track_location: Option<String>,
    pub race_date: Option<NaiveDate>,
    pub registration_closure_date: Option<NaiveDate>,
    pub registered_drivers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddDriversRequest {
    pub drivers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetRaceDriversRequest {
    pub drivers: Vec<DriverId>,
}

/// Race with the names of its registered drivers
#[derive(Debug, Clone, Serialize)]
pub struct RaceResponse {
    pub id: RaceId,
    pub track_name: String,
    pub track_location: String,
    pub race_date: NaiveDate,
    pub registration_closure_date: Option<NaiveDate>,
    pub label: String,
    pub registered_drivers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListRacesResponse {
    pub races: Vec<RaceResponse>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddDriversResponse {
    pub race: RaceResponse,
    /// Drivers registered by this request
    pub added: Vec<String>,
}

async fn race_response(state: &AppState, race: &Race) -> Result<RaceResponse, ApiError> {
    let registered_drivers = state.race_service.driver_names(race.id()).await?;

    Ok(RaceResponse {
        id: race.id(),
        track_name: race.track_name().to_string(),
        track_location: race.track_location().to_string(),
        race_date: race.race_date(),
        registration_closure_date: race.registration_closure_date(),
        label: race.label(),
        registered_drivers,
    })
}

/// GET /api/races
pub async fn list_races(State(state): State<AppState>) -> Result<Json<ListRacesResponse>, ApiError> {
    debug!("Listing races");

    let races = state.race_service.list().await?;
    let mut responses = Vec::with_capacity(races.len());
    for race in &races {
        responses.push(race_response(&state, race).await?);
    }

    Ok(Json(ListRacesResponse {
        total: responses.len(),
        races: responses,
    }))
}

/// POST /api/races
pub async fn create_race(
    State(state): State<AppState>,
    Json(request): Json<CreateRaceApiRequest>,
) -> Result<Json<RaceResponse>, ApiError> {
    let race = state
        .race_service
        .create(CreateRaceRequest {
            track_name: request.track_name,
            track_location: request.track_location,
            race_date: request.race_date,
            registration_closure_date: request.registration_closure_date,
            registered_drivers: request.registered_drivers,
        })
        .await?;

    Ok(Json(race_response(&state, &race).await?))
}

/// GET /api/races/{race_id}
pub async fn get_race(
    State(state): State<AppState>,
    Path(race_id): Path<i64>,
) -> Result<Json<RaceResponse>, ApiError> {
    let race = state.race_service.get(RaceId::new(race_id)).await?;
    Ok(Json(race_response(&state, &race).await?))
}

/// PUT /api/races/{race_id}
pub async fn update_race(
    State(state): State<AppState>,
    Path(race_id): Path<i64>,
    Json(request): Json<UpdateRaceApiRequest>,
) -> Result<Json<RaceResponse>, ApiError> {
    let race = state
        .race_service
        .update(
            RaceId::new(race_id),
            UpdateRaceRequest {
                track_name: request.track_name,
                track_location: request.track_location,
                race_date: request.race_date,
                registration_closure_date: request.registration_closure_date,
                registered_drivers: request.registered_drivers,
            },
        )
        .await?;

    Ok(Json(race_response(&state, &race).await?))
}

/// POST /api/races/{race_id}/drivers
pub async fn add_race_drivers(
    State(state): State<AppState>,
    Path(race_id): Path<i64>,
    Json(request): Json<AddDriversRequest>,
) -> Result<Json<AddDriversResponse>, ApiError> {
    let id = RaceId::new(race_id);
    let added = state.race_service.add_drivers(id, &request.drivers).await?;

    let race = state.race_service.get(id).await?;
    Ok(Json(AddDriversResponse {
        race: race_response(&state, &race).await?,
        added: added.iter().map(|d| d.full_name()).collect(),
    }))
}

/// PUT /api/races/{race_id}/drivers
pub async fn set_race_drivers(
    State(state): State<AppState>,
    Path(race_id): Path<i64>,
    Json(request): Json<SetRaceDriversRequest>,
) -> Result<Json<RaceResponse>, ApiError> {
    let id = RaceId::new(race_id);
    state.race_service.set_drivers(id, &request.drivers).await?;

    let race = state.race_service.get(id).await?;
    Ok(Json(race_response(&state, &race).await?))
}

/// DELETE /api/races/{race_id}
pub async fn delete_race(
    State(state): State<AppState>,
    Path(race_id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let outcome = state.race_service.delete(RaceId::new(race_id)).await?;
    Ok(Json(DeleteResponse::from(outcome)))
}

/// GET /api/races/{race_id}/deletable
pub async fn race_deletable(
    State(state): State<AppState>,
    Path(race_id): Path<i64>,
) -> Result<Json<DeletableResponse>, ApiError> {
    let check = state.race_service.can_delete(RaceId::new(race_id)).await;
    Ok(Json(DeletableResponse::from_check(check)?))
}
