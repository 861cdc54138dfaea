//! Team endpoints

use axum::extract::{Path, State};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DeletableResponse, DeleteResponse};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{
    DomainError, Driver, FieldError, LogoUpload, Team, TeamId, ValidationErrors, ValidationKind,
};
use crate::infrastructure::team::{CreateTeamRequest, UpdateTeamRequest};

/// Logo file submitted inline as base64
#[derive(Debug, Clone, Deserialize)]
pub struct LogoPayload {
    pub file_name: String,
    pub content: String,
}

impl LogoPayload {
    fn decode(self) -> Result<LogoUpload, DomainError> {
        let bytes = STANDARD.decode(self.content.trim()).map_err(|_| {
            DomainError::from(ValidationErrors::single(FieldError::new(
                "logo",
                ValidationKind::InvalidFormat,
                "Logo content is not valid base64.",
            )))
        })?;
        Ok(LogoUpload::new(self.file_name, bytes))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamApiRequest {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo: Option<LogoPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTeamApiRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub logo: Option<LogoPayload>,
}

/// Team with the names of the drivers it owns
#[derive(Debug, Clone, Serialize)]
pub struct TeamResponse {
    pub id: TeamId,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub logo: String,
    pub drivers: Vec<String>,
}

impl TeamResponse {
    fn new(team: &Team, drivers: &[Driver]) -> Self {
        Self {
            id: team.id(),
            name: team.name().to_string(),
            location: team.location().to_string(),
            description: team.description().map(String::from),
            logo: team.logo().to_string(),
            drivers: drivers.iter().map(Driver::full_name).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListTeamsResponse {
    pub teams: Vec<TeamResponse>,
    pub total: usize,
}

async fn team_response(state: &AppState, team: &Team) -> Result<TeamResponse, ApiError> {
    let drivers = state.team_service.drivers(team.id()).await?;
    Ok(TeamResponse::new(team, &drivers))
}

/// GET /api/teams
pub async fn list_teams(State(state): State<AppState>) -> Result<Json<ListTeamsResponse>, ApiError> {
    debug!("Listing teams");

    let teams = state.team_service.list().await?;
    let mut responses = Vec::with_capacity(teams.len());
    for team in &teams {
        responses.push(team_response(&state, team).await?);
    }

    Ok(Json(ListTeamsResponse {
        total: responses.len(),
        teams: responses,
    }))
}

/// POST /api/teams
pub async fn create_team(
    State(state): State<AppState>,
    Json(request): Json<CreateTeamApiRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    let logo = request.logo.map(LogoPayload::decode).transpose()?;

    let team = state
        .team_service
        .create(CreateTeamRequest {
            name: request.name,
            location: request.location,
            description: request.description,
            logo,
        })
        .await?;

    Ok(Json(TeamResponse::new(&team, &[])))
}

/// GET /api/teams/{team_id}
pub async fn get_team(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = state.team_service.get(TeamId::new(team_id)).await?;
    Ok(Json(team_response(&state, &team).await?))
}

/// PUT /api/teams/{team_id}
pub async fn update_team(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
    Json(request): Json<UpdateTeamApiRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    let logo = request.logo.map(LogoPayload::decode).transpose()?;

    let team = state
        .team_service
        .update(
            TeamId::new(team_id),
            UpdateTeamRequest {
                name: request.name,
                location: request.location,
                description: request.description,
                logo,
            },
        )
        .await?;

    Ok(Json(team_response(&state, &team).await?))
}

/// DELETE /api/teams/{team_id}
pub async fn delete_team(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let outcome = state.team_service.delete(TeamId::new(team_id)).await?;
    Ok(Json(DeleteResponse::from(outcome)))
}

/// GET /api/teams/{team_id}/deletable
pub async fn team_deletable(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
) -> Result<Json<DeletableResponse>, ApiError> {
    let check = state.team_service.can_delete(TeamId::new(team_id)).await;
    Ok(Json(DeletableResponse::from_check(check)?))
}
