//! Process and storage health endpoints

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::warn;

use super::state::AppState;
use crate::api::types::Json;
use crate::infrastructure::storage::Repositories;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageCheck>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Outcome of pinging the configured backend
#[derive(Debug, Serialize)]
pub struct StorageCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

impl HealthResponse {
    fn new(status: HealthStatus, storage: Option<StorageCheck>) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            storage,
        }
    }
}

/// Returns 200 while the process is up
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse::new(HealthStatus::Healthy, None)))
}

/// 200 when the store answers, 503 otherwise
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let check = check_storage(&state.repositories).await;
    let status = check.status;

    let code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (code, Json(HealthResponse::new(status, Some(check))))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn check_storage(repositories: &Repositories) -> StorageCheck {
    let start = Instant::now();
    let result = repositories.ping().await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let name = format!("storage_{}", repositories.storage_type());

    match result {
        Ok(()) => StorageCheck {
            name,
            status: HealthStatus::Healthy,
            message: None,
            latency_ms,
        },
        Err(e) => {
            warn!(check = %name, error = %e, "Storage readiness check failed");
            StorageCheck {
                name,
                status: HealthStatus::Unhealthy,
                message: Some(e.message()),
                latency_ms,
            }
        }
    }
}
