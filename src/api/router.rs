use axum::{middleware, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::resources;
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Probes only; `/ready` needs state and is not mounted here
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .layer(TraceLayer::new_for_http())
}

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/api", resources::create_resource_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Full router plus the Prometheus endpoint when metrics are enabled
pub fn create_app_router(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    metrics_path: &str,
) -> Router {
    let router = create_router_with_state(state);

    match metrics {
        Some(m) => router.merge(create_metrics_router(m, metrics_path)),
        None => router,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use base64::{engine::general_purpose::STANDARD, Engine};
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::FixedClock;
    use crate::infrastructure::media::InMemoryLogoStore;
    use crate::infrastructure::storage::Repositories;

    fn app() -> Router {
        let today = NaiveDate::from_ymd_opt(2030, 3, 1).unwrap();
        let state = AppState::new(
            Repositories::in_memory(),
            Arc::new(InMemoryLogoStore::new()),
            Arc::new(FixedClock::new(today)),
        );
        create_router_with_state(state)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn logo(size: usize) -> Value {
        json!({ "file_name": "logo.png", "content": STANDARD.encode(vec![7u8; size]) })
    }

    async fn seed(app: &Router) -> (i64, i64, i64) {
        let (status, team) = call(
            app,
            Method::POST,
            "/api/teams",
            Some(json!({ "name": "Mercedes", "location": "Brackley", "logo": logo(64) })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", team);

        let (status, driver) = call(
            app,
            Method::POST,
            "/api/drivers",
            Some(json!({
                "first_name": "Lewis",
                "last_name": "Hamilton",
                "dob": "1985-01-07",
                "team": "Mercedes"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", driver);

        let (status, race) = call(
            app,
            Method::POST,
            "/api/races",
            Some(json!({
                "track_name": "Silverstone",
                "track_location": "Northamptonshire",
                "race_date": "2030-07-05",
                "registered_drivers": ["Lewis Hamilton"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", race);

        (
            team["id"].as_i64().unwrap(),
            driver["id"].as_i64().unwrap(),
            race["id"].as_i64().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_probes() {
        let app = app();

        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = call(&app, Method::GET, "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["storage"]["name"], "storage_memory");
        assert_eq!(body["storage"]["status"], "healthy");

        let (status, _) = call(&app, Method::GET, "/live", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn test_responses_carry_related_names() {
        let app = app();
        let (team_id, driver_id, race_id) = seed(&app).await;

        let (_, team) = call(&app, Method::GET, &format!("/api/teams/{}", team_id), None).await;
        assert_eq!(team["drivers"], json!(["Lewis Hamilton"]));

        let (_, driver) = call(&app, Method::GET, &format!("/api/drivers/{}", driver_id), None).await;
        assert_eq!(driver["team"], "Mercedes");
        assert_eq!(driver["races"], json!(["Silverstone on 2030-07-05"]));

        let (_, races) = call(&app, Method::GET, "/api/races", None).await;
        assert_eq!(races["total"], 1);
        assert_eq!(races["races"][0]["id"], race_id);
        assert_eq!(races["races"][0]["registered_drivers"], json!(["Lewis Hamilton"]));
    }

    #[tokio::test]
    async fn test_guarded_deletes_are_refused() {
        let app = app();
        let (team_id, driver_id, race_id) = seed(&app).await;

        for uri in [
            format!("/api/teams/{}", team_id),
            format!("/api/drivers/{}", driver_id),
            format!("/api/races/{}", race_id),
        ] {
            let (status, body) = call(&app, Method::GET, &format!("{}/deletable", uri), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["deletable"], false);

            let (status, body) = call(&app, Method::DELETE, &uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "referential_conflict");
        }
    }

    #[tokio::test]
    async fn test_team_delete_cascades_once_registrations_are_cleared() {
        let app = app();
        let (team_id, driver_id, race_id) = seed(&app).await;

        let (status, race) = call(
            &app,
            Method::PUT,
            &format!("/api/races/{}/drivers", race_id),
            Some(json!({ "drivers": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(race["registered_drivers"], json!([]));

        let (_, check) = call(&app, Method::GET, &format!("/api/teams/{}/deletable", team_id), None).await;
        assert_eq!(check["deletable"], true);

        let (status, body) = call(&app, Method::DELETE, &format!("/api/teams/{}", team_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cascaded_drivers"], 1);

        let (status, _) = call(&app, Method::GET, &format!("/api/drivers/{}", driver_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_adding_registered_driver_is_rejected() {
        let app = app();
        let (_, _, race_id) = seed(&app).await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/races/{}/drivers", race_id),
            Some(json!({ "drivers": ["Lewis Hamilton"] })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields = body["error"]["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0]["field"], "drivers");
        assert_eq!(fields[0]["kind"], "already_registered");
        assert!(fields[0]["message"].as_str().unwrap().contains("Lewis Hamilton"));
    }

    #[tokio::test]
    async fn test_validation_errors_list_fields() {
        let app = app();

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/races",
            Some(json!({
                "track_name": "Monza",
                "track_location": "Italy",
                "race_date": "2030-02-01",
                "registration_closure_date": "2030-02-15"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = body["error"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"race_date"));
    }

    #[tokio::test]
    async fn test_oversized_logo_is_rejected() {
        let app = app();

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/teams",
            Some(json!({ "name": "Ferrari", "location": "Maranello", "logo": logo(50 * 1024 + 1) })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"][0]["kind"], "size_exceeded");
    }

    #[tokio::test]
    async fn test_unknown_team_name_is_a_field_error() {
        let app = app();

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/drivers",
            Some(json!({
                "first_name": "Max",
                "last_name": "Verstappen",
                "dob": "1997-09-30",
                "team": "Red Bull"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"][0]["field"], "team");
        assert_eq!(body["error"]["fields"][0]["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_missing_records_are_not_found() {
        let app = app();

        let (status, body) = call(&app, Method::GET, "/api/races/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found_error");
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_envelope() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/teams")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "json_parse_error");
    }
}
