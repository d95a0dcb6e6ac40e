use std::collections::BTreeMap;

use axum::http::{header, StatusCode};
use axum::{extract::State, response::IntoResponse, Json};

use crate::core::metrics;
use crate::core::redis::RedisHealth;
use crate::core::state::AppState;
use crate::schemas::{HealthResponse, HealthStatus, RootResponse};

pub(crate) async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let api = state.settings().api();

    Json(RootResponse {
        message: api.project_name.clone(),
        version: api.version.clone(),
        docs_url: format!("{}/docs", api.api_v1_str),
    })
}

/// Database problems make the service unhealthy; a failing Redis only
/// degrades it since draft throttling fails open.
pub(crate) async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut components = BTreeMap::new();
    let mut status = HealthStatus::Healthy;

    match sqlx::query("SELECT 1").execute(state.db()).await {
        Ok(_) => {
            components.insert("database", "healthy".to_string());
        }
        Err(err) => {
            components.insert("database", format!("unhealthy: {err}"));
            status = HealthStatus::Unhealthy;
        }
    }

    let redis = match state.redis().health().await {
        RedisHealth::Healthy => "healthy".to_string(),
        RedisHealth::Disconnected => "disconnected".to_string(),
        RedisHealth::Unhealthy(error) => {
            status = status.max(HealthStatus::Degraded);
            format!("unhealthy: {error}")
        }
    };
    components.insert("redis", redis);

    Json(HealthResponse { service: "examonline-api", status, components })
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings().telemetry().prometheus_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    let Some(body) = metrics::render() else {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response()
}
