use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;
use serde_json::Value;

use crate::{
    core::types::{DiagnosticResponse, HealthResponse, RootStatusResponse},
    AppState, SERVICE_NAME,
};

pub const API_VERSION: &str = "1.0.0";

pub async fn root() -> Json<RootStatusResponse> {
    Json(RootStatusResponse {
        message: "Nursery Registration API is running!".to_string(),
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: API_VERSION.to_string(),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        service: SERVICE_NAME.to_string(),
    })
}

pub async fn diagnostics() -> Json<DiagnosticResponse> {
    Json(DiagnosticResponse {
        message: "API endpoint is working!".to_string(),
        received_body: None,
        identity_provider_initialized: true,
        timestamp: Utc::now(),
    })
}

/// Echoes the request body; unparseable bodies echo as `{}`.
pub async fn diagnostics_echo(body: Result<Json<Value>, JsonRejection>) -> Json<DiagnosticResponse> {
    let received = body
        .map(|Json(value)| value)
        .unwrap_or_else(|_| serde_json::json!({}));
    Json(DiagnosticResponse {
        message: "POST API endpoint is working!".to_string(),
        received_body: Some(received),
        identity_provider_initialized: true,
        timestamp: Utc::now(),
    })
}
