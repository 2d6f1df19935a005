use crate::presentation::http::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    storage: &'static str,
    backend: String,
    version: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage_up = state.catalog.is_some() && state.storage_status.available;
    let response = HealthResponse {
        status: if storage_up { "healthy" } else { "degraded" },
        storage: if storage_up { "up" } else { "down" },
        backend: state.storage_status.backend.clone(),
        version: env!("CARGO_PKG_VERSION"),
    };

    let code = if storage_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(response))
}
