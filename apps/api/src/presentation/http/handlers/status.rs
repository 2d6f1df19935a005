use crate::presentation::http::state::{AppState, StorageStatus};
use axum::{Json, extract::State};
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct StatusResponse {
    pub storage: StorageStatus,
    pub catalog_file: String,
    pub upload_password_required: bool,
}

/// Which backend is active and whether it answered the startup probe.
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        storage: (*state.storage_status).clone(),
        catalog_file: state.config.catalog_file_name.clone(),
        upload_password_required: state.config.upload_gate_enabled(),
    })
}
