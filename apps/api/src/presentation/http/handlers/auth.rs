use crate::presentation::http::{
    errors::AppError, middleware::upload_gate::issue_session_token, state::AppState,
};
use anyhow::Context;
use axum::{Json, extract::State};
use bcrypt::verify;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    /// Unix timestamp after which the token is rejected
    pub expires_at: usize,
}

/// Exchanges the shared upload password for a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (Some(hash), Some(secret)) = (
        state.config.upload_password_hash.as_deref(),
        state.config.session_secret.as_deref(),
    ) else {
        return Err(AppError::BadRequest(
            "Uploads are not password protected".into(),
        ));
    };

    let valid = verify(&body.password, hash).context("verifying upload password")?;
    if !valid {
        return Err(AppError::Forbidden("Invalid credentials".to_string()));
    }

    let (token, expires_at) = issue_session_token(secret, state.config.session_ttl_minutes)?;

    tracing::info!("Upload session opened");
    Ok(Json(LoginResponse { token, expires_at }))
}
