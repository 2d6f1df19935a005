use axum::{
    extract::State,
    http::header,
    middleware::Next,
    response::Response,
};
use anyhow::Context;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::presentation::http::{errors::AppError, state::AppState};

pub const SESSION_SUBJECT: &str = "uploader";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: usize,
}

/// Signs an HS256 session token valid for `ttl_minutes`.
pub fn issue_session_token(secret: &str, ttl_minutes: i64) -> Result<(String, usize), AppError> {
    let exp = (chrono::Utc::now() + chrono::Duration::minutes(ttl_minutes)).timestamp() as usize;
    let claims = SessionClaims {
        sub: SESSION_SUBJECT.to_string(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("signing session token")?;
    Ok((token, exp))
}

/// Requires a valid session token when an upload password is configured;
/// passes every request through otherwise.
pub async fn require_upload_session(
    State(state): State<AppState>,
    mut req: axum::extract::Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.config.upload_gate_enabled() {
        return Ok(next.run(req).await);
    }
    let secret = state
        .config
        .session_secret
        .as_deref()
        .ok_or_else(|| AppError::Internal("Session secret not configured".into()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;

    let claims = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Unauthorized(format!("invalid session token: {}", e)))?
    .claims;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
