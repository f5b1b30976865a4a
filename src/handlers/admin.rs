use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::AppState;
use crate::{
    auth::{self, AdminAuth, AdminSession},
    config::MAX_SESSION_TTL_SECONDS,
    error::AppError,
    metrics,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

/// Exchange the admin password for a session token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AdminSession>, AppError> {
    let Json(LoginRequest { password }) = payload?;

    let admin = state.settings.load().config.admin.clone();

    // argon2 verification blocks; run it on the blocking pool
    let verified = tokio::task::spawn_blocking(move || {
        auth::verify_password(&password, &admin.password_hash)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Password check failed: {}", e)))?;

    metrics::record_login(verified);

    if !verified {
        warn!("Admin login failed");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    let ttl_seconds = admin.session_ttl_seconds.min(MAX_SESSION_TTL_SECONDS) as i64;
    let session = state.sessions.issue(chrono::Duration::seconds(ttl_seconds));

    info!(expires_at = %session.expires_at, "Admin logged in");

    Ok(Json(session))
}

/// Revoke the session presented with this request
pub async fn logout(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
) -> StatusCode {
    state.sessions.revoke(&admin.token);
    info!("Admin logged out");
    StatusCode::NO_CONTENT
}
