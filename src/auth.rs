use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::{error::AppError, handlers::AppState};

/// Authenticated admin session attached to each admin request
#[derive(Debug, Clone)]
pub struct AdminAuth {
    pub token: String,
}

/// Issued admin session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Live admin sessions keyed by opaque token
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, DateTime<Utc>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session valid for `ttl`
    pub fn issue(&self, ttl: Duration) -> AdminSession {
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let expires_at = Utc::now() + ttl;
        self.sessions.insert(token.clone(), expires_at);
        AdminSession { token, expires_at }
    }

    /// Whether `token` names a live session; expired sessions are dropped
    pub fn validate(&self, token: &str) -> bool {
        self.validate_at(token, Utc::now())
    }

    fn validate_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        let expired = match self.sessions.get(token) {
            Some(expires_at) if *expires_at > now => return true,
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove(token);
        }
        false
    }

    /// Revoke a session; returns whether it existed
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drop every expired session, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut purged = 0;
        self.sessions.retain(|_, expires_at| {
            let keep = *expires_at > now;
            if !keep {
                purged += 1;
            }
            keep
        });
        purged
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Hash a password into an argon2 PHC string
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Check a password against a PHC string; malformed hashes never verify
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Configured admin password hash is malformed");
            false
        }
    }
}

/// Admin authentication middleware
/// Extracts the Bearer token from the Authorization header and checks it against live sessions
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = extract_bearer_token(auth_header)?.to_string();

    if !state.sessions.validate(&token) {
        return Err(AppError::Unauthorized(
            "Invalid or expired session".to_string(),
        ));
    }

    req.extensions_mut().insert(AdminAuth { token });

    Ok(next.run(req).await)
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(auth_header: &str) -> Result<&str, AppError> {
    const BEARER_PREFIX: &str = "Bearer ";

    let token = auth_header.strip_prefix(BEARER_PREFIX).ok_or_else(|| {
        AppError::Unauthorized("Authorization header must use Bearer scheme".to_string())
    })?;

    if token.is_empty() {
        return Err(AppError::Unauthorized("Bearer token is empty".to_string()));
    }

    Ok(token)
}
