use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use super::AppState;

/// Health check endpoint
/// Returns 200 OK if the service is running
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "service": "shipquote",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Readiness check endpoint
/// Returns 200 OK once a rate table is loaded, with a short summary of it
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.settings.load();
    (StatusCode::OK, Json(json!({
        "status": "ready",
        "service": "shipquote",
        "priced_cells": settings.rates.priced_cells(),
        "quotations": state.quotations.len(),
    })))
}
