use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::AppState;
use crate::{
    error::AppError,
    logging::MaskedEmail,
    metrics,
    quotation::{validate_submission, Quotation, QuotationSubmission, ShipmentUpdate, StatusUpdate},
};

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    #[serde(default)]
    pub email: Option<String>,
}

/// Submit a quotation request
///
/// The stored estimate is recomputed here from the validated fields.
pub async fn submit_quotation(
    State(state): State<AppState>,
    payload: Result<Json<QuotationSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<Quotation>), AppError> {
    let Json(submission) = payload?;

    let details = validate_submission(&submission).map_err(|errors| {
        warn!(
            email = %MaskedEmail::new(&submission.email),
            fields = %errors,
            "Quotation submission rejected"
        );
        errors
    })?;

    let request = details.quote_request();
    let estimate = state.estimator().estimate(&request);
    metrics::record_estimate(&request, &estimate);

    let quotation = state.quotations.insert(details, estimate);
    metrics::record_submission(quotation.details.destination.as_str());

    info!(
        quotation_id = %quotation.id,
        email = %MaskedEmail::new(&quotation.details.email),
        shipping_type = %quotation.details.shipping_type,
        destination = %quotation.details.destination,
        weight = %quotation.details.weight,
        total = ?quotation.estimate.total,
        "Quotation submitted"
    );

    Ok((StatusCode::CREATED, Json(quotation)))
}

/// Quotations submitted with the given email, newest first
pub async fn list_by_email(
    State(state): State<AppState>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<Vec<Quotation>>, AppError> {
    let Query(query) = query?;

    let email = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AppError::BadRequest("Query parameter 'email' is required".to_string()))?;

    let quotations = state.quotations.list_by_email(email);
    debug!(
        email = %MaskedEmail::new(email),
        count = quotations.len(),
        "Listed quotations by email"
    );

    Ok(Json(quotations))
}

/// Every quotation, newest first (admin)
pub async fn list_all(State(state): State<AppState>) -> Json<Vec<Quotation>> {
    let quotations = state.quotations.list_all();
    debug!(count = quotations.len(), "Admin listed all quotations");
    Json(quotations)
}

/// Set the commercial status of a quotation (admin)
pub async fn update_status(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<Quotation>, AppError> {
    let id = quotation_id(id)?;
    let Json(update) = payload?;

    let quotation = state
        .quotations
        .update_status(&id, update.status)
        .ok_or_else(|| not_found(&id.to_string()))?;
    metrics::record_update("status");

    info!(
        quotation_id = %id,
        status = quotation.status.as_str(),
        "Quotation status updated"
    );

    Ok(Json(quotation))
}

/// Update shipment status and tracking number of a quotation (admin)
pub async fn update_shipment(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ShipmentUpdate>, JsonRejection>,
) -> Result<Json<Quotation>, AppError> {
    let id = quotation_id(id)?;
    let Json(update) = payload?;

    let quotation = state
        .quotations
        .update_shipment(&id, update)
        .ok_or_else(|| not_found(&id.to_string()))?;
    metrics::record_update("shipment");

    info!(
        quotation_id = %id,
        shipment_status = quotation.shipment_status.map(|s| s.as_str()),
        has_tracking_number = quotation.tracking_number.is_some(),
        "Quotation shipment updated"
    );

    Ok(Json(quotation))
}

/// A malformed id cannot name a stored quotation, so it is a 404 as well
fn quotation_id(id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, AppError> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "Rejected quotation id");
            Err(not_found("requested id"))
        }
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Quotation {} not found", id))
}
