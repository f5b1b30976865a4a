use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use tracing::{debug, info};

use super::AppState;
use crate::{
    error::AppError,
    metrics,
    pricing::{Estimate, QuoteRequest, RateTableSnapshot},
};

/// Live price preview
///
/// Pure function of the request and the active rate table. An unsupported
/// combination is a normal 200 response carrying `breakdown.error`.
pub async fn handle_estimate(
    State(state): State<AppState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<Estimate>, AppError> {
    let Json(request) = payload?;

    if let Some(value) = request.invoice_value {
        if !value.is_finite() || value < 0.0 {
            return Err(AppError::BadRequest(
                "invoiceValue must be a non-negative number".to_string(),
            ));
        }
    }

    let estimate = state.estimator().estimate(&request);
    metrics::record_estimate(&request, &estimate);

    match estimate.total {
        Some(total) => debug!(
            shipping_type = %request.shipping_type,
            destination = %request.destination,
            weight = %request.weight,
            total = total,
            "Estimate computed"
        ),
        None => info!(
            shipping_type = %request.shipping_type,
            destination = %request.destination,
            weight = %request.weight,
            "Estimate requested for unsupported combination"
        ),
    }

    Ok(Json(estimate))
}

#[derive(Debug, Serialize)]
pub struct RatesResponse {
    pub currency: String,
    #[serde(flatten)]
    pub table: RateTableSnapshot,
}

/// Active rate table, for building form option lists
pub async fn list_rates(State(state): State<AppState>) -> Json<RatesResponse> {
    let settings = state.settings.load();
    Json(RatesResponse {
        currency: settings.config.pricing.currency.clone(),
        table: settings.rates.snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::create_test_config;
    use crate::pricing::{Destination, RateTable, ShippingType, WeightTier};

    fn test_state() -> AppState {
        AppState::new(create_test_config(), RateTable::standard())
    }

    #[tokio::test]
    async fn test_handle_estimate_switzerland() {
        let request = QuoteRequest::new(
            ShippingType::Postal,
            Destination::Switzerland,
            WeightTier::UpTo1,
            Some(1000.0),
        );

        let Json(estimate) = handle_estimate(State(test_state()), Ok(Json(request)))
            .await
            .unwrap();
        assert_eq!(estimate.total, Some(48.3));
        assert_eq!(estimate.breakdown.custom_declaration, None);
    }

    #[tokio::test]
    async fn test_handle_estimate_rejects_negative_invoice() {
        let request = QuoteRequest::new(
            ShippingType::Fast,
            Destination::EuCountries,
            WeightTier::UpTo2,
            Some(-1.0),
        );

        let result = handle_estimate(State(test_state()), Ok(Json(request))).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_list_rates_includes_currency() {
        let Json(rates) = list_rates(State(test_state())).await;
        assert_eq!(rates.currency, "CHF");
    }
}
