use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::pricing::{Estimate, QuoteRequest};

/// Install the global Prometheus recorder
///
/// Fails if a recorder is already installed in this process.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "shipquote_estimates_total",
        "Total number of price estimates computed"
    );
    describe_histogram!(
        "shipquote_estimate_total_amount",
        "Total of priced estimates, in the configured currency"
    );
    describe_counter!(
        "shipquote_quotations_submitted_total",
        "Total number of quotations submitted"
    );
    describe_counter!(
        "shipquote_quotation_updates_total",
        "Total number of admin updates to quotations"
    );
    describe_counter!(
        "shipquote_admin_logins_total",
        "Total number of admin login attempts"
    );
    describe_gauge!(
        "shipquote_quotations_stored",
        "Number of quotations held in memory"
    );
    describe_gauge!(
        "shipquote_admin_sessions",
        "Number of admin sessions not yet purged"
    );
    describe_gauge!(
        "shipquote_info",
        "Service version and build information"
    );

    gauge!("shipquote_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record an estimate and its outcome
pub fn record_estimate(request: &QuoteRequest, estimate: &Estimate) {
    let outcome = if estimate.is_supported() { "priced" } else { "unsupported" };

    counter!(
        "shipquote_estimates_total",
        "shipping_type" => request.shipping_type.as_str(),
        "destination" => request.destination.as_str(),
        "weight" => request.weight.as_str(),
        "outcome" => outcome,
    )
    .increment(1);

    if let Some(total) = estimate.total {
        histogram!("shipquote_estimate_total_amount").record(total);
    }
}

/// Record a stored quotation
pub fn record_submission(destination: &str) {
    counter!(
        "shipquote_quotations_submitted_total",
        "destination" => destination.to_string(),
    )
    .increment(1);
}

/// Record an admin update, `kind` is `status` or `shipment`
pub fn record_update(kind: &'static str) {
    counter!("shipquote_quotation_updates_total", "kind" => kind).increment(1);
}

/// Record an admin login attempt
pub fn record_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("shipquote_admin_logins_total", "outcome" => outcome).increment(1);
}

/// Record the current size of the in-memory stores
pub fn record_store_sizes(quotations: usize, sessions: usize) {
    gauge!("shipquote_quotations_stored").set(quotations as f64);
    gauge!("shipquote_admin_sessions").set(sessions as f64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{calculate_estimate, Destination, ShippingType, WeightTier};

    #[test]
    fn test_record_metrics() {
        init_metric_descriptions();

        let request = QuoteRequest::new(
            ShippingType::Postal,
            Destination::OtherCountries,
            WeightTier::Over5,
            Some(100.0),
        );
        record_estimate(&request, &calculate_estimate(&request));
        record_submission("OTHER COUNTRIES");
        record_update("status");
        record_login(false);
        record_store_sizes(3, 1);

        // Without an installed recorder these are no-ops; just verify they don't panic
    }
}
