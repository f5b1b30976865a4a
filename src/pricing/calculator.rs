use std::sync::Arc;

use super::models::{Breakdown, Estimate, LineItem, QuoteRequest};
use super::table::{Fee, RateTable};

/// Round to two decimals, ties away from zero
///
/// Amounts here are never negative, so this matches half-up rounding.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Estimator over a fixed rate table
///
/// Cloning is cheap; the table is shared.
#[derive(Debug, Clone)]
pub struct Estimator {
    table: Arc<RateTable>,
}

impl Estimator {
    pub fn new(table: Arc<RateTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RateTable {
        &self.table
    }

    /// Price a shipment
    ///
    /// Lines are accumulated in display order, each already rounded, and the
    /// sum is rounded once more. The total may therefore differ from the sum
    /// of the displayed lines by a cent; the total is authoritative.
    pub fn estimate(&self, request: &QuoteRequest) -> Estimate {
        estimate_with(&self.table, request)
    }
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new(Arc::new(RateTable::standard()))
    }
}

/// Price a shipment against the standard tariff
pub fn calculate_estimate(request: &QuoteRequest) -> Estimate {
    estimate_with(RateTable::standard_ref(), request)
}

/// Price a shipment against `table`
pub fn estimate_with(table: &RateTable, request: &QuoteRequest) -> Estimate {
    // Unsupported main cell short-circuits before any other line
    let Some(main) = table.main_price(request.shipping_type, request.destination, request.weight)
    else {
        return Estimate::unsupported();
    };

    let mut breakdown = Breakdown::default();
    let mut total = 0.0;

    let mut add = |item: LineItem, amount: f64| {
        breakdown.set(item, amount);
        total += amount;
    };

    add(LineItem::Main, main);

    if request.include_insurance {
        if let Some(invoice_value) = request.invoice_value.filter(|v| *v != 0.0) {
            add(LineItem::Insurance, round2(table.insurance_rate() * invoice_value));
        }
    }

    // Fee cells: absent and zero both mean "no line"
    let fee_amount = |fee: Fee| table.fee(fee, request.weight).filter(|amount| *amount != 0.0);

    if request.include_packaging {
        if let Some(amount) = fee_amount(Fee::Packaging) {
            add(LineItem::Packaging, amount);
        }
    }

    if request.include_custom_declaration && !request.destination.is_domestic() {
        if let Some(amount) = fee_amount(Fee::CustomDeclaration) {
            add(LineItem::CustomDeclaration, amount);
        }
    }

    if request.include_forwarding {
        if let Some(amount) = fee_amount(Fee::Forwarding) {
            add(LineItem::Forwarding, amount);
        }
    }

    Estimate {
        total: Some(round2(total)),
        breakdown,
    }
}
