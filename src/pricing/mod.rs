//! Shipping price estimation
//!
//! The rate table is a decision table keyed by shipping type, destination
//! zone, and weight tier. [`Estimator`] turns a [`QuoteRequest`] into an
//! [`Estimate`]; it has no side effects and is safe to call on every form
//! change.

pub mod calculator;
pub mod loader;
pub mod models;
pub mod table;

pub use calculator::{calculate_estimate, estimate_with, round2, Estimator};
pub use loader::{
    load_rate_table, parse_rate_table_json, parse_rate_table_toml, resolve_rate_table,
    RateTableError, RateTableFile,
};
pub use models::{
    Breakdown, Destination, Estimate, LineItem, QuoteRequest, ShippingType, UnknownKey,
    WeightTier, UNSUPPORTED_MESSAGE,
};
pub use table::{Fee, RateTable, RateTableSnapshot};
