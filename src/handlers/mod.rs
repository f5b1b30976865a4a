//! HTTP handlers
//!
//! - estimate: live price preview
//! - quotations: customer submission and lookup, admin listing and updates
//! - admin: admin login/logout
//! - health, metrics_handler: operational endpoints

pub mod admin;
pub mod estimate;
pub mod health;
pub mod metrics_handler;
pub mod quotations;

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::{
    auth::SessionStore,
    config::Config,
    pricing::{Estimator, RateTable},
    quotation::QuotationStore,
};

/// Configuration and the rate table it names
///
/// Replaced as one value on reload, so a reader never pairs a table with
/// another configuration's currency.
#[derive(Debug)]
pub struct Settings {
    pub config: Config,
    pub rates: Arc<RateTable>,
}

/// Shared state for all API handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<ArcSwap<Settings>>,
    pub quotations: Arc<QuotationStore>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config, rates: RateTable) -> Self {
        Self {
            settings: Arc::new(ArcSwap::from_pointee(Settings {
                config,
                rates: Arc::new(rates),
            })),
            quotations: Arc::new(QuotationStore::new()),
            sessions: Arc::new(SessionStore::new()),
        }
    }

    /// Estimator over the rate table active right now
    ///
    /// A reload swapping the table does not affect an estimator already taken.
    pub fn estimator(&self) -> Estimator {
        Estimator::new(self.settings.load().rates.clone())
    }
}
