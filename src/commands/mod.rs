//! Command implementations for the CLI
//!
//! This module contains the implementation of all CLI commands:
//! - start: Start the quotation server
//! - test: Test configuration validity
//! - config: Configuration display and validation
//! - estimate: One-shot price estimate
//! - rates: Print the active rate table
//! - hash_password: Produce an admin password hash

pub mod config;
pub mod estimate;
pub mod hash_password;
pub mod rates;
pub mod start;

use anyhow::{Context, Result};
use shipquote::{
    config::load_config,
    pricing::{load_rate_table, RateTable},
};
use std::path::Path;

/// Rate table and currency for one-shot commands
///
/// An explicit rate table file wins; otherwise the configuration file is
/// used when present, and the standard tariff in CHF when it is not.
pub(crate) fn resolve_cli_rates(
    config_path: &Path,
    rates_path: Option<&Path>,
) -> Result<(RateTable, String)> {
    let config = if config_path.exists() {
        Some(load_config(config_path)?)
    } else {
        None
    };
    let currency = config
        .as_ref()
        .map(|cfg| cfg.pricing.currency.clone())
        .unwrap_or_else(|| "CHF".to_string());

    let table = match (rates_path, &config) {
        (Some(path), _) => load_rate_table(path)
            .with_context(|| format!("Failed to load rate table {}", path.display()))?,
        (None, Some(cfg)) => cfg.load_rate_table()?,
        (None, None) => RateTable::standard(),
    };

    Ok((table, currency))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_cli_rates_without_config() {
        let (table, currency) =
            resolve_cli_rates(Path::new("/nonexistent/config.toml"), None).unwrap();
        assert_eq!(table, RateTable::standard());
        assert_eq!(currency, "CHF");
    }

    #[test]
    fn test_resolve_cli_rates_with_rate_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"{"insurance_rate": 0.0, "shipping": {"fast": {"SWITZERLAND": {">5": 150}}}}"#,
        )
        .unwrap();

        let (table, _) =
            resolve_cli_rates(Path::new("/nonexistent/config.toml"), Some(file.path())).unwrap();
        assert_eq!(table.priced_cells(), 1);
    }
}
