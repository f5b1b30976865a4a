use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::models::{Destination, ShippingType, UnknownKey, WeightTier};
use super::table::{Fee, RateTable};

/// Errors raised while loading a rate table override
#[derive(Debug, thiserror::Error)]
pub enum RateTableError {
    #[error("failed to read rate table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported rate table format '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),
    #[error("failed to parse rate table: {0}")]
    Parse(String),
    #[error(transparent)]
    UnknownKey(#[from] UnknownKey),
    #[error("invalid price {value} for {cell}: prices must be finite and non-negative")]
    InvalidPrice { cell: String, value: f64 },
    #[error("invalid insurance rate {0}: must be in [0, 1)")]
    InvalidInsuranceRate(f64),
}

type Cells = HashMap<String, Option<f64>>;

/// Rate table file layout
///
/// Keys are the external names (`postal`, `EU COUNTRIES`, `>5`, ...). A file
/// replaces the whole table: a cell that is omitted (or `null` in JSON) is
/// unsupported.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateTableFile {
    pub insurance_rate: f64,
    pub shipping: HashMap<String, HashMap<String, Cells>>,
    #[serde(default)]
    pub packaging: Cells,
    #[serde(default, alias = "customDeclaration")]
    pub custom_declaration: Cells,
    #[serde(default)]
    pub forwarding: Cells,
}

impl TryFrom<RateTableFile> for RateTable {
    type Error = RateTableError;

    fn try_from(file: RateTableFile) -> Result<Self, Self::Error> {
        if !file.insurance_rate.is_finite() || !(0.0..1.0).contains(&file.insurance_rate) {
            return Err(RateTableError::InvalidInsuranceRate(file.insurance_rate));
        }

        let mut main = HashMap::new();
        for (method_name, zones) in &file.shipping {
            let method: ShippingType = method_name.parse()?;
            for (zone_name, cells) in zones {
                let zone: Destination = zone_name.parse()?;
                for (tier_name, price) in cells {
                    let tier: WeightTier = tier_name.parse()?;
                    let cell = format!("{} / {} / {}", method, zone, tier);
                    main.insert((method, zone, tier), check_price(&cell, *price)?);
                }
            }
        }

        let mut fees = HashMap::new();
        for (fee, cells) in [
            (Fee::Packaging, &file.packaging),
            (Fee::CustomDeclaration, &file.custom_declaration),
            (Fee::Forwarding, &file.forwarding),
        ] {
            for (tier_name, amount) in cells {
                let tier: WeightTier = tier_name.parse()?;
                let cell = format!("{} / {}", fee.as_str(), tier);
                fees.insert((fee, tier), check_price(&cell, *amount)?);
            }
        }

        Ok(RateTable::from_parts(main, file.insurance_rate, fees))
    }
}

fn check_price(cell: &str, price: Option<f64>) -> Result<Option<f64>, RateTableError> {
    match price {
        Some(value) if !value.is_finite() || value < 0.0 => Err(RateTableError::InvalidPrice {
            cell: cell.to_string(),
            value,
        }),
        other => Ok(other),
    }
}

/// Parse a rate table from TOML
pub fn parse_rate_table_toml(content: &str) -> Result<RateTable, RateTableError> {
    let file: RateTableFile =
        toml::from_str(content).map_err(|e| RateTableError::Parse(e.to_string()))?;
    RateTable::try_from(file)
}

/// Parse a rate table from JSON
pub fn parse_rate_table_json(content: &str) -> Result<RateTable, RateTableError> {
    let file: RateTableFile =
        serde_json::from_str(content).map_err(|e| RateTableError::Parse(e.to_string()))?;
    RateTable::try_from(file)
}

/// Load a rate table file, choosing the parser by extension
pub fn load_rate_table(path: &Path) -> Result<RateTable, RateTableError> {
    info!("Loading rate table from: {}", path.display());

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let content = std::fs::read_to_string(path).map_err(|source| RateTableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes of rate table data", content.len());

    let table = match extension.as_str() {
        "toml" => parse_rate_table_toml(&content)?,
        "json" => parse_rate_table_json(&content)?,
        other => return Err(RateTableError::UnsupportedFormat(other.to_string())),
    };

    info!("Loaded rate table with {} priced cells", table.priced_cells());
    Ok(table)
}

/// Rate table named by the configuration, or the standard tariff
pub fn resolve_rate_table(path: Option<&Path>) -> Result<RateTable, RateTableError> {
    match path {
        Some(path) => load_rate_table(path),
        None => Ok(RateTable::standard()),
    }
}
