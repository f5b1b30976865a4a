use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use super::models::{Destination, ShippingType, WeightTier};

/// Per-tier surcharge tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fee {
    Packaging,
    CustomDeclaration,
    Forwarding,
}

impl Fee {
    pub const ALL: [Fee; 3] = [Fee::Packaging, Fee::CustomDeclaration, Fee::Forwarding];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Packaging => "packaging",
            Self::CustomDeclaration => "customDeclaration",
            Self::Forwarding => "forwarding",
        }
    }
}

/// Main shipping cell key
pub type RateKey = (ShippingType, Destination, WeightTier);

/// Decision table behind every estimate
///
/// A main cell is `Some(price)` or `None` for an unsupported combination; a
/// missing key is treated like `None`. Fee cells follow the same shape but
/// the estimator does not tell absent and zero apart for them.
#[derive(Debug, Clone)]
pub struct RateTable {
    main: HashMap<RateKey, Option<f64>>,
    insurance_rate: f64,
    fees: HashMap<(Fee, WeightTier), Option<f64>>,
}

static STANDARD: LazyLock<RateTable> = LazyLock::new(RateTable::standard);

impl RateTable {
    pub(crate) fn from_parts(
        main: HashMap<RateKey, Option<f64>>,
        insurance_rate: f64,
        fees: HashMap<(Fee, WeightTier), Option<f64>>,
    ) -> Self {
        Self {
            main,
            insurance_rate,
            fees,
        }
    }

    /// The published broker tariff (CHF)
    pub fn standard() -> Self {
        use Destination::*;
        use ShippingType::*;
        use WeightTier::*;

        const TIERS: [WeightTier; 4] = [UpTo1, UpTo2, UpTo5, Over5];

        let rows: [(ShippingType, Destination, [Option<f64>; 4]); 8] = [
            (Postal, Switzerland, [Some(25.0), Some(35.0), Some(55.0), None]),
            (Postal, EuCountries, [Some(35.0), Some(45.0), Some(65.0), None]),
            (Postal, UsaCanada, [Some(40.0), Some(55.0), Some(75.0), None]),
            (Postal, OtherCountries, [Some(45.0), Some(60.0), Some(85.0), None]),
            (Fast, Switzerland, [Some(40.0), Some(56.0), Some(88.0), None]),
            (Fast, EuCountries, [Some(56.0), Some(72.0), Some(104.0), None]),
            (Fast, UsaCanada, [Some(64.0), Some(88.0), Some(120.0), None]),
            (Fast, OtherCountries, [Some(72.0), Some(96.0), Some(136.0), None]),
        ];

        let mut main = HashMap::new();
        for (method, zone, prices) in rows {
            for (tier, price) in TIERS.into_iter().zip(prices) {
                main.insert((method, zone, tier), price);
            }
        }

        let fee_rows: [(Fee, [Option<f64>; 4]); 3] = [
            (Fee::Packaging, [Some(12.0), Some(14.0), Some(16.0), None]),
            (Fee::CustomDeclaration, [Some(9.0), Some(9.0), Some(9.0), None]),
            (Fee::Forwarding, [Some(3.0), Some(4.0), Some(5.0), None]),
        ];

        let mut fees = HashMap::new();
        for (fee, amounts) in fee_rows {
            for (tier, amount) in TIERS.into_iter().zip(amounts) {
                fees.insert((fee, tier), amount);
            }
        }

        Self::from_parts(main, 0.0083, fees)
    }

    /// Shared instance of [`RateTable::standard`]
    pub fn standard_ref() -> &'static RateTable {
        &STANDARD
    }

    /// Main shipping price, `None` when the combination is unsupported
    pub fn main_price(
        &self,
        shipping_type: ShippingType,
        destination: Destination,
        weight: WeightTier,
    ) -> Option<f64> {
        self.main
            .get(&(shipping_type, destination, weight))
            .copied()
            .flatten()
    }

    pub fn insurance_rate(&self) -> f64 {
        self.insurance_rate
    }

    /// Fee amount for a tier, `None` when the cell is absent or unset
    pub fn fee(&self, fee: Fee, weight: WeightTier) -> Option<f64> {
        self.fees.get(&(fee, weight)).copied().flatten()
    }

    /// Number of priced main-shipping cells
    pub fn priced_cells(&self) -> usize {
        self.main.values().filter(|cell| cell.is_some()).count()
    }

    /// Serializable view keyed by the external names
    pub fn snapshot(&self) -> RateTableSnapshot {
        let mut main: BTreeMap<&'static str, BTreeMap<&'static str, BTreeMap<&'static str, Option<f64>>>> =
            BTreeMap::new();
        for method in ShippingType::ALL {
            for zone in Destination::ALL {
                let cells = WeightTier::ALL
                    .into_iter()
                    .map(|tier| (tier.as_str(), self.main_price(method, zone, tier)))
                    .collect();
                main.entry(method.as_str()).or_default().insert(zone.as_str(), cells);
            }
        }

        let fee_view = |fee: Fee| -> BTreeMap<&'static str, Option<f64>> {
            WeightTier::ALL
                .into_iter()
                .map(|tier| (tier.as_str(), self.fee(fee, tier)))
                .collect()
        };

        RateTableSnapshot {
            shipping: main,
            insurance_rate: self.insurance_rate,
            packaging: fee_view(Fee::Packaging),
            custom_declaration: fee_view(Fee::CustomDeclaration),
            forwarding: fee_view(Fee::Forwarding),
        }
    }
}

/// Tables are equal when they price every cell the same; an absent key and
/// an explicit `None` are the same cell
impl PartialEq for RateTable {
    fn eq(&self, other: &Self) -> bool {
        let same_main = ShippingType::ALL.iter().all(|&method| {
            Destination::ALL.iter().all(|&zone| {
                WeightTier::ALL.iter().all(|&tier| {
                    self.main_price(method, zone, tier) == other.main_price(method, zone, tier)
                })
            })
        });
        let same_fees = Fee::ALL.iter().all(|&fee| {
            WeightTier::ALL
                .iter()
                .all(|&tier| self.fee(fee, tier) == other.fee(fee, tier))
        });
        same_main && same_fees && self.insurance_rate == other.insurance_rate
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Rate table as exposed over the API and printed by the CLI
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTableSnapshot {
    pub shipping: BTreeMap<&'static str, BTreeMap<&'static str, BTreeMap<&'static str, Option<f64>>>>,
    pub insurance_rate: f64,
    pub packaging: BTreeMap<&'static str, Option<f64>>,
    pub custom_declaration: BTreeMap<&'static str, Option<f64>>,
    pub forwarding: BTreeMap<&'static str, Option<f64>>,
}
