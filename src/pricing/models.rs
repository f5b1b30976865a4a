use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message returned in place of a breakdown when a combination has no main-shipping price
pub const UNSUPPORTED_MESSAGE: &str = "Please contact us for this option.";

/// Shipping method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingType {
    Postal,
    Fast,
}

impl ShippingType {
    pub const ALL: [ShippingType; 2] = [ShippingType::Postal, ShippingType::Fast];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postal => "postal",
            Self::Fast => "fast",
        }
    }
}

/// Destination zone
///
/// The serialized names include spaces and a comma; they are the values
/// stored with existing quotations and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Destination {
    #[serde(rename = "SWITZERLAND")]
    Switzerland,
    #[serde(rename = "EU COUNTRIES")]
    EuCountries,
    #[serde(rename = "USA, CANADA")]
    UsaCanada,
    #[serde(rename = "OTHER COUNTRIES")]
    OtherCountries,
}

impl Destination {
    pub const ALL: [Destination; 4] = [
        Destination::Switzerland,
        Destination::EuCountries,
        Destination::UsaCanada,
        Destination::OtherCountries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Switzerland => "SWITZERLAND",
            Self::EuCountries => "EU COUNTRIES",
            Self::UsaCanada => "USA, CANADA",
            Self::OtherCountries => "OTHER COUNTRIES",
        }
    }

    /// Domestic shipments never carry a customs declaration
    pub fn is_domestic(&self) -> bool {
        matches!(self, Self::Switzerland)
    }
}

/// Weight bucket
///
/// `>5` is a tag like the others, not a parseable weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeightTier {
    #[serde(rename = "1")]
    UpTo1,
    #[serde(rename = "2")]
    UpTo2,
    #[serde(rename = "5")]
    UpTo5,
    #[serde(rename = ">5")]
    Over5,
}

impl WeightTier {
    pub const ALL: [WeightTier; 4] = [
        WeightTier::UpTo1,
        WeightTier::UpTo2,
        WeightTier::UpTo5,
        WeightTier::Over5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpTo1 => "1",
            Self::UpTo2 => "2",
            Self::UpTo5 => "5",
            Self::Over5 => ">5",
        }
    }
}

/// Error for a string that names no known shipping type, zone, or tier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownKey {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

fn parse_key<T: Copy>(
    kind: &'static str,
    all: &[T],
    name: fn(&T) -> &'static str,
    s: &str,
) -> Result<T, UnknownKey> {
    all.iter()
        .find(|candidate| name(candidate) == s)
        .copied()
        .ok_or_else(|| UnknownKey {
            kind,
            value: s.to_string(),
            expected: all.iter().map(|c| format!("'{}'", name(c))).collect::<Vec<_>>().join(", "),
        })
}

impl FromStr for ShippingType {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key("shipping type", &Self::ALL, Self::as_str, s)
    }
}

impl FromStr for Destination {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key("destination", &Self::ALL, Self::as_str, s)
    }
}

impl FromStr for WeightTier {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key("weight tier", &Self::ALL, Self::as_str, s)
    }
}

impl fmt::Display for ShippingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for WeightTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_true() -> bool {
    true
}

/// Input to the estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub shipping_type: ShippingType,
    pub destination: Destination,
    pub weight: WeightTier,
    /// Declared invoice value; absent behaves like zero
    #[serde(default)]
    pub invoice_value: Option<f64>,
    #[serde(default = "default_true")]
    pub include_insurance: bool,
    #[serde(default = "default_true")]
    pub include_packaging: bool,
    #[serde(default = "default_true")]
    pub include_custom_declaration: bool,
    #[serde(default = "default_true")]
    pub include_forwarding: bool,
}

impl QuoteRequest {
    /// Request with every optional line enabled
    pub fn new(
        shipping_type: ShippingType,
        destination: Destination,
        weight: WeightTier,
        invoice_value: Option<f64>,
    ) -> Self {
        Self {
            shipping_type,
            destination,
            weight,
            invoice_value,
            include_insurance: true,
            include_packaging: true,
            include_custom_declaration: true,
            include_forwarding: true,
        }
    }
}

/// Named line of a breakdown, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineItem {
    Main,
    Insurance,
    Packaging,
    CustomDeclaration,
    Forwarding,
}

impl LineItem {
    /// Field name used in the serialized breakdown
    pub fn key(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Insurance => "insurance",
            Self::Packaging => "packaging",
            Self::CustomDeclaration => "customDeclaration",
            Self::Forwarding => "forwarding",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Main => "Main shipping",
            Self::Insurance => "Insurance",
            Self::Packaging => "Packaging",
            Self::CustomDeclaration => "Custom declaration",
            Self::Forwarding => "Forwarding",
        }
    }
}

/// Itemized charges of an estimate
///
/// Lines that do not apply are absent rather than zero. When `error` is
/// set, every numeric line is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_declaration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forwarding: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Breakdown {
    pub fn get(&self, item: LineItem) -> Option<f64> {
        match item {
            LineItem::Main => self.main,
            LineItem::Insurance => self.insurance,
            LineItem::Packaging => self.packaging,
            LineItem::CustomDeclaration => self.custom_declaration,
            LineItem::Forwarding => self.forwarding,
        }
    }

    pub(crate) fn set(&mut self, item: LineItem, amount: f64) {
        let slot = match item {
            LineItem::Main => &mut self.main,
            LineItem::Insurance => &mut self.insurance,
            LineItem::Packaging => &mut self.packaging,
            LineItem::CustomDeclaration => &mut self.custom_declaration,
            LineItem::Forwarding => &mut self.forwarding,
        };
        *slot = Some(amount);
    }

    /// Present lines in display order
    pub fn lines(&self) -> Vec<(LineItem, f64)> {
        [
            LineItem::Main,
            LineItem::Insurance,
            LineItem::Packaging,
            LineItem::CustomDeclaration,
            LineItem::Forwarding,
        ]
        .into_iter()
        .filter_map(|item| self.get(item).map(|amount| (item, amount)))
        .collect()
    }
}

/// Result of an estimate
///
/// `total` is `None` exactly when the combination is unsupported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub total: Option<f64>,
    pub breakdown: Breakdown,
}

impl Estimate {
    /// Estimate for a combination without a main-shipping price
    pub fn unsupported() -> Self {
        Self {
            total: None,
            breakdown: Breakdown {
                error: Some(UNSUPPORTED_MESSAGE.to_string()),
                ..Breakdown::default()
            },
        }
    }

    pub fn is_supported(&self) -> bool {
        self.total.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.breakdown.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_destination_wire_names() {
        assert_eq!(
            serde_json::to_value(Destination::UsaCanada).unwrap(),
            json!("USA, CANADA")
        );
        let parsed: Destination = serde_json::from_value(json!("EU COUNTRIES")).unwrap();
        assert_eq!(parsed, Destination::EuCountries);
    }

    #[test]
    fn test_weight_tier_is_a_tag() {
        let parsed: WeightTier = serde_json::from_value(json!(">5")).unwrap();
        assert_eq!(parsed, WeightTier::Over5);
        // Numbers are not accepted, tiers are strings
        assert!(serde_json::from_value::<WeightTier>(json!(5)).is_err());
    }

    #[test]
    fn test_from_str_matches_wire_names() {
        for destination in Destination::ALL {
            assert_eq!(destination.as_str().parse::<Destination>().unwrap(), destination);
        }
        for tier in WeightTier::ALL {
            assert_eq!(tier.as_str().parse::<WeightTier>().unwrap(), tier);
        }
        assert_eq!("fast".parse::<ShippingType>().unwrap(), ShippingType::Fast);
    }

    #[test]
    fn test_from_str_rejects_near_misses() {
        let err = "EU_COUNTRIES".parse::<Destination>().unwrap_err();
        assert_eq!(err.kind, "destination");
        assert!(err.to_string().contains("'EU COUNTRIES'"));
        assert!("Postal".parse::<ShippingType>().is_err());
        assert!("10".parse::<WeightTier>().is_err());
    }

    #[test]
    fn test_quote_request_toggles_default_to_true() {
        let request: QuoteRequest = serde_json::from_value(json!({
            "shippingType": "postal",
            "destination": "SWITZERLAND",
            "weight": "1",
            "invoiceValue": 1000
        }))
        .unwrap();

        assert!(request.include_insurance);
        assert!(request.include_packaging);
        assert!(request.include_custom_declaration);
        assert!(request.include_forwarding);
        assert_eq!(request.invoice_value, Some(1000.0));
    }

    #[test]
    fn test_unsupported_serializes_without_numeric_lines() {
        let value = serde_json::to_value(Estimate::unsupported()).unwrap();
        assert_eq!(
            value,
            json!({
                "total": null,
                "breakdown": { "error": "Please contact us for this option." }
            })
        );
    }

    #[test]
    fn test_breakdown_lines_in_display_order() {
        let breakdown = Breakdown {
            main: Some(25.0),
            forwarding: Some(3.0),
            packaging: Some(12.0),
            ..Breakdown::default()
        };

        let items: Vec<LineItem> = breakdown.lines().into_iter().map(|(item, _)| item).collect();
        assert_eq!(
            items,
            vec![LineItem::Main, LineItem::Packaging, LineItem::Forwarding]
        );
    }
}
