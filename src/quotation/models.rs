use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::{Destination, Estimate, QuoteRequest, ShippingType, WeightTier};

/// Correspondence language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

/// Whether the customer already holds the full auction invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceReceived {
    #[default]
    Yes,
    No,
}

/// Invoice value as typed into the form: a number or numeric text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InvoiceValueInput {
    Number(f64),
    Text(String),
}

/// Quotation request as posted by the form
///
/// Text fields default to empty so that missing and blank values are both
/// reported by validation instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationSubmission {
    // Personal info
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub language: Language,

    // Delivery address
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,

    // Auction details
    #[serde(default)]
    pub auction_house: String,
    #[serde(default)]
    pub purchase_date: String,
    #[serde(default)]
    pub invoice_received: InvoiceReceived,
    #[serde(default)]
    pub invoice_value: Option<InvoiceValueInput>,
    #[serde(default)]
    pub invoice_file: Option<String>,

    // Package details
    #[serde(default)]
    pub shipping_type: Option<ShippingType>,
    #[serde(default)]
    pub destination: Option<Destination>,
    #[serde(default)]
    pub weight: Option<WeightTier>,
    #[serde(default)]
    pub special_handling: Option<String>,
}

/// Validated quotation fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationDetails {
    pub first_name: String,
    pub last_name: String,
    pub language: Language,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub auction_house: String,
    pub purchase_date: NaiveDate,
    pub invoice_received: InvoiceReceived,
    pub invoice_value: f64,
    /// Reference to the uploaded invoice; storage lives outside this service
    pub invoice_file: String,
    pub shipping_type: ShippingType,
    pub destination: Destination,
    pub weight: WeightTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_handling: Option<String>,
}

impl QuotationDetails {
    /// Estimate request for this quotation, every optional line enabled
    pub fn quote_request(&self) -> QuoteRequest {
        QuoteRequest::new(
            self.shipping_type,
            self.destination,
            self.weight,
            Some(self.invoice_value),
        )
    }
}

/// Commercial status set by administrators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotationStatus {
    #[default]
    Pending,
    Approved,
    Paid,
    Shipped,
    Completed,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
        }
    }
}

/// Physical shipment progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentStatus {
    Pending,
    Shipped,
    Completed,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
        }
    }
}

/// Stored quotation
///
/// `estimate` is computed once at submission and then only displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: QuotationDetails,
    pub estimate: Estimate,
    pub status: QuotationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_status: Option<ShipmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

/// Body of `PATCH /api/quotation/:id/status`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: QuotationStatus,
}

/// Body of `PATCH /api/quotation/:id/shipment`
///
/// Omitted fields keep their value; a blank tracking number clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentUpdate {
    #[serde(default)]
    pub shipment_status: Option<ShipmentStatus>,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_submission_accepts_numeric_text() {
        let submission: QuotationSubmission = serde_json::from_value(json!({
            "firstName": "Ada",
            "invoiceValue": "1250.50",
            "destination": "USA, CANADA"
        }))
        .unwrap();

        assert_eq!(
            submission.invoice_value,
            Some(InvoiceValueInput::Text("1250.50".to_string()))
        );
        assert_eq!(submission.destination, Some(Destination::UsaCanada));
        assert_eq!(submission.language, Language::En);
        assert_eq!(submission.invoice_received, InvoiceReceived::Yes);
        assert!(submission.last_name.is_empty());
    }

    #[test]
    fn test_submission_rejects_unknown_language() {
        let result = serde_json::from_value::<QuotationSubmission>(json!({ "language": "de" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_value(QuotationStatus::Approved).unwrap(), json!("approved"));
        let update: StatusUpdate = serde_json::from_value(json!({ "status": "paid" })).unwrap();
        assert_eq!(update.status, QuotationStatus::Paid);
        assert!(serde_json::from_value::<StatusUpdate>(json!({ "status": "lost" })).is_err());
    }

    #[test]
    fn test_shipment_update_fields_are_optional() {
        let update: ShipmentUpdate =
            serde_json::from_value(json!({ "trackingNumber": "99.00.123" })).unwrap();
        assert_eq!(update.shipment_status, None);
        assert_eq!(update.tracking_number.as_deref(), Some("99.00.123"));
    }
}
