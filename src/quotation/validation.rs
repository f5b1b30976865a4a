use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::models::{InvoiceValueInput, QuotationDetails, QuotationSubmission};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Field-level validation failures, keyed by the camelCase field name
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.summary())]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    /// Record the first error seen for a field
    fn add(&mut self, field: &'static str, message: &str) {
        self.fields
            .entry(field)
            .or_insert_with(|| message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<&'static str, String> {
        &self.fields
    }

    /// `field: message` pairs joined with `; `
    fn summary(&self) -> String {
        self.fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn required(errors: &mut ValidationErrors, field: &'static str, value: &str, message: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, message);
    }
    trimmed.to_string()
}

fn parse_invoice_value(errors: &mut ValidationErrors, input: Option<&InvoiceValueInput>) -> f64 {
    const FIELD: &str = "invoiceValue";

    let value = match input {
        None => {
            errors.add(FIELD, "Invoice value is required");
            return 0.0;
        }
        Some(InvoiceValueInput::Number(n)) => *n,
        Some(InvoiceValueInput::Text(text)) if text.trim().is_empty() => {
            errors.add(FIELD, "Invoice value is required");
            return 0.0;
        }
        Some(InvoiceValueInput::Text(text)) => match text.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => {
                errors.add(FIELD, "Must be a number");
                return 0.0;
            }
        },
    };

    if !value.is_finite() {
        errors.add(FIELD, "Must be a number");
    } else if value < 0.0 {
        errors.add(FIELD, "Invoice value cannot be negative");
    }
    value
}

/// Validate a submission, collecting every field error
pub fn validate_submission(
    submission: &QuotationSubmission,
) -> Result<QuotationDetails, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let first_name = required(&mut errors, "firstName", &submission.first_name, "First name is required");
    let last_name = required(&mut errors, "lastName", &submission.last_name, "Last name is required");

    let address = required(&mut errors, "address", &submission.address, "Address is required");
    let phone = required(&mut errors, "phone", &submission.phone, "Phone is required");
    let email = required(&mut errors, "email", &submission.email, "Email is required");
    if !email.is_empty() && !EMAIL_RE.is_match(&email) {
        errors.add("email", "Invalid email");
    }

    let auction_house = required(
        &mut errors,
        "auctionHouse",
        &submission.auction_house,
        "Auction house name is required",
    );
    let purchase_date_text = required(
        &mut errors,
        "purchaseDate",
        &submission.purchase_date,
        "Purchase date is required",
    );
    let purchase_date = if purchase_date_text.is_empty() {
        None
    } else {
        match NaiveDate::parse_from_str(&purchase_date_text, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add("purchaseDate", "Purchase date must be YYYY-MM-DD");
                None
            }
        }
    };

    let invoice_value = parse_invoice_value(&mut errors, submission.invoice_value.as_ref());
    let invoice_file = required(
        &mut errors,
        "invoiceFile",
        submission.invoice_file.as_deref().unwrap_or_default(),
        "Invoice file is required",
    );

    if submission.shipping_type.is_none() {
        errors.add("shippingType", "Shipping type is required");
    }
    if submission.destination.is_none() {
        errors.add("destination", "Destination is required");
    }
    if submission.weight.is_none() {
        errors.add("weight", "Weight is required");
    }

    let special_handling = submission
        .special_handling
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    match (
        purchase_date,
        submission.shipping_type,
        submission.destination,
        submission.weight,
    ) {
        (Some(purchase_date), Some(shipping_type), Some(destination), Some(weight))
            if errors.is_empty() =>
        {
            Ok(QuotationDetails {
                first_name,
                last_name,
                language: submission.language,
                address,
                phone,
                email,
                auction_house,
                purchase_date,
                invoice_received: submission.invoice_received,
                invoice_value,
                invoice_file,
                shipping_type,
                destination,
                weight,
                special_handling,
            })
        }
        _ => Err(errors),
    }
}

/// Normalize an email for lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{Destination, ShippingType, WeightTier};
    use crate::quotation::models::Language;

    fn valid_submission() -> QuotationSubmission {
        QuotationSubmission {
            first_name: "Ada".to_string(),
            last_name: "Muster".to_string(),
            language: Language::Fr,
            address: "Rue du Lac 1, 1003 Lausanne".to_string(),
            phone: "+41 21 000 00 00".to_string(),
            email: " Ada@Example.ch ".to_string(),
            auction_house: "Galerie Koller".to_string(),
            purchase_date: "2026-09-30".to_string(),
            invoice_value: Some(InvoiceValueInput::Number(1000.0)),
            invoice_file: Some("invoice-2026-0042.pdf".to_string()),
            shipping_type: Some(ShippingType::Postal),
            destination: Some(Destination::Switzerland),
            weight: Some(WeightTier::UpTo1),
            special_handling: Some("   ".to_string()),
            ..QuotationSubmission::default()
        }
    }

    #[test]
    fn test_valid_submission() {
        let details = validate_submission(&valid_submission()).unwrap();

        assert_eq!(details.email, "Ada@Example.ch");
        assert_eq!(details.purchase_date, NaiveDate::from_ymd_opt(2026, 9, 30).unwrap());
        assert_eq!(details.invoice_value, 1000.0);
        assert_eq!(details.special_handling, None);
        assert_eq!(details.language, Language::Fr);
    }

    #[test]
    fn test_collects_every_missing_field() {
        let errors = validate_submission(&QuotationSubmission::default()).unwrap_err();

        assert_eq!(errors.get("firstName"), Some("First name is required"));
        assert_eq!(errors.get("lastName"), Some("Last name is required"));
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("purchaseDate"), Some("Purchase date is required"));
        assert_eq!(errors.get("invoiceValue"), Some("Invoice value is required"));
        assert_eq!(errors.get("invoiceFile"), Some("Invoice file is required"));
        assert_eq!(errors.get("shippingType"), Some("Shipping type is required"));
        assert_eq!(errors.get("destination"), Some("Destination is required"));
        assert_eq!(errors.get("weight"), Some("Weight is required"));
        assert_eq!(errors.fields().len(), 12);
    }

    #[test]
    fn test_invalid_email() {
        let mut submission = valid_submission();
        submission.email = "not-an-email".to_string();

        let errors = validate_submission(&submission).unwrap_err();
        assert_eq!(errors.get("email"), Some("Invalid email"));
        assert_eq!(errors.fields().len(), 1);
    }

    #[test]
    fn test_invoice_value_text() {
        let mut submission = valid_submission();
        submission.invoice_value = Some(InvoiceValueInput::Text(" 250.5 ".to_string()));
        assert_eq!(validate_submission(&submission).unwrap().invoice_value, 250.5);

        submission.invoice_value = Some(InvoiceValueInput::Text("abc".to_string()));
        let errors = validate_submission(&submission).unwrap_err();
        assert_eq!(errors.get("invoiceValue"), Some("Must be a number"));
    }

    #[test]
    fn test_negative_invoice_value() {
        let mut submission = valid_submission();
        submission.invoice_value = Some(InvoiceValueInput::Number(-1.0));

        let errors = validate_submission(&submission).unwrap_err();
        assert_eq!(errors.get("invoiceValue"), Some("Invoice value cannot be negative"));
    }

    #[test]
    fn test_purchase_date_format() {
        let mut submission = valid_submission();
        submission.purchase_date = "30.09.2026".to_string();

        let errors = validate_submission(&submission).unwrap_err();
        assert_eq!(errors.get("purchaseDate"), Some("Purchase date must be YYYY-MM-DD"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.CH "), "ada@example.ch");
    }

    #[test]
    fn test_display_lists_fields() {
        let mut submission = valid_submission();
        submission.first_name.clear();
        submission.phone = "  ".to_string();

        let errors = validate_submission(&submission).unwrap_err();
        assert_eq!(
            errors.to_string(),
            "firstName: First name is required; phone: Phone is required"
        );
    }

    #[test]
    fn test_errors_convert_to_boxed_error() {
        let mut submission = valid_submission();
        submission.email = "not-an-email".to_string();

        let result: Result<(), Box<dyn std::error::Error>> =
            validate_submission(&submission).map(|_| ()).map_err(Into::into);
        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("email: "));
        assert!(err.downcast_ref::<ValidationErrors>().is_some());
    }
}
