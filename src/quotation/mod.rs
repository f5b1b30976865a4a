//! Submitted quotations: validation, records, and the in-memory store

pub mod models;
pub mod store;
pub mod validation;

pub use models::{
    InvoiceReceived, InvoiceValueInput, Language, Quotation, QuotationDetails, QuotationStatus,
    QuotationSubmission, ShipmentStatus, ShipmentUpdate, StatusUpdate,
};
pub use store::QuotationStore;
pub use validation::{normalize_email, validate_submission, ValidationErrors};
