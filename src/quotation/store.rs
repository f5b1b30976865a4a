use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::models::{Quotation, QuotationDetails, QuotationStatus, ShipmentUpdate};
use super::validation::normalize_email;
use crate::pricing::Estimate;

/// In-memory quotation store
///
/// Entries are only touched through short `DashMap` guards; none is held
/// across an await point.
#[derive(Debug, Default)]
pub struct QuotationStore {
    quotations: DashMap<Uuid, Quotation>,
}

impl QuotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new pending quotation with its authoritative estimate
    pub fn insert(&self, details: QuotationDetails, estimate: Estimate) -> Quotation {
        let quotation = Quotation {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            details,
            estimate,
            status: QuotationStatus::Pending,
            shipment_status: None,
            tracking_number: None,
        };
        self.quotations.insert(quotation.id, quotation.clone());
        quotation
    }

    pub fn get(&self, id: &Uuid) -> Option<Quotation> {
        self.quotations.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.quotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotations.is_empty()
    }

    /// Quotations submitted with `email` (case-insensitive), newest first
    pub fn list_by_email(&self, email: &str) -> Vec<Quotation> {
        let wanted = normalize_email(email);
        let matching = self
            .quotations
            .iter()
            .filter(|entry| normalize_email(&entry.details.email) == wanted)
            .map(|entry| entry.value().clone())
            .collect();
        newest_first(matching)
    }

    /// Every quotation, newest first
    pub fn list_all(&self) -> Vec<Quotation> {
        let all = self
            .quotations
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        newest_first(all)
    }

    /// Set the commercial status; `None` if the id is unknown
    pub fn update_status(&self, id: &Uuid, status: QuotationStatus) -> Option<Quotation> {
        let mut entry = self.quotations.get_mut(id)?;
        entry.status = status;
        Some(entry.value().clone())
    }

    /// Apply a shipment update; `None` if the id is unknown
    pub fn update_shipment(&self, id: &Uuid, update: ShipmentUpdate) -> Option<Quotation> {
        let mut entry = self.quotations.get_mut(id)?;
        if let Some(status) = update.shipment_status {
            entry.shipment_status = Some(status);
        }
        if let Some(tracking_number) = update.tracking_number {
            let trimmed = tracking_number.trim();
            entry.tracking_number = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        Some(entry.value().clone())
    }
}

fn newest_first(mut quotations: Vec<Quotation>) -> Vec<Quotation> {
    quotations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    quotations
}
