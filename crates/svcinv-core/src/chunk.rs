//! Retrieval chunks: one self-contained text per service entry.
//!
//! Every chunk repeats the invoice header so it can be understood without
//! the rest of the document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::record::{InvoiceRecord, ServiceEntry};

/// Placeholder rendered for absent header values.
pub const UNKNOWN: &str = "UNKNOWN";

/// A chunk ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// `{document_id}:{entry_index}`, or `{invoice_id}:{entry_index}` when
    /// the record has no document id.
    pub id: String,
    /// Text to embed.
    pub text: String,
    /// Flat string metadata stored next to the vector.
    pub metadata: BTreeMap<String, String>,
}

impl Chunk {
    /// Invoice identifier recorded in the metadata.
    pub fn invoice_id(&self) -> &str {
        self.metadata
            .get("invoice_id")
            .map(String::as_str)
            .unwrap_or(UNKNOWN)
    }
}

/// Build the chunks for a record.
///
/// Only complete records produce chunks, one per service entry, in entry
/// order.
pub fn chunks_for_record(record: &InvoiceRecord) -> Vec<Chunk> {
    if !record.is_indexable() {
        return Vec::new();
    }

    let metadata = header_metadata(record);
    let header = format_header(&metadata);
    let id_prefix = record
        .document_id
        .clone()
        .unwrap_or_else(|| metadata["invoice_id"].clone());

    record
        .services
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let mut metadata = metadata.clone();
            metadata.insert("entry_index".to_string(), index.to_string());
            if let Some(number) = entry.block_number {
                metadata.insert("block_number".to_string(), number.to_string());
            }

            Chunk {
                id: format!("{}:{}", id_prefix, index),
                text: format!("{}\n\n{}", header, format_entry(entry)),
                metadata,
            }
        })
        .collect()
}

fn header_metadata(record: &InvoiceRecord) -> BTreeMap<String, String> {
    let header = &record.header;
    let vehicle = &header.vehicle;
    let or_unknown = |value: Option<String>| value.unwrap_or_else(|| UNKNOWN.to_string());

    let mut metadata = BTreeMap::new();
    metadata.insert("invoice_id".to_string(), or_unknown(header.invoice_id.clone()));
    metadata.insert("date".to_string(), or_unknown(header.date.clone()));
    metadata.insert(
        "customer_name".to_string(),
        or_unknown(header.customer.name.clone()),
    );
    metadata.insert(
        "vehicle_year".to_string(),
        or_unknown(vehicle.year.map(|y| y.to_string())),
    );
    metadata.insert("vehicle_make".to_string(), or_unknown(vehicle.make.clone()));
    metadata.insert("vehicle_model".to_string(), or_unknown(vehicle.model.clone()));
    metadata.insert("vin".to_string(), or_unknown(vehicle.vin.clone()));
    metadata.insert(
        "mileage".to_string(),
        or_unknown(vehicle.mileage.map(|m| m.to_string())),
    );
    metadata.insert(
        "document_id".to_string(),
        or_unknown(record.document_id.clone()),
    );

    metadata
}

fn format_header(metadata: &BTreeMap<String, String>) -> String {
    format!(
        "Invoice: {}\nDate: {}\nCustomer: {}\nVehicle: {} {} {}\nVIN: {}\nMileage: {}",
        metadata["invoice_id"],
        metadata["date"],
        metadata["customer_name"],
        metadata["vehicle_year"],
        metadata["vehicle_make"],
        metadata["vehicle_model"],
        metadata["vin"],
        metadata["mileage"],
    )
}

fn format_entry(entry: &ServiceEntry) -> String {
    let parts = if entry.parts.is_empty() {
        "None listed".to_string()
    } else {
        entry.parts.join(", ")
    };

    let labor = match &entry.labor {
        Some(labor) => match labor.rate {
            Some(rate) => format!("{} hours @ ${}/hr", labor.hours, rate),
            None => format!("{} hours", labor.hours),
        },
        None => "Not specified".to_string(),
    };

    format!(
        "Complaint: {}\nCause: {}\nCorrection: {}\nParts Used: {}\nLabor: {}",
        entry.complaint.as_deref().unwrap_or(""),
        entry.cause.as_deref().unwrap_or(""),
        entry.correction.as_deref().unwrap_or(""),
        parts,
        labor,
    )
}
