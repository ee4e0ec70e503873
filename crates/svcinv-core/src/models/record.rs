//! Service invoice data models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

/// A structured service invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Caller-supplied document identifier (usually the source file name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,

    /// Fields found once per document.
    pub header: InvoiceHeader,

    /// Service entries in document order.
    #[serde(default)]
    pub services: Vec<ServiceEntry>,

    /// How much of the document could be structured.
    pub classification: Classification,

    /// Reason the record is failed, if it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<DocumentError>,
}

/// Invoice header: identifier, date, customer and vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    /// Invoice identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,

    /// Invoice date as written (`MM/DD/YYYY`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Customer information.
    #[serde(default)]
    pub customer: Customer,

    /// Vehicle information.
    #[serde(default)]
    pub vehicle: Vehicle,
}

impl InvoiceHeader {
    /// Interpret the date as a US month/day/year calendar date.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%m/%d/%Y").ok())
    }
}

/// The customer named on the invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Vehicle details. Every field is recovered independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Model year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,

    /// Manufacturer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,

    /// Model name (may contain several words).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Vehicle identification number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,

    /// Odometer reading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u64>,
}

impl Vehicle {
    /// Check if no vehicle detail was recovered.
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.make.is_none()
            && self.model.is_none()
            && self.vin.is_none()
            && self.mileage.is_none()
    }

    /// Format as "year make model", skipping absent parts.
    pub fn describe(&self) -> String {
        let year = self.year.map(|y| y.to_string());
        [year.as_deref(), self.make.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One repair or service performed on the vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    /// Number from an explicit "Service Block N" heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u32>,

    /// What the customer reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complaint: Option<String>,

    /// What was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,

    /// What was done.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction: Option<String>,

    /// Labor charged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor: Option<Labor>,

    /// Parts used, in listed order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<String>,
}

impl ServiceEntry {
    /// True when every sub-field is absent.
    pub fn is_degenerate(&self) -> bool {
        self.complaint.is_none()
            && self.cause.is_none()
            && self.correction.is_none()
            && self.labor.is_none()
            && self.parts.is_empty()
    }
}

/// Labor hours with an optional hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labor {
    pub hours: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
}

impl Labor {
    /// Hours multiplied by rate, when a rate is known.
    pub fn cost(&self) -> Option<Decimal> {
        self.rate.map(|rate| rate * self.hours)
    }
}

/// Outcome of structuring one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Identifier found and at least one service entry.
    Complete,
    /// Identifier found but no service entries.
    HeaderOnly,
    /// Identifier not recoverable.
    #[default]
    Failed,
}

impl Classification {
    /// Classify from identifier presence and entry count.
    pub fn of(has_identifier: bool, entries: usize) -> Self {
        match (has_identifier, entries) {
            (false, _) => Classification::Failed,
            (true, 0) => Classification::HeaderOnly,
            (true, _) => Classification::Complete,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Complete => "complete",
            Classification::HeaderOnly => "header_only",
            Classification::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InvoiceRecord {
    /// A failed record carrying only the document id and the reason.
    pub fn failed(document_id: Option<String>, reason: DocumentError) -> Self {
        Self {
            document_id,
            header: InvoiceHeader::default(),
            services: Vec::new(),
            classification: Classification::Failed,
            failure: Some(reason),
        }
    }

    /// Whether the record should be chunked and indexed.
    pub fn is_indexable(&self) -> bool {
        self.classification == Classification::Complete
    }

    /// Names of header fields that could not be recovered.
    pub fn missing_header_fields(&self) -> Vec<&'static str> {
        let header = &self.header;
        let mut missing = Vec::new();

        if header.invoice_id.is_none() {
            missing.push("invoice_id");
        }
        if header.date.is_none() {
            missing.push("date");
        }
        if header.customer.name.is_none() {
            missing.push("customer");
        }
        if header.vehicle.is_empty() {
            missing.push("vehicle");
        }

        missing
    }
}
