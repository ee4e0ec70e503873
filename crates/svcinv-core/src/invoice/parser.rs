//! Record assembly: header pass plus block pass over the same text.

use std::time::Instant;

use tracing::{debug, info};

use crate::error::DocumentError;
use crate::models::config::ExtractionConfig;
use crate::models::record::{Classification, InvoiceRecord};

use super::rules::{block::extract_entries, header::HeaderExtractor};

/// Result of structuring one document.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Structured record.
    pub record: InvoiceRecord,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Structure one document. Never fails: unreadable documents come back
    /// as failed records.
    fn parse(&self, document_id: &str, text: &str) -> ExtractionResult;
}

/// Rule-based service invoice parser.
#[derive(Debug, Clone)]
pub struct ServiceInvoiceParser {
    header: HeaderExtractor,
    /// Keep header and entries recovered from a document without identifier.
    keep_partial_failures: bool,
}

impl ServiceInvoiceParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            header: HeaderExtractor::new(),
            keep_partial_failures: true,
        }
    }

    /// Create a parser from the extraction section of the configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_strict_vin(config.strict_vin)
            .with_keep_partial_failures(config.keep_partial_failures)
    }

    /// Set strict VIN validation.
    pub fn with_strict_vin(mut self, strict: bool) -> Self {
        self.header = self.header.with_strict_vin(strict);
        self
    }

    /// Keep or clear partially extracted data on failed records.
    pub fn with_keep_partial_failures(mut self, keep: bool) -> Self {
        self.keep_partial_failures = keep;
        self
    }

    /// Structure `text` into a record.
    ///
    /// Output depends on `text` alone, so repeated calls yield identical
    /// records.
    pub fn extract(&self, text: &str) -> InvoiceRecord {
        if text.trim().is_empty() {
            return InvoiceRecord::failed(None, DocumentError::EmptyText);
        }

        let header = self.header.extract(text);
        let services = extract_entries(text);
        let classification = Classification::of(header.invoice_id.is_some(), services.len());

        let mut record = InvoiceRecord {
            document_id: None,
            header,
            services,
            classification,
            failure: None,
        };

        if classification == Classification::Failed {
            record.failure = Some(DocumentError::IdentifierNotFound);
            if !self.keep_partial_failures {
                record.header = Default::default();
                record.services.clear();
            }
        }

        record
    }

    fn collect_warnings(&self, record: &InvoiceRecord) -> Vec<String> {
        if record.failure == Some(DocumentError::EmptyText) {
            return vec!["Document text is empty".to_string()];
        }

        let mut warnings: Vec<String> = record
            .missing_header_fields()
            .into_iter()
            .map(|field| format!("Could not extract {}", field))
            .collect();

        if record.services.is_empty() {
            warnings.push("Could not extract service entries".to_string());
        }

        for (i, entry) in record.services.iter().enumerate() {
            if entry.is_degenerate() {
                warnings.push(format!("Service entry {} has no readable fields", i + 1));
            }
        }

        warnings
    }
}

impl Default for ServiceInvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for ServiceInvoiceParser {
    fn parse(&self, document_id: &str, text: &str) -> ExtractionResult {
        let start = Instant::now();

        info!(
            "Parsing {} from {} characters of text",
            document_id,
            text.len()
        );

        let mut record = self.extract(text);
        record.document_id = Some(document_id.to_string());

        let warnings = self.collect_warnings(&record);
        for warning in &warnings {
            debug!("{}: {}", document_id, warning);
        }

        debug!(
            "Structured {} as {} with {} service entries",
            document_id,
            record.classification,
            record.services.len()
        );

        ExtractionResult {
            record,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const COMPLETE: &str = r#"
        ACME TRUCK REPAIR
        Invoice: 50231
        Date: 04/02/2024
        Customer: Northline Logistics
        Vehicle: 2020 Volvo VNL 860 4V4NC9EH5LN223344 312,040 mi

        Service Block 1:
        Complaint: Check engine light on
        Cause: Faulty NOx sensor
        Correction: Replaced NOx sensor, cleared codes
        Labor: 1.5 hrs @ $145.00
        Parts: NOx Sensor

        Service Block 2:
        Complaint: Driver door won't latch
        Correction: Adjusted striker
        Labor: 0.3 hrs
    "#;

    #[test]
    fn test_parse_complete_invoice() {
        let record = ServiceInvoiceParser::new().extract(COMPLETE);

        assert_eq!(record.classification, Classification::Complete);
        assert_eq!(record.failure, None);
        assert_eq!(record.header.invoice_id.as_deref(), Some("50231"));
        assert_eq!(record.header.vehicle.make.as_deref(), Some("Volvo"));
        assert_eq!(record.header.vehicle.model.as_deref(), Some("VNL 860"));
        assert_eq!(record.header.vehicle.mileage, Some(312_040));
        assert_eq!(record.services.len(), 2);
        assert_eq!(
            record.services[0].correction.as_deref(),
            Some("Replaced NOx sensor, cleared codes")
        );
        assert_eq!(record.services[1].cause, None);
        assert_eq!(record.services[1].parts, Vec::<String>::new());
    }

    #[test]
    fn test_header_only() {
        let text = "Invoice: 50232\nDate: 04/03/2024\nCustomer: Walk-in\nNotes: inspection only";
        let record = ServiceInvoiceParser::new().extract(text);

        assert_eq!(record.classification, Classification::HeaderOnly);
        assert!(record.services.is_empty());
        assert!(!record.is_indexable());
    }

    #[test]
    fn test_identifier_inside_heading_line() {
        let text = "Fleet Repair Invoice 58812\nComplaint: Dead battery\n";
        let record = ServiceInvoiceParser::new().extract(text);

        assert_eq!(record.header.invoice_id.as_deref(), Some("58812"));
        assert_eq!(record.classification, Classification::Complete);
    }

    #[test]
    fn test_missing_identifier_is_failed() {
        let text = "Customer: Northline\nComplaint: Flat tire\nCorrection: Patched";
        let record = ServiceInvoiceParser::new().extract(text);

        assert_eq!(record.classification, Classification::Failed);
        assert_eq!(record.failure, Some(DocumentError::IdentifierNotFound));
        assert_eq!(record.services.len(), 1);
        assert_eq!(record.header.customer.name.as_deref(), Some("Northline"));
    }

    #[test]
    fn test_failed_record_without_partials() {
        let text = "Customer: Northline\nComplaint: Flat tire";
        let record = ServiceInvoiceParser::new()
            .with_keep_partial_failures(false)
            .extract(text);

        assert_eq!(
            record,
            InvoiceRecord::failed(None, DocumentError::IdentifierNotFound)
        );
    }

    #[test]
    fn test_empty_text_is_failed() {
        let parser = ServiceInvoiceParser::new();

        for text in ["", "   \n\t\n"] {
            let record = parser.extract(text);
            assert_eq!(record.classification, Classification::Failed);
            assert_eq!(record.failure, Some(DocumentError::EmptyText));
        }
    }

    #[test]
    fn test_degenerate_entry_counts_toward_complete() {
        let text = "Invoice: 50233\nService Block 1:\nLabor: see notes\n";
        let result = ServiceInvoiceParser::new().parse("50233.pdf", text);

        assert_eq!(result.record.classification, Classification::Complete);
        assert!(result.record.services[0].is_degenerate());
        assert!(result
            .warnings
            .contains(&"Service entry 1 has no readable fields".to_string()));
    }

    #[test]
    fn test_inspection_only_blocks_are_counted() {
        let text = "Invoice: 700\n\
                    Service Block 1:\nOil change\n\
                    Service Block 2:\nTire rotation\n\
                    Service Block 3:\nAnnual DOT inspection\n";
        let record = ServiceInvoiceParser::new().extract(text);

        assert_eq!(record.classification, Classification::Complete);
        assert_eq!(record.services.len(), 3);
        assert!(record.services.iter().all(|e| e.is_degenerate()));
        assert_eq!(
            record.services.iter().map(|e| e.block_number).collect::<Vec<_>>(),
            vec![Some(1), Some(2), Some(3)]
        );
    }

    #[test]
    fn test_parse_sets_document_id_and_warnings() {
        let result = ServiceInvoiceParser::new().parse("scan_01.pdf", "");

        assert_eq!(result.record.document_id.as_deref(), Some("scan_01.pdf"));
        assert_eq!(result.warnings, vec!["Document text is empty".to_string()]);

        let result = ServiceInvoiceParser::new().parse("a.pdf", "Invoice: 77\n");
        assert_eq!(
            result.warnings,
            vec![
                "Could not extract date".to_string(),
                "Could not extract customer".to_string(),
                "Could not extract vehicle".to_string(),
                "Could not extract service entries".to_string(),
            ]
        );
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let parser = ServiceInvoiceParser::new();

        let first = serde_json::to_string(&parser.parse("a.pdf", COMPLETE).record).unwrap();
        let second = serde_json::to_string(&parser.parse("a.pdf", COMPLETE).record).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_from_config() {
        let config = ExtractionConfig {
            strict_vin: false,
            keep_partial_failures: false,
        };
        let parser = ServiceInvoiceParser::from_config(&config);

        let record = parser.extract("Invoice: 9\nVIN: UNIT42\n");
        assert_eq!(record.header.vehicle.vin.as_deref(), Some("UNIT42"));
    }
}
