//! Rule-based field extractors for service invoices.

pub mod field;
pub mod patterns;
pub mod header;
pub mod segment;
pub mod labor;
pub mod parts;
pub mod block;

pub use field::{match_field, FieldMatcher, FieldSpec, MarkerMatch};
pub use header::{extract_customer, extract_date, extract_identifier, HeaderExtractor};
pub use segment::{segment, Segment};
pub use labor::extract_labor;
pub use parts::extract_parts;
pub use block::{extract_entries, extract_entry};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

impl FieldExtractor for FieldMatcher {
    type Output = String;

    fn extract(&self, text: &str) -> Option<String> {
        self.find(text)
    }

    fn extract_all(&self, text: &str) -> Vec<String> {
        self.find_all(text)
    }
}
