//! Per-block field extraction.

use super::labor::extract_labor;
use super::parts::extract_parts;
use super::patterns::{CAUSE_FIELD, COMPLAINT_FIELD, CORRECTION_FIELD};
use super::segment::{segment, Segment};
use super::FieldExtractor;
use crate::models::record::ServiceEntry;

/// Build one service entry from a segment.
///
/// Every segment yields exactly one entry. A segment with no readable
/// field produces a degenerate entry rather than being skipped.
pub fn extract_entry(segment: &Segment<'_>) -> ServiceEntry {
    let text = segment.text;

    ServiceEntry {
        block_number: segment.number,
        complaint: COMPLAINT_FIELD.extract(text),
        cause: CAUSE_FIELD.extract(text),
        correction: CORRECTION_FIELD.extract(text),
        labor: extract_labor(text),
        parts: extract_parts(text),
    }
}

/// Segment `text` and extract every service entry in source order.
pub fn extract_entries(text: &str) -> Vec<ServiceEntry> {
    segment(text).iter().map(extract_entry).collect()
}
