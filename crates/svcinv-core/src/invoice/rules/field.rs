//! Marker-delimited field matching.
//!
//! A field value starts right after its marker and separator. Single-line
//! fields end with the marker's line. Multi-line fields keep consuming the
//! following lines until a line opens with one of the field's stop markers,
//! so a value never swallows the next field and never truncates itself at
//! its own first line break.
//!
//! A marker is anchored when it opens a line or is followed by a colon.
//! Single-line fields also accept a bare mid-line marker such as
//! "Fleet Repair Invoice 58812"; anchored occurrences are preferred over
//! those. Multi-line fields only accept anchored markers.

use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Colon and/or horizontal whitespace after a marker.
const SEPARATOR: &str = r"(?:[ \t]*:|[ \t])[ \t]*";

/// Static description of one field: its marker and what terminates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Marker name, e.g. "Complaint".
    pub marker: &'static str,
    /// Markers that end the value when they open a later line.
    pub stop_markers: &'static [&'static str],
    /// Match the marker names case-sensitively.
    pub case_sensitive: bool,
    /// Continue the value past the marker's own line.
    pub multiline: bool,
}

impl FieldSpec {
    /// A case-insensitive field whose value is the rest of the marker line.
    pub const fn single_line(marker: &'static str) -> Self {
        Self {
            marker,
            stop_markers: &[],
            case_sensitive: false,
            multiline: false,
        }
    }

    /// A case-insensitive field that spans lines until one of `stop_markers`.
    pub const fn multi_line(marker: &'static str, stop_markers: &'static [&'static str]) -> Self {
        Self {
            marker,
            stop_markers,
            case_sensitive: false,
            multiline: true,
        }
    }

    /// Same field with case-sensitive marker matching.
    pub const fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }
}

/// Location of a marker occurrence in a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerMatch {
    /// Byte offset of the marker name.
    pub start: usize,
    /// Byte offset where the value begins (after the separator).
    pub value_start: usize,
    /// The marker opens a line or is followed by a colon.
    pub anchored: bool,
}

/// A compiled [`FieldSpec`].
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    spec: FieldSpec,
    marker: Regex,
    stop: Option<Regex>,
}

impl FieldMatcher {
    /// Compile the marker and stop-marker patterns for `spec`.
    pub fn new(spec: FieldSpec) -> Result<Self, regex::Error> {
        let name = regex::escape(spec.marker);
        let anchored = format!(r"^[ \t]*(?P<a>{name}){SEPARATOR}|\b(?P<b>{name})[ \t]*:[ \t]*");
        let pattern = if spec.multiline {
            format!("(?m)(?:{anchored})")
        } else {
            format!(r"(?m)(?:{anchored}|\b(?P<c>{name})[ \t]+)")
        };
        let marker = RegexBuilder::new(&pattern)
            .case_insensitive(!spec.case_sensitive)
            .build()?;

        let stop = if spec.multiline && !spec.stop_markers.is_empty() {
            let names: Vec<String> = spec.stop_markers.iter().map(|m| regex::escape(m)).collect();
            let pattern = format!(r"^[ \t]*(?:{})\b(?:[ \t]*:|[ \t]|$)", names.join("|"));
            Some(
                RegexBuilder::new(&pattern)
                    .case_insensitive(!spec.case_sensitive)
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self { spec, marker, stop })
    }

    /// The spec this matcher was built from.
    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// Check whether the marker occurs anywhere in `text`.
    pub fn is_present(&self, text: &str) -> bool {
        self.marker.is_match(text)
    }

    /// Every marker occurrence in document order.
    pub fn markers<'t>(&'t self, text: &'t str) -> impl Iterator<Item = MarkerMatch> + 't {
        self.marker.captures_iter(text).filter_map(|caps| {
            let (name, anchored) = match caps.name("a").or_else(|| caps.name("b")) {
                Some(name) => (name, true),
                None => (caps.name("c")?, false),
            };
            Some(MarkerMatch {
                start: name.start(),
                value_start: caps.get(0)?.end(),
                anchored,
            })
        })
    }

    /// Marker occurrences in preference order: anchored ones first, then
    /// bare mid-line ones, each group in document order.
    pub fn candidates(&self, text: &str) -> Vec<MarkerMatch> {
        let mut found: Vec<MarkerMatch> = self.markers(text).collect();
        found.sort_by_key(|m| !m.anchored);
        found
    }

    /// Value of the preferred occurrence of the field.
    pub fn find(&self, text: &str) -> Option<String> {
        self.candidates(text)
            .first()
            .map(|m| self.value_at(text, m.value_start))
    }

    /// Values of every occurrence of the field, in preference order.
    pub fn find_all(&self, text: &str) -> Vec<String> {
        self.candidates(text)
            .iter()
            .map(|m| self.value_at(text, m.value_start))
            .collect()
    }

    /// Check whether `line` opens with one of the stop markers.
    pub fn is_stop_line(&self, line: &str) -> bool {
        self.stop.as_ref().is_some_and(|stop| stop.is_match(line))
    }

    fn value_at(&self, text: &str, start: usize) -> String {
        let mut lines = text[start..].lines();
        let first = lines.next().unwrap_or("");

        if !self.spec.multiline {
            return first.trim().to_string();
        }

        let mut captured = vec![first];
        for line in lines {
            if self.is_stop_line(line) {
                break;
            }
            captured.push(line);
        }

        // Trimming also drops blank lines left before a stop marker or the end.
        captured.join("\n").trim().to_string()
    }
}

/// Match a single field against `text`.
///
/// Returns `None` when the marker does not occur. A marker with nothing
/// after it yields `Some("")`.
pub fn match_field(text: &str, spec: &FieldSpec) -> Option<String> {
    match FieldMatcher::new(*spec) {
        Ok(matcher) => matcher.find(text),
        Err(e) => {
            warn!("Invalid field spec for {}: {}", spec.marker, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::patterns::{
        CAUSE_SPEC, COMPLAINT_SPEC, CUSTOMER_SPEC, DATE_SPEC, INVOICE_SPEC,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_stops_at_next_field() {
        let text = "Complaint: Engine overheating\nCause: Failed water pump";
        assert_eq!(
            match_field(text, &COMPLAINT_SPEC),
            Some("Engine overheating".to_string())
        );
        assert_eq!(
            match_field(text, &CAUSE_SPEC),
            Some("Failed water pump".to_string())
        );
    }

    #[test]
    fn test_multi_line_value() {
        let text = "Complaint: Driver reports grinding noise\n  when braking at low speed\nafter long hauls\nCorrection: Replaced pads";
        assert_eq!(
            match_field(text, &COMPLAINT_SPEC),
            Some("Driver reports grinding noise\n  when braking at low speed\nafter long hauls".to_string())
        );
    }

    #[test]
    fn test_trailing_blank_lines_dropped() {
        let text = "Complaint: No start\n\n\n   \nCause: Dead battery";
        assert_eq!(match_field(text, &COMPLAINT_SPEC), Some("No start".to_string()));
    }

    #[test]
    fn test_inner_blank_line_kept() {
        let text = "Complaint: No start\n\nAlso check lights\nCause: Dead battery";
        assert_eq!(
            match_field(text, &COMPLAINT_SPEC),
            Some("No start\n\nAlso check lights".to_string())
        );
    }

    #[test]
    fn test_value_runs_to_end_of_text() {
        let text = "Cause: Corroded terminals\nat both posts\n";
        assert_eq!(
            match_field(text, &CAUSE_SPEC),
            Some("Corroded terminals\nat both posts".to_string())
        );
    }

    #[test]
    fn test_stop_marker_with_leading_whitespace() {
        let text = "Complaint: Low power\n    CAUSE: clogged filter";
        assert_eq!(match_field(text, &COMPLAINT_SPEC), Some("Low power".to_string()));
    }

    #[test]
    fn test_stop_marker_needs_word_boundary() {
        // "Causes" is not the "Cause" marker
        let text = "Complaint: Rough idle\nCauses stalling at lights\nCause: Vacuum leak";
        assert_eq!(
            match_field(text, &COMPLAINT_SPEC),
            Some("Rough idle\nCauses stalling at lights".to_string())
        );
    }

    #[test]
    fn test_marker_without_colon_at_line_start() {
        let text = "Complaint Check engine light on\nCause O2 sensor";
        assert_eq!(
            match_field(text, &COMPLAINT_SPEC),
            Some("Check engine light on".to_string())
        );
    }

    #[test]
    fn test_prose_mention_is_not_a_block_marker() {
        let text = "Complaint: Leak, the cause of which is unknown\nCause: Cracked hose";
        assert_eq!(match_field(text, &CAUSE_SPEC), Some("Cracked hose".to_string()));
    }

    #[test]
    fn test_prose_mention_without_field_line() {
        let text = "Complaint: Leak\nCorrection: Traced the cause to a cracked hose";
        assert_eq!(match_field(text, &CAUSE_SPEC), None);
    }

    #[test]
    fn test_single_line_marker_mid_line() {
        let text = "Fleet Repair Invoice 58812\nIssued Date 03/15/2024\n";
        assert_eq!(match_field(text, &INVOICE_SPEC), Some("58812".to_string()));
        assert_eq!(match_field(text, &DATE_SPEC), Some("03/15/2024".to_string()));
    }

    #[test]
    fn test_anchored_marker_preferred() {
        let matcher = FieldMatcher::new(INVOICE_SPEC).unwrap();
        let text = "Payment due within 30 days of invoice receipt\nInvoice: A-17\n";

        assert_eq!(matcher.find(text), Some("A-17".to_string()));
        assert_eq!(
            matcher.find_all(text),
            vec!["A-17".to_string(), "receipt".to_string()]
        );

        let candidates = matcher.candidates(text);
        assert!(candidates[0].anchored);
        assert!(!candidates[1].anchored);
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let text = "COMPLAINT: brakes squeal\ncause: glazed rotors";
        assert_eq!(match_field(text, &COMPLAINT_SPEC), Some("brakes squeal".to_string()));
    }

    #[test]
    fn test_case_sensitive_spec() {
        let spec = COMPLAINT_SPEC.case_sensitive();
        assert_eq!(match_field("COMPLAINT: brakes", &spec), None);
        assert_eq!(match_field("Complaint: brakes", &spec), Some("brakes".to_string()));
    }

    #[test]
    fn test_absent_marker() {
        assert_eq!(match_field("Cause: something", &COMPLAINT_SPEC), None);
        assert_eq!(match_field("", &COMPLAINT_SPEC), None);
    }

    #[test]
    fn test_present_but_empty() {
        assert_eq!(match_field("Complaint:\nCause: x", &COMPLAINT_SPEC), Some(String::new()));
        assert_eq!(match_field("Complaint:", &COMPLAINT_SPEC), Some(String::new()));
    }

    #[test]
    fn test_value_on_following_line() {
        let text = "Complaint:\n  Trailer lights flicker\nCause: Chafed harness";
        assert_eq!(
            match_field(text, &COMPLAINT_SPEC),
            Some("Trailer lights flicker".to_string())
        );
    }

    #[test]
    fn test_single_line_field() {
        let text = "Customer: Acme Freight LLC\nVehicle: 2019 Volvo VNL";
        assert_eq!(match_field(text, &CUSTOMER_SPEC), Some("Acme Freight LLC".to_string()));
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "Complaint: Hard shifting\r\nfrom 2nd to 3rd\r\nCause: Worn clutch\r\n";
        assert_eq!(
            match_field(text, &COMPLAINT_SPEC),
            Some("Hard shifting\nfrom 2nd to 3rd".to_string())
        );
    }

    #[test]
    fn test_find_all_in_order() {
        let matcher = FieldMatcher::new(COMPLAINT_SPEC).unwrap();
        let text = "Complaint: one\nCause: a\nComplaint: two\nCause: b";
        assert_eq!(matcher.find_all(text), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_marker_position() {
        let matcher = FieldMatcher::new(COMPLAINT_SPEC).unwrap();
        let text = "header\n   Complaint: noise";
        let m = matcher.markers(text).next().unwrap();
        assert_eq!(&text[m.start..], "Complaint: noise");
        assert_eq!(&text[m.value_start..], "noise");
    }
}
