//! Marker table and common regex patterns for service invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

use super::field::{FieldMatcher, FieldSpec};

// Header fields: found once per document, single-line.
pub const INVOICE_SPEC: FieldSpec = FieldSpec::single_line("Invoice");
pub const DATE_SPEC: FieldSpec = FieldSpec::single_line("Date");
pub const CUSTOMER_SPEC: FieldSpec = FieldSpec::single_line("Customer");
pub const VEHICLE_SPEC: FieldSpec = FieldSpec::single_line("Vehicle");
pub const VIN_SPEC: FieldSpec = FieldSpec::single_line("VIN");
pub const MILEAGE_SPEC: FieldSpec = FieldSpec::single_line("Mileage");

// Block fields: each stop set excludes its own marker and names every other field.
pub const COMPLAINT_SPEC: FieldSpec =
    FieldSpec::multi_line("Complaint", &["Cause", "Correction", "Labor", "Parts"]);
pub const CAUSE_SPEC: FieldSpec =
    FieldSpec::multi_line("Cause", &["Correction", "Labor", "Parts", "Complaint"]);
pub const CORRECTION_SPEC: FieldSpec =
    FieldSpec::multi_line("Correction", &["Labor", "Parts", "Complaint", "Cause"]);
pub const PARTS_SPEC: FieldSpec =
    FieldSpec::multi_line("Parts", &["Labor", "Complaint", "Cause", "Correction"]);
pub const LABOR_SPEC: FieldSpec = FieldSpec::single_line("Labor");

lazy_static! {
    // Compiled field matchers, shared read-only by every parse call
    pub static ref INVOICE_FIELD: FieldMatcher = FieldMatcher::new(INVOICE_SPEC).unwrap();
    pub static ref DATE_FIELD: FieldMatcher = FieldMatcher::new(DATE_SPEC).unwrap();
    pub static ref CUSTOMER_FIELD: FieldMatcher = FieldMatcher::new(CUSTOMER_SPEC).unwrap();
    pub static ref VEHICLE_FIELD: FieldMatcher = FieldMatcher::new(VEHICLE_SPEC).unwrap();
    pub static ref VIN_FIELD: FieldMatcher = FieldMatcher::new(VIN_SPEC).unwrap();
    pub static ref MILEAGE_FIELD: FieldMatcher = FieldMatcher::new(MILEAGE_SPEC).unwrap();

    pub static ref COMPLAINT_FIELD: FieldMatcher = FieldMatcher::new(COMPLAINT_SPEC).unwrap();
    pub static ref CAUSE_FIELD: FieldMatcher = FieldMatcher::new(CAUSE_SPEC).unwrap();
    pub static ref CORRECTION_FIELD: FieldMatcher = FieldMatcher::new(CORRECTION_SPEC).unwrap();
    pub static ref PARTS_FIELD: FieldMatcher = FieldMatcher::new(PARTS_SPEC).unwrap();
    pub static ref LABOR_FIELD: FieldMatcher = FieldMatcher::new(LABOR_SPEC).unwrap();

    // Explicit block heading: "Service Block 2:", "SERVICE BLOCK #2"
    pub static ref SERVICE_BLOCK: Regex = Regex::new(
        r"(?i)\bService[ \t]+Block[ \t]*#?[ \t]*(\d+)[ \t]*:?"
    ).unwrap();

    // Identifier token (first token of the invoice line)
    pub static ref IDENTIFIER: Regex = Regex::new(
        r"^#?([A-Za-z0-9][A-Za-z0-9_/\-]*)$"
    ).unwrap();

    // US date at the start of the date value
    pub static ref DATE_SHAPE: Regex = Regex::new(
        r"^(\d{1,2}/\d{1,2}/\d{4})\b"
    ).unwrap();

    // Email pattern
    pub static ref EMAIL: Regex = Regex::new(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"
    ).unwrap();

    // Brackets left behind once an e-mail address is cut out
    pub static ref EMPTY_BRACKETS: Regex = Regex::new(
        r"[(<\[][ \t]*[)>\]]"
    ).unwrap();

    // Vehicle line
    pub static ref MODEL_YEAR: Regex = Regex::new(
        r"^((?:19|20)\d{2})\b"
    ).unwrap();

    pub static ref VIN_TOKEN: Regex = Regex::new(
        r"(?i)\b[A-Z0-9]{17}\b"
    ).unwrap();

    pub static ref VEHICLE_LABEL: Regex = Regex::new(
        r"(?i)\b(?:VIN|Mileage|Odometer)\b"
    ).unwrap();

    pub static ref MILEAGE_VALUE: Regex = Regex::new(
        r"^(\d{1,3}(?:[,.]\d{3})+|\d+)\b"
    ).unwrap();

    pub static ref MILEAGE_WITH_UNIT: Regex = Regex::new(
        r"(?i)\b(\d{1,3}(?:[,.]\d{3})+|\d+)[ \t]*(?:mi|miles|km)\b"
    ).unwrap();

    // Labor value: hours, optional unit, optional @/$ rate
    pub static ref LABOR_VALUE: Regex = Regex::new(
        r"(?i)^(?P<hours>\d+(?:\.\d+)?|\.\d+)(?:[ \t]*(?:hours?|hrs?|h)\b\.?|\b)(?:[ \t]*[@$][ \t]*\$?[ \t]*(?P<rate>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?|\.\d+))?"
    ).unwrap();
}
