//! Header field extraction: identifier, date, customer and vehicle.
//!
//! Each field is extracted independently from the whole document. A value
//! that fails its shape check is treated as absent, never as an error.

use super::patterns::{
    CUSTOMER_FIELD, DATE_FIELD, DATE_SHAPE, EMAIL, EMPTY_BRACKETS, IDENTIFIER, INVOICE_FIELD,
    MILEAGE_FIELD, MILEAGE_VALUE, MILEAGE_WITH_UNIT, MODEL_YEAR, VEHICLE_FIELD, VEHICLE_LABEL,
    VIN_FIELD, VIN_TOKEN,
};
use crate::models::record::{Customer, InvoiceHeader, Vehicle};

/// Header extractor.
#[derive(Debug, Clone)]
pub struct HeaderExtractor {
    /// Require labeled VINs to have the 17-character shape.
    strict_vin: bool,
}

impl HeaderExtractor {
    pub fn new() -> Self {
        Self { strict_vin: true }
    }

    /// Set strict VIN validation.
    pub fn with_strict_vin(mut self, strict: bool) -> Self {
        self.strict_vin = strict;
        self
    }

    /// Extract every header field from the document text.
    pub fn extract(&self, text: &str) -> InvoiceHeader {
        InvoiceHeader {
            invoice_id: extract_identifier(text),
            date: extract_date(text),
            customer: extract_customer(text),
            vehicle: self.extract_vehicle(text),
        }
    }

    /// Extract the compound vehicle field plus the labeled VIN and mileage.
    pub fn extract_vehicle(&self, text: &str) -> Vehicle {
        let line = VEHICLE_FIELD.find(text).unwrap_or_default();
        let mut vehicle = parse_vehicle_line(&line);

        if let Some(vin) = VIN_FIELD.find(text).and_then(|v| self.labeled_vin(&v)) {
            vehicle.vin = Some(vin);
        }

        if let Some(mileage) = MILEAGE_FIELD.find(text).and_then(|v| parse_mileage(&v)) {
            vehicle.mileage = Some(mileage);
        }

        vehicle
    }

    fn labeled_vin(&self, value: &str) -> Option<String> {
        let token = value.split_whitespace().next()?;
        let token = token.trim_matches(|c: char| !c.is_ascii_alphanumeric());

        if self.strict_vin {
            is_vin(token).then(|| token.to_uppercase())
        } else {
            (token.len() >= 5 && token.chars().all(|c| c.is_ascii_alphanumeric()))
                .then(|| token.to_uppercase())
        }
    }
}

impl Default for HeaderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the invoice identifier.
///
/// Every "Invoice" marker is tried in preference order; the first one
/// followed by an identifier-shaped token containing a digit wins. This
/// skips headings such as "Invoice Date: ..." in favour of the real
/// "Invoice: INV-1001", and still finds "Fleet Repair Invoice 58812".
pub fn extract_identifier(text: &str) -> Option<String> {
    INVOICE_FIELD.find_all(text).into_iter().find_map(|value| {
        let token = value.split_whitespace().next()?;
        let caps = IDENTIFIER.captures(token)?;
        let id = &caps[1];
        id.chars().any(|c| c.is_ascii_digit()).then(|| id.to_string())
    })
}

/// Extract the invoice date (`M/D/YYYY`).
pub fn extract_date(text: &str) -> Option<String> {
    let value = DATE_FIELD.find(text)?;
    DATE_SHAPE.captures(&value).map(|caps| caps[1].to_string())
}

/// Extract the customer name and e-mail address.
pub fn extract_customer(text: &str) -> Customer {
    let Some(value) = CUSTOMER_FIELD.find(text) else {
        return Customer::default();
    };

    let email_match = EMAIL.find(&value);
    let email = email_match.map(|m| m.as_str().to_string());
    let name = match email_match {
        Some(m) => format!("{}{}", &value[..m.start()], &value[m.end()..]),
        None => value.clone(),
    };
    let name = EMPTY_BRACKETS.replace_all(&name, "");
    let name = name
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '|' | '-' | ':'))
        .to_string();

    Customer {
        name: (!name.is_empty()).then_some(name),
        email,
    }
}

/// Parse a "Vehicle:" value such as `2019 Freightliner Cascadia VIN 1FUJ... 245,000 mi`.
pub fn parse_vehicle_line(line: &str) -> Vehicle {
    let mut vehicle = Vehicle::default();
    let line = line.trim();
    if line.is_empty() {
        return vehicle;
    }

    let mut rest = line;
    if let Some(caps) = MODEL_YEAR.captures(line) {
        vehicle.year = caps[1].parse().ok();
        rest = &line[caps.get(0).map_or(0, |m| m.end())..];
    }

    // The description ends at the first VIN, label or mileage reading.
    let end = [
        VIN_TOKEN
            .find_iter(rest)
            .find(|m| is_vin(m.as_str()))
            .map(|m| m.start()),
        VEHICLE_LABEL.find(rest).map(|m| m.start()),
        MILEAGE_WITH_UNIT.find(rest).map(|m| m.start()),
    ]
    .into_iter()
    .flatten()
    .min()
    .unwrap_or(rest.len());

    let description = rest[..end]
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '|' | '-' | '('));
    let mut words = description.split_whitespace();
    vehicle.make = words.next().map(str::to_string);
    let model = words.collect::<Vec<_>>().join(" ");
    vehicle.model = (!model.is_empty()).then_some(model);

    vehicle.vin = VIN_TOKEN
        .find_iter(rest)
        .find(|m| is_vin(m.as_str()))
        .map(|m| m.as_str().to_uppercase());

    vehicle.mileage = MILEAGE_WITH_UNIT
        .captures(rest)
        .and_then(|caps| parse_mileage(&caps[1]));

    vehicle
}

/// Parse an odometer reading, ignoring thousands separators.
pub fn parse_mileage(value: &str) -> Option<u64> {
    let caps = MILEAGE_VALUE.captures(value.trim())?;
    caps[1]
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .ok()
}

/// 17 alphanumerics with at least one digit.
pub fn is_vin(token: &str) -> bool {
    token.len() == 17
        && token.chars().all(|c| c.is_ascii_alphanumeric())
        && token.chars().any(|c| c.is_ascii_digit())
}
