use std::str::FromStr;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use svcinv_core::{
    chunks_for_record, extract_batch, Classification, DocumentError, InvoiceParser, Labor,
    ServiceInvoiceParser,
};

const SHOP_INVOICE: &str = "\
HIGHWAY DIESEL & FLEET SERVICE
1200 Industrial Pkwy, Dayton OH

Invoice: HD-24-0917
Date: 09/17/2024
Customer: Ridgeway Transport (ap@ridgewaytransport.com)
Vehicle: 2018 Peterbilt 579 1XPBDP9X4JD501234
Mileage: 412,887

Service Block 1:
Complaint: Driver reports air leak at rear axle,
audible when parked.
Cause: Cracked air line fitting at
rear brake chamber.
Correction: Replaced fitting and tested system
for leaks.
Labor: 0.75 hrs @ $125.50
Parts: 3/8 Air Fitting, Thread Sealant

Service Block 2:
Cause: Worn wiper blades
Complaint: Streaking windshield
Parts: Wiper Blade (2)
Labor: .25

Service Block 3:
Correction: Performed 90-day DOT inspection
Labor: DOT rate

Thank you for your business!
";

#[test]
fn test_structures_shop_invoice() {
    let result = ServiceInvoiceParser::new().parse("HD-24-0917.pdf", SHOP_INVOICE);
    let record = &result.record;

    assert_eq!(record.classification, Classification::Complete);
    assert_eq!(record.header.invoice_id.as_deref(), Some("HD-24-0917"));
    assert_eq!(record.header.date.as_deref(), Some("09/17/2024"));
    assert_eq!(record.header.customer.name.as_deref(), Some("Ridgeway Transport"));
    assert_eq!(
        record.header.customer.email.as_deref(),
        Some("ap@ridgewaytransport.com")
    );

    let vehicle = &record.header.vehicle;
    assert_eq!(vehicle.year, Some(2018));
    assert_eq!(vehicle.make.as_deref(), Some("Peterbilt"));
    assert_eq!(vehicle.model.as_deref(), Some("579"));
    assert_eq!(vehicle.vin.as_deref(), Some("1XPBDP9X4JD501234"));
    assert_eq!(vehicle.mileage, Some(412_887));

    assert_eq!(record.services.len(), 3);

    let first = &record.services[0];
    assert_eq!(
        first.complaint.as_deref(),
        Some("Driver reports air leak at rear axle,\naudible when parked.")
    );
    assert_eq!(
        first.cause.as_deref(),
        Some("Cracked air line fitting at\nrear brake chamber.")
    );
    assert_eq!(
        first.correction.as_deref(),
        Some("Replaced fitting and tested system\nfor leaks.")
    );
    assert_eq!(
        first.labor,
        Some(Labor {
            hours: Decimal::from_str("0.75").unwrap(),
            rate: Some(Decimal::from_str("125.50").unwrap()),
        })
    );
    assert_eq!(first.parts, vec!["3/8 Air Fitting", "Thread Sealant"]);

    let second = &record.services[1];
    assert_eq!(second.complaint.as_deref(), Some("Streaking windshield"));
    assert_eq!(second.cause.as_deref(), Some("Worn wiper blades"));
    assert_eq!(second.parts, vec!["Wiper Blade (2)"]);
    assert_eq!(second.labor.map(|l| l.hours), Decimal::from_str("0.25").ok());

    let third = &record.services[2];
    assert_eq!(third.block_number, Some(3));
    assert_eq!(third.labor, None);
    assert_eq!(
        third.correction.as_deref(),
        Some("Performed 90-day DOT inspection")
    );
}

#[test]
fn test_trailing_boilerplate_stays_out_of_last_block() {
    let record = ServiceInvoiceParser::new().extract(SHOP_INVOICE);
    let last = record.services.last().unwrap();

    assert!(
        !last
            .correction
            .as_deref()
            .unwrap_or_default()
            .contains("Thank you")
    );
}

#[test]
fn test_chunks_follow_entry_order() {
    let record = ServiceInvoiceParser::new()
        .parse("HD-24-0917.pdf", SHOP_INVOICE)
        .record;
    let chunks = chunks_for_record(&record);

    assert_eq!(
        chunks.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
        vec!["HD-24-0917.pdf:0", "HD-24-0917.pdf:1", "HD-24-0917.pdf:2"]
    );
    assert!(chunks[0].text.starts_with("Invoice: HD-24-0917\nDate: 09/17/2024\n"));
    assert!(chunks[0]
        .text
        .contains("Vehicle: 2018 Peterbilt 579\nVIN: 1XPBDP9X4JD501234\nMileage: 412887"));
    assert!(chunks[1].text.ends_with("Labor: 0.25 hours"));
    assert!(chunks[2].text.ends_with("Labor: Not specified"));
}

#[test]
fn test_batch_never_aborts() {
    let documents = vec![
        ("good.pdf".to_string(), SHOP_INVOICE.to_string()),
        ("scanned.pdf".to_string(), String::new()),
        ("no_id.pdf".to_string(), "Complaint: Flat\n".to_string()),
        ("header.pdf".to_string(), "Invoice: 55\nDate: 01/02/2024\n".to_string()),
    ];

    let results = extract_batch(&ServiceInvoiceParser::new(), &documents);

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].record.classification, Classification::Complete);
    assert_eq!(results[1].record.failure, Some(DocumentError::EmptyText));
    assert_eq!(
        results[2].record.failure,
        Some(DocumentError::IdentifierNotFound)
    );
    assert_eq!(results[3].record.classification, Classification::HeaderOnly);
}

#[test]
fn test_crlf_document_matches_lf_document() {
    let parser = ServiceInvoiceParser::new();
    let crlf = SHOP_INVOICE.replace('\n', "\r\n");

    assert_eq!(parser.extract(&crlf), parser.extract(SHOP_INVOICE));
}

#[test]
fn test_record_json_shape() {
    let record = ServiceInvoiceParser::new().parse("x.pdf", "Invoice: 9\n").record;
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["classification"], "header_only");
    assert_eq!(json["header"]["invoice_id"], "9");
    assert_eq!(json["document_id"], "x.pdf");
    assert!(json.get("failure").is_none());
}
