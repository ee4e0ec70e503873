//! Service invoice structuring module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, InvoiceParser, ServiceInvoiceParser};
