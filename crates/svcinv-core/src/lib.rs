//! Core library for structuring truck service invoices.
//!
//! This crate provides:
//! - Marker-delimited field matching with stop-marker boundaries
//! - Header extraction (identifier, date, customer, vehicle)
//! - Service block segmentation and per-block field extraction
//! - Record assembly with Complete / HeaderOnly / Failed classification
//! - Per-entry chunking and a retrieval pipeline over pluggable collaborators
//! - Document text sources (PDF text layer, plain text)

pub mod error;
pub mod models;
pub mod invoice;
pub mod chunk;
pub mod rag;
pub mod pdf;

pub use error::{DocumentError, PdfError, RagError, Result, SvcinvError};
pub use models::config::SvcinvConfig;
pub use models::record::{
    Classification, Customer, InvoiceHeader, InvoiceRecord, Labor, ServiceEntry, Vehicle,
};
pub use invoice::{ExtractionResult, InvoiceParser, ServiceInvoiceParser};
pub use chunk::{chunks_for_record, Chunk};
pub use rag::{
    extract_batch, AnswerGenerator, Embedder, IngestReport, Ingestor, MemoryIndex, Retriever,
    VectorIndex,
};
pub use pdf::{PlainTextSource, TextSource};
#[cfg(feature = "pdf")]
pub use pdf::PdfTextSource;
