//! Error types for the svcinv-core library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the svcinv library.
#[derive(Error, Debug)]
pub enum SvcinvError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Embedding, indexing or generation collaborator error.
    #[error("retrieval error: {0}")]
    Rag(#[from] RagError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF text extraction.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised by the external collaborators behind the retrieval pipeline.
#[derive(Error, Debug)]
pub enum RagError {
    /// The embedding collaborator failed.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// A vector did not have the dimensionality the index was built with.
    #[error("vector has {actual} dimensions, index expects {expected}")]
    Dimension { expected: usize, actual: usize },

    /// The vector index rejected an operation.
    #[error("index error: {0}")]
    Index(String),

    /// The answer generator failed.
    #[error("generation failed: {0}")]
    Generation(String),
}

/// Why a document could not be structured.
///
/// These never abort a batch: they are carried on the resulting record and the
/// record is classified as failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentError {
    /// The upstream text source produced no text (scanned or corrupted input).
    #[error("document text is empty")]
    EmptyText,

    /// No invoice identifier could be located anywhere in the text.
    #[error("identifier not found")]
    IdentifierNotFound,
}

/// Result type for the svcinv library.
pub type Result<T> = std::result::Result<T, SvcinvError>;
