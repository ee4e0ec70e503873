//! PDF text extraction using lopdf and pdf-extract.

use std::path::Path;

use lopdf::Document;
use tracing::debug;

use super::TextSource;
use crate::error::{PdfError, Result};
use crate::models::config::PdfConfig;

/// Text source for digital (non-scanned) PDFs.
#[derive(Debug, Clone)]
pub struct PdfTextSource {
    /// Extracted text shorter than this counts as no text.
    min_text_length: usize,
}

impl PdfTextSource {
    pub fn new() -> Self {
        Self::from_config(&PdfConfig::default())
    }

    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            min_text_length: config.min_text_length,
        }
    }

    /// Set the minimum text length.
    pub fn with_min_text_length(mut self, min_text_length: usize) -> Self {
        self.min_text_length = min_text_length;
        self
    }

    /// Extract the text of an in-memory PDF.
    ///
    /// Documents encrypted with an empty user password are decrypted first.
    /// Text shorter than the configured minimum is returned as empty.
    pub fn extract_from_bytes(&self, data: &[u8]) -> std::result::Result<String, PdfError> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let text = pdf_extract::extract_text_from_mem(&raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        let meaningful = text.trim().chars().count();
        debug!(
            "Extracted {} characters from {} pages",
            meaningful, page_count
        );

        if meaningful < self.min_text_length {
            debug!("PDF has no usable text layer");
            return Ok(String::new());
        }

        Ok(text)
    }
}

impl Default for PdfTextSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSource for PdfTextSource {
    fn extract_text(&self, path: &Path) -> Result<String> {
        let data = std::fs::read(path)?;
        Ok(self.extract_from_bytes(&data)?)
    }
}
