//! Document text sources.

#[cfg(feature = "pdf")]
mod extractor;

#[cfg(feature = "pdf")]
pub use extractor::PdfTextSource;

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::models::config::PdfConfig;

/// Supplies the raw text of a document.
///
/// Returning an empty string is valid and means the document had no
/// readable text (for example a scanned page).
pub trait TextSource: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<String>;
}

/// Reads UTF-8 text files as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn extract_text(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        debug!("Read {} characters from {}", text.len(), path.display());
        Ok(text)
    }
}

/// Check whether `path` has a `.pdf` extension.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Pick the text source for a file by its extension.
#[cfg(feature = "pdf")]
pub fn source_for(path: &Path, config: &PdfConfig) -> Box<dyn TextSource> {
    if is_pdf(path) {
        Box::new(PdfTextSource::from_config(config))
    } else {
        Box::new(PlainTextSource)
    }
}

/// Pick the text source for a file by its extension.
#[cfg(not(feature = "pdf"))]
pub fn source_for(_path: &Path, _config: &PdfConfig) -> Box<dyn TextSource> {
    Box::new(PlainTextSource)
}

/// Document identifier for a path: its file name.
pub fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
