//! CLI subcommands.

pub mod batch;
pub mod chunks;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use glob::glob;
use tracing::{debug, warn};

use svcinv_core::models::config::SvcinvConfig;
use svcinv_core::pdf::{document_id, is_pdf, source_for};

/// Load the configuration from `config_path`, or the default file, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<SvcinvConfig> {
    if let Some(path) = config_path {
        return Ok(SvcinvConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using configuration from {}", default_path.display());
        Ok(SvcinvConfig::from_file(&default_path)?)
    } else {
        Ok(SvcinvConfig::default())
    }
}

/// Expand a glob pattern into the PDF and text files it matches.
pub fn expand_inputs(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let files: Vec<PathBuf> = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && (is_pdf(p) || is_text(p)))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", pattern);
    }

    Ok(files)
}

fn is_text(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext.to_lowercase().as_str(), "txt" | "text")
}

/// Raw text of one input file.
pub struct SourceDocument {
    pub path: PathBuf,
    pub document_id: String,
    pub text: String,
    /// Why the text source failed, if it did. The text is then empty.
    pub error: Option<String>,
}

/// Read a document's text. Unreadable files yield empty text and an error
/// message so they can still be structured as failed records.
pub fn read_document(path: &Path, config: &SvcinvConfig) -> SourceDocument {
    let source = source_for(path, &config.pdf);
    let (text, error) = match source.extract_text(path) {
        Ok(text) => (text, None),
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            (String::new(), Some(e.to_string()))
        }
    };

    SourceDocument {
        path: path.to_path_buf(),
        document_id: document_id(path),
        text,
        error,
    }
}
