//! Configuration structures for the structuring pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for svcinv.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SvcinvConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF text source configuration.
    pub pdf: PdfConfig,

    /// Retrieval configuration.
    pub retrieval: RetrievalConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Require labeled VINs to be 17 alphanumerics.
    pub strict_vin: bool,

    /// Keep partially extracted fields on failed records.
    pub keep_partial_failures: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strict_vin: true,
            keep_partial_failures: true,
        }
    }
}

/// PDF text source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Extracted text shorter than this is treated as empty (scanned page).
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 20 }
    }
}

/// Retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per question.
    pub top_k: usize,

    /// Drop matches below this similarity.
    pub min_similarity: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 50,
            min_similarity: 0.0,
        }
    }
}

impl SvcinvConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SvcinvConfig =
            serde_json::from_str(r#"{"retrieval": {"top_k": 5}}"#).unwrap();
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.min_similarity, 0.0);
        assert!(config.extraction.strict_vin);
        assert_eq!(config.pdf.min_text_length, 20);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = SvcinvConfig::default();
        config.extraction.keep_partial_failures = false;
        config.save(&path).unwrap();

        let loaded = SvcinvConfig::from_file(&path).unwrap();
        assert!(!loaded.extraction.keep_partial_failures);
        assert_eq!(loaded.retrieval.top_k, 50);
    }

    #[test]
    fn test_invalid_json_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = SvcinvConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
