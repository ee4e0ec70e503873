//! In-process vector index.

use std::collections::BTreeMap;

use crate::error::{RagError, Result};

use super::{Match, VectorIndex};

#[derive(Debug, Clone)]
struct Entry {
    id: String,
    vector: Vec<f32>,
    metadata: BTreeMap<String, String>,
    text: String,
}

/// Brute-force cosine similarity index held in memory.
///
/// The dimensionality is fixed by the first inserted vector unless given
/// up front.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    dimensions: Option<usize>,
    entries: Vec<Entry>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index that only accepts vectors of `dimensions` length.
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions: Some(dimensions),
            entries: Vec::new(),
        }
    }

    fn check_dimensions(&self, actual: usize) -> Result<()> {
        match self.dimensions {
            Some(expected) if expected != actual => {
                Err(RagError::Dimension { expected, actual }.into())
            }
            _ => Ok(()),
        }
    }
}

impl VectorIndex for MemoryIndex {
    fn insert(
        &mut self,
        id: &str,
        vector: Vec<f32>,
        metadata: BTreeMap<String, String>,
        text: &str,
    ) -> Result<()> {
        self.check_dimensions(vector.len())?;
        self.dimensions.get_or_insert(vector.len());

        let entry = Entry {
            id: id.to_string(),
            vector,
            metadata,
            text: text.to_string(),
        };

        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }

        Ok(())
    }

    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Match>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        self.check_dimensions(vector.len())?;

        let mut scored: Vec<(f32, &Entry)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(vector, &entry.vector), entry))
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(i, (similarity, entry))| Match {
                id: entry.id.clone(),
                text: entry.text.clone(),
                metadata: entry.metadata.clone(),
                similarity,
                rank: i + 1,
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Cosine similarity of two vectors; 0.0 for mismatched or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
