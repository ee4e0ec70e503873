//! Retrieval pipeline over structured invoices.
//!
//! Embedding, vector storage and answer generation are external
//! collaborators behind the traits below. The pipeline only decides what
//! gets indexed and how retrieved chunks are turned into an answer.

mod memory;
mod pipeline;

pub use memory::{cosine_similarity, MemoryIndex};
pub use pipeline::{extract_batch, Answer, IngestReport, Ingestor, Retriever};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Turns text into a dense vector.
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, in order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Vector dimensionality.
    fn dimensions(&self) -> usize;
}

/// Stores vectors with their chunk text and metadata.
pub trait VectorIndex {
    /// Insert or replace the entry stored under `id`.
    fn insert(
        &mut self,
        id: &str,
        vector: Vec<f32>,
        metadata: BTreeMap<String, String>,
        text: &str,
    ) -> Result<()>;

    /// The `k` most similar entries, most similar first.
    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Match>>;

    /// Number of stored entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Produces an answer from a question and retrieved context texts.
pub trait AnswerGenerator {
    fn generate(&self, question: &str, context: &[String]) -> Result<String>;
}

/// A retrieved chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
    /// Cosine similarity to the query vector.
    pub similarity: f32,
    /// 1-based position in the result list.
    pub rank: usize,
}

impl Match {
    /// Invoice identifier from the chunk metadata.
    pub fn invoice_id(&self) -> Option<&str> {
        self.metadata.get("invoice_id").map(String::as_str)
    }
}
