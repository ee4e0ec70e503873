//! Batch extraction, ingestion and retrieval.

use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chunk::{chunks_for_record, Chunk};
use crate::error::{RagError, Result};
use crate::invoice::{ExtractionResult, InvoiceParser};
use crate::models::config::RetrievalConfig;
use crate::models::record::Classification;

use super::{AnswerGenerator, Embedder, Match, VectorIndex};

/// Structure many documents in parallel.
///
/// Results come back in input order. A malformed document yields a failed
/// record and never stops the batch.
pub fn extract_batch<P>(parser: &P, documents: &[(String, String)]) -> Vec<ExtractionResult>
where
    P: InvoiceParser + Sync,
{
    documents
        .par_iter()
        .map(|(document_id, text)| parser.parse(document_id, text))
        .collect()
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub complete: usize,
    pub header_only: usize,
    pub failed: usize,
    /// `(document_id, reason)` for every failed document.
    pub failures: Vec<(String, String)>,
    /// Distinct chunk ids written to the index.
    pub chunks_indexed: usize,
}

impl IngestReport {
    /// Total number of documents seen.
    pub fn documents(&self) -> usize {
        self.complete + self.header_only + self.failed
    }
}

/// Extracts, chunks, embeds and indexes documents.
pub struct Ingestor<'a, P> {
    parser: &'a P,
    embedder: &'a dyn Embedder,
    index: &'a mut dyn VectorIndex,
}

impl<'a, P> Ingestor<'a, P>
where
    P: InvoiceParser + Sync,
{
    pub fn new(parser: &'a P, embedder: &'a dyn Embedder, index: &'a mut dyn VectorIndex) -> Self {
        Self {
            parser,
            embedder,
            index,
        }
    }

    /// Ingest `(document_id, text)` pairs.
    ///
    /// Only complete records are indexed. Header-only records are skipped
    /// and failed records are reported; neither stops the run. Chunk ids are
    /// derived from document ids, so a document id repeated within one run
    /// replaces the earlier document's chunks. Errors from the embedder or
    /// the index are returned.
    pub fn ingest(&mut self, documents: &[(String, String)]) -> Result<IngestReport> {
        let results = extract_batch(self.parser, documents);
        let mut report = IngestReport::default();
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut seen_documents: BTreeSet<&str> = BTreeSet::new();

        for result in &results {
            let record = &result.record;
            let document_id = record.document_id.clone().unwrap_or_default();
            if !seen_documents.insert(record.document_id.as_deref().unwrap_or_default()) {
                warn!(
                    "Duplicate document id {}; later chunks replace earlier ones",
                    document_id
                );
            }

            match record.classification {
                Classification::Complete => {
                    report.complete += 1;
                    chunks.extend(chunks_for_record(record));
                }
                Classification::HeaderOnly => {
                    report.header_only += 1;
                    debug!("Skipping header-only document {}", document_id);
                }
                Classification::Failed => {
                    report.failed += 1;
                    let reason = record
                        .failure
                        .map(|f| f.to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    warn!("Failed to structure {}: {}", document_id, reason);
                    report.failures.push((document_id, reason));
                }
            }
        }

        if !chunks.is_empty() {
            let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts)?;
            if vectors.len() != chunks.len() {
                return Err(RagError::Embedding(format!(
                    "expected {} vectors, got {}",
                    chunks.len(),
                    vectors.len()
                ))
                .into());
            }

            let mut written: BTreeSet<String> = BTreeSet::new();
            for (chunk, vector) in chunks.into_iter().zip(vectors) {
                self.index
                    .insert(&chunk.id, vector, chunk.metadata, &chunk.text)?;
                written.insert(chunk.id);
            }
            report.chunks_indexed = written.len();
        }

        info!(
            "Ingested {} documents: {} complete, {} header-only, {} failed, {} chunks",
            report.documents(),
            report.complete,
            report.header_only,
            report.failed,
            report.chunks_indexed
        );

        Ok(report)
    }
}

/// A generated answer with its supporting chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    /// Unique invoice identifiers of the retrieved chunks, first seen first.
    pub sources: Vec<String>,
    pub chunks: Vec<Match>,
}

/// Answers questions from an index.
pub struct Retriever<'a> {
    embedder: &'a dyn Embedder,
    index: &'a dyn VectorIndex,
    min_similarity: f32,
}

impl<'a> Retriever<'a> {
    pub fn new(embedder: &'a dyn Embedder, index: &'a dyn VectorIndex) -> Self {
        Self {
            embedder,
            index,
            min_similarity: 0.0,
        }
    }

    /// Create a retriever honoring the retrieval configuration.
    pub fn from_config(
        embedder: &'a dyn Embedder,
        index: &'a dyn VectorIndex,
        config: &RetrievalConfig,
    ) -> Self {
        Self::new(embedder, index).with_min_similarity(config.min_similarity)
    }

    /// Drop matches below this similarity.
    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    /// The `k` chunks most similar to the question.
    pub fn retrieve(&self, question: &str, k: usize) -> Result<Vec<Match>> {
        let vector = self.embedder.embed(question)?;
        let matches: Vec<Match> = self
            .index
            .query(&vector, k)?
            .into_iter()
            .filter(|m| m.similarity >= self.min_similarity)
            .collect();

        debug!("Retrieved {} chunks for question", matches.len());
        Ok(matches)
    }

    /// Retrieve context and ask `generator` for an answer.
    pub fn answer(
        &self,
        generator: &dyn AnswerGenerator,
        question: &str,
        k: usize,
    ) -> Result<Answer> {
        let chunks = self.retrieve(question, k)?;
        let context: Vec<String> = chunks.iter().map(|m| m.text.clone()).collect();
        let answer = generator.generate(question, &context)?;

        let mut sources: Vec<String> = Vec::new();
        for chunk in &chunks {
            if let Some(id) = chunk.invoice_id() {
                if !sources.iter().any(|s| s == id) {
                    sources.push(id.to_string());
                }
            }
        }

        Ok(Answer {
            answer,
            sources,
            chunks,
        })
    }
}
