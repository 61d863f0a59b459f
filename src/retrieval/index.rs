//! In-memory vector index with maximal-marginal-relevance selection.
//!
//! Retrieval runs in two stages: `fetch_k` candidates by cosine
//! similarity, then `k` picks re-ranked so each next passage balances
//! relevance to the query against overlap with what is already selected.

use super::types::{DocumentRetriever, EmbeddingModel, Passage, RetrievalParams};
use super::RetrievalError;

/// Vector index holding embedded document chunks.
pub struct InMemoryDocumentIndex<E> {
    embedder: E,
    entries: Vec<IndexedDocument>,
}

struct IndexedDocument {
    content: String,
    embedding: Vec<f32>,
}

impl<E: EmbeddingModel> InMemoryDocumentIndex<E> {
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
        }
    }

    /// Embed one document chunk and add it to the index.
    ///
    /// The embedding must match the model's declared dimension; a
    /// mismatched vector would silently score zero against every query.
    pub fn add_document(&mut self, content: &str) -> Result<(), RetrievalError> {
        let embedding = self.embedder.embed(content)?;
        if embedding.len() != self.embedder.dimension() {
            return Err(RetrievalError::EmbeddingFailed(format!(
                "expected {} dimensions, got {}",
                self.embedder.dimension(),
                embedding.len()
            )));
        }
        self.entries.push(IndexedDocument {
            content: content.to_string(),
            embedding,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E: EmbeddingModel> DocumentRetriever for InMemoryDocumentIndex<E> {
    fn retrieve(
        &self,
        query: &str,
        params: &RetrievalParams,
    ) -> Result<Vec<Passage>, RetrievalError> {
        if self.entries.is_empty() || params.k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query)?;

        // Stage one: candidate pool by plain relevance.
        let mut candidates: Vec<(f32, &IndexedDocument)> = self
            .entries
            .iter()
            .map(|doc| (cosine_similarity(&query_embedding, &doc.embedding), doc))
            .collect();
        candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        candidates.truncate(params.fetch_k);

        // Stage two: maximal marginal relevance over the pool.
        Ok(mmr_select(&candidates, params.k, params.diversity_weight))
    }
}

fn mmr_select(
    candidates: &[(f32, &IndexedDocument)],
    k: usize,
    diversity_weight: f32,
) -> Vec<Passage> {
    let lambda = diversity_weight.clamp(0.0, 1.0);
    let mut remaining: Vec<usize> = (0..candidates.len()).collect();
    let mut selected: Vec<usize> = Vec::new();

    while selected.len() < k && !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_score = f32::NEG_INFINITY;

        for (pos, &idx) in remaining.iter().enumerate() {
            let relevance = candidates[idx].0;
            // Worst-case overlap with anything already picked.
            let overlap = selected
                .iter()
                .map(|&s| {
                    cosine_similarity(&candidates[idx].1.embedding, &candidates[s].1.embedding)
                })
                .fold(0.0f32, f32::max);

            let score = lambda * relevance - (1.0 - lambda) * overlap;
            if score > best_score {
                best_score = score;
                best_pos = pos;
            }
        }

        selected.push(remaining.swap_remove(best_pos));
    }

    selected
        .into_iter()
        .map(|idx| Passage {
            content: candidates[idx].1.content.clone(),
            score: candidates[idx].0,
        })
        .collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
