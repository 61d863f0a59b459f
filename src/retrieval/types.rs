use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::RetrievalError;

/// A retrieved passage with its relevance to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    pub content: String,
    pub score: f32,
}

/// Parameters for diversity-aware retrieval.
#[derive(Debug, Clone)]
pub struct RetrievalParams {
    /// Passages to return.
    pub k: usize,
    /// Candidate pool fetched by plain relevance before re-ranking.
    pub fetch_k: usize,
    /// Weight in [0,1]: 1.0 is pure relevance, 0.0 is pure diversity.
    pub diversity_weight: f32,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            k: 5,
            fetch_k: 20,
            diversity_weight: 0.7,
        }
    }
}

/// Text embedding backend.
pub trait EmbeddingModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
    fn dimension(&self) -> usize;
}

/// Query-time retrieval contract used by the interview pipeline.
pub trait DocumentRetriever {
    fn retrieve(
        &self,
        query: &str,
        params: &RetrievalParams,
    ) -> Result<Vec<Passage>, RetrievalError>;
}

/// Scripted retriever for tests: serves the same fixed passages for
/// every query and records each query it was asked.
pub struct MockRetriever {
    passages: Vec<Passage>,
    queries: Mutex<Vec<String>>,
}

impl MockRetriever {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            passages: texts
                .iter()
                .map(|t| Passage {
                    content: t.to_string(),
                    score: 1.0,
                })
                .collect(),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries seen so far, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl DocumentRetriever for MockRetriever {
    fn retrieve(
        &self,
        query: &str,
        _params: &RetrievalParams,
    ) -> Result<Vec<Passage>, RetrievalError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        Ok(self.passages.clone())
    }
}
