//! Document retrieval: embedding-backed search with diversity-aware
//! re-ranking over an in-memory index.

pub mod index;
pub mod types;

pub use index::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),
}
