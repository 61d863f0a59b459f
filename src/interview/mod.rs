//! Interview engine: question generation, answer evaluation, and the
//! per-session state machine that sequences them.

pub mod checkpoint;
pub mod completion;
pub mod controller;
pub mod pipeline;
pub mod prompt;
pub mod workflow;

pub use checkpoint::{Checkpoint, CheckpointStore, MemoryCheckpointStore};
pub use completion::{GenerationError, HttpCompletionClient, MockCompletion, TextCompletion};
pub use controller::{SessionController, StartedSession};
pub use pipeline::{GeneratedQuestion, InterviewPipeline};
pub use prompt::BOOTSTRAP_QUERY;
pub use workflow::{EvaluationWorkflow, WorkflowEvent};

use thiserror::Error;

use crate::db::DatabaseError;
use crate::retrieval::RetrievalError;

#[derive(Error, Debug)]
pub enum InterviewError {
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Interaction state lock poisoned")]
    LockPoisoned,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
}
