//! Single-node evaluation workflow with checkpointed resumability.
//!
//! One `run` is one evaluation turn: the inputs are checkpointed before
//! the completion call, the finite event sequence afterwards. Re-running
//! an interaction id whose checkpoint is complete replays the recorded
//! events without re-invoking the completion service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::checkpoint::{Checkpoint, CheckpointStore};
use super::completion::{GenerationError, TextCompletion};
use super::prompt::build_evaluation_prompt;

/// One element of a workflow's finite event sequence: zero or more
/// message snapshots, then exactly one `End`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowEvent {
    Message(String),
    End,
}

/// Wraps one evaluation call between checkpoint saves.
pub struct EvaluationWorkflow<'a, G: TextCompletion, S: CheckpointStore> {
    completion: &'a G,
    checkpoints: &'a S,
}

impl<'a, G: TextCompletion, S: CheckpointStore> EvaluationWorkflow<'a, G, S> {
    pub fn new(completion: &'a G, checkpoints: &'a S) -> Self {
        Self {
            completion,
            checkpoints,
        }
    }

    pub fn run(
        &self,
        interaction_id: Uuid,
        question: &str,
        answer: &str,
        context: &str,
    ) -> Result<Vec<WorkflowEvent>, GenerationError> {
        if let Some(existing) = self.checkpoints.load(interaction_id) {
            if let Some(events) = existing.events {
                tracing::debug!(%interaction_id, "Replaying completed evaluation checkpoint");
                return Ok(events);
            }
        }

        let mut checkpoint = Checkpoint {
            question: question.to_string(),
            answer: answer.to_string(),
            context: context.to_string(),
            events: None,
        };
        self.checkpoints.save(interaction_id, &checkpoint);

        let prompt = build_evaluation_prompt(question, answer, context);
        let text = self.completion.complete(&prompt)?;

        let events = vec![WorkflowEvent::Message(text), WorkflowEvent::End];
        checkpoint.events = Some(events.clone());
        self.checkpoints.save(interaction_id, &checkpoint);

        Ok(events)
    }
}
