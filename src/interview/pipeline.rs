//! Two-stage question/evaluation pipeline.
//!
//! Stage 1 retrieves passages for the fixed bootstrap query and authors
//! one interview question from them. Stage 2 re-retrieves with the
//! generated question text as the query, rather than reusing the
//! bootstrap context, and evaluates the answer inside the checkpointed
//! workflow.

use uuid::Uuid;

use super::checkpoint::CheckpointStore;
use super::completion::TextCompletion;
use super::prompt::{build_question_prompt, join_context, BOOTSTRAP_QUERY};
use super::workflow::{EvaluationWorkflow, WorkflowEvent};
use super::InterviewError;
use crate::retrieval::{DocumentRetriever, RetrievalParams};

/// Output of Stage 1: the question plus the context block it was
/// authored from.
#[derive(Debug, Clone)]
pub struct GeneratedQuestion {
    pub question: String,
    pub context: String,
}

pub struct InterviewPipeline<'a, R, G, S>
where
    R: DocumentRetriever,
    G: TextCompletion,
    S: CheckpointStore,
{
    retriever: &'a R,
    completion: &'a G,
    checkpoints: &'a S,
    params: RetrievalParams,
}

impl<'a, R, G, S> InterviewPipeline<'a, R, G, S>
where
    R: DocumentRetriever,
    G: TextCompletion,
    S: CheckpointStore,
{
    pub fn new(retriever: &'a R, completion: &'a G, checkpoints: &'a S) -> Self {
        Self {
            retriever,
            completion,
            checkpoints,
            params: RetrievalParams::default(),
        }
    }

    pub fn with_params(
        retriever: &'a R,
        completion: &'a G,
        checkpoints: &'a S,
        params: RetrievalParams,
    ) -> Self {
        Self {
            retriever,
            completion,
            checkpoints,
            params,
        }
    }

    /// Stage 1: bootstrap retrieval, then question authoring.
    pub fn generate_question(&self) -> Result<GeneratedQuestion, InterviewError> {
        let passages = self.retriever.retrieve(BOOTSTRAP_QUERY, &self.params)?;
        let context = join_context(&passages);

        let prompt = build_question_prompt(&context);
        let question = self.completion.complete(&prompt)?;
        tracing::debug!(passages = passages.len(), "Interview question generated");

        Ok(GeneratedQuestion { question, context })
    }

    /// Stage 2: retrieve feedback context for the question, then run the
    /// checkpointed evaluation workflow under `interaction_id`.
    pub fn evaluate_answer(
        &self,
        interaction_id: Uuid,
        question: &str,
        answer: &str,
    ) -> Result<Vec<WorkflowEvent>, InterviewError> {
        let passages = self.retriever.retrieve(question, &self.params)?;
        let context = join_context(&passages);

        let workflow = EvaluationWorkflow::new(self.completion, self.checkpoints);
        let events = workflow.run(interaction_id, question, answer, &context)?;
        tracing::debug!(
            %interaction_id,
            events = events.len(),
            "Answer evaluation completed"
        );

        Ok(events)
    }
}
