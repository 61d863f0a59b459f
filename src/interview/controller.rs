//! Per-session interaction state and call sequencing.
//!
//! One controller drives one interview session: it binds the persisted
//! chat session, tracks the conversation phase, and runs the pipeline
//! stages in order. Phase transitions happen under the state lock;
//! retrieval and generation calls run with the lock released.

use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use super::checkpoint::CheckpointStore;
use super::completion::TextCompletion;
use super::pipeline::InterviewPipeline;
use super::workflow::WorkflowEvent;
use super::InterviewError;
use crate::chat::ChatStore;
use crate::models::enums::Sender;
use crate::retrieval::DocumentRetriever;

/// Where a session is in the question/answer loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SessionPhase {
    #[default]
    Idle,
    AwaitingFirstQuestion,
    QuestionPosted,
    Evaluating,
}

/// Transient per-session state. Discarded at session end; only the
/// persisted messages survive.
#[derive(Default)]
struct InteractionState {
    phase: SessionPhase,
    session_id: Option<i64>,
    user_id: Option<i64>,
    question: Option<String>,
    context: String,
    displayed: Vec<String>,
    interaction_id: Option<Uuid>,
}

/// Result of a successful session start.
#[derive(Debug, Clone)]
pub struct StartedSession {
    pub session_id: i64,
    pub question: String,
}

pub struct SessionController<'a, R, G, S>
where
    R: DocumentRetriever,
    G: TextCompletion,
    S: CheckpointStore,
{
    pipeline: InterviewPipeline<'a, R, G, S>,
    chat: &'a ChatStore<'a>,
    state: Mutex<InteractionState>,
}

impl<'a, R, G, S> SessionController<'a, R, G, S>
where
    R: DocumentRetriever,
    G: TextCompletion,
    S: CheckpointStore,
{
    pub fn new(pipeline: InterviewPipeline<'a, R, G, S>, chat: &'a ChatStore<'a>) -> Self {
        Self {
            pipeline,
            chat,
            state: Mutex::new(InteractionState::default()),
        }
    }

    /// Open a session for `user_id` and post the first question.
    ///
    /// When question generation fails the session stays bound in the
    /// awaiting-question phase; `request_next_question` retries it.
    pub fn start(&self, user_id: i64) -> Result<StartedSession, InterviewError> {
        {
            let mut state = self.lock_state()?;
            if state.phase != SessionPhase::Idle {
                return Err(InterviewError::InvalidState("session already active"));
            }
            state.phase = SessionPhase::AwaitingFirstQuestion;
        }

        let session_id = match self.chat.create_session(user_id) {
            Ok(id) => id,
            Err(e) => {
                self.end();
                return Err(e.into());
            }
        };

        {
            let mut state = self.lock_state()?;
            state.session_id = Some(session_id);
            state.user_id = Some(user_id);
        }
        tracing::info!(user_id, session_id, "Interview session started");

        let question = self.post_question(session_id)?;
        Ok(StartedSession {
            session_id,
            question,
        })
    }

    /// Persist the user's answer, evaluate it, and return the bot texts
    /// that were newly displayed (after duplicate suppression).
    ///
    /// Rejects overlapping submissions: a second call while one is in
    /// flight fails with an invalid-state error and has no effect.
    pub fn submit_answer(&self, answer: &str) -> Result<Vec<String>, InterviewError> {
        let (session_id, question) = {
            let mut state = self.lock_state()?;
            let session_id = state
                .session_id
                .ok_or(InterviewError::InvalidState("no active session"))?;
            match state.phase {
                SessionPhase::Evaluating => {
                    tracing::warn!(
                        session_id,
                        in_flight = ?state.interaction_id,
                        "Rejected overlapping answer submission"
                    );
                    return Err(InterviewError::InvalidState("evaluation in progress"));
                }
                SessionPhase::QuestionPosted => {}
                _ => return Err(InterviewError::InvalidState("no question posted")),
            }
            let question = state
                .question
                .clone()
                .ok_or(InterviewError::InvalidState("no question posted"))?;
            state.phase = SessionPhase::Evaluating;
            (session_id, question)
        };

        // The user's side of the turn is persisted before evaluation runs.
        if let Err(e) = self.chat.append_message(session_id, Sender::User, answer) {
            self.restore_posted(session_id);
            return Err(e.into());
        }

        // Fresh identifier per submission: a resubmitted answer starts a
        // new checkpoint lineage instead of replaying the failed one.
        let interaction_id = Uuid::new_v4();
        {
            let mut state = self.lock_state()?;
            state.displayed.push(answer.to_string());
            state.interaction_id = Some(interaction_id);
        }

        let events = match self
            .pipeline
            .evaluate_answer(interaction_id, &question, answer)
        {
            Ok(events) => events,
            Err(e) => {
                tracing::error!(session_id, %interaction_id, error = %e, "Answer evaluation failed");
                self.restore_posted(session_id);
                return Err(e);
            }
        };

        let fresh = {
            let state = self.lock_state()?;
            collect_new_texts(&events, &state.displayed)
        };

        for text in &fresh {
            if let Err(e) = self.chat.append_message(session_id, Sender::Bot, text) {
                self.restore_posted(session_id);
                return Err(e.into());
            }
        }

        let mut state = self.lock_state()?;
        if state.session_id == Some(session_id) && state.phase == SessionPhase::Evaluating {
            state.displayed.extend(fresh.iter().cloned());
            state.interaction_id = None;
            state.phase = SessionPhase::QuestionPosted;
        }
        Ok(fresh)
    }

    /// Generate and post another question for the bound session. Also
    /// the retry path after a failed `start` or a failed earlier call
    /// of this method.
    pub fn request_next_question(&self) -> Result<String, InterviewError> {
        let session_id = {
            let mut state = self.lock_state()?;
            let session_id = state
                .session_id
                .ok_or(InterviewError::InvalidState("no active session"))?;
            if state.phase == SessionPhase::Evaluating {
                return Err(InterviewError::InvalidState("evaluation in progress"));
            }
            state.phase = SessionPhase::AwaitingFirstQuestion;
            session_id
        };

        self.post_question(session_id)
    }

    /// Drop the interaction state. The persisted chat history stays.
    pub fn end(&self) {
        if let Ok(mut state) = self.state.lock() {
            if let (Some(session_id), Some(user_id)) = (state.session_id, state.user_id) {
                tracing::info!(session_id, user_id, "Interview session ended");
            }
            *state = InteractionState::default();
        }
    }

    /// End the session and delete its persisted history.
    pub fn end_and_delete(&self) -> Result<(), InterviewError> {
        let session_id = {
            let mut state = self.lock_state()?;
            let session_id = state
                .session_id
                .ok_or(InterviewError::InvalidState("no active session"))?;
            *state = InteractionState::default();
            session_id
        };

        let removed = self.chat.delete_session(session_id)?;
        if !removed {
            tracing::warn!(session_id, "Session row was already gone at delete");
        }
        Ok(())
    }

    /// Id of the bound chat session, if one is active.
    pub fn session_id(&self) -> Option<i64> {
        self.state.lock().ok().and_then(|state| state.session_id)
    }

    /// The question currently posed, if any.
    pub fn current_question(&self) -> Option<String> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.question.clone())
    }

    /// Context block the current question was generated from.
    pub fn current_context(&self) -> String {
        self.state
            .lock()
            .map(|state| state.context.clone())
            .unwrap_or_default()
    }

    /// Snapshot of the displayed message log, oldest first.
    pub fn displayed_log(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.displayed.clone())
            .unwrap_or_default()
    }

    /// Stage 1 for the bound session: generate, persist, then commit to
    /// state. The question only reaches the state once both the
    /// generation call and the persistence write have succeeded.
    fn post_question(&self, session_id: i64) -> Result<String, InterviewError> {
        let generated = match self.pipeline.generate_question() {
            Ok(generated) => generated,
            Err(e) => {
                tracing::error!(session_id, error = %e, "Question generation failed");
                return Err(e);
            }
        };
        self.chat
            .append_message(session_id, Sender::Bot, &generated.question)?;

        let mut state = self.lock_state()?;
        // A session that ended while the call was in flight stays reset.
        if state.session_id == Some(session_id) {
            state.question = Some(generated.question.clone());
            state.context = generated.context;
            state.displayed.push(generated.question.clone());
            state.phase = SessionPhase::QuestionPosted;
        }
        Ok(generated.question)
    }

    /// Put an in-flight evaluation back to the posted-question phase so
    /// the caller can resubmit.
    fn restore_posted(&self, session_id: i64) {
        if let Ok(mut state) = self.state.lock() {
            if state.session_id == Some(session_id) && state.phase == SessionPhase::Evaluating {
                state.phase = SessionPhase::QuestionPosted;
                state.interaction_id = None;
            }
        }
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, InteractionState>, InterviewError> {
        self.state.lock().map_err(|_| InterviewError::LockPoisoned)
    }
}

/// Message texts from `events` that are not already displayed, first
/// occurrence only. Comparison is exact text; the event contract allows
/// the terminal message to be emitted more than once.
fn collect_new_texts(events: &[WorkflowEvent], displayed: &[String]) -> Vec<String> {
    let mut fresh: Vec<String> = Vec::new();
    for event in events {
        if let WorkflowEvent::Message(text) = event {
            if !displayed.contains(text) && !fresh.contains(text) {
                fresh.push(text.clone());
            }
        }
    }
    fresh
}
