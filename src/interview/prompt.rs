//! Prompt templates for question authoring and answer evaluation.
//!
//! Templates are fixed text with named slots. Substitution is plain
//! string replacement, ordered so the user-supplied answer is inserted
//! last and never rescanned for slot names.

use crate::retrieval::Passage;

/// Fixed retrieval query that seeds the first question of a session.
pub const BOOTSTRAP_QUERY: &str = "Generate one Python interview question";

/// Stage 1 question authoring. Slot: `{context}`.
pub const QUESTION_PROMPT: &str = "\
Generate exactly one Python interview question based on the documents below.

Documents:
{context}

Interview question:";

/// Stage 2 answer evaluation. Slots: `{question}`, `{answer}`, `{context}`.
pub const EVALUATION_PROMPT: &str = "\
You are a Python interviewer bot. Evaluate the candidate's answer against
the reference documents below, then provide a model answer.

Reference documents:
{context}

Question: {question}
Answer: {answer}
Evaluation:";

pub fn build_question_prompt(context: &str) -> String {
    QUESTION_PROMPT.replace("{context}", context)
}

pub fn build_evaluation_prompt(question: &str, answer: &str, context: &str) -> String {
    EVALUATION_PROMPT
        .replace("{context}", context)
        .replace("{question}", question)
        .replace("{answer}", answer)
}

/// Join retrieved passages into one context block, newline-separated.
pub fn join_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(content: &str) -> Passage {
        Passage {
            content: content.to_string(),
            score: 1.0,
        }
    }

    #[test]
    fn question_prompt_substitutes_context() {
        let prompt = build_question_prompt("GIL basics");
        assert!(prompt.contains("GIL basics"));
        assert!(!prompt.contains("{context}"));
    }

    #[test]
    fn evaluation_prompt_fills_all_three_slots() {
        let prompt = build_evaluation_prompt("What is the GIL?", "A global lock.", "GIL docs");
        assert!(prompt.contains("Question: What is the GIL?"));
        assert!(prompt.contains("Answer: A global lock."));
        assert!(prompt.contains("GIL docs"));
        assert!(!prompt.contains("{question}"));
        assert!(!prompt.contains("{answer}"));
        assert!(!prompt.contains("{context}"));
    }

    #[test]
    fn answer_text_is_not_treated_as_a_slot() {
        let prompt = build_evaluation_prompt("Q", "sneaky {context} answer", "CTX");
        // The literal stays; only template slots are substituted.
        assert!(prompt.contains("sneaky {context} answer"));
    }

    #[test]
    fn join_context_separates_with_newlines() {
        let passages = vec![passage("first"), passage("second"), passage("third")];
        assert_eq!(join_context(&passages), "first\nsecond\nthird");
    }

    #[test]
    fn join_context_of_nothing_is_empty() {
        assert_eq!(join_context(&[]), "");
        assert_eq!(join_context(&[passage("only")]), "only");
    }

    #[test]
    fn bootstrap_query_is_fixed() {
        assert!(!BOOTSTRAP_QUERY.is_empty());
        assert_eq!(BOOTSTRAP_QUERY, "Generate one Python interview question");
    }
}
