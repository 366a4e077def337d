// Answer generation from grounded context
use std::sync::Arc;

use crate::errors::Result;
use crate::models::{CompletionOptions, Completer};

/// Reply the model is told to give when the context is insufficient
pub const FALLBACK_ANSWER: &str = "I don't know";

/// Instruction preamble of the answer prompt
const PROMPT_PREAMBLE: &str = "You are an expert question-answering assistant.
Answer the question based only on the provided context.
If the answer is not in the context, say 'I don't know'.";

/// Builds the answer prompt and delegates to the completion capability
#[derive(Clone)]
pub struct AnswerGenerator {
    completer: Arc<dyn Completer>,
    options: CompletionOptions,
}

impl AnswerGenerator {
    /// Create a generator with deterministic decoding
    pub fn new(completer: Arc<dyn Completer>) -> Self {
        Self {
            completer,
            options: CompletionOptions::deterministic(),
        }
    }

    /// Render the fixed template with context and question inserted verbatim
    pub fn build_prompt(question: &str, context: &str) -> String {
        format!(
            "{}\n\nContext:\n{}\n\nQuestion:\n{}\n",
            PROMPT_PREAMBLE, context, question
        )
    }

    /// Generate an answer. Completer failures surface as `GenerationError`.
    pub async fn generate(&self, question: &str, context: &str) -> Result<String> {
        let prompt = Self::build_prompt(question, context);
        self.completer.complete(&prompt, self.options).await
    }
}
