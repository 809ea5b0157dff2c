//! Note-to-flashcard generation with a bounded retry on malformed output.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::completion::CompletionClient;
use crate::error::GenerationError;
use crate::flashcard::{parse_flashcards, FlashcardSet, NotesInput, OutputError};
use crate::prompt::Prompt;

/// Sampling temperature used for every generation call.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Retries granted after a malformed first response.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationPolicy {
    pub temperature: f64,
    /// Extra attempts allowed when the model output fails validation.
    /// Upstream failures are never retried.
    pub max_retries: u32,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl GenerationPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// One model call and its raw text. Dropped as soon as it has been validated.
struct GenerationAttempt {
    number: u32,
    raw: String,
}

impl GenerationAttempt {
    fn outcome(&self) -> Result<FlashcardSet, OutputError> {
        parse_flashcards(&self.raw)
    }
}

/// Turns notes into a validated [`FlashcardSet`].
///
/// Holds no per-request state, so one instance is shared by all requests.
#[derive(Clone)]
pub struct FlashcardGenerator {
    client: Arc<dyn CompletionClient>,
    policy: GenerationPolicy,
}

impl FlashcardGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, policy: GenerationPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> GenerationPolicy {
        self.policy
    }

    /// Generates flashcards for `notes`.
    ///
    /// Each attempt sends a fresh prompt. Output that fails validation is
    /// retried until `max_attempts` is spent. Upstream errors end the request
    /// immediately.
    pub async fn generate(&self, notes: &str) -> Result<FlashcardSet, GenerationError> {
        let notes = NotesInput::parse(notes)?;
        let max_attempts = self.policy.max_attempts();

        let mut number = 0;
        loop {
            number += 1;
            let attempt = self.attempt(&notes, number).await?;

            match attempt.outcome() {
                Ok(cards) => {
                    info!(
                        attempt = attempt.number,
                        cards = cards.len(),
                        "generated flashcards"
                    );
                    return Ok(cards);
                }
                Err(reason) if attempt.number < max_attempts => {
                    warn!(
                        attempt = attempt.number,
                        max_attempts,
                        %reason,
                        "model output rejected, retrying"
                    );
                }
                Err(reason) => {
                    warn!(
                        attempt = attempt.number,
                        max_attempts,
                        %reason,
                        "model output rejected, giving up"
                    );
                    return Err(GenerationError::MalformedOutput {
                        attempts: attempt.number,
                        last: reason,
                    });
                }
            }
        }
    }

    async fn attempt(
        &self,
        notes: &NotesInput<'_>,
        number: u32,
    ) -> Result<GenerationAttempt, GenerationError> {
        let prompt = Prompt::for_notes(notes);
        let raw = self
            .client
            .complete(&prompt, self.policy.temperature)
            .await
            .map_err(|err| {
                error!(attempt = number, error = %err, "completion request failed");
                GenerationError::Upstream(err)
            })?;

        debug!(attempt = number, response_len = raw.len(), "received completion");
        Ok(GenerationAttempt { number, raw })
    }
}

impl std::fmt::Debug for FlashcardGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlashcardGenerator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
