//! Error types for flashcard generation.

use thiserror::Error;

use crate::completion::CompletionError;
use crate::flashcard::OutputError;

/// Why a generation request produced no flashcards.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The notes failed the length precondition. No model call was made.
    #[error("notes too short: please provide more substantial notes (at least {min_chars} characters)")]
    Validation { min_chars: usize },

    /// The hosted model could not be reached or rejected the call. Never retried.
    #[error("upstream model call failed: {0}")]
    Upstream(#[from] CompletionError),

    /// Every attempt returned output that was not a valid flashcard set.
    #[error("failed to generate valid output after retries ({attempts} attempts): {last}")]
    MalformedOutput {
        attempts: u32,
        #[source]
        last: OutputError,
    },
}

impl GenerationError {
    /// Whether the caller, rather than the service or its dependency, is at fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = GenerationError::Validation { min_chars: 10 };
        let msg = err.to_string();
        assert!(msg.starts_with("notes too short"));
        assert!(msg.contains("at least 10 characters"));
    }

    #[test]
    fn test_from_completion_error() {
        let err: GenerationError = CompletionError::MissingApiKey.into();
        assert!(matches!(err, GenerationError::Upstream(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_malformed_output_display() {
        let err = GenerationError::MalformedOutput {
            attempts: 2,
            last: OutputError::NotAnArray,
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to generate valid output after retries"));
        assert!(msg.contains("2 attempts"));
    }

    #[test]
    fn test_is_client_error() {
        assert!(GenerationError::Validation { min_chars: 10 }.is_client_error());
        assert!(!GenerationError::Upstream(CompletionError::Timeout).is_client_error());
        assert!(!GenerationError::MalformedOutput {
            attempts: 2,
            last: OutputError::NotAnArray,
        }
        .is_client_error());
    }
}
