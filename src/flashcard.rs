//! Flashcard data model and validation of raw model output.
//!
//! The hosted model is asked for a bare JSON array but is not trusted to
//! deliver one. Everything it returns goes through [`parse_flashcards`] before
//! it reaches a caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::GenerationError;

/// Minimum trimmed length of the notes accepted for generation.
pub const MIN_NOTES_CHARS: usize = 10;

/// Fewest flashcards a valid set may contain.
pub const MIN_CARDS: usize = 5;

/// Most flashcards a valid set may contain.
pub const MAX_CARDS: usize = 10;

/// Notes that passed the length precondition.
///
/// The text is kept verbatim; trimming is only used for the length check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotesInput<'a>(&'a str);

impl<'a> NotesInput<'a> {
    pub fn parse(raw: &'a str) -> Result<Self, GenerationError> {
        if raw.trim().chars().count() < MIN_NOTES_CHARS {
            return Err(GenerationError::Validation {
                min_chars: MIN_NOTES_CHARS,
            });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

/// A single question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// An ordered, validated set of 5 to 10 flashcards.
///
/// Serializes as a bare JSON array, which is the success body of the
/// generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlashcardSet(Vec<Flashcard>);

impl FlashcardSet {
    pub fn cards(&self) -> &[Flashcard] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Flashcard> {
        self.0
    }
}

/// Why a model response was rejected.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is not a JSON array")]
    NotAnArray,

    #[error("expected {min} to {max} flashcards, got {count}", min = MIN_CARDS, max = MAX_CARDS)]
    CardCount { count: usize },

    #[error("flashcard {index} has no non-empty \"{field}\"")]
    MissingField { index: usize, field: &'static str },
}

/// Removes markdown code fences around the output. The opening fence (with
/// its optional language tag) and the closing fence are stripped
/// independently, so a lone fence on either side is also removed.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut body = raw.trim();

    if let Some(rest) = body.strip_prefix("```") {
        body = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

/// Parses and validates raw model output into a [`FlashcardSet`].
///
/// Keys other than `question` and `answer` are dropped. Field values are
/// returned as the model wrote them.
pub fn parse_flashcards(raw: &str) -> Result<FlashcardSet, OutputError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))?;
    let Value::Array(items) = value else {
        return Err(OutputError::NotAnArray);
    };

    if !(MIN_CARDS..=MAX_CARDS).contains(&items.len()) {
        return Err(OutputError::CardCount { count: items.len() });
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            Ok(Flashcard {
                question: text_field(item, "question", index)?,
                answer: text_field(item, "answer", index)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(FlashcardSet)
}

fn text_field(item: &Value, field: &'static str, index: usize) -> Result<String, OutputError> {
    item.get(field)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_owned)
        .ok_or(OutputError::MissingField { index, field })
}
