//! The fixed instruction prompt sent to the completion model.

use crate::flashcard::{NotesInput, MAX_CARDS, MIN_CARDS};

/// System instruction sent with every generation request.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant that outputs only valid JSON arrays.";

/// A chat prompt: one system instruction plus one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Builds the flashcard prompt for `notes`. The same notes always yield the
    /// same prompt.
    pub fn for_notes(notes: &NotesInput<'_>) -> Self {
        let user = format!(
            "You are an expert educator. Create a JSON array of {MIN_CARDS} to {MAX_CARDS} \
             flashcards based on the following study notes.\n\
             Each flashcard must be an object with exactly two keys: \"question\" and \"answer\".\n\
             Return ONLY the valid JSON array. No extra text, no markdown code blocks.\n\
             \n\
             Notes:\n\
             {notes}",
            notes = notes.as_str(),
        );

        Self {
            system: SYSTEM_INSTRUCTION.to_string(),
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_states_output_shape() {
        let notes = NotesInput::parse("The French Revolution began in 1789.").unwrap();
        let prompt = Prompt::for_notes(&notes);

        assert_eq!(prompt.system, SYSTEM_INSTRUCTION);
        assert!(prompt.user.contains("JSON array of 5 to 10 flashcards"));
        assert!(prompt.user.contains("exactly two keys: \"question\" and \"answer\""));
    }

    #[test]
    fn prompt_embeds_notes_verbatim() {
        let raw = "  Line one.\nLine \"two\" with {braces}.  ";
        let prompt = Prompt::for_notes(&NotesInput::parse(raw).unwrap());
        assert!(prompt.user.ends_with(&format!("Notes:\n{raw}")));
    }

    #[test]
    fn prompt_is_deterministic() {
        let notes = NotesInput::parse("Water boils at 100 degrees Celsius.").unwrap();
        assert_eq!(Prompt::for_notes(&notes), Prompt::for_notes(&notes));
    }
}
