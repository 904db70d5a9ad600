use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::NoteId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NoteError {
    #[error("note title cannot be empty")]
    EmptyTitle,
}

/// User input for a new note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub body: String,
}

impl NoteDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// # Errors
    ///
    /// Returns `NoteError::EmptyTitle` if the title is blank.
    pub fn validate(self) -> Result<Note, NoteError> {
        if self.title.trim().is_empty() {
            return Err(NoteError::EmptyTitle);
        }
        Ok(Note {
            id: NoteId::generate(),
            title: self.title.trim().to_owned(),
            body: self.body,
        })
    }
}

/// A free-form summary stored under a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        let err = NoteDraft::new("  ", "body").validate().unwrap_err();
        assert_eq!(err, NoteError::EmptyTitle);
    }

    #[test]
    fn title_is_trimmed_and_body_kept() {
        let note = NoteDraft::new(" Leis de Newton ", "F = m·a").validate().unwrap();
        assert_eq!(note.title, "Leis de Newton");
        assert_eq!(note.body, "F = m·a");
    }

    #[test]
    fn legacy_note_without_id_deserializes() {
        let note: Note =
            serde_json::from_str(r#"{"type":"note","title":"T","body":"B"}"#).unwrap();
        assert_eq!(note.title, "T");
    }
}
