use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::answer_key;
use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("option A cannot be empty")]
    EmptyFirstOption,

    #[error("no correct answer was selected or found in the question text")]
    MissingAnswerKey,
}

/// Error returned when a string is not one of the four option labels.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid option label: {raw:?} (expected a, b, c or d)")]
pub struct ParseLabelError {
    raw: String,
}

//
// ─── OPTION LABELS ─────────────────────────────────────────────────────────────
//

/// One of the four fixed answer slots of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Lowercase form used in storage and answer keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
        }
    }

    /// Uppercase form shown to the learner.
    #[must_use]
    pub fn display_letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLabel {
    type Err = ParseLabelError;

    /// Parses a label case-insensitively, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(Self::A),
            "b" => Ok(Self::B),
            "c" => Ok(Self::C),
            "d" => Ok(Self::D),
            _ => Err(ParseLabelError { raw: s.to_owned() }),
        }
    }
}

impl Serialize for OptionLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OptionLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

//
// ─── OPTIONS ───────────────────────────────────────────────────────────────────
//

/// Text of the four answer options, keyed by label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerOptions {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

impl AnswerOptions {
    #[must_use]
    pub fn new(
        a: impl Into<String>,
        b: impl Into<String>,
        c: impl Into<String>,
        d: impl Into<String>,
    ) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            c: c.into(),
            d: d.into(),
        }
    }

    #[must_use]
    pub fn get(&self, label: OptionLabel) -> &str {
        match label {
            OptionLabel::A => &self.a,
            OptionLabel::B => &self.b,
            OptionLabel::C => &self.c,
            OptionLabel::D => &self.d,
        }
    }

    /// Iterates options in label order.
    pub fn iter(&self) -> impl Iterator<Item = (OptionLabel, &str)> {
        OptionLabel::ALL.into_iter().map(|label| (label, self.get(label)))
    }
}

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// User input for a new question, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub options: AnswerOptions,
    /// Answer picked manually in the form, if any.
    pub correct: Option<OptionLabel>,
    pub explanation: String,
}

/// Reported when an answer key written in the question text replaced the
/// answer picked manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerKeyOverride {
    pub entered: OptionLabel,
    pub detected: OptionLabel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestion {
    pub question: Question,
    pub answer_key_override: Option<AnswerKeyOverride>,
}

impl QuestionDraft {
    /// Validate the draft and resolve its answer key.
    ///
    /// An answer key found in the text (see [`answer_key::detect`]) wins over
    /// the manually selected one; a differing manual choice is reported in
    /// [`ValidatedQuestion::answer_key_override`].
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` / `EmptyFirstOption` when required
    /// fields are blank, and `MissingAnswerKey` when no answer can be resolved.
    pub fn validate(self) -> Result<ValidatedQuestion, QuestionError> {
        let detected = answer_key::detect(&self.text);

        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.options.a.trim().is_empty() {
            return Err(QuestionError::EmptyFirstOption);
        }

        let answer_key_override = match (self.correct, detected) {
            (Some(entered), Some(detected)) if entered != detected => {
                Some(AnswerKeyOverride { entered, detected })
            }
            _ => None,
        };
        let correct = detected
            .or(self.correct)
            .ok_or(QuestionError::MissingAnswerKey)?;

        Ok(ValidatedQuestion {
            question: Question {
                id: QuestionId::generate(),
                text: self.text,
                options: self.options,
                correct,
                explanation: self.explanation.trim().to_owned(),
            },
            answer_key_override,
        })
    }
}

/// A stored multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: QuestionId,
    pub text: String,
    #[serde(default)]
    pub options: AnswerOptions,
    pub correct: OptionLabel,
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    #[must_use]
    pub fn is_correct(&self, selected: OptionLabel) -> bool {
        self.correct == selected
    }

    /// Explanation shown after answering, with a generated fallback.
    #[must_use]
    pub fn feedback_text(&self) -> String {
        if self.explanation.trim().is_empty() {
            format!(
                "The correct answer was option {}.",
                self.correct.display_letter()
            )
        } else {
            self.explanation.clone()
        }
    }

    /// Short preview for list views.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.text.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
