use serde::{Deserialize, Serialize};

use crate::model::ids::SubjectId;
use crate::model::note::Note;
use crate::model::question::Question;

/// Display metadata for a built-in subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectInfo {
    pub slug: &'static str,
    pub name: &'static str,
    /// Icon key understood by the view layer.
    pub icon: &'static str,
}

impl SubjectInfo {
    #[must_use]
    pub fn id(&self) -> SubjectId {
        SubjectId::new(self.slug)
    }
}

/// Subjects every fresh state is seeded with, in display order.
pub const BUILTIN_SUBJECTS: [SubjectInfo; 6] = [
    SubjectInfo {
        slug: "portugues",
        name: "Português",
        icon: "fa-book",
    },
    SubjectInfo {
        slug: "matematica",
        name: "Matemática",
        icon: "fa-calculator",
    },
    SubjectInfo {
        slug: "fisica",
        name: "Física",
        icon: "fa-atom",
    },
    SubjectInfo {
        slug: "quimica",
        name: "Química",
        icon: "fa-flask",
    },
    SubjectInfo {
        slug: "biologia",
        name: "Biologia",
        icon: "fa-dna",
    },
    SubjectInfo {
        slug: "ingles",
        name: "Inglês",
        icon: "fa-flag-usa",
    },
];

/// Looks up display metadata for a built-in subject.
#[must_use]
pub fn builtin_subject(id: &SubjectId) -> Option<&'static SubjectInfo> {
    BUILTIN_SUBJECTS.iter().find(|info| info.slug == id.as_str())
}

/// Questions and notes owned by one subject, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectData {
    pub questions: Vec<Question>,
    pub notes: Vec<Note>,
}

impl SubjectData {
    /// Number of stored items, used for subject cards.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.questions.len() + self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }
}
