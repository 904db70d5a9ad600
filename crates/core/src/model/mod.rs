mod ids;
mod note;
mod question;
mod state;
mod subject;

pub use ids::{NoteId, ParseIdError, QuestionId, SubjectId};
pub use note::{Note, NoteDraft, NoteError};
pub use question::{
    AnswerKeyOverride, AnswerOptions, OptionLabel, ParseLabelError, Question, QuestionDraft,
    QuestionError, ValidatedQuestion,
};
pub use state::{AppState, ContentError, ContentItem, DEFAULT_DAILY_GOAL, QuestionAdded};
pub use subject::{BUILTIN_SUBJECTS, SubjectData, SubjectInfo, builtin_subject};
