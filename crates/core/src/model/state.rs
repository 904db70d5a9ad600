use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::ids::{NoteId, QuestionId, SubjectId};
use crate::model::note::{Note, NoteDraft, NoteError};
use crate::model::question::{AnswerKeyOverride, Question, QuestionDraft, QuestionError};
use crate::model::subject::{BUILTIN_SUBJECTS, SubjectData};

/// Daily goal used for fresh states and for stored goals of zero.
pub const DEFAULT_DAILY_GOAL: u32 = 5;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Validation failures when adding content. Nothing is stored on error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentError {
    #[error("unknown subject: {0}")]
    UnknownSubject(SubjectId),

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error(transparent)]
    Note(#[from] NoteError),

    #[error("daily goal must be > 0")]
    InvalidDailyGoal,
}

//
// ─── APP STATE ─────────────────────────────────────────────────────────────────
//

/// Everything the tracker persists: gamification counters plus content.
///
/// Field names follow the stored blob (`camelCase`, `data` accepted for
/// `subjects`). Missing fields fall back to defaults so older blobs still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub(crate) streak: u32,
    #[serde(deserialize_with = "lenient_date::deserialize")]
    pub(crate) last_study_date: Option<NaiveDate>,
    pub(crate) daily_goal: u32,
    pub(crate) today_count: u32,
    #[serde(deserialize_with = "lenient_date::deserialize")]
    pub(crate) last_goal_date: Option<NaiveDate>,
    #[serde(alias = "data")]
    pub(crate) subjects: BTreeMap<SubjectId, SubjectData>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a successful `add_question`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionAdded {
    pub id: QuestionId,
    pub answer_key_override: Option<AnswerKeyOverride>,
}

/// An entry of a subject's content list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentItem<'a> {
    Note(&'a Note),
    Question(&'a Question),
}

impl AppState {
    /// Fresh state with an empty collection for every built-in subject.
    #[must_use]
    pub fn new() -> Self {
        let subjects = BUILTIN_SUBJECTS
            .iter()
            .map(|info| (info.id(), SubjectData::default()))
            .collect();
        Self {
            streak: 0,
            last_study_date: None,
            daily_goal: DEFAULT_DAILY_GOAL,
            today_count: 0,
            last_goal_date: None,
            subjects,
        }
    }

    /// Repairs a freshly loaded state: re-seeds missing built-in subjects and
    /// replaces a zero daily goal with the default.
    ///
    /// Returns true when anything was changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        for info in &BUILTIN_SUBJECTS {
            if !self.subjects.contains_key(&info.id()) {
                self.subjects.insert(info.id(), SubjectData::default());
                changed = true;
            }
        }
        if self.daily_goal == 0 {
            self.daily_goal = DEFAULT_DAILY_GOAL;
            changed = true;
        }
        changed
    }

    // Accessors
    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn last_study_date(&self) -> Option<NaiveDate> {
        self.last_study_date
    }

    #[must_use]
    pub fn last_goal_date(&self) -> Option<NaiveDate> {
        self.last_goal_date
    }

    #[must_use]
    pub fn daily_goal(&self) -> u32 {
        self.daily_goal
    }

    #[must_use]
    pub fn today_count(&self) -> u32 {
        self.today_count
    }

    /// Change the number of correct answers required per day.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::InvalidDailyGoal` if `goal` is zero.
    pub fn set_daily_goal(&mut self, goal: u32) -> Result<(), ContentError> {
        if goal == 0 {
            return Err(ContentError::InvalidDailyGoal);
        }
        self.daily_goal = goal;
        Ok(())
    }

    #[must_use]
    pub fn subject(&self, id: &SubjectId) -> Option<&SubjectData> {
        self.subjects.get(id)
    }

    /// Subject ids with built-in subjects first (catalogue order), then any
    /// other stored subjects in id order.
    #[must_use]
    pub fn subject_ids(&self) -> Vec<SubjectId> {
        let mut ids: Vec<SubjectId> = BUILTIN_SUBJECTS
            .iter()
            .map(|info| info.id())
            .filter(|id| self.subjects.contains_key(id))
            .collect();
        let extra: Vec<SubjectId> = self
            .subjects
            .keys()
            .filter(|id| !ids.contains(id))
            .cloned()
            .collect();
        ids.extend(extra);
        ids
    }

    fn subject_mut(&mut self, id: &SubjectId) -> Result<&mut SubjectData, ContentError> {
        self.subjects
            .get_mut(id)
            .ok_or_else(|| ContentError::UnknownSubject(id.clone()))
    }

    //
    // ─── CONTENT REPOSITORY ────────────────────────────────────────────────────
    //

    /// Validate and append a question to a subject.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::UnknownSubject` for unknown subjects and
    /// `ContentError::Question` if the draft fails validation.
    pub fn add_question(
        &mut self,
        subject: &SubjectId,
        draft: QuestionDraft,
    ) -> Result<QuestionAdded, ContentError> {
        let data = self.subject_mut(subject)?;
        let validated = draft.validate()?;
        let added = QuestionAdded {
            id: validated.question.id,
            answer_key_override: validated.answer_key_override,
        };
        data.questions.push(validated.question);
        Ok(added)
    }

    /// Validate and append a note to a subject.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::UnknownSubject` for unknown subjects and
    /// `ContentError::Note` if the title is blank.
    pub fn add_note(&mut self, subject: &SubjectId, draft: NoteDraft) -> Result<NoteId, ContentError> {
        let data = self.subject_mut(subject)?;
        let note = draft.validate()?;
        let id = note.id;
        data.notes.push(note);
        Ok(id)
    }

    /// Questions plus notes for a subject; zero for unknown subjects.
    #[must_use]
    pub fn item_count(&self, subject: &SubjectId) -> usize {
        self.subjects.get(subject).map_or(0, SubjectData::item_count)
    }

    /// Snapshot of one subject's questions, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::UnknownSubject` for unknown subjects.
    pub fn all_questions(&self, subject: &SubjectId) -> Result<Vec<Question>, ContentError> {
        self.subjects
            .get(subject)
            .map(|data| data.questions.clone())
            .ok_or_else(|| ContentError::UnknownSubject(subject.clone()))
    }

    /// Snapshot of every stored question, subject by subject.
    #[must_use]
    pub fn all_questions_across_subjects(&self) -> Vec<Question> {
        self.subject_ids()
            .iter()
            .filter_map(|id| self.subjects.get(id))
            .flat_map(|data| data.questions.iter().cloned())
            .collect()
    }

    /// Notes first, then questions, as listed on a subject page.
    #[must_use]
    pub fn list_items(&self, subject: &SubjectId) -> Vec<ContentItem<'_>> {
        let Some(data) = self.subjects.get(subject) else {
            return Vec::new();
        };
        data.notes
            .iter()
            .map(ContentItem::Note)
            .chain(data.questions.iter().map(ContentItem::Question))
            .collect()
    }
}

/// Accepts ISO dates and the `Date.toDateString()` form older blobs used
/// (`"Sat Oct 17 2026"`). Anything else reads as no date.
mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    pub(super) fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(raw, "%a %b %d %Y"))
            .ok()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::{AnswerOptions, OptionLabel};

    fn question(text: &str, correct: OptionLabel) -> QuestionDraft {
        QuestionDraft {
            text: text.to_owned(),
            options: AnswerOptions::new("1", "2", "3", "4"),
            correct: Some(correct),
            explanation: String::new(),
        }
    }

    fn matematica() -> SubjectId {
        SubjectId::new("matematica")
    }

    #[test]
    fn new_state_seeds_builtin_subjects() {
        let state = AppState::new();
        assert_eq!(state.subject_ids().len(), BUILTIN_SUBJECTS.len());
        assert_eq!(state.daily_goal(), DEFAULT_DAILY_GOAL);
        assert_eq!(state.item_count(&matematica()), 0);
    }

    #[test]
    fn add_question_preserves_insertion_order() {
        let mut state = AppState::new();
        state.add_question(&matematica(), question("first", OptionLabel::A)).unwrap();
        state.add_question(&matematica(), question("second", OptionLabel::B)).unwrap();

        let texts: Vec<_> = state
            .all_questions(&matematica())
            .unwrap()
            .into_iter()
            .map(|q| q.text)
            .collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[test]
    fn invalid_question_is_not_stored() {
        let mut state = AppState::new();
        let err = state
            .add_question(&matematica(), question("", OptionLabel::A))
            .unwrap_err();
        assert_eq!(err, ContentError::Question(QuestionError::EmptyText));
        assert_eq!(state.item_count(&matematica()), 0);
    }

    #[test]
    fn note_with_empty_title_leaves_notes_untouched() {
        let mut state = AppState::new();
        state.add_note(&matematica(), NoteDraft::new("Frações", "")).unwrap();

        let err = state
            .add_note(&matematica(), NoteDraft::new("", "body"))
            .unwrap_err();

        assert_eq!(err, ContentError::Note(NoteError::EmptyTitle));
        assert_eq!(state.subject(&matematica()).unwrap().notes.len(), 1);
    }

    #[test]
    fn unknown_subject_is_rejected() {
        let mut state = AppState::new();
        let err = state
            .add_note(&SubjectId::new("history"), NoteDraft::new("T", ""))
            .unwrap_err();
        assert!(matches!(err, ContentError::UnknownSubject(_)));
    }

    #[test]
    fn item_count_sums_questions_and_notes() {
        let mut state = AppState::new();
        state.add_question(&matematica(), question("q", OptionLabel::A)).unwrap();
        state.add_note(&matematica(), NoteDraft::new("n", "")).unwrap();
        assert_eq!(state.item_count(&matematica()), 2);
    }

    #[test]
    fn snapshots_do_not_follow_later_mutation() {
        let mut state = AppState::new();
        state.add_question(&matematica(), question("q1", OptionLabel::A)).unwrap();
        let snapshot = state.all_questions(&matematica()).unwrap();

        state.add_question(&matematica(), question("q2", OptionLabel::B)).unwrap();

        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn across_subjects_follows_catalogue_order() {
        let mut state = AppState::new();
        state
            .add_question(&SubjectId::new("ingles"), question("en", OptionLabel::A))
            .unwrap();
        state
            .add_question(&SubjectId::new("portugues"), question("pt", OptionLabel::A))
            .unwrap();

        let texts: Vec<_> = state
            .all_questions_across_subjects()
            .into_iter()
            .map(|q| q.text)
            .collect();
        assert_eq!(texts, ["pt", "en"]);
    }

    #[test]
    fn list_items_puts_notes_first() {
        let mut state = AppState::new();
        state.add_question(&matematica(), question("q", OptionLabel::A)).unwrap();
        state.add_note(&matematica(), NoteDraft::new("n", "")).unwrap();

        let items = state.list_items(&matematica());
        assert!(matches!(items[0], ContentItem::Note(_)));
        assert!(matches!(items[1], ContentItem::Question(_)));
    }

    #[test]
    fn zero_daily_goal_is_rejected() {
        let mut state = AppState::new();
        assert_eq!(state.set_daily_goal(0), Err(ContentError::InvalidDailyGoal));
        state.set_daily_goal(8).unwrap();
        assert_eq!(state.daily_goal(), 8);
    }

    #[test]
    fn legacy_blob_is_merged_with_defaults() {
        let raw = r#"{
            "streak": 3,
            "lastStudyDate": "Sat Oct 17 2026",
            "dailyGoal": 0,
            "todayCount": 2,
            "data": {
                "matematica": {
                    "questions": [{
                        "type": "question",
                        "text": "2+2?",
                        "options": {"a": "3", "b": "4", "c": "5", "d": "6"},
                        "correct": "b",
                        "explanation": ""
                    }],
                    "notes": []
                }
            }
        }"#;

        let mut state: AppState = serde_json::from_str(raw).unwrap();
        assert!(state.normalize());

        assert_eq!(state.streak(), 3);
        assert_eq!(state.last_study_date(), NaiveDate::from_ymd_opt(2026, 10, 17));
        assert_eq!(state.daily_goal(), DEFAULT_DAILY_GOAL);
        assert_eq!(state.subject_ids().len(), BUILTIN_SUBJECTS.len());
        assert_eq!(state.all_questions(&matematica()).unwrap()[0].correct, OptionLabel::B);
    }

    #[test]
    fn unparseable_date_reads_as_none() {
        assert_eq!(lenient_date::parse("yesterday-ish"), None);
        assert_eq!(
            lenient_date::parse("2026-10-17"),
            NaiveDate::from_ymd_opt(2026, 10, 17)
        );
    }

    #[test]
    fn state_roundtrips_through_json() {
        let mut state = AppState::new();
        state.add_question(&matematica(), question("q", OptionLabel::C)).unwrap();
        state.last_study_date = NaiveDate::from_ymd_opt(2026, 10, 17);

        let json = serde_json::to_string(&state).unwrap();
        let back: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
