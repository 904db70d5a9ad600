use std::sync::Arc;

use storage::repository::StateStore;
use study_core::model::{
    AppState, NoteDraft, NoteId, QuestionAdded, QuestionDraft, SubjectId, builtin_subject,
};

use crate::error::ContentServiceError;

/// Icon for subjects that only exist in an imported state.
const FALLBACK_ICON: &str = "fa-folder";

/// A subject card on the home screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectOverview {
    pub id: SubjectId,
    pub name: String,
    pub icon: &'static str,
    pub item_count: usize,
}

/// Orchestrates content authoring and persistence.
#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn StateStore>,
}

impl ContentService {
    #[must_use]
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Validate and store a question, then persist the state.
    ///
    /// When the text carries an answer key hint that disagrees with the
    /// entered answer, the hint wins and the override is returned.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Content` for validation failures; the
    /// state is left untouched in that case.
    /// Returns `ContentServiceError::Storage` if persistence fails.
    pub async fn add_question(
        &self,
        state: &mut AppState,
        subject: &SubjectId,
        draft: QuestionDraft,
    ) -> Result<QuestionAdded, ContentServiceError> {
        let added = state.add_question(subject, draft)?;
        if let Some(over) = added.answer_key_override {
            tracing::warn!(
                subject = %subject,
                entered = %over.entered,
                detected = %over.detected,
                "answer key in question text overrides the selected answer"
            );
        }
        self.store.save_state(state).await?;
        tracing::debug!(subject = %subject, id = %added.id, "question added");
        Ok(added)
    }

    /// Validate and store a note, then persist the state.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Content` for a blank title or unknown subject.
    /// Returns `ContentServiceError::Storage` if persistence fails.
    pub async fn add_note(
        &self,
        state: &mut AppState,
        subject: &SubjectId,
        draft: NoteDraft,
    ) -> Result<NoteId, ContentServiceError> {
        let id = state.add_note(subject, draft)?;
        self.store.save_state(state).await?;
        tracing::debug!(subject = %subject, id = %id, "note added");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `ContentServiceError::Content` for a zero goal.
    /// Returns `ContentServiceError::Storage` if persistence fails.
    pub async fn set_daily_goal(
        &self,
        state: &mut AppState,
        goal: u32,
    ) -> Result<(), ContentServiceError> {
        state.set_daily_goal(goal)?;
        self.store.save_state(state).await?;
        tracing::info!(goal, "daily goal updated");
        Ok(())
    }

    /// Subjects with display metadata and item counts, built-ins first.
    #[must_use]
    pub fn subject_overview(&self, state: &AppState) -> Vec<SubjectOverview> {
        state
            .subject_ids()
            .into_iter()
            .map(|id| {
                let (name, icon) = builtin_subject(&id).map_or_else(
                    || (id.as_str().to_owned(), FALLBACK_ICON),
                    |info| (info.name.to_owned(), info.icon),
                );
                SubjectOverview {
                    item_count: state.item_count(&id),
                    id,
                    name,
                    icon,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::Storage;
    use study_core::model::{AnswerOptions, ContentError, OptionLabel, QuestionError};

    fn service() -> (ContentService, Arc<Storage>) {
        let store = Arc::new(Storage::in_memory());
        (ContentService::new(store.clone()), store)
    }

    fn draft(text: &str, correct: Option<OptionLabel>) -> QuestionDraft {
        QuestionDraft {
            text: text.to_owned(),
            options: AnswerOptions::new("2", "3", "4", "5"),
            correct,
            explanation: String::new(),
        }
    }

    #[tokio::test]
    async fn added_question_is_persisted() {
        let (service, store) = service();
        let mut state = AppState::new();
        let subject = SubjectId::new("matematica");

        let added = service
            .add_question(&mut state, &subject, draft("2+2?", Some(OptionLabel::C)))
            .await
            .unwrap();

        assert!(added.answer_key_override.is_none());
        let stored = store.load_state().await.unwrap().unwrap();
        assert_eq!(stored.item_count(&subject), 1);
    }

    #[tokio::test]
    async fn hint_in_text_overrides_entered_answer() {
        let (service, _store) = service();
        let mut state = AppState::new();
        let subject = SubjectId::new("fisica");

        let added = service
            .add_question(
                &mut state,
                &subject,
                draft("Qual? Gabarito: B", Some(OptionLabel::D)),
            )
            .await
            .unwrap();

        let over = added.answer_key_override.unwrap();
        assert_eq!(over.entered, OptionLabel::D);
        assert_eq!(over.detected, OptionLabel::B);
        let stored = &state.all_questions(&subject).unwrap()[0];
        assert_eq!(stored.correct, OptionLabel::B);
    }

    #[tokio::test]
    async fn invalid_question_is_not_stored() {
        let (service, store) = service();
        let mut state = AppState::new();
        let subject = SubjectId::new("quimica");

        let err = service
            .add_question(&mut state, &subject, draft("   ", Some(OptionLabel::A)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ContentServiceError::Content(ContentError::Question(QuestionError::EmptyText))
        ));
        assert_eq!(state.item_count(&subject), 0);
        assert!(store.load_state().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn note_and_goal_updates_are_persisted() {
        let (service, store) = service();
        let mut state = AppState::new();
        let subject = SubjectId::new("portugues");

        service
            .add_note(&mut state, &subject, NoteDraft::new("Crase", "a + a"))
            .await
            .unwrap();
        service.set_daily_goal(&mut state, 8).await.unwrap();

        let stored = store.load_state().await.unwrap().unwrap();
        assert_eq!(stored.item_count(&subject), 1);
        assert_eq!(stored.daily_goal(), 8);
    }

    #[tokio::test]
    async fn zero_goal_is_rejected() {
        let (service, _store) = service();
        let mut state = AppState::new();
        let err = service.set_daily_goal(&mut state, 0).await.unwrap_err();
        assert!(matches!(
            err,
            ContentServiceError::Content(ContentError::InvalidDailyGoal)
        ));
        assert_eq!(state.daily_goal(), 5);
    }

    #[test]
    fn overview_lists_builtin_subjects_in_order() {
        let (service, _store) = service();
        let overview = service.subject_overview(&AppState::new());
        let slugs: Vec<_> = overview.iter().map(|s| s.id.as_str().to_owned()).collect();
        assert_eq!(
            slugs,
            ["portugues", "matematica", "fisica", "quimica", "biologia", "ingles"]
        );
        assert_eq!(overview[1].name, "Matemática");
        assert!(overview.iter().all(|s| s.item_count == 0));
    }
}
