use std::sync::Arc;

use rand::Rng;
use storage::repository::StateStore;
use study_core::gamification::GamificationTracker;
use study_core::model::{AppState, OptionLabel};

use super::plan::SessionPlanner;
use super::service::{AdvanceOutcome, AnswerFeedback, SessionScope, StudySession};
use crate::Clock;
use crate::error::SessionError;

/// Orchestrates session start, answering and persistence of progress.
#[derive(Clone)]
pub struct StudyLoopService {
    clock: Clock,
    store: Arc<dyn StateStore>,
    planner: SessionPlanner,
    tracker: GamificationTracker,
}

impl StudyLoopService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn StateStore>) -> Self {
        Self {
            clock,
            store,
            planner: SessionPlanner::default(),
            tracker: GamificationTracker::default(),
        }
    }

    #[must_use]
    pub fn with_planner(mut self, planner: SessionPlanner) -> Self {
        self.planner = planner;
        self
    }

    #[must_use]
    pub fn with_tracker(mut self, tracker: GamificationTracker) -> Self {
        self.tracker = tracker;
        self
    }

    #[must_use]
    pub fn tracker(&self) -> GamificationTracker {
        self.tracker
    }

    /// Start a session over one subject or, with [`SessionScope::All`], every subject.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Content` for an unknown subject and
    /// `SessionError::EmptyPool` when there is nothing to study.
    pub fn start_session(
        &self,
        state: &AppState,
        scope: SessionScope,
    ) -> Result<StudySession, SessionError> {
        self.start_session_with_rng(state, scope, &mut rand::rng())
    }

    /// Same as [`Self::start_session`] with a caller supplied RNG.
    ///
    /// # Errors
    ///
    /// See [`Self::start_session`].
    pub fn start_session_with_rng<R: Rng + ?Sized>(
        &self,
        state: &AppState,
        scope: SessionScope,
        rng: &mut R,
    ) -> Result<StudySession, SessionError> {
        let pool = match &scope {
            SessionScope::Subject(subject) => state.all_questions(subject)?,
            SessionScope::All => state.all_questions_across_subjects(),
        };
        let plan = self.planner.plan(pool, rng)?;
        tracing::info!(
            scope = %scope,
            questions = plan.total(),
            pool = plan.pool_size,
            "study session started"
        );
        Ok(StudySession::started(scope, plan, self.clock.now()))
    }

    /// Grade the current question and persist the state after a correct answer.
    ///
    /// A day change since the last answer is applied first, so a session left
    /// open past midnight counts towards the new day.
    ///
    /// `state` and `session` only change once the save has succeeded. After a
    /// storage error the same question can be answered again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for session misuse or persistence failures.
    pub async fn answer_current(
        &self,
        session: &mut StudySession,
        state: &mut AppState,
        selected: OptionLabel,
    ) -> Result<AnswerFeedback, SessionError> {
        let today = self.clock.today();
        let mut staged = state.clone();
        let rollover = self.tracker.begin_day(&mut staged, today);

        let feedback = session
            .answer(selected, &mut staged, &self.tracker, today)?
            .clone();

        if feedback.is_correct() {
            if let Err(err) = self.store.save_state(&staged).await {
                session.retract_answer();
                tracing::warn!(error = %err, "could not save answer; it can be retried");
                return Err(err.into());
            }
        }
        *state = staged;

        if let Some(lost) = rollover.streak_broken {
            tracing::info!(lost, "streak reset after a missed day");
        }
        if let Some(goal) = feedback.goal_reached {
            tracing::info!(streak = goal.streak, day = %goal.day, "daily goal reached");
        }
        tracing::debug!(
            question = %feedback.question_id,
            selected = %feedback.selected,
            correct = feedback.is_correct(),
            "answer graded"
        );

        Ok(feedback)
    }

    /// Move to the next question, finishing the session after the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Unanswered` if the current question has no
    /// answer yet, or the phase errors of [`StudySession::advance`].
    pub fn advance(&self, session: &mut StudySession) -> Result<AdvanceOutcome, SessionError> {
        let outcome = session.advance(self.clock.now())?;
        if let AdvanceOutcome::Finished(summary) = &outcome {
            tracing::info!(
                scope = %summary.scope,
                total = summary.total,
                correct = summary.correct,
                "study session finished"
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::atomic::{AtomicBool, Ordering};
    use storage::repository::{Storage, StorageError};
    use study_core::model::{AnswerOptions, QuestionDraft, SubjectId};
    use study_core::time::{fixed_clock, fixed_today};

    fn draft(text: &str, correct: OptionLabel) -> QuestionDraft {
        QuestionDraft {
            text: text.to_owned(),
            options: AnswerOptions::new("1", "2", "3", "4"),
            correct: Some(correct),
            explanation: String::new(),
        }
    }

    fn state_with(subject: &str, count: usize) -> AppState {
        let mut state = AppState::new();
        let id = SubjectId::new(subject);
        for i in 0..count {
            state
                .add_question(&id, draft(&format!("Q{i}"), OptionLabel::C))
                .unwrap();
        }
        state
    }

    #[tokio::test]
    async fn unknown_subject_cannot_start() {
        let service = StudyLoopService::new(fixed_clock(), Arc::new(Storage::in_memory()));
        let err = service
            .start_session(&AppState::new(), SessionScope::Subject(SubjectId::new("latim")))
            .unwrap_err();
        assert!(matches!(err, SessionError::Content(_)));
    }

    #[tokio::test]
    async fn empty_subject_cannot_start() {
        let service = StudyLoopService::new(fixed_clock(), Arc::new(Storage::in_memory()));
        let err = service
            .start_session(&AppState::new(), SessionScope::Subject(SubjectId::new("fisica")))
            .unwrap_err();
        assert!(matches!(err, SessionError::EmptyPool));
    }

    #[tokio::test]
    async fn session_size_follows_planner_limit() {
        let service = StudyLoopService::new(fixed_clock(), Arc::new(Storage::in_memory()))
            .with_planner(SessionPlanner::new(3));
        let state = state_with("quimica", 7);
        let session = service
            .start_session_with_rng(&state, SessionScope::All, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(session.total_questions(), 3);
    }

    #[tokio::test]
    async fn correct_answer_is_persisted() {
        let store = Arc::new(Storage::in_memory());
        let service = StudyLoopService::new(fixed_clock(), store.clone());
        let mut state = state_with("matematica", 1);
        let mut session = service
            .start_session(&state, SessionScope::Subject(SubjectId::new("matematica")))
            .unwrap();

        let feedback = service
            .answer_current(&mut session, &mut state, OptionLabel::C)
            .await
            .unwrap();
        assert!(feedback.is_correct());

        let stored = store.load_state().await.unwrap().unwrap();
        assert_eq!(stored.today_count(), 1);
        assert_eq!(stored.last_study_date(), Some(fixed_today()));
    }

    #[tokio::test]
    async fn incorrect_answer_is_not_persisted() {
        let store = Arc::new(Storage::in_memory());
        let service = StudyLoopService::new(fixed_clock(), store.clone());
        let mut state = state_with("matematica", 1);
        let mut session = service.start_session(&state, SessionScope::All).unwrap();

        let feedback = service
            .answer_current(&mut session, &mut state, OptionLabel::A)
            .await
            .unwrap();

        assert!(!feedback.is_correct());
        assert_eq!(feedback.correct, OptionLabel::C);
        assert!(store.load_state().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn answering_on_a_new_day_resets_the_counter() {
        let store = Arc::new(Storage::in_memory());
        let mut clock = fixed_clock();
        let mut state = state_with("biologia", 2);
        let service = StudyLoopService::new(clock, store.clone());
        let mut session = service.start_session(&state, SessionScope::All).unwrap();
        service
            .answer_current(&mut session, &mut state, OptionLabel::C)
            .await
            .unwrap();
        service.advance(&mut session).unwrap();

        clock.advance(Duration::days(1));
        let next_day = StudyLoopService::new(clock, store);
        next_day
            .answer_current(&mut session, &mut state, OptionLabel::C)
            .await
            .unwrap();

        assert_eq!(state.today_count(), 1);
        assert_eq!(state.last_study_date(), Some(clock.today()));
    }

    /// Fails the first save, then stores normally.
    struct FlakyStore {
        fail_next: AtomicBool,
        inner: Storage,
    }

    #[async_trait::async_trait]
    impl StateStore for FlakyStore {
        async fn load_state(&self) -> Result<Option<AppState>, StorageError> {
            self.inner.load_state().await
        }

        async fn save_state(&self, state: &AppState) -> Result<(), StorageError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(StorageError::Connection("database is locked".into()));
            }
            self.inner.save_state(state).await
        }

        async fn clear_state(&self) -> Result<(), StorageError> {
            self.inner.clear_state().await
        }
    }

    #[tokio::test]
    async fn failed_save_leaves_answer_retryable() {
        let store = Arc::new(FlakyStore {
            fail_next: AtomicBool::new(true),
            inner: Storage::in_memory(),
        });
        let service = StudyLoopService::new(fixed_clock(), store.clone());
        let mut state = state_with("fisica", 1);
        let mut session = service.start_session(&state, SessionScope::All).unwrap();

        let err = service
            .answer_current(&mut session, &mut state, OptionLabel::C)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Storage(_)));
        assert_eq!(state.today_count(), 0);
        assert!(session.feedback().is_none());

        let feedback = service
            .answer_current(&mut session, &mut state, OptionLabel::C)
            .await
            .unwrap();
        assert!(feedback.is_correct());
        assert_eq!(state.today_count(), 1);
        assert_eq!(session.progress().correct, 1);

        let stored = store.load_state().await.unwrap().unwrap();
        assert_eq!(stored.today_count(), 1);
    }

    #[tokio::test]
    async fn advance_finishes_after_last_question() {
        let service = StudyLoopService::new(fixed_clock(), Arc::new(Storage::in_memory()));
        let mut state = state_with("ingles", 1);
        let mut session = service.start_session(&state, SessionScope::All).unwrap();
        service
            .answer_current(&mut session, &mut state, OptionLabel::B)
            .await
            .unwrap();

        let outcome = service.advance(&mut session).unwrap();
        assert!(matches!(outcome, AdvanceOutcome::Finished(ref s) if s.total == 1 && s.correct == 0));
    }
}
