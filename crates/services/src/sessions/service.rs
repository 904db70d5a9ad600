use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

use study_core::gamification::{GamificationTracker, GoalReached};
use study_core::model::{AppState, OptionLabel, Question, QuestionId, SubjectId};

use super::plan::SessionPlan;
use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── SCOPE & PHASE ─────────────────────────────────────────────────────────────
//

/// Which questions a session draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionScope {
    Subject(SubjectId),
    /// Every subject; the "study today" button.
    All,
}

impl fmt::Display for SessionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionScope::Subject(id) => write!(f, "{id}"),
            SessionScope::All => f.write_str("all"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    Active,
    Finished,
}

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
}

/// Feedback for one answered question. Stays available through
/// [`StudySession::feedback`] until the learner moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub question_id: QuestionId,
    pub selected: OptionLabel,
    pub outcome: AnswerOutcome,
    pub correct: OptionLabel,
    /// The question's explanation, or a fallback naming the correct option.
    pub explanation: String,
    /// Set when this answer completed today's goal.
    pub goal_reached: Option<GoalReached>,
}

impl AnswerFeedback {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.outcome == AnswerOutcome::Correct
    }
}

/// Emitted once when the last question is moved past.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCompleted {
    pub scope: SessionScope,
    pub total: usize,
    pub correct: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The next question, now current.
    Next(Question),
    Finished(SessionCompleted),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz run over an order-frozen queue of questions.
///
/// `Idle → Active → Finished`. Answering and moving on are separate steps so
/// feedback stays visible until the caller asks for the next question.
/// A finished session is inert; call [`StudySession::start`] again for a new one.
#[derive(Default)]
pub struct StudySession {
    phase: SessionPhase,
    scope: Option<SessionScope>,
    queue: Vec<Question>,
    position: usize,
    feedback: Option<AnswerFeedback>,
    correct: usize,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl StudySession {
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Begin a session over `plan`, discarding whatever ran before.
    pub fn start(&mut self, scope: SessionScope, plan: SessionPlan, started_at: DateTime<Utc>) {
        *self = Self {
            phase: if plan.questions.is_empty() {
                SessionPhase::Finished
            } else {
                SessionPhase::Active
            },
            scope: Some(scope),
            queue: plan.questions,
            position: 0,
            feedback: None,
            correct: 0,
            started_at: Some(started_at),
            completed_at: None,
        };
    }

    /// Convenience constructor for an already started session.
    #[must_use]
    pub fn started(scope: SessionScope, plan: SessionPlan, started_at: DateTime<Utc>) -> Self {
        let mut session = Self::idle();
        session.start(scope, plan, started_at);
        session
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn scope(&self) -> Option<&SessionScope> {
        self.scope.as_ref()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Total number of questions in this session.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase == SessionPhase::Active {
            self.queue.get(self.position)
        } else {
            None
        }
    }

    /// Feedback for the current question, once answered.
    #[must_use]
    pub fn feedback(&self) -> Option<&AnswerFeedback> {
        self.feedback.as_ref()
    }

    /// `position / total`: completed questions, read before moving on.
    #[must_use]
    pub fn progress_fraction(&self) -> f64 {
        if self.queue.is_empty() {
            return 0.0;
        }
        // queue length is capped far below f64's exact integer range
        #[allow(clippy::cast_precision_loss)]
        let fraction = self.position as f64 / self.queue.len() as f64;
        fraction
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total_questions(),
            position: self.position,
            correct: self.correct,
            remaining: self.queue.len().saturating_sub(self.position),
            fraction: self.progress_fraction(),
            is_complete: self.is_complete(),
        }
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Idle => Err(SessionError::NotStarted),
            SessionPhase::Finished => Err(SessionError::Completed),
            SessionPhase::Active => Ok(()),
        }
    }

    /// Grade `selected` against the current question.
    ///
    /// A correct answer is counted towards today's goal through `tracker`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` / `Completed` outside the active
    /// phase, and `SessionError::AlreadyAnswered` on a second answer to the
    /// same question.
    pub fn answer(
        &mut self,
        selected: OptionLabel,
        state: &mut AppState,
        tracker: &GamificationTracker,
        today: NaiveDate,
    ) -> Result<&AnswerFeedback, SessionError> {
        self.ensure_active()?;
        if self.feedback.is_some() {
            return Err(SessionError::AlreadyAnswered);
        }
        let question = self.queue.get(self.position).ok_or(SessionError::Completed)?;

        let (outcome, goal_reached) = if question.is_correct(selected) {
            self.correct += 1;
            (
                AnswerOutcome::Correct,
                tracker.record_correct_answer(state, today),
            )
        } else {
            (AnswerOutcome::Incorrect, None)
        };

        let feedback = self.feedback.insert(AnswerFeedback {
            question_id: question.id,
            selected,
            outcome,
            correct: question.correct,
            explanation: question.feedback_text(),
            goal_reached,
        });
        Ok(feedback)
    }

    /// Undo the answer to the current question so it can be answered again.
    pub(crate) fn retract_answer(&mut self) {
        if let Some(feedback) = self.feedback.take() {
            if feedback.is_correct() {
                self.correct = self.correct.saturating_sub(1);
            }
        }
    }

    /// Move past the answered current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` / `Completed` outside the active
    /// phase and `SessionError::Unanswered` if the current question has no
    /// answer yet.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<AdvanceOutcome, SessionError> {
        self.ensure_active()?;
        if self.feedback.take().is_none() {
            return Err(SessionError::Unanswered);
        }

        self.position += 1;
        if let Some(next) = self.queue.get(self.position) {
            return Ok(AdvanceOutcome::Next(next.clone()));
        }

        self.phase = SessionPhase::Finished;
        self.completed_at = Some(now);
        Ok(AdvanceOutcome::Finished(SessionCompleted {
            scope: self.scope.clone().unwrap_or(SessionScope::All),
            total: self.queue.len(),
            correct: self.correct,
            started_at: self.started_at.unwrap_or(now),
            completed_at: now,
        }))
    }
}

impl fmt::Debug for StudySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudySession")
            .field("phase", &self.phase)
            .field("scope", &self.scope)
            .field("queue_len", &self.queue.len())
            .field("position", &self.position)
            .field("answered", &self.feedback.is_some())
            .field("correct", &self.correct)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
