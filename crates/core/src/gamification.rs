use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::AppState;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown streak policy: {raw:?} (expected `preserve` or `break-on-missed-day`)")]
pub struct ParsePolicyError {
    raw: String,
}

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// What happens to the streak after a day without reaching the goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreakPolicy {
    /// Keep the streak forever; only the daily counter resets.
    Preserve,
    /// Reset the streak once a full day passes without reaching the goal.
    #[default]
    BreakOnMissedDay,
}

impl StreakPolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preserve => "preserve",
            Self::BreakOnMissedDay => "break-on-missed-day",
        }
    }
}

impl fmt::Display for StreakPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreakPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "break-on-missed-day" | "break" => Ok(Self::BreakOnMissedDay),
            _ => Err(ParsePolicyError { raw: s.to_owned() }),
        }
    }
}

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// Fired on the answer that makes today's count equal the daily goal, at
/// most once per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalReached {
    pub day: NaiveDate,
    pub streak: u32,
}

/// What changed when a new day was observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayRollover {
    /// Progress counted on an earlier day was cleared.
    pub count_reset: bool,
    /// Streak value lost to a missed day, if any.
    pub streak_broken: Option<u32>,
}

/// Daily goal progress as shown on the home screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyProgress {
    pub today_count: u32,
    pub daily_goal: u32,
    pub streak: u32,
    /// `min(today_count / daily_goal, 1.0)`
    pub ratio: f64,
}

impl DailyProgress {
    #[must_use]
    pub fn goal_met(&self) -> bool {
        self.ratio >= 1.0
    }

    /// Ratio as a whole percentage for progress bars.
    #[must_use]
    pub fn percent(&self) -> u8 {
        // ratio is clamped to [0, 1]
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = (self.ratio * 100.0).round() as u8;
        pct
    }
}

//
// ─── TRACKER ───────────────────────────────────────────────────────────────────
//

/// Daily goal and streak bookkeeping over an [`AppState`].
///
/// # Examples
///
/// ```
/// # use study_core::gamification::GamificationTracker;
/// # use study_core::model::AppState;
/// let tracker = GamificationTracker::default();
/// let mut state = AppState::new();
/// let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
///
/// let mut fired = 0;
/// for _ in 0..state.daily_goal() + 2 {
///     if tracker.record_correct_answer(&mut state, today).is_some() {
///         fired += 1;
///     }
/// }
/// assert_eq!(fired, 1);
/// assert_eq!(state.streak(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct GamificationTracker {
    policy: StreakPolicy,
}

impl GamificationTracker {
    #[must_use]
    pub fn new(policy: StreakPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> StreakPolicy {
        self.policy
    }

    /// Resets today's counter when the last study day is not `today`.
    ///
    /// Leaves the streak alone. Returns true if progress counted on an
    /// earlier day was cleared; a day change with nothing counted yet
    /// returns false.
    pub fn reconcile_day(&self, state: &mut AppState, today: NaiveDate) -> bool {
        if state.last_study_date == Some(today) {
            return false;
        }
        let had_progress = state.today_count > 0;
        state.today_count = 0;
        had_progress
    }

    /// Applies the configured streak policy for `today`.
    ///
    /// With [`StreakPolicy::BreakOnMissedDay`] the streak resets when the last
    /// day the goal was met is older than yesterday. States written before
    /// goal days were tracked fall back to the last study day.
    ///
    /// Returns the streak value that was lost, if any.
    pub fn apply_streak_policy(&self, state: &mut AppState, today: NaiveDate) -> Option<u32> {
        if self.policy == StreakPolicy::Preserve || state.streak == 0 {
            return None;
        }
        let reference = state.last_goal_date.or(state.last_study_date)?;
        let yesterday = today.pred_opt()?;
        if reference >= yesterday {
            return None;
        }
        let lost = state.streak;
        state.streak = 0;
        Some(lost)
    }

    /// Runs [`Self::reconcile_day`] and [`Self::apply_streak_policy`].
    pub fn begin_day(&self, state: &mut AppState, today: NaiveDate) -> DayRollover {
        let count_reset = self.reconcile_day(state, today);
        let streak_broken = self.apply_streak_policy(state, today);
        DayRollover {
            count_reset,
            streak_broken,
        }
    }

    /// Counts one correct answer for `today`.
    ///
    /// The streak grows only on the answer where the count becomes exactly
    /// the daily goal, and only if the goal was not already met today. A goal
    /// changed in the middle of the day cannot grow the streak twice.
    pub fn record_correct_answer(
        &self,
        state: &mut AppState,
        today: NaiveDate,
    ) -> Option<GoalReached> {
        state.today_count = state.today_count.saturating_add(1);
        state.last_study_date = Some(today);

        if state.today_count != state.daily_goal || state.last_goal_date == Some(today) {
            return None;
        }
        state.streak = state.streak.saturating_add(1);
        state.last_goal_date = Some(today);
        Some(GoalReached {
            day: today,
            streak: state.streak,
        })
    }

    #[must_use]
    pub fn progress(&self, state: &AppState) -> DailyProgress {
        DailyProgress {
            today_count: state.today_count,
            daily_goal: state.daily_goal,
            streak: state.streak,
            ratio: progress_ratio(state),
        }
    }
}

/// `min(today_count / daily_goal, 1.0)`; a zero goal counts as met.
#[must_use]
pub fn progress_ratio(state: &AppState) -> f64 {
    if state.daily_goal == 0 {
        return 1.0;
    }
    (f64::from(state.today_count) / f64::from(state.daily_goal)).min(1.0)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
