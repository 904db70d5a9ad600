use rand::Rng;
use rand::seq::SliceRandom;

use study_core::model::Question;

use crate::error::SessionError;

/// Questions per session unless configured otherwise.
pub const DEFAULT_SESSION_SIZE: usize = 10;

/// Selection result for a session build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    pub questions: Vec<Question>,
    /// Number of eligible questions the sample was drawn from.
    pub pool_size: usize,
}

impl SessionPlan {
    /// Total number of questions in this plan.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }
}

/// Draws a uniformly random, order-frozen sample of questions.
#[derive(Debug, Clone, Copy)]
pub struct SessionPlanner {
    limit: usize,
}

impl Default for SessionPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_SIZE)
    }
}

impl SessionPlanner {
    /// A planner capping sessions at `limit` questions (at least one).
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Shuffle the pool and keep the first `min(limit, pool.len())` questions.
    ///
    /// `SliceRandom::shuffle` is a Fisher–Yates shuffle, so every ordering of
    /// the pool is equally likely.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPool` if `pool` is empty.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        mut pool: Vec<Question>,
        rng: &mut R,
    ) -> Result<SessionPlan, SessionError> {
        if pool.is_empty() {
            return Err(SessionError::EmptyPool);
        }
        let pool_size = pool.len();
        pool.shuffle(rng);
        pool.truncate(self.limit.min(pool_size));

        Ok(SessionPlan {
            questions: pool,
            pool_size,
        })
    }
}
