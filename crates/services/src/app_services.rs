use std::sync::Arc;

use storage::repository::{StateStore, Storage, StorageError};
use study_core::gamification::{DailyProgress, DayRollover, GamificationTracker};
use study_core::model::AppState;

use crate::Clock;
use crate::config::StudyConfig;
use crate::content_service::ContentService;
use crate::error::AppServicesError;
use crate::sessions::{SessionPlanner, StudyLoopService};

/// Assembles app-facing services around one state store.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    tracker: GamificationTracker,
    store: Arc<dyn StateStore>,
    content: Arc<ContentService>,
    study_loop: Arc<StudyLoopService>,
}

/// What happened while loading the stored state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// No usable state was stored; a new one was created.
    pub fresh: bool,
    /// A stored state could not be read and was discarded.
    pub discarded_corrupt: bool,
    pub rollover: DayRollover,
}

/// Services plus the loaded state they operate on.
pub struct Bootstrap {
    pub services: AppServices,
    pub state: AppState,
    pub report: BootstrapReport,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and load the state.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or the initial
    /// load/save fails.
    pub async fn new_sqlite(
        config: &StudyConfig,
        clock: Clock,
    ) -> Result<Bootstrap, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        Self::from_store(Arc::new(storage), config, clock).await
    }

    /// Build services over an existing store and load the state.
    ///
    /// A stored blob that cannot be decoded is logged, cleared and replaced
    /// by a fresh state. The day rollover is applied before anything else
    /// reads the counters, and the result is saved.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` for storage failures other than a
    /// corrupt blob, and `AppServicesError::Content` for an invalid goal.
    pub async fn from_store(
        store: Arc<dyn StateStore>,
        config: &StudyConfig,
        clock: Clock,
    ) -> Result<Bootstrap, AppServicesError> {
        let tracker = GamificationTracker::new(config.streak_policy);
        let mut report = BootstrapReport::default();

        let mut state = match store.load_state().await {
            Ok(Some(state)) => state,
            Ok(None) => {
                report.fresh = true;
                AppState::new()
            }
            Err(StorageError::Deserialization(reason)) => {
                tracing::warn!(%reason, "stored state is unreadable; starting over");
                store.clear_state().await?;
                report.fresh = true;
                report.discarded_corrupt = true;
                AppState::new()
            }
            Err(err) => return Err(err.into()),
        };

        if let Some(goal) = config.daily_goal {
            state.set_daily_goal(goal)?;
        }
        report.rollover = tracker.begin_day(&mut state, clock.today());
        if let Some(lost) = report.rollover.streak_broken {
            tracing::info!(lost, "streak reset after a missed day");
        }
        store.save_state(&state).await?;

        tracing::info!(
            fresh = report.fresh,
            streak = state.streak(),
            today = state.today_count(),
            goal = state.daily_goal(),
            "study state loaded"
        );

        let content = Arc::new(ContentService::new(Arc::clone(&store)));
        let study_loop = Arc::new(
            StudyLoopService::new(clock, Arc::clone(&store))
                .with_planner(SessionPlanner::new(config.session_size))
                .with_tracker(tracker),
        );

        Ok(Bootstrap {
            services: Self {
                clock,
                tracker,
                store,
                content,
                study_loop,
            },
            state,
            report,
        })
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn tracker(&self) -> GamificationTracker {
        self.tracker
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn StateStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn content(&self) -> Arc<ContentService> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn study_loop(&self) -> Arc<StudyLoopService> {
        Arc::clone(&self.study_loop)
    }

    /// Today's progress towards the goal, as shown on the home screen.
    #[must_use]
    pub fn daily_progress(&self, state: &AppState) -> DailyProgress {
        self.tracker.progress(state)
    }
}
