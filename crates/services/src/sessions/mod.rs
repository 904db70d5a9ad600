mod plan;
mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{DEFAULT_SESSION_SIZE, SessionPlan, SessionPlanner};
pub use progress::SessionProgress;
pub use service::{
    AdvanceOutcome, AnswerFeedback, AnswerOutcome, SessionCompleted, SessionPhase, SessionScope,
    StudySession,
};
pub use workflow::StudyLoopService;
