#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod content_service;
pub mod error;
pub mod logging;
pub mod sessions;

pub use study_core::Clock;
pub use sessions as session;

pub use app_services::{AppServices, Bootstrap, BootstrapReport};
pub use config::StudyConfig;
pub use content_service::{ContentService, SubjectOverview};
pub use error::{AppServicesError, ConfigError, ContentServiceError, SessionError};

pub use sessions::{
    AdvanceOutcome, AnswerFeedback, AnswerOutcome, SessionCompleted, SessionPhase, SessionPlan,
    SessionPlanner, SessionProgress, SessionScope, StudyLoopService, StudySession,
};
