//! Runtime configuration, read from `STUDY_*` environment variables.

use study_core::gamification::StreakPolicy;

use crate::error::ConfigError;
use crate::sessions::DEFAULT_SESSION_SIZE;

pub const ENV_DB_URL: &str = "STUDY_DB_URL";
pub const ENV_DAILY_GOAL: &str = "STUDY_DAILY_GOAL";
pub const ENV_SESSION_SIZE: &str = "STUDY_SESSION_SIZE";
pub const ENV_STREAK_POLICY: &str = "STUDY_STREAK_POLICY";

/// Database used when nothing else is configured; created on first use.
pub const DEFAULT_DB_URL: &str = "sqlite://study.sqlite3?mode=rwc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyConfig {
    pub db_url: String,
    /// Overrides the stored daily goal at startup when set.
    pub daily_goal: Option<u32>,
    pub session_size: usize,
    pub streak_policy: StreakPolicy,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.to_owned(),
            daily_goal: None,
            session_size: DEFAULT_SESSION_SIZE,
            streak_policy: StreakPolicy::default(),
        }
    }
}

impl StudyConfig {
    /// Defaults overridden by the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `STUDY_*` key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a value is empty or cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_DB_URL) {
            config = config.with_db_url(raw)?;
        }
        if let Some(raw) = lookup(ENV_DAILY_GOAL) {
            config.daily_goal = Some(parse_positive(ENV_DAILY_GOAL, &raw)?);
        }
        if let Some(raw) = lookup(ENV_SESSION_SIZE) {
            config.session_size = parse_positive(ENV_SESSION_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_STREAK_POLICY) {
            config.streak_policy = raw.parse().map_err(|_| ConfigError::Invalid {
                key: ENV_STREAK_POLICY,
                raw,
            })?;
        }

        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Empty` for a blank URL.
    pub fn with_db_url(mut self, raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ConfigError::Empty { key: ENV_DB_URL });
        }
        self.db_url = normalize_sqlite_url(raw.trim());
        Ok(self)
    }
}

fn parse_positive<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::Invalid {
            key,
            raw: raw.to_owned(),
        }),
    }
}

/// Turns a bare path into a `sqlite://` URL that creates the file if missing.
fn normalize_sqlite_url(raw: &str) -> String {
    if raw.starts_with("sqlite:") {
        return raw.to_owned();
    }
    format!("sqlite://{raw}?mode=rwc")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_env() {
        let config = StudyConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StudyConfig::default());
        assert_eq!(config.session_size, 10);
        assert_eq!(config.streak_policy, StreakPolicy::BreakOnMissedDay);
    }

    #[test]
    fn env_overrides_are_parsed() {
        let config = StudyConfig::from_lookup(lookup(&[
            (ENV_DB_URL, "/tmp/study.db"),
            (ENV_DAILY_GOAL, "8"),
            (ENV_SESSION_SIZE, "4"),
            (ENV_STREAK_POLICY, "preserve"),
        ]))
        .unwrap();

        assert_eq!(config.db_url, "sqlite:///tmp/study.db?mode=rwc");
        assert_eq!(config.daily_goal, Some(8));
        assert_eq!(config.session_size, 4);
        assert_eq!(config.streak_policy, StreakPolicy::Preserve);
    }

    #[test]
    fn sqlite_urls_are_kept() {
        let config = StudyConfig::default()
            .with_db_url("sqlite::memory:")
            .unwrap();
        assert_eq!(config.db_url, "sqlite::memory:");
    }

    #[test]
    fn zero_goal_is_rejected() {
        let err = StudyConfig::from_lookup(lookup(&[(ENV_DAILY_GOAL, "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: ENV_DAILY_GOAL,
                raw: "0".into()
            }
        );
    }

    #[test]
    fn garbage_values_are_rejected() {
        assert!(StudyConfig::from_lookup(lookup(&[(ENV_SESSION_SIZE, "ten")])).is_err());
        assert!(StudyConfig::from_lookup(lookup(&[(ENV_STREAK_POLICY, "never")])).is_err());
        assert!(StudyConfig::from_lookup(lookup(&[(ENV_DB_URL, "  ")])).is_err());
    }
}
