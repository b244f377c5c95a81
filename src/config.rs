//! Configuration types.
//!
//! Values come from environment variables (a `.env` file is loaded first by
//! the binary), falling back to the defaults below.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::advising::state::IntakeField;
use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig, RetryConfig};

/// One question asked during the intake phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeQuestion {
    pub field: IntakeField,
    pub question: String,
}

impl IntakeQuestion {
    pub fn new(field: IntakeField, question: impl Into<String>) -> Self {
        Self {
            field,
            question: question.into(),
        }
    }
}

/// Intake questions in the order they are asked.
pub fn default_intake_questions() -> Vec<IntakeQuestion> {
    vec![
        IntakeQuestion::new(
            IntakeField::Year,
            "What Student Year are you in? (e.g., Freshman, Junior)",
        ),
        IntakeQuestion::new(
            IntakeField::TimePreference,
            "What is your preferred time for classes? (e.g., Morning, Evening, Online)",
        ),
        IntakeQuestion::new(
            IntakeField::CareerGoals,
            "What are your primary Career Goals? (e.g., Software Engineer, Cybersecurity, Data Science)",
        ),
    ]
}

/// Advising conversation configuration.
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// Validation attempts allowed per intake field before it is skipped.
    pub retry_limit: u32,
    /// Maximum turns kept in a profile's conversation history.
    pub max_history: usize,
    /// Turns of history included in recommendation prompts.
    pub recent_messages: usize,
    /// Turns of history included in feedback prompts.
    pub feedback_messages: usize,
    /// Retry-store entries untouched for this long are evicted.
    pub session_idle_timeout: Duration,
    /// Intake questions, in declared order.
    pub intake: Vec<IntakeQuestion>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            retry_limit: 2,
            max_history: 20,
            recent_messages: 10,
            feedback_messages: 5,
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            intake: default_intake_questions(),
        }
    }
}

impl AdvisorConfig {
    /// Build config from environment variables, keeping defaults for unset keys.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            retry_limit: env_parse("ADVISOR_RETRY_LIMIT", defaults.retry_limit)?,
            max_history: env_parse("ADVISOR_MAX_HISTORY", defaults.max_history)?,
            recent_messages: env_parse("ADVISOR_RECENT_MESSAGES", defaults.recent_messages)?,
            feedback_messages: env_parse("ADVISOR_FEEDBACK_MESSAGES", defaults.feedback_messages)?,
            session_idle_timeout: Duration::from_secs(env_parse(
                "ADVISOR_SESSION_IDLE_SECS",
                defaults.session_idle_timeout.as_secs(),
            )?),
            intake: defaults.intake,
        })
    }
}

/// Where the course catalog snapshot is read from.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub path: PathBuf,
    /// Maximum course records loaded into the snapshot.
    pub limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/courses.json"),
            limit: 200,
        }
    }
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            path: std::env::var("ADVISOR_CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.path),
            limit: env_parse("ADVISOR_CATALOG_LIMIT", defaults.limit)?,
        })
    }
}

/// Build the LLM configuration from environment variables.
///
/// Fails if the API key for the selected backend is missing.
pub fn llm_config_from_env() -> Result<LlmConfig, ConfigError> {
    let backend = match std::env::var("ADVISOR_LLM_BACKEND") {
        Ok(value) => LlmBackend::from_str(&value)?,
        Err(_) => LlmBackend::Anthropic,
    };

    let api_key = std::env::var(backend.api_key_var())
        .map_err(|_| ConfigError::MissingEnvVar(backend.api_key_var().to_string()))?;

    let model = std::env::var("ADVISOR_MODEL")
        .unwrap_or_else(|_| backend.default_model().to_string());

    let retry = RetryConfig {
        max_attempts: env_parse("ADVISOR_LLM_MAX_RETRIES", RetryConfig::default().max_attempts)?,
        ..RetryConfig::default()
    };

    Ok(LlmConfig {
        backend,
        api_key: secrecy::SecretString::from(api_key),
        model,
        retry,
    })
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{raw}': {e}"),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_advising_policy() {
        let config = AdvisorConfig::default();
        assert_eq!(config.retry_limit, 2);
        assert_eq!(config.max_history, 20);
        assert_eq!(config.recent_messages, 10);
        assert_eq!(config.feedback_messages, 5);
        let order: Vec<IntakeField> = config.intake.iter().map(|q| q.field).collect();
        assert_eq!(
            order,
            vec![
                IntakeField::Year,
                IntakeField::TimePreference,
                IntakeField::CareerGoals
            ]
        );
    }

    #[test]
    fn env_parse_falls_back_and_rejects_garbage() {
        // Keys are unique to this test so parallel tests don't interfere.
        assert_eq!(env_parse("ADVISOR_TEST_UNSET_KEY", 7u32).unwrap(), 7);

        unsafe { std::env::set_var("ADVISOR_TEST_BAD_NUMBER", "lots") };
        let err = env_parse("ADVISOR_TEST_BAD_NUMBER", 1usize).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "ADVISOR_TEST_BAD_NUMBER"));

        unsafe { std::env::set_var("ADVISOR_TEST_GOOD_NUMBER", " 42 ") };
        assert_eq!(env_parse("ADVISOR_TEST_GOOD_NUMBER", 1usize).unwrap(), 42);
    }
}
