//! Error types for the course advisor.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Model {model} not available on provider {provider}")]
    ModelNotAvailable { provider: String, model: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Provider {provider} failed after {attempts} attempts: {reason}")]
    RetriesExhausted {
        provider: String,
        attempts: u32,
        reason: String,
    },
}

impl LlmError {
    /// Whether another attempt at the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed { .. } | Self::RateLimited { .. } | Self::InvalidResponse { .. }
        )
    }
}

/// Course catalog errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog file {path} could not be read: {reason}")]
    Read { path: String, reason: String },

    #[error("Catalog file {path} is not a JSON array of course records: {reason}")]
    Parse { path: String, reason: String },

    #[error("Catalog file {path} contains no usable course records")]
    Empty { path: String },
}

/// Turn-level failures surfaced to the caller.
///
/// A failed turn never returns a partially advanced profile.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    /// A collaborator cannot serve requests right now. The caller should
    /// resend the identical turn later.
    #[error("Service unavailable: {reason}")]
    ServiceUnavailable { reason: String },

    /// Text generation failed after its own retries were exhausted.
    #[error("Generation failed: {0}")]
    GenerationFailed(LlmError),
}

impl AdvisorError {
    /// Whether resending the same turn later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }
}

impl From<LlmError> for AdvisorError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::AuthFailed { .. } | LlmError::ModelNotAvailable { .. } => {
                Self::ServiceUnavailable {
                    reason: err.to_string(),
                }
            }
            other => Self::GenerationFailed(other),
        }
    }
}

/// Result type alias for the advisor.
pub type Result<T> = std::result::Result<T, Error>;
