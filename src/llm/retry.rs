//! Bounded retry with exponential backoff around any `LlmProvider`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::warn;

use crate::error::LlmError;
use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider};

/// Retry settings for generation calls.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles on each further attempt.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Backoff before the attempt following `attempt` (zero-based).
    fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        let jitter_ms = (self.base_delay.as_millis() / 4) as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        exp + Duration::from_millis(jitter)
    }
}

/// Provider wrapper that retries transient failures.
///
/// Non-transient errors (auth, unknown model) are returned immediately.
/// When every attempt fails, the last error is folded into
/// `LlmError::RetriesExhausted`.
pub struct RetryProvider {
    inner: Arc<dyn LlmProvider>,
    config: RetryConfig,
}

impl RetryProvider {
    pub fn new(inner: Arc<dyn LlmProvider>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl LlmProvider for RetryProvider {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let attempts = self.config.max_attempts.max(1);
        let mut last_reason = String::new();

        for attempt in 0..attempts {
            match self.inner.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    last_reason = e.to_string();
                    if attempt + 1 < attempts {
                        let delay = match &e {
                            LlmError::RateLimited {
                                retry_after: Some(after),
                                ..
                            } => *after,
                            _ => self.config.delay_for(attempt),
                        };
                        warn!(
                            model = self.inner.model_name(),
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Generation call failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(LlmError::RetriesExhausted {
            provider: self.inner.model_name().to_string(),
            attempts,
            reason: last_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::llm::provider::{ChatMessage, FinishReason};

    /// Fails `failures` times with the given error, then succeeds.
    struct Flaky {
        failures: Mutex<u32>,
        calls: Mutex<u32>,
        error: fn() -> LlmError,
    }

    impl Flaky {
        fn new(failures: u32, error: fn() -> LlmError) -> Arc<Self> {
            Arc::new(Self {
                failures: Mutex::new(failures),
                calls: Mutex::new(0),
                error,
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl LlmProvider for Flaky {
        fn model_name(&self) -> &str {
            "flaky"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            *self.calls.lock().unwrap() += 1;
            let mut remaining = self.failures.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err((self.error)());
            }
            Ok(CompletionResponse {
                content: "ok".to_string(),
                input_tokens: 1,
                output_tokens: 1,
                finish_reason: FinishReason::Stop,
            })
        }
    }

    fn transient() -> LlmError {
        LlmError::RequestFailed {
            provider: "flaky".to_string(),
            reason: "connection reset".to_string(),
        }
    }

    fn auth() -> LlmError {
        LlmError::AuthFailed {
            provider: "flaky".to_string(),
        }
    }

    fn fast() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new(vec![ChatMessage::user("hello")])
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let inner = Flaky::new(2, transient);
        let provider = RetryProvider::new(inner.clone(), fast());
        let response = provider.complete(request()).await.unwrap();
        assert_eq!(response.content, "ok");
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let inner = Flaky::new(10, transient);
        let provider = RetryProvider::new(inner.clone(), fast());
        let err = provider.complete(request()).await.unwrap_err();
        assert!(matches!(err, LlmError::RetriesExhausted { attempts: 3, .. }));
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn non_transient_errors_are_not_retried() {
        let inner = Flaky::new(10, auth);
        let provider = RetryProvider::new(inner.clone(), fast());
        let err = provider.complete(request()).await.unwrap_err();
        assert!(matches!(err, LlmError::AuthFailed { .. }));
        assert_eq!(inner.calls(), 1);
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let config = RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        };
        let first = config.delay_for(0);
        let second = config.delay_for(1);
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(125));
        assert!(second >= Duration::from_millis(200) && second <= Duration::from_millis(225));
    }
}
