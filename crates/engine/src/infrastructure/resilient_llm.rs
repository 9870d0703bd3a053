//! Resilient LLM client wrapper with exponential backoff retry
//!
//! Wraps any LlmPort implementation and retries requests the provider
//! throttled. Only rate limiting is retried: every other failure goes straight
//! back to the caller. When the budget runs out the caller gets
//! `LlmError::RetriesExhausted`, which the HTTP layer turns into a
//! "server busy" message.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Delay in milliseconds before the first retry
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2000,
            max_delay_ms: 30000,
        }
    }
}

/// Wrapper that adds rate-limit retry to any LLM client
pub struct ResilientLlmClient {
    inner: Arc<dyn LlmPort>,
    config: RetryConfig,
}

impl ResilientLlmClient {
    /// Create a new resilient wrapper around an existing LLM client
    pub fn new(inner: Arc<dyn LlmPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Delay before retry number `retry` (1-based): base * 2^(retry-1), capped.
    fn calculate_delay(&self, retry: u32) -> Duration {
        let base = self.config.base_delay_ms;
        let exponential = base.saturating_mul(2u64.saturating_pow(retry.saturating_sub(1)));
        Duration::from_millis(exponential.min(self.config.max_delay_ms))
    }
}

#[async_trait]
impl LlmPort for ResilientLlmClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.inner.generate(request.clone()).await {
                Ok(response) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "LLM request succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(e) if self.inner.is_rate_limited(&e) => {
                    if attempt == max_attempts {
                        tracing::warn!(attempt, error = %e, "LLM request rate limited on final attempt");
                        break;
                    }
                    let delay = self.calculate_delay(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "LLM request rate limited, retrying..."
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "LLM request failed with non-retryable error");
                    return Err(e);
                }
            }
        }

        tracing::error!(
            attempts = max_attempts,
            "LLM request still rate limited after all retry attempts"
        );
        Err(LlmError::RetriesExhausted {
            attempts: max_attempts,
        })
    }

    fn is_rate_limited(&self, error: &LlmError) -> bool {
        self.inner.is_rate_limited(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Mock LLM that fails a configurable number of times before succeeding,
    /// recording when each attempt happened.
    struct FailingMockLlm {
        failures_remaining: AtomicU32,
        error_type: LlmError,
        calls: AtomicU32,
        attempt_times: Mutex<Vec<Instant>>,
    }

    impl FailingMockLlm {
        fn new(failure_count: u32, error: LlmError) -> Self {
            Self {
                failures_remaining: AtomicU32::new(failure_count),
                error_type: error,
                calls: AtomicU32::new(0),
                attempt_times: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        fn gaps_ms(&self) -> Vec<u128> {
            let times = self.attempt_times.lock().unwrap();
            times
                .windows(2)
                .map(|pair| (pair[1] - pair[0]).as_millis())
                .collect()
        }
    }

    #[async_trait]
    impl LlmPort for FailingMockLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.attempt_times.lock().unwrap().push(Instant::now());
            let remaining = self.failures_remaining.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
                Err(self.error_type.clone())
            } else {
                Ok(LlmResponse::new("Success!"))
            }
        }
    }

    fn rate_limited() -> LlmError {
        LlmError::RateLimited("429 Too Many Requests".into())
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_without_retry() {
        let mock = Arc::new(FailingMockLlm::new(0, rate_limited()));
        let client = ResilientLlmClient::new(mock.clone(), RetryConfig::default());

        let result = client.generate(LlmRequest::new(vec![])).await;

        assert_eq!(result.unwrap().content, "Success!");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_two_rate_limits_with_doubling_backoff() {
        let mock = Arc::new(FailingMockLlm::new(2, rate_limited()));
        let client = ResilientLlmClient::new(mock.clone(), RetryConfig::default());

        let start = Instant::now();
        let result = client.generate(LlmRequest::new(vec![])).await;

        assert_eq!(result.unwrap().content, "Success!");
        assert_eq!(mock.calls(), 3);
        assert_eq!(mock.gaps_ms(), vec![2000, 4000]);
        assert_eq!(start.elapsed().as_millis(), 6000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_rate_limited_exhausts_after_three_attempts() {
        let mock = Arc::new(FailingMockLlm::new(u32::MAX, rate_limited()));
        let client = ResilientLlmClient::new(mock.clone(), RetryConfig::default());

        let start = Instant::now();
        let result = client.generate(LlmRequest::new(vec![])).await;

        assert_eq!(result.unwrap_err(), LlmError::RetriesExhausted { attempts: 3 });
        assert_eq!(mock.calls(), 3);
        // No sleep after the last attempt.
        assert_eq!(start.elapsed().as_millis(), 6000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_are_not_retried() {
        let mock = Arc::new(FailingMockLlm::new(
            5,
            LlmError::RequestFailed("401 Unauthorized".into()),
        ));
        let client = ResilientLlmClient::new(mock.clone(), RetryConfig::default());

        let result = client.generate(LlmRequest::new(vec![])).await;

        assert!(matches!(result, Err(LlmError::RequestFailed(_))));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_response_is_not_retried() {
        let mock = Arc::new(FailingMockLlm::new(
            5,
            LlmError::InvalidResponse("no candidates".into()),
        ));
        let client = ResilientLlmClient::new(mock.clone(), RetryConfig::default());

        let result = client.generate(LlmRequest::new(vec![])).await;

        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn test_calculate_delay_doubles_and_caps() {
        let mock = Arc::new(FailingMockLlm::new(0, rate_limited()));
        let client = ResilientLlmClient::new(
            mock,
            RetryConfig {
                max_attempts: 10,
                base_delay_ms: 2000,
                max_delay_ms: 10000,
            },
        );

        assert_eq!(client.calculate_delay(1), Duration::from_millis(2000));
        assert_eq!(client.calculate_delay(2), Duration::from_millis(4000));
        assert_eq!(client.calculate_delay(3), Duration::from_millis(8000));
        assert_eq!(client.calculate_delay(4), Duration::from_millis(10000));
    }

    #[test]
    fn test_default_config_matches_provider_budget() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay_ms, 2000);
    }
}
