//! Error types for infrastructure ports.

/// Failures reported by an LLM provider or the retry wrapper around it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    /// The provider throttled us. Retryable after a backoff.
    #[error("LLM provider rate limited the request: {0}")]
    RateLimited(String),
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// Still rate limited after every attempt the retry budget allows.
    #[error("LLM provider still rate limited after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl LlmError {
    pub fn is_retries_exhausted(&self) -> bool {
        matches!(self, LlmError::RetriesExhausted { .. })
    }
}
