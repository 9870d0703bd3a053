//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - LLM calls (Groq, Gemini, or the retrying wrapper around either)
//! - Random (for testing)

mod error;
mod external;
mod testing;

pub use error::LlmError;
pub use external::{ChatMessage, LlmPort, LlmRequest, LlmResponse, MessageRole, ResponseFormat};
pub use testing::RandomPort;

#[cfg(test)]
pub use external::MockLlmPort;
#[cfg(test)]
pub use testing::MockRandomPort;
