//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod gemini;
pub mod groq;
pub mod ports;
pub mod random;
pub mod resilient_llm;
