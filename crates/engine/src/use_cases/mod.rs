//! Use cases - User story orchestration.
//!
//! `complaint` holds the three operations the HTTP layer exposes. The other
//! modules are the pure pieces they are built from: prompt text, the echo
//! guard, model output validation, and request input validation.

pub mod complaint;
pub mod echo_guard;
pub mod prompts;
pub mod response;
pub mod validation;

// Re-export main types
pub use complaint::{ComplaintUseCases, GenerationSettings};
