//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::{LlmPort, RandomPort};
use crate::use_cases::{ComplaintUseCases, GenerationSettings};

/// Main application state.
///
/// Holds the use cases built on the provider port.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub complaint: ComplaintUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    ///
    /// `llm` is used as given; wrap it in a retrying client before passing it
    /// in if rate limits should be retried.
    pub fn new(
        llm: Arc<dyn LlmPort>,
        random: Arc<dyn RandomPort>,
        settings: GenerationSettings,
    ) -> Self {
        let complaint = ComplaintUseCases::new(llm, random, settings);

        Self {
            use_cases: UseCases { complaint },
        }
    }
}
