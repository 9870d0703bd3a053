//! Initiate claim use case.
//!
//! Generates the customer's opening complaint for a new session.

use std::sync::Arc;

use claimdesk_domain::{ClaimResult, Difficulty};

use super::GenerationSettings;
use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, RandomPort};
use crate::use_cases::prompts::{build_claim_prompt, pick_claim_genre};
use crate::use_cases::response::{validate_claim_response, MalformedResponse};

/// Initiate claim use case.
///
/// Orchestrates: genre selection, claim prompt, JSON-mode generation, validation.
pub struct InitiateClaim {
    llm: Arc<dyn LlmPort>,
    random: Arc<dyn RandomPort>,
    settings: GenerationSettings,
}

impl InitiateClaim {
    pub fn new(
        llm: Arc<dyn LlmPort>,
        random: Arc<dyn RandomPort>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            llm,
            random,
            settings,
        }
    }

    pub async fn execute(&self, difficulty: Difficulty) -> Result<ClaimResult, ClaimError> {
        let genre = pick_claim_genre(self.random.as_ref());
        tracing::debug!(%difficulty, genre, "Generating claim");

        let request = self
            .settings
            .apply(LlmRequest::json_prompt(build_claim_prompt(difficulty, genre)));
        let response = self.llm.generate(request).await?;

        Ok(validate_claim_response(&response.content)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error(transparent)]
    Malformed(#[from] MalformedResponse),
    #[error(transparent)]
    Llm(#[from] LlmError),
}
