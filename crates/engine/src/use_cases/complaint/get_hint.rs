//! Get hint use case.
//!
//! Suggests three lines the player could say next.

use std::sync::Arc;

use claimdesk_domain::{ConversationHistory, HintSet};

use super::GenerationSettings;
use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest};
use crate::use_cases::prompts::build_hint_prompt;
use crate::use_cases::response::{validate_hint_response, MalformedResponse};
use crate::use_cases::validation::{require_non_empty, ValidationError};

pub struct GetHint {
    llm: Arc<dyn LlmPort>,
    settings: GenerationSettings,
}

impl GetHint {
    pub fn new(llm: Arc<dyn LlmPort>, settings: GenerationSettings) -> Self {
        Self { llm, settings }
    }

    /// Generate hints for the current state of the conversation.
    ///
    /// # Arguments
    /// * `complaint` - The customer's opening complaint
    /// * `history` - The conversation so far (may be empty)
    pub async fn execute(
        &self,
        complaint: &str,
        history: &ConversationHistory,
    ) -> Result<HintSet, HintError> {
        require_non_empty(complaint, "complaint")?;

        let request = self
            .settings
            .apply(LlmRequest::json_prompt(build_hint_prompt(complaint, history)));
        let response = self.llm.generate(request).await?;

        Ok(validate_hint_response(&response.content)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HintError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Malformed(#[from] MalformedResponse),
    #[error(transparent)]
    Llm(#[from] LlmError),
}
