//! Handle turn use case.
//!
//! Produces the customer's reply to one player message. Echoes of the
//! customer's own words are answered locally; everything else goes to the
//! model with the persona instruction and the full history.

use std::sync::Arc;

use claimdesk_domain::{ConversationHistory, Difficulty, TurnOutcome};

use super::GenerationSettings;
use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest};
use crate::use_cases::echo_guard::{check_repetition, RepetitionVerdict};
use crate::use_cases::prompts::build_turn_messages;
use crate::use_cases::response::sanitize_turn_response;

pub struct HandleTurn {
    llm: Arc<dyn LlmPort>,
    settings: GenerationSettings,
}

impl HandleTurn {
    pub fn new(llm: Arc<dyn LlmPort>, settings: GenerationSettings) -> Self {
        Self { llm, settings }
    }

    /// Reply to `player_message` given the conversation so far.
    ///
    /// # Returns
    /// * `Ok(TurnOutcome)` - The reply, with its control marker parsed
    /// * `Err(TurnError)` - The provider failed
    pub async fn execute(
        &self,
        difficulty: Difficulty,
        history: &ConversationHistory,
        player_message: &str,
    ) -> Result<TurnOutcome, TurnError> {
        if let RepetitionVerdict::Echoed(echo) = check_repetition(history, player_message) {
            tracing::info!(?echo, %difficulty, "Player echoed the customer, skipping LLM");
            return Ok(TurnOutcome::from_reply(echo.rebuke()));
        }

        let messages = build_turn_messages(difficulty, history, player_message);
        let request = self.settings.apply(LlmRequest::new(messages));
        let response = self.llm.generate(request).await?;

        let outcome = sanitize_turn_response(&response.content, difficulty);
        tracing::debug!(
            %difficulty,
            turns = history.len(),
            outcome = outcome.label(),
            "Customer replied"
        );

        Ok(outcome)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    Llm(#[from] LlmError),
}
