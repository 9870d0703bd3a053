//! Complaint session use cases.
//!
//! The client drives a session through three calls:
//! 1. Initiate a claim (the customer's opening complaint)
//! 2. Handle each player turn (the customer's reply, possibly ending the session)
//! 3. Ask for hints whenever the player is stuck
//!
//! The service keeps no state between calls; every request carries the
//! difficulty and the full conversation.

use std::sync::Arc;

mod get_hint;
mod handle_turn;
mod initiate_claim;

pub use get_hint::{GetHint, HintError};
pub use handle_turn::{HandleTurn, TurnError};
pub use initiate_claim::{ClaimError, InitiateClaim};

use crate::infrastructure::ports::{LlmPort, LlmRequest, RandomPort};

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

impl GenerationSettings {
    pub(crate) fn apply(&self, request: LlmRequest) -> LlmRequest {
        request
            .with_temperature(self.temperature)
            .with_max_tokens(Some(self.max_tokens))
    }
}

/// Container for complaint session use cases.
pub struct ComplaintUseCases {
    pub initiate_claim: Arc<InitiateClaim>,
    pub handle_turn: Arc<HandleTurn>,
    pub get_hint: Arc<GetHint>,
}

impl ComplaintUseCases {
    pub fn new(
        llm: Arc<dyn LlmPort>,
        random: Arc<dyn RandomPort>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            initiate_claim: Arc::new(InitiateClaim::new(llm.clone(), random, settings)),
            handle_turn: Arc::new(HandleTurn::new(llm.clone(), settings)),
            get_hint: Arc::new(GetHint::new(llm, settings)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_are_applied_to_requests() {
        let request = GenerationSettings::default().apply(LlmRequest::json_prompt("p"));
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.max_tokens, Some(1024));
        assert!(request.is_json());
    }
}
