//! # claimdesk domain
//!
//! Value types shared by the engine: the difficulty a session is played at,
//! the conversation history the client sends on every request, and the
//! structured results produced from model output.
//!
//! Everything here is pure data. No I/O, no async.

pub mod error;
pub mod types;

pub use error::DomainError;
pub use types::{
    ClaimResult, ControlMarker, ConversationHistory, ConversationTurn, Difficulty, HintSet,
    SpeakerRole, TurnOutcome, HINT_COUNT,
};
