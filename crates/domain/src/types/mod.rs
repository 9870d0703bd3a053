//! # claimdesk domain types
//!
//! Shared vocabulary between the HTTP layer and the orchestration use cases.
//!
//! ## Design Principles
//!
//! 1. **Pure data types** - No I/O, no async, no side effects
//! 2. **Strict parsing** - Client input that doesn't name a known value is an error
//! 3. **Serializable** - Wire-facing types derive Serialize/Deserialize

mod difficulty;
pub use difficulty::Difficulty;

mod conversation;
pub use conversation::{ConversationHistory, ConversationTurn, SpeakerRole};

mod outcome;
pub use outcome::{ClaimResult, ControlMarker, HintSet, TurnOutcome, HINT_COUNT};
