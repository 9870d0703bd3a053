//! Results produced from model output.
//!
//! Turn replies carry their outcome as a literal tag inside the text
//! (`[CLEAR]` or `[DAMAGE]`). Clients scan for those substrings, so the text
//! is never rewritten; [`TurnOutcome`] parses the tag once so nothing
//! downstream has to look at the raw text again.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Number of suggestions in a [`HintSet`].
pub const HINT_COUNT: usize = 3;

/// Conversation-ending tag embedded in a customer reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMarker {
    /// The player resolved the complaint.
    Clear,
    /// The player's turn made things worse.
    Damage,
}

impl ControlMarker {
    /// Literal tag as it appears in reply text.
    pub fn tag(&self) -> &'static str {
        match self {
            ControlMarker::Clear => "[CLEAR]",
            ControlMarker::Damage => "[DAMAGE]",
        }
    }

    /// Find the marker in a reply.
    ///
    /// A well-formed reply holds at most one tag. If the model emits both, the
    /// one that appears last is the verdict it settled on.
    pub fn detect(text: &str) -> Option<Self> {
        let clear = text.rfind(ControlMarker::Clear.tag());
        let damage = text.rfind(ControlMarker::Damage.tag());
        match (clear, damage) {
            (Some(c), Some(d)) if c > d => Some(ControlMarker::Clear),
            (Some(_), Some(_)) => Some(ControlMarker::Damage),
            (Some(_), None) => Some(ControlMarker::Clear),
            (None, Some(_)) => Some(ControlMarker::Damage),
            (None, None) => None,
        }
    }

    /// Remove every control tag from `text`.
    pub fn strip_all(text: &str) -> String {
        text.replace(ControlMarker::Clear.tag(), "")
            .replace(ControlMarker::Damage.tag(), "")
    }
}

/// The customer's reply to a player turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Reply text exactly as it goes on the wire, tag included.
    pub text: String,
    /// Parsed tag; `None` means the conversation continues.
    pub marker: Option<ControlMarker>,
}

impl TurnOutcome {
    pub fn from_reply(text: impl Into<String>) -> Self {
        let text = text.into();
        let marker = ControlMarker::detect(&text);
        Self { text, marker }
    }

    pub fn is_clear(&self) -> bool {
        self.marker == Some(ControlMarker::Clear)
    }

    pub fn is_damage(&self) -> bool {
        self.marker == Some(ControlMarker::Damage)
    }

    /// Short label for the outcome: `clear`, `damage` or `continue`.
    pub fn label(&self) -> &'static str {
        match self.marker {
            Some(ControlMarker::Clear) => "clear",
            Some(ControlMarker::Damage) => "damage",
            None => "continue",
        }
    }
}

/// Opening complaint for a new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimResult {
    /// One or two sentences of complaint.
    pub claim: String,
    /// Short summary shown in the UI (targets 15 characters).
    pub summary: String,
}

/// Exactly [`HINT_COUNT`] short, sayable suggestions for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HintSet(Vec<String>);

impl HintSet {
    pub fn new(hints: Vec<String>) -> Result<Self, DomainError> {
        if hints.len() != HINT_COUNT {
            return Err(DomainError::validation(format!(
                "expected {} hints, got {}",
                HINT_COUNT,
                hints.len()
            )));
        }
        if hints.iter().any(|hint| hint.trim().is_empty()) {
            return Err(DomainError::validation("hints must not be blank"));
        }
        Ok(Self(hints))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
