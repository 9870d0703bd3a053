//! Conversation history as sent by the client.
//!
//! The client stores the conversation and sends the whole thing with every
//! request. Older clients send provider-shaped turns
//! (`{"role": "model", "parts": [{"text": "..."}]}`), newer ones send
//! `{"role": "customer", "text": "..."}`. Both normalize to a
//! [`ConversationTurn`] on deserialization.

use crate::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who said a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerRole {
    /// The simulated customer (the model's persona).
    Customer,
    /// The human playing the shop clerk.
    Player,
}

impl SpeakerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeakerRole::Customer => "customer",
            SpeakerRole::Player => "player",
        }
    }
}

impl fmt::Display for SpeakerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpeakerRole {
    type Err = DomainError;

    /// Accepts the game's own vocabulary as well as the provider role names
    /// older clients replay back to us.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" | "model" | "assistant" => Ok(SpeakerRole::Customer),
            "player" | "user" => Ok(SpeakerRole::Player),
            other => Err(DomainError::parse(format!(
                "Unknown conversation role: '{}'. Valid values: customer, player, model, user",
                other
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for SpeakerRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single line of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationTurn {
    pub role: SpeakerRole,
    pub text: String,
}

impl ConversationTurn {
    pub fn customer(text: impl Into<String>) -> Self {
        Self {
            role: SpeakerRole::Customer,
            text: text.into(),
        }
    }

    pub fn player(text: impl Into<String>) -> Self {
        Self {
            role: SpeakerRole::Player,
            text: text.into(),
        }
    }

    pub fn is_customer(&self) -> bool {
        self.role == SpeakerRole::Customer
    }
}

/// Wire shape accepted for a turn.
#[derive(Deserialize)]
struct RawTurn {
    role: SpeakerRole,
    #[serde(default, alias = "content")]
    text: Option<String>,
    #[serde(default)]
    parts: Vec<RawPart>,
}

#[derive(Deserialize)]
struct RawPart {
    #[serde(default)]
    text: Option<String>,
}

impl<'de> Deserialize<'de> for ConversationTurn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawTurn::deserialize(deserializer)?;
        // Only the first part carries dialogue in provider-shaped turns.
        let text = raw
            .text
            .or_else(|| raw.parts.into_iter().next().and_then(|part| part.text))
            .ok_or_else(|| serde::de::Error::missing_field("text"))?;
        Ok(ConversationTurn {
            role: raw.role,
            text,
        })
    }
}

/// Ordered conversation, oldest line first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory(Vec<ConversationTurn>);

impl ConversationHistory {
    pub fn new(turns: Vec<ConversationTurn>) -> Self {
        Self(turns)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversationTurn> {
        self.0.iter()
    }

    /// The opening line of the conversation, whoever said it.
    pub fn first(&self) -> Option<&ConversationTurn> {
        self.0.first()
    }

    /// The most recent line spoken by the customer.
    pub fn last_customer_turn(&self) -> Option<&ConversationTurn> {
        self.0.iter().rev().find(|turn| turn.is_customer())
    }

    /// Every line spoken by the customer, oldest first.
    pub fn customer_turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.0.iter().filter(|turn| turn.is_customer())
    }
}

impl From<Vec<ConversationTurn>> for ConversationHistory {
    fn from(turns: Vec<ConversationTurn>) -> Self {
        Self(turns)
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a ConversationTurn;
    type IntoIter = std::slice::Iter<'a, ConversationTurn>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
