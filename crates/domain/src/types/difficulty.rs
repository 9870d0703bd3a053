//! Difficulty levels for a complaint session.
//!
//! The difficulty picks the customer's persona: how the opening complaint is
//! phrased, how the customer reacts to the player's replies, and what it takes
//! to end the conversation with a `[CLEAR]`.
//!
//! The service keeps no session state, so the client sends the difficulty on
//! every request. It is always parsed strictly.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How hard the simulated customer is to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Gentle, slightly troubled customer. An apology plus a remedy is enough.
    Easy,
    /// Logical, composed customer who wants a clear explanation.
    Normal,
    /// Rigid, hostile customer who only softens after sustained effort.
    Crazy,
}

impl Difficulty {
    /// All difficulties, in ascending order.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Crazy];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Crazy => "crazy",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DomainError;

    /// Parses a wire value into a Difficulty.
    ///
    /// Matching is exact: the client always sends lowercase values, and a value
    /// that differs only in case is treated as a client bug rather than
    /// silently accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "crazy" => Ok(Difficulty::Crazy),
            _ => Err(DomainError::parse(format!(
                "Unknown difficulty: '{}'. Valid values: easy, normal, crazy",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_values() {
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("normal".parse::<Difficulty>().unwrap(), Difficulty::Normal);
        assert_eq!("crazy".parse::<Difficulty>().unwrap(), Difficulty::Crazy);
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        for raw in ["", "hard", "Easy", " normal", "default"] {
            let err = raw.parse::<Difficulty>().unwrap_err();
            assert!(matches!(err, DomainError::Parse(_)), "{raw:?} should not parse");
        }
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.to_string().parse::<Difficulty>().unwrap(), difficulty);
        }
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&Difficulty::Crazy).unwrap();
        assert_eq!(json, "\"crazy\"");
        assert!(serde_json::from_str::<Difficulty>("\"CRAZY\"").is_err());
    }
}
