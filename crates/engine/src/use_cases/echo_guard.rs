//! Echo guard: catches players parroting the customer's own lines.
//!
//! Repeating the customer back at them is never a real answer, so the turn is
//! answered locally with a `[DAMAGE]` rebuke and the model is not called.

use claimdesk_domain::{ControlMarker, ConversationHistory, ConversationTurn};

/// Rebuke when the player repeats the customer's latest line.
pub const REPEAT_LATEST_REBUKE: &str = "私の言葉を繰り返さないでください。 [DAMAGE]";

/// Rebuke when the player repeats the opening line of the conversation.
pub const REPEAT_OPENING_REBUKE: &str = "お客様の言葉をそのまま返すのは不適切です。 [DAMAGE]";

/// Rebuke when the player repeats any earlier customer line.
pub const REPEAT_EARLIER_REBUKE: &str = "お客様の言葉をそのまま返すのは適切ではありません。 [DAMAGE]";

/// Which line the player echoed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    LatestCustomerLine,
    OpeningLine,
    EarlierCustomerLine,
}

impl Echo {
    pub fn rebuke(&self) -> &'static str {
        match self {
            Echo::LatestCustomerLine => REPEAT_LATEST_REBUKE,
            Echo::OpeningLine => REPEAT_OPENING_REBUKE,
            Echo::EarlierCustomerLine => REPEAT_EARLIER_REBUKE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepetitionVerdict {
    Fresh,
    Echoed(Echo),
}

/// Compare the player's message against the conversation so far.
///
/// Lines are compared trimmed and with control tags removed. Checked in
/// order: the customer's latest line, the opening line, then every customer
/// line. While the opening line is still the customer's latest, it is
/// reported as [`Echo::OpeningLine`].
pub fn check_repetition(history: &ConversationHistory, player_message: &str) -> RepetitionVerdict {
    if history.is_empty() {
        return RepetitionVerdict::Fresh;
    }

    let message = player_message.trim();
    let echoes = |turn: &ConversationTurn| clean_line(&turn.text) == message;

    let opening = history.first();
    if let Some(latest) = history.last_customer_turn() {
        let latest_is_opening = opening.is_some_and(|first| std::ptr::eq(first, latest));
        if !latest_is_opening && echoes(latest) {
            return RepetitionVerdict::Echoed(Echo::LatestCustomerLine);
        }
    }

    if opening.is_some_and(echoes) {
        return RepetitionVerdict::Echoed(Echo::OpeningLine);
    }

    if history.customer_turns().any(echoes) {
        return RepetitionVerdict::Echoed(Echo::EarlierCustomerLine);
    }

    RepetitionVerdict::Fresh
}

fn clean_line(text: &str) -> String {
    ControlMarker::strip_all(text).trim().to_string()
}
