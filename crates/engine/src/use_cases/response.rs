//! Validation and repair of model output.
//!
//! Claims and hints must come back as JSON objects. Models still wrap them in
//! code fences or chat around them now and then, so the outermost object is
//! cut out before parsing. Anything that still doesn't parse is a
//! [`MalformedResponse`]; this layer never retries.
//!
//! Turn replies are free text and are never parsed as JSON. An empty reply is
//! replaced by a canned `[DAMAGE]` line so the conversation can't stall.

use claimdesk_domain::{ClaimResult, Difficulty, HintSet, TurnOutcome, HINT_COUNT};
use serde::Deserialize;

/// Model output that should have been JSON of a known shape but wasn't.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed model response: {reason}")]
pub struct MalformedResponse {
    pub reason: String,
}

impl MalformedResponse {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Reply used when the model produced no text for a turn.
pub fn fallback_reply(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "その言い方はあんまりだと思います… [DAMAGE]",
        Difficulty::Normal => "その言葉遣いは不適切ですね。話になりません。 [DAMAGE]",
        Difficulty::Crazy => "なんだその口の利き方は！客を誰だと思ってるんだ！ [DAMAGE]",
    }
}

#[derive(Deserialize)]
struct RawClaim {
    claim: Option<String>,
    summary: Option<String>,
}

#[derive(Deserialize)]
struct RawHints {
    hints: Option<Vec<serde_json::Value>>,
}

/// Parse `{claim, summary}` from model output.
pub fn validate_claim_response(raw: &str) -> Result<ClaimResult, MalformedResponse> {
    let parsed: RawClaim = parse_json_object(raw)?;

    let claim = non_blank(parsed.claim, "claim")?;
    let summary = non_blank(parsed.summary, "summary")?;

    Ok(ClaimResult { claim, summary })
}

/// Turn raw model output into the customer's reply. Never fails.
pub fn sanitize_turn_response(raw: &str, difficulty: Difficulty) -> TurnOutcome {
    if raw.trim().is_empty() {
        tracing::warn!(%difficulty, "LLM turn response was empty, using fallback reply");
        return TurnOutcome::from_reply(fallback_reply(difficulty));
    }
    TurnOutcome::from_reply(raw)
}

/// Parse `{hints: [..]}` from model output.
///
/// Extra suggestions beyond the first three are dropped; fewer than three, or
/// any entry that isn't a non-blank string, is malformed.
pub fn validate_hint_response(raw: &str) -> Result<HintSet, MalformedResponse> {
    let parsed: RawHints = parse_json_object(raw)?;
    let values = parsed
        .hints
        .ok_or_else(|| MalformedResponse::new("missing field `hints`"))?;

    let hints = values
        .into_iter()
        .take(HINT_COUNT)
        .map(|value| match value {
            serde_json::Value::String(hint) => Ok(hint),
            other => Err(MalformedResponse::new(format!(
                "hint is not a string: {}",
                other
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    HintSet::new(hints).map_err(|e| MalformedResponse::new(e.to_string()))
}

fn non_blank(value: Option<String>, field: &str) -> Result<String, MalformedResponse> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err(MalformedResponse::new(format!("field `{}` is blank", field))),
        None => Err(MalformedResponse::new(format!("missing field `{}`", field))),
    }
}

fn parse_json_object<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, MalformedResponse> {
    let candidate = extract_json(raw);
    serde_json::from_str(candidate).map_err(|e| {
        tracing::error!(error = %e, raw = %raw, "Failed to parse LLM JSON response");
        MalformedResponse::new(e.to_string())
    })
}

/// Extract JSON from a response that might have markdown code blocks or extra text.
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return trimmed;
    }

    // Try to find JSON in a code block, with or without a language tag
    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            let block = after_fence[..end].trim();
            let block = block.strip_prefix("json").unwrap_or(block).trim();
            if block.starts_with('{') {
                return block;
            }
        }
    }

    // Try to find raw JSON object
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return &trimmed[start..=end];
        }
    }

    // Return as-is if no JSON found
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimdesk_domain::ControlMarker;

    #[test]
    fn test_claim_valid_json() {
        let claim = validate_claim_response(r#"{"claim":"x","summary":"y"}"#).unwrap();
        assert_eq!(
            claim,
            ClaimResult {
                claim: "x".to_string(),
                summary: "y".to_string()
            }
        );
    }

    #[test]
    fn test_claim_not_json_is_malformed() {
        assert!(validate_claim_response("not json").is_err());
    }

    #[test]
    fn test_claim_in_code_fence_is_repaired() {
        let raw = "```json\n{\"claim\":\"料理が冷めています。\",\"summary\":\"料理が冷めている\"}\n```";
        let claim = validate_claim_response(raw).unwrap();
        assert_eq!(claim.claim, "料理が冷めています。");
        assert_eq!(claim.summary, "料理が冷めている");
    }

    #[test]
    fn test_claim_with_surrounding_chatter_is_repaired() {
        let raw = "はい、こちらです。{\"claim\":\"x\",\"summary\":\"y\"} 以上です。";
        assert_eq!(validate_claim_response(raw).unwrap().claim, "x");
    }

    #[test]
    fn test_claim_missing_or_blank_fields_are_malformed() {
        let err = validate_claim_response(r#"{"claim":"x"}"#).unwrap_err();
        assert!(err.reason.contains("summary"));

        let err = validate_claim_response(r#"{"claim":"  ","summary":"y"}"#).unwrap_err();
        assert!(err.reason.contains("claim"));
    }

    #[test]
    fn test_hints_not_json_is_malformed() {
        assert!(validate_hint_response("not json").is_err());
    }

    #[test]
    fn test_hints_valid_json() {
        let hints = validate_hint_response(
            r#"{"hints":["まず謝罪しましょう","返品を提案しましょう","原因を説明しましょう"]}"#,
        )
        .unwrap();
        assert_eq!(
            hints.as_slice(),
            &["まず謝罪しましょう", "返品を提案しましょう", "原因を説明しましょう"]
        );
    }

    #[test]
    fn test_hints_extra_entries_are_dropped() {
        let hints = validate_hint_response(r#"{"hints":["a","b","c","d"]}"#).unwrap();
        assert_eq!(hints.as_slice(), &["a", "b", "c"]);
    }

    #[test]
    fn test_hints_wrong_shape_is_malformed() {
        assert!(validate_hint_response(r#"{"hints":["a","b"]}"#).is_err());
        assert!(validate_hint_response(r#"{"hints":["a",2,"c"]}"#).is_err());
        assert!(validate_hint_response(r#"{"suggestions":["a","b","c"]}"#).is_err());
        assert!(validate_hint_response(r#"{"hints":"a"}"#).is_err());
    }

    #[test]
    fn test_blank_turn_falls_back_to_damage_line() {
        for difficulty in Difficulty::ALL {
            for raw in ["", "   ", "\n\t"] {
                let outcome = sanitize_turn_response(raw, difficulty);
                assert!(!outcome.text.is_empty());
                assert_eq!(outcome.text, fallback_reply(difficulty));
                assert_eq!(outcome.marker, Some(ControlMarker::Damage));
            }
        }
    }

    #[test]
    fn test_turn_text_passes_through_unmodified() {
        let raw = "  {\"not\": \"parsed\"} 分かりました。 [CLEAR]\n";
        let outcome = sanitize_turn_response(raw, Difficulty::Normal);
        assert_eq!(outcome.text, raw);
        assert!(outcome.is_clear());
    }

    #[test]
    fn test_extract_json_variants() {
        assert_eq!(extract_json(r#"{"a":1}"#), r#"{"a":1}"#);
        assert_eq!(extract_json("```\n{\"a\":1}\n```"), r#"{"a":1}"#);
        assert_eq!(extract_json("```json {\"a\":1} ```"), r#"{"a":1}"#);
        assert_eq!(extract_json("no json here"), "no json here");
    }
}
