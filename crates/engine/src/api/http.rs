//! HTTP routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use claimdesk_domain::{ClaimResult, ConversationHistory, HintSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app::App;
use crate::infrastructure::ports::LlmError;
use crate::use_cases::complaint::{ClaimError, HintError, TurnError};
use crate::use_cases::validation::{require_difficulty, require_present};

const WELCOME: &str = "バックエンドサーバーへようこそ！AIの準備ができました。";

const INVALID_DIFFICULTY: &str = "有効な難易度を指定してください。";
const MISSING_TURN_FIELDS: &str = "会話履歴、プレイヤーの発言、または難易度が不足しています。";
const MISSING_HINT_FIELDS: &str = "会話履歴またはクレーム内容が不足しています。";
const INVALID_BODY: &str = "リクエストの形式が不正です。";

const CLAIM_FAILED: &str = "AIによるクレーム生成に失敗しました。";
const CLAIM_MALFORMED: &str = "AIの応答形式が不正です。";
const TURN_FAILED: &str = "AIによる応答生成に失敗しました。";
const HINT_FAILED: &str = "AIによるヒント生成に失敗しました。";
const HINT_MALFORMED: &str = "AIのヒント生成形式が不正です。";
const PROVIDER_BUSY: &str =
    "APIリトライ回数超過: サーバーが混雑しています。しばらく待ってから試してください。";

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(welcome))
        .route("/api/health", get(health))
        .route("/api/initiate-claim", post(initiate_claim))
        .route("/api/handle-response", post(handle_response))
        .route("/api/get-hint", post(get_hint))
}

async fn welcome() -> &'static str {
    WELCOME
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Complaint session
// =============================================================================

#[derive(Debug, Deserialize)]
struct InitiateClaimRequest {
    difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HandleResponseRequest {
    conversation_history: Option<ConversationHistory>,
    player_message: Option<String>,
    difficulty: Option<String>,
}

#[derive(Debug, Serialize)]
struct HandleResponseBody {
    response: String,
    outcome: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetHintRequest {
    conversation_history: Option<ConversationHistory>,
    complaint: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetHintBody {
    hints: HintSet,
}

async fn initiate_claim(
    State(app): State<Arc<App>>,
    payload: Result<Json<InitiateClaimRequest>, JsonRejection>,
) -> Result<Json<ClaimResult>, ApiError> {
    let Json(request) = payload.map_err(ApiError::from)?;
    let difficulty = require_difficulty(request.difficulty.as_deref())
        .map_err(|_| ApiError::BadRequest(INVALID_DIFFICULTY.to_string()))?;

    let claim = app
        .use_cases
        .complaint
        .initiate_claim
        .execute(difficulty)
        .await
        .map_err(|e| match e {
            ClaimError::Malformed(e) => {
                tracing::error!(error = %e, "Claim generation returned malformed output");
                ApiError::Internal(CLAIM_MALFORMED.to_string())
            }
            ClaimError::Llm(e) => provider_failure("initiate-claim", &e, CLAIM_FAILED),
        })?;

    Ok(Json(claim))
}

async fn handle_response(
    State(app): State<Arc<App>>,
    payload: Result<Json<HandleResponseRequest>, JsonRejection>,
) -> Result<Json<HandleResponseBody>, ApiError> {
    let Json(request) = payload.map_err(ApiError::from)?;
    let missing = |_| ApiError::BadRequest(MISSING_TURN_FIELDS.to_string());

    let history = require_present(request.conversation_history, "conversationHistory")
        .map_err(missing)?;
    let player_message =
        require_present(request.player_message, "playerMessage").map_err(missing)?;
    let difficulty = request
        .difficulty
        .filter(|difficulty| !difficulty.trim().is_empty());
    let difficulty = require_present(difficulty, "difficulty").map_err(missing)?;
    let difficulty = require_difficulty(Some(difficulty.as_str()))
        .map_err(|_| ApiError::BadRequest(INVALID_DIFFICULTY.to_string()))?;

    let outcome = app
        .use_cases
        .complaint
        .handle_turn
        .execute(difficulty, &history, &player_message)
        .await
        .map_err(|e| match e {
            TurnError::Llm(e) => provider_failure("handle-response", &e, TURN_FAILED),
        })?;

    Ok(Json(HandleResponseBody {
        outcome: outcome.label(),
        response: outcome.text,
    }))
}

async fn get_hint(
    State(app): State<Arc<App>>,
    payload: Result<Json<GetHintRequest>, JsonRejection>,
) -> Result<Json<GetHintBody>, ApiError> {
    let Json(request) = payload.map_err(ApiError::from)?;
    let missing = |_| ApiError::BadRequest(MISSING_HINT_FIELDS.to_string());

    let history = require_present(request.conversation_history, "conversationHistory")
        .map_err(missing)?;
    let complaint = require_present(request.complaint, "complaint").map_err(missing)?;

    let hints = app
        .use_cases
        .complaint
        .get_hint
        .execute(&complaint, &history)
        .await
        .map_err(|e| match e {
            HintError::Validation(_) => ApiError::BadRequest(MISSING_HINT_FIELDS.to_string()),
            HintError::Malformed(e) => {
                tracing::error!(error = %e, "Hint generation returned malformed output");
                ApiError::Internal(HINT_MALFORMED.to_string())
            }
            HintError::Llm(e) => provider_failure("get-hint", &e, HINT_FAILED),
        })?;

    Ok(Json(GetHintBody { hints }))
}

/// Map a provider failure to a client message. Exhausted retries get their
/// own message so the user knows to wait.
fn provider_failure(endpoint: &'static str, error: &LlmError, message: &'static str) -> ApiError {
    tracing::error!(endpoint, error = %error, "LLM provider call failed");
    if error.is_retries_exhausted() {
        ApiError::Internal(PROVIDER_BUSY.to_string())
    } else {
        ApiError::Internal(message.to_string())
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Client-facing error. The message is what the client sees; internal
/// details are logged where the error is mapped.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        ApiError::BadRequest(INVALID_BODY.to_string())
    }
}
