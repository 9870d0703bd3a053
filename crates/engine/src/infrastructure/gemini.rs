//! Google Gemini LLM client (generateContent API)
//!
//! Gemini has no system role inside `contents`; system messages go into
//! `systemInstruction` and the assistant side of the conversation is called
//! `model`. `contents` must open with a `user` turn and alternate roles, so a
//! history that starts with the customer gets a short user opener and
//! repeated roles are folded into one turn.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::infrastructure::ports::{
    LlmError, LlmPort, LlmRequest, LlmResponse, MessageRole, ResponseFormat,
};

/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model for Gemini.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

const USER_ROLE: &str = "user";
const MODEL_ROLE: &str = "model";

/// User turn placed ahead of a history that starts with the customer.
const CONVERSATION_OPENER: &str = "（お客様が来店しました）";

/// Status string Gemini puts in the error body when a quota is hit.
const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

/// Client for the Gemini generateContent API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl LlmPort for GeminiClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let api_request = build_generate_request(&request);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, error_text));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(convert_response(api_response))
    }

    fn is_rate_limited(&self, error: &LlmError) -> bool {
        match error {
            LlmError::RateLimited(_) => true,
            // Some quota errors come back with a non-429 status but the
            // RESOURCE_EXHAUSTED status string in the body.
            LlmError::RequestFailed(msg) => msg.contains(RESOURCE_EXHAUSTED),
            _ => false,
        }
    }
}

fn classify_failure(status: StatusCode, body: String) -> LlmError {
    let error_status = serde_json::from_str::<GeminiErrorEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.error.status);

    if status == StatusCode::TOO_MANY_REQUESTS || error_status.as_deref() == Some(RESOURCE_EXHAUSTED)
    {
        LlmError::RateLimited(body)
    } else {
        LlmError::RequestFailed(format!("HTTP {}: {}", status, body))
    }
}

fn build_generate_request(request: &LlmRequest) -> GenerateContentRequest {
    let mut system_parts = Vec::new();
    let mut contents: Vec<Content> = Vec::new();

    for msg in &request.messages {
        let role = match msg.role {
            MessageRole::System => {
                system_parts.push(Part {
                    text: msg.content.clone(),
                });
                continue;
            }
            MessageRole::User => USER_ROLE,
            MessageRole::Assistant => MODEL_ROLE,
        };
        push_content(&mut contents, role, msg.content.clone());
    }

    // Gemini rejects a conversation that opens with a model turn.
    if contents
        .first()
        .is_some_and(|first| first.role.as_deref() != Some(USER_ROLE))
    {
        contents.insert(
            0,
            Content {
                role: Some(USER_ROLE.to_string()),
                parts: vec![Part {
                    text: CONVERSATION_OPENER.to_string(),
                }],
            },
        );
    }

    GenerateContentRequest {
        contents,
        system_instruction: (!system_parts.is_empty()).then(|| Content {
            role: None,
            parts: system_parts,
        }),
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
            response_mime_type: match request.response_format {
                ResponseFormat::Json => Some("application/json".to_string()),
                ResponseFormat::Text => None,
            },
        },
    }
}

/// Appends a turn, folding it into the previous one when the role repeats.
fn push_content(contents: &mut Vec<Content>, role: &str, text: String) {
    match contents.last_mut() {
        Some(last) if last.role.as_deref() == Some(role) => last.parts.push(Part { text }),
        _ => contents.push(Content {
            role: Some(role.to_string()),
            parts: vec![Part { text }],
        }),
    }
}

/// Joins the text parts of the first candidate. A blocked or empty
/// generation yields an empty string rather than an error.
fn convert_response(response: GenerateContentResponse) -> LlmResponse {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    LlmResponse::new(text)
}

// =============================================================================
// Gemini API types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    status: Option<String>,
}
