/// LLM Client: the single point of entry for all model calls in the coaching service.
///
/// ARCHITECTURAL RULE: No other module may call the completion endpoint directly.
/// Dialogue code depends on the `ModelClient` trait; `LlmClient` is the production backend.
///
/// The endpoint speaks the OpenAI-compatible chat completions protocol (DeepSeek by default).
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;

const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM call timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Speaker of a replayed conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    fn as_str(self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Everything the model sees for one completion: a system instruction and ordered turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelRequest {
    pub instruction: String,
    pub turns: Vec<ChatTurn>,
}

#[derive(Debug, Clone)]
pub struct ModelReply {
    pub text: String,
    pub usage: Option<Usage>,
}

/// The model boundary used by the dialogue controller.
/// Implement this to swap backends (or script replies in tests) without touching callers.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, LlmError>;

    /// Backend label for logs.
    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<CompletionMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl CompletionResponse {
    /// Extracts the text of the first choice, if it carries any.
    fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single LLM client used by the coaching service.
/// Wraps a chat completions endpoint with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(attempt_timeout(config.model_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.model_api_key.clone(),
            endpoint: format!("{}/chat/completions", config.model_base_url),
            model: config.model_name.clone(),
            temperature: config.model_temperature,
        })
    }

    /// Sends a trivial request to verify the credential and endpoint before serving.
    pub async fn probe(&self) -> Result<(), LlmError> {
        let request = ModelRequest {
            instruction: prompts::PROBE_SYSTEM.to_string(),
            turns: vec![ChatTurn::user("Hello")],
        };
        self.call(&request).await.map(|_| ())
    }

    /// Makes a raw call to the completion endpoint.
    /// Retries on 429 (rate limit), 5xx and transport errors with exponential backoff.
    async fn call(&self, request: &ModelRequest) -> Result<ModelReply, LlmError> {
        let request_body = build_request_body(&self.model, self.temperature, request);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let completion: CompletionResponse = serde_json::from_str(&body)?;
            let text = completion.text().ok_or(LlmError::EmptyContent)?.to_string();

            if let Some(usage) = &completion.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(ModelReply {
                text,
                usage: completion.usage,
            });
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl ModelClient for LlmClient {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, LlmError> {
        self.call(request).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Per-attempt transport timeout. `model_timeout_secs` bounds the whole call
/// (all attempts plus backoff), so each attempt gets a share of it.
fn attempt_timeout(total_secs: u64) -> Duration {
    Duration::from_secs((total_secs / (u64::from(MAX_RETRIES) + 1)).max(1))
}

/// The instruction always travels as the leading system message.
fn build_request_body<'a>(
    model: &'a str,
    temperature: f32,
    request: &'a ModelRequest,
) -> CompletionRequest<'a> {
    let mut messages = Vec::with_capacity(request.turns.len() + 1);
    messages.push(CompletionMessage {
        role: "system",
        content: &request.instruction,
    });
    messages.extend(request.turns.iter().map(|t| CompletionMessage {
        role: t.role.as_str(),
        content: &t.content,
    }));

    CompletionRequest {
        model,
        temperature,
        max_tokens: MAX_TOKENS,
        messages,
    }
}
