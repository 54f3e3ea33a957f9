/// LLM Client — the single point of entry for all hosted-model calls in Cardinal.
///
/// ARCHITECTURAL RULE: No other module may call the AI provider directly.
/// Handlers depend on `AiProvider`; `OpenAiClient` is the production backend.
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;

const MAX_TOKENS: u32 = 1024;
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
}

/// The provider seam. Carried in `AppState` as `Arc<dyn AiProvider>` so the
/// router can be exercised against a deterministic fake.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Plain chat completion; returns the assistant text.
    async fn chat(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Vision completion over a single inline image.
    async fn describe_image(
        &self,
        image: &[u8],
        mime: &str,
        prompt: &str,
    ) -> Result<String, LlmError>;

    /// Text-to-speech; returns audio/mpeg bytes.
    async fn speak(&self, text: &str, voice: &str) -> Result<Bytes, LlmError>;
}

/// Calls the provider and deserializes the text response as JSON.
/// The prompt must instruct the model to return valid JSON.
pub async fn chat_json<T: DeserializeOwned>(
    provider: &dyn AiProvider,
    system: &str,
    prompt: &str,
) -> Result<T, LlmError> {
    let text = provider.chat(system, prompt).await?;
    if text.trim().is_empty() {
        return Err(LlmError::EmptyContent);
    }
    serde_json::from_str(strip_json_fences(&text)).map_err(LlmError::Parse)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Value,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text content from the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// OpenAI-compatible client covering chat, vision and speech.
/// Retries on 429 and 5xx with exponential backoff.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    vision_model: String,
    tts_model: String,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            vision_model: config.vision_model.clone(),
            tts_model: config.tts_model.clone(),
        })
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    /// Sends the request built by `build`, retrying on 429 and 5xx.
    /// Any other non-success status fails immediately with the provider's message.
    async fn send_with_retry<F>(&self, build: F) -> Result<Response, LlmError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "AI call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build().bearer_auth(&self.api_key).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("AI API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ProviderError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatMessage<'_>>,
    ) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model,
            max_tokens: MAX_TOKENS,
            messages,
        };
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .send_with_retry(|| self.client.post(&url).json(&request_body))
            .await?;
        let chat: ChatResponse = response.json().await?;

        if let Some(usage) = &chat.usage {
            debug!(
                "AI call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.text().map(str::to_string).ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl AiProvider for OpenAiClient {
    async fn chat(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let messages = vec![
            ChatMessage {
                role: "system",
                content: Value::String(system.to_string()),
            },
            ChatMessage {
                role: "user",
                content: Value::String(prompt.to_string()),
            },
        ];
        self.complete(&self.chat_model, messages).await
    }

    async fn describe_image(
        &self,
        image: &[u8],
        mime: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        let data_url = format!("data:{mime};base64,{}", BASE64.encode(image));
        let messages = vec![ChatMessage {
            role: "user",
            content: json!([
                { "type": "text", "text": prompt },
                { "type": "image_url", "image_url": { "url": data_url } }
            ]),
        }];
        self.complete(&self.vision_model, messages).await
    }

    async fn speak(&self, text: &str, voice: &str) -> Result<Bytes, LlmError> {
        let request_body = SpeechRequest {
            model: &self.tts_model,
            input: text,
            voice,
            response_format: "mp3",
        };
        let url = format!("{}/audio/speech", self.base_url);

        let response = self
            .send_with_retry(|| self.client.post(&url).json(&request_body))
            .await?;
        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        debug!("Speech synthesized: {} bytes", audio.len());
        Ok(audio)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
