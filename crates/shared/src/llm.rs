use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::LlmConfig;
use crate::error::{PipelineError, Result};

/// Token ceiling for drafts and refinements.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
/// Token ceiling for longer analytical output such as idea lists.
pub const LONG_MAX_TOKENS: u32 = 1500;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anything that turns a prompt into text. The drafting service only needs
/// this, which keeps it testable without a network.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Thin client for the Anthropic Messages API.
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl ClaudeClient {
    pub fn new(api_key: impl Into<String>, config: &LlmConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: config.model.clone(),
            endpoint: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
        })
    }

    /// Send one user message and return the first text block of the reply.
    ///
    /// There are no retries: a failed call is reported and the person at the
    /// keyboard decides whether to ask again.
    pub async fn invoke(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = ClaudeRequest {
            model: &self.model,
            max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %self.model, max_tokens, prompt_chars = prompt.len(), "calling Claude");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(PipelineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let claude_response: ClaudeResponse = response.json().await.map_err(|e| {
            PipelineError::UnexpectedResponse(format!("could not decode response envelope: {e}"))
        })?;

        let stop_reason = claude_response.stop_reason.unwrap_or_default();
        let text = claude_response
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .ok_or_else(|| {
                PipelineError::UnexpectedResponse(format!(
                    "no text block in response (stop_reason: {stop_reason})"
                ))
            })?;

        info!(model = %self.model, chars = text.len(), "Claude responded");
        Ok(text)
    }
}

#[async_trait]
impl TextModel for ClaudeClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        self.invoke(prompt, max_tokens).await
    }
}

/// Caller-owned handle that builds its [`ClaudeClient`] on first use.
///
/// The API key is only required when a model call is actually made, so the
/// scraping half of the tool runs without one. Once built, the client is
/// reused for every later call through this handle.
pub struct LazyClaude {
    config: LlmConfig,
    client: OnceCell<ClaudeClient>,
}

impl LazyClaude {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&ClaudeClient> {
        self.client
            .get_or_try_init(|| async {
                let api_key = self.config.api_key.as_deref().ok_or_else(|| {
                    PipelineError::Configuration(
                        "ANTHROPIC_API_KEY is not set. Add it to your environment or to \
                         ~/.config/content-studio/.env"
                            .to_string(),
                    )
                })?;
                ClaudeClient::new(api_key, &self.config)
            })
            .await
    }

    pub async fn invoke(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        self.client().await?.invoke(prompt, max_tokens).await
    }
}

#[async_trait]
impl TextModel for LazyClaude {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        self.invoke(prompt, max_tokens).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_fails_before_building_a_client() {
        let lazy = LazyClaude::new(LlmConfig::default());

        let err = lazy.invoke("hello", DEFAULT_MAX_TOKENS).await.unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(lazy.client.get().is_none());
    }

    #[test]
    fn endpoint_is_built_from_base_url() {
        let config = LlmConfig {
            base_url: "http://localhost:9999/".to_string(),
            ..LlmConfig::default()
        };
        let client = ClaudeClient::new("sk-test", &config).unwrap();
        assert_eq!(client.endpoint, "http://localhost:9999/v1/messages");
    }

    #[test]
    fn unknown_block_types_decode_as_other() {
        let response: ClaudeResponse = serde_json::from_str(
            r#"{"content":[{"type":"tool_use","id":"t1","name":"x","input":{}},{"type":"text","text":"hi"}],"stop_reason":"end_turn"}"#,
        )
        .unwrap();
        assert!(matches!(response.content[0], ContentBlock::Other));
        assert!(matches!(&response.content[1], ContentBlock::Text { text } if text == "hi"));
    }
}
