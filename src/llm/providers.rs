use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::{ReviewDeskError, ReviewDeskResult};

const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEEPSEEK_ENDPOINT: &str = "https://api.deepseek.com/chat/completions";
const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";

/// A chat-completion backend: one prompt in, one reply out
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(&self, prompt: &str) -> ReviewDeskResult<String>;
}

impl std::fmt::Debug for dyn ChatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChatProvider({})", self.name())
    }
}

/// Select the provider implementation named in the configuration
pub fn create_provider(config: &LlmConfig) -> ReviewDeskResult<Box<dyn ChatProvider>> {
    match config.provider.as_str() {
        "openai" => Ok(Box::new(OpenAiProvider::new(config)?)),
        "groq" => Ok(Box::new(GroqProvider::new(config)?)),
        "deepseek" => Ok(Box::new(DeepSeekProvider::new(config)?)),
        "gemini" => Ok(Box::new(GeminiProvider::new(config)?)),
        other => Err(ReviewDeskError::UnknownProvider { name: other.to_string() }),
    }
}

// Request and response shapes shared by all four vendors. Each of them
// accepts the OpenAI chat-completions contract on its own endpoint.

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Trimmed completion text, `None` when the vendor returned nothing usable
fn completion_text(response: ChatResponse) -> Option<String> {
    let content = response.choices.into_iter().next()?.message.content;
    let content = content.trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

/// Shared HTTP client for the OpenAI-compatible wire shape
struct OpenAiCompatClient {
    name: &'static str,
    endpoint: &'static str,
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiCompatClient {
    fn new(
        name: &'static str,
        endpoint: &'static str,
        config: &LlmConfig,
    ) -> ReviewDeskResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ReviewDeskError::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            name,
            endpoint,
            client,
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    async fn complete(&self, prompt: &str) -> ReviewDeskResult<String> {
        if self.api_key.is_empty() {
            return Err(ReviewDeskError::MissingCredential {
                name: "LLM API key".to_string(),
            });
        }

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("Requesting completion from {} ({})", self.name, self.model);
        let response = self
            .client
            .post(self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ReviewDeskError::provider(self.name, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReviewDeskError::provider(
                self.name,
                format!("HTTP {}: {}", status.as_u16(), body.trim()),
            ));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ReviewDeskError::provider(self.name, format!("malformed response: {e}")))?;

        completion_text(body)
            .ok_or_else(|| ReviewDeskError::EmptyCompletion { provider: self.name.to_string() })
    }
}

pub struct OpenAiProvider {
    inner: OpenAiCompatClient,
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig) -> ReviewDeskResult<Self> {
        Ok(Self { inner: OpenAiCompatClient::new("openai", OPENAI_ENDPOINT, config)? })
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        self.inner.name
    }

    async fn complete(&self, prompt: &str) -> ReviewDeskResult<String> {
        self.inner.complete(prompt).await
    }
}

pub struct GroqProvider {
    inner: OpenAiCompatClient,
}

impl GroqProvider {
    pub fn new(config: &LlmConfig) -> ReviewDeskResult<Self> {
        Ok(Self { inner: OpenAiCompatClient::new("groq", GROQ_ENDPOINT, config)? })
    }
}

#[async_trait]
impl ChatProvider for GroqProvider {
    fn name(&self) -> &'static str {
        self.inner.name
    }

    async fn complete(&self, prompt: &str) -> ReviewDeskResult<String> {
        self.inner.complete(prompt).await
    }
}

pub struct DeepSeekProvider {
    inner: OpenAiCompatClient,
}

impl DeepSeekProvider {
    pub fn new(config: &LlmConfig) -> ReviewDeskResult<Self> {
        Ok(Self { inner: OpenAiCompatClient::new("deepseek", DEEPSEEK_ENDPOINT, config)? })
    }
}

#[async_trait]
impl ChatProvider for DeepSeekProvider {
    fn name(&self) -> &'static str {
        self.inner.name
    }

    async fn complete(&self, prompt: &str) -> ReviewDeskResult<String> {
        self.inner.complete(prompt).await
    }
}

/// Gemini through its OpenAI-compatibility endpoint
pub struct GeminiProvider {
    inner: OpenAiCompatClient,
}

impl GeminiProvider {
    pub fn new(config: &LlmConfig) -> ReviewDeskResult<Self> {
        Ok(Self { inner: OpenAiCompatClient::new("gemini", GEMINI_ENDPOINT, config)? })
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        self.inner.name
    }

    async fn complete(&self, prompt: &str) -> ReviewDeskResult<String> {
        self.inner.complete(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn config_for(provider: &str) -> LlmConfig {
        let mut config = AppConfig::default().llm;
        config.provider = provider.to_string();
        config.api_key = "test-key".to_string();
        config
    }

    #[test]
    fn test_factory_covers_all_supported_providers() {
        for name in crate::config::SUPPORTED_PROVIDERS {
            let provider = create_provider(&config_for(name)).unwrap();
            assert_eq!(provider.name(), name);
        }
    }

    #[test]
    fn test_factory_rejects_unknown_provider() {
        let error = create_provider(&config_for("mistral")).unwrap_err();
        match error {
            ReviewDeskError::UnknownProvider { name } => assert_eq!(name, "mistral"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_chat_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage { role: "user", content: "Привет" }],
            temperature: 0.6,
            max_tokens: 400,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "Привет");
        assert_eq!(value["max_tokens"], 400);
    }

    #[test]
    fn test_completion_text_extraction() {
        let response: ChatResponse = serde_json::from_str(
            r#"{
                "id": "chatcmpl-1",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "  Спасибо за отзыв!  "}, "finish_reason": "stop"}
                ],
                "usage": {"prompt_tokens": 120, "completion_tokens": 25}
            }"#,
        )
        .unwrap();
        assert_eq!(completion_text(response).as_deref(), Some("Спасибо за отзыв!"));
    }

    #[test]
    fn test_completion_text_rejects_empty() {
        let blank: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "   "}}]}"#).unwrap();
        assert_eq!(completion_text(blank), None);

        let no_choices: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(completion_text(no_choices), None);
    }
}
