//! LLM API client supporting Anthropic, OpenAI-compatible and local Ollama
//! backends. Sync HTTP via ureq — no async runtime needed here.

use crate::ai::{AiError, AiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::{BufRead, BufReader};

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmBackend {
    #[default]
    Anthropic,
    OpenAi,
    Ollama,
}

impl LlmBackend {
    pub fn env_key(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
            LlmBackend::OpenAi => "OPENAI_API_KEY",
            LlmBackend::Ollama => "OLLAMA_MODEL",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "claude-sonnet-4-20250514",
            LlmBackend::OpenAi => "gpt-4o",
            LlmBackend::Ollama => "qwen2.5-coder:7b",
        }
    }

    pub fn api_url(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "https://api.anthropic.com/v1/messages",
            LlmBackend::OpenAi => "https://api.openai.com/v1/chat/completions",
            LlmBackend::Ollama => "http://localhost:11434/v1/chat/completions",
        }
    }

    pub fn is_openai_compatible(&self) -> bool {
        matches!(self, LlmBackend::OpenAi | LlmBackend::Ollama)
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LlmBackend::Ollama)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub backend: LlmBackend,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::default(),
            model: None,
            max_tokens: 4096,
            temperature: 0.2,
        }
    }
}

impl AiConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }
}

/// Unified LLM client.
pub struct AiClient {
    config: AiConfig,
    api_key: String,
    agent: ureq::Agent,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // status codes handled below
        .timeout_global(Some(std::time::Duration::from_secs(120)))
        .build()
        .new_agent()
}

impl AiClient {
    pub fn new(config: AiConfig, api_key: impl Into<String>) -> Self {
        Self {
            config,
            api_key: api_key.into(),
            agent: make_agent(),
        }
    }

    pub fn from_env(backend: LlmBackend) -> AiResult<Self> {
        let mut config = AiConfig {
            backend,
            ..Default::default()
        };
        if !backend.requires_api_key() {
            if let Ok(model) = env::var("OLLAMA_MODEL") {
                config.model = Some(model);
            }
            return Ok(Self::new(config, "ollama"));
        }

        let env_key = backend.env_key();
        let api_key = env::var(env_key).map_err(|_| AiError::MissingApiKey {
            env_var: env_key.to_string(),
        })?;
        Ok(Self::new(config, api_key))
    }

    pub fn backend(&self) -> LlmBackend {
        self.config.backend
    }

    pub fn model(&self) -> &str {
        self.config.model()
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.model = Some(model.into());
    }

    /// Readiness probe: a keyed backend is ready when its key is present;
    /// Ollama is ready when something listens on its port.
    pub fn is_ready(&self) -> bool {
        if self.config.backend.requires_api_key() {
            !self.api_key.is_empty()
        } else {
            std::net::TcpStream::connect("127.0.0.1:11434").is_ok()
        }
    }

    /// Single-turn completion.
    pub fn complete(&self, prompt: &str) -> AiResult<String> {
        self.chat(vec![Message::user(prompt)], None)
    }

    /// Multi-turn chat.
    pub fn chat(&self, messages: Vec<Message>, system: Option<&str>) -> AiResult<String> {
        if self.config.backend.is_openai_compatible() {
            self.chat_openai(messages, system)
        } else {
            self.chat_anthropic(messages, system)
        }
    }

    /// Streaming chat. `on_token` is called for each token as it arrives;
    /// the full response is also returned.
    pub fn chat_stream(
        &self,
        messages: Vec<Message>,
        system: Option<&str>,
        mut on_token: impl FnMut(&str),
    ) -> AiResult<String> {
        let response = if self.config.backend.is_openai_compatible() {
            self.send_openai(messages, system, true)?
        } else {
            self.send_anthropic(messages, system, true)?
        };

        let status = response.status().as_u16();
        if status >= 400 {
            let error_text = response.into_body().read_to_string().unwrap_or_default();
            return Err(AiError::ApiError {
                status,
                message: error_text,
            });
        }

        let openai_format = self.config.backend.is_openai_compatible();
        let reader = BufReader::new(response.into_body().into_reader());
        let mut full = String::new();
        for line in reader.lines() {
            let line = line?;
            let Some(data) = line.strip_prefix("data: ") else {
                continue;
            };
            if data == "[DONE]" {
                break;
            }
            if let Some(token) = parse_stream_token(data, openai_format) {
                on_token(&token);
                full.push_str(&token);
            }
        }
        Ok(full)
    }

    fn chat_openai(&self, messages: Vec<Message>, system: Option<&str>) -> AiResult<String> {
        let response = self.send_openai(messages, system, false)?;

        let status = response.status().as_u16();
        if status >= 400 {
            let error_text = response.into_body().read_to_string().unwrap_or_default();
            return Err(AiError::ApiError {
                status,
                message: error_text,
            });
        }

        let resp: OpenAiResponse = response
            .into_body()
            .read_json()
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content)
            .ok_or_else(|| AiError::ParseError("No response choices".to_string()))
    }

    fn chat_anthropic(&self, messages: Vec<Message>, system: Option<&str>) -> AiResult<String> {
        let response = self.send_anthropic(messages, system, false)?;

        let status = response.status().as_u16();
        if status >= 400 {
            let error_text = response.into_body().read_to_string().unwrap_or_default();
            return Err(AiError::ApiError {
                status,
                message: error_text,
            });
        }

        let resp: AnthropicResponse = response
            .into_body()
            .read_json()
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        resp.content
            .into_iter()
            .find(|c| c.content_type == "text")
            .map(|c| c.text)
            .ok_or_else(|| AiError::ParseError("No text content in response".to_string()))
    }

    fn send_openai(
        &self,
        mut messages: Vec<Message>,
        system: Option<&str>,
        stream: bool,
    ) -> AiResult<ureq::http::Response<ureq::Body>> {
        if let Some(sys) = system {
            messages.insert(0, Message::system(sys));
        }

        let body = OpenAiRequest {
            model: self.config.model().to_string(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream,
        };

        let mut req = self
            .agent
            .post(self.config.backend.api_url())
            .header("Content-Type", "application/json");
        if self.config.backend.requires_api_key() {
            req = req.header("Authorization", &format!("Bearer {}", self.api_key));
        }

        req.send_json(&body).map_err(|e| AiError::ApiError {
            status: 0,
            message: e.to_string(),
        })
    }

    fn send_anthropic(
        &self,
        messages: Vec<Message>,
        system: Option<&str>,
        stream: bool,
    ) -> AiResult<ureq::http::Response<ureq::Body>> {
        let messages: Vec<_> = messages
            .into_iter()
            .filter(|m| m.role != Role::System)
            .collect();

        let body = AnthropicRequest {
            model: self.config.model().to_string(),
            max_tokens: self.config.max_tokens,
            messages,
            system: system.map(|s| s.to_string()),
            temperature: Some(self.config.temperature),
            stream,
        };

        self.agent
            .post(self.config.backend.api_url())
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .send_json(&body)
            .map_err(|e| AiError::ApiError {
                status: 0,
                message: e.to_string(),
            })
    }
}

/// Pull the next token out of one SSE data payload.
fn parse_stream_token(data: &str, openai_format: bool) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(data).ok()?;
    if openai_format {
        value
            .pointer("/choices/0/delta/content")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    } else {
        // Anthropic streams content_block_delta events with a text delta.
        if value.get("type").and_then(|t| t.as_str()) != Some("content_block_delta") {
            return None;
        }
        value
            .pointer("/delta/text")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
}

// OpenAI API types
#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiMessage>,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: String,
}

// Anthropic API types
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_defaults() {
        assert_eq!(LlmBackend::OpenAi.default_model(), "gpt-4o");
        assert!(LlmBackend::Ollama.is_openai_compatible());
        assert!(!LlmBackend::Ollama.requires_api_key());
    }

    #[test]
    fn test_config_model_override() {
        let config = AiConfig {
            model: Some("custom-model".to_string()),
            ..Default::default()
        };
        assert_eq!(config.model(), "custom-model");
    }

    #[test]
    fn test_set_model() {
        let mut client = AiClient::new(AiConfig::default(), "key");
        client.set_model("other-model");
        assert_eq!(client.model(), "other-model");
    }

    #[test]
    fn test_parse_stream_token_openai() {
        let data = r#"{"choices":[{"delta":{"content":"hi"}}]}"#;
        assert_eq!(parse_stream_token(data, true).as_deref(), Some("hi"));
    }

    #[test]
    fn test_parse_stream_token_anthropic() {
        let data = r#"{"type":"content_block_delta","delta":{"type":"text_delta","text":"hi"}}"#;
        assert_eq!(parse_stream_token(data, false).as_deref(), Some("hi"));

        let other = r#"{"type":"message_start"}"#;
        assert_eq!(parse_stream_token(other, false), None);
    }

    #[test]
    fn test_keyed_backend_readiness() {
        let client = AiClient::new(AiConfig::default(), "key");
        assert!(client.is_ready());
        let client = AiClient::new(AiConfig::default(), "");
        assert!(!client.is_ready());
    }
}
