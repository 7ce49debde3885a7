use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use crate::utils::toml_config::OllamaConfig;
use async_trait::async_trait;
use ollama_rs::{
    generation::chat::{request::ChatMessageRequest, ChatMessage},
    Ollama,
};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Port Ollama listens on when the URL names none
pub const DEFAULT_OLLAMA_PORT: u16 = 11434;

/// Split an Ollama base URL into `(scheme://host, port)`.
pub fn parse_base_url(base_url: &str) -> Result<(String, u16)> {
    let url = Url::parse(base_url.trim())
        .map_err(|e| AppError::Config(format!("Invalid Ollama URL '{}': {}", base_url, e)))?;
    let host = url
        .host_str()
        .ok_or_else(|| AppError::Config(format!("Ollama URL '{}' has no host", base_url)))?;
    let port = url.port().unwrap_or(DEFAULT_OLLAMA_PORT);
    Ok((format!("{}://{}", url.scheme(), host), port))
}

/// Build an `ollama-rs` client for `base_url`.
pub(crate) fn ollama_from_url(base_url: &str) -> Result<Ollama> {
    let (host, port) = parse_base_url(base_url)?;
    Ok(Ollama::new(host, port))
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

pub struct OllamaClient {
    client: Ollama,
    http: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let (host, port) = parse_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client: Ollama::new(host.clone(), port),
            http,
            base_url: format!("{}:{}", host, port),
            model: model.into(),
            timeout,
        })
    }

    pub fn from_config(config: &OllamaConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// `scheme://host:port` this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of the models installed on the server (`GET /api/tags`)
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("Cannot reach Ollama at {}: {}", self.base_url, e)))?
            .error_for_status()
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Unexpected /api/tags response: {}", e)))?;

        let names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        debug!(count = names.len(), "Listed Ollama models");
        Ok(names)
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatMessageRequest::new(self.model.clone(), messages);

        let response = tokio::time::timeout(self.timeout, self.client.send_chat_messages(request))
            .await
            .map_err(|_| {
                AppError::LLM(format!("Ollama request timed out after {:?}", self.timeout))
            })?
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.chat(vec![ChatMessage::user(prompt.to_string())]).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.chat(vec![
            ChatMessage::system(system.to_string()),
            ChatMessage::user(prompt.to_string()),
        ])
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
