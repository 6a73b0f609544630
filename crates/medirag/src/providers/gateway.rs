//! OpenRouter gateway client for chat completions and embeddings
//!
//! The gateway speaks the OpenAI-compatible API. Failed requests are retried
//! with exponential backoff up to the configured count; anything past that
//! propagates to the caller.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::{EmbeddingConfig, GatewayConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Gateway API client with automatic retry
pub struct GatewayClient {
    /// HTTP client with auth and attribution headers pre-set
    client: Client,
    /// Gateway configuration
    config: GatewayConfig,
    /// Embedding model name
    embed_model: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingsDatum>,
}

#[derive(Deserialize)]
struct EmbeddingsDatum {
    embedding: Vec<f32>,
}

impl GatewayClient {
    /// Create a new gateway client
    pub fn new(gateway: &GatewayConfig, embeddings: &EmbeddingConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", gateway.api_key);
        let mut auth = HeaderValue::from_str(&bearer)
            .map_err(|_| Error::Config("API key contains invalid header characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        if let Ok(referer) = HeaderValue::from_str(&gateway.referer) {
            headers.insert("HTTP-Referer", referer);
        }
        if let Ok(title) = HeaderValue::from_str(&gateway.title) {
            headers.insert("X-Title", title);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(gateway.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            config: gateway.clone(),
            embed_model: embeddings.model.clone(),
        })
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.config.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            "Gateway request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            self.config.max_retries + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Llm("Unknown error".to_string())))
    }

    /// Check if the gateway is reachable with the configured key
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.config.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Generate a chat completion with retry
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let model = self.config.model.clone();
        let temperature = self.config.temperature;
        let client = self.client.clone();
        let system = system.to_string();
        let user = user.to_string();

        tracing::info!("Generating answer with model: {}", model);

        self.retry_request(|| {
            let url = url.clone();
            let model = model.clone();
            let client = client.clone();
            let system = system.clone();
            let user = user.clone();

            async move {
                let request = ChatRequest {
                    model,
                    messages: vec![
                        ChatMessage {
                            role: "system".to_string(),
                            content: system,
                        },
                        ChatMessage {
                            role: "user".to_string(),
                            content: user,
                        },
                    ],
                    temperature,
                };

                let response = client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::Llm(format!("Completion request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::Llm(format!(
                        "Completion failed: HTTP {} - {}",
                        status, body
                    )));
                }

                let chat_response: ChatResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Llm(format!("Failed to parse completion response: {}", e)))?;

                chat_response
                    .choices
                    .into_iter()
                    .next()
                    .map(|c| c.message.content)
                    .ok_or_else(|| Error::Llm("Completion returned no choices".to_string()))
            }
        })
        .await
    }

    /// Generate an embedding with retry
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.config.base_url);
        let model = self.embed_model.clone();
        let client = self.client.clone();
        let text = text.to_string();

        self.retry_request(|| {
            let url = url.clone();
            let model = model.clone();
            let client = client.clone();
            let text = text.clone();

            async move {
                let request = EmbeddingsRequest {
                    model,
                    input: vec![text],
                };

                let response = client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::Embedding(format!("Embedding request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::Embedding(format!(
                        "Embedding failed: HTTP {} - {}",
                        status, body
                    )));
                }

                let embed_response: EmbeddingsResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Embedding(format!("Failed to parse embedding response: {}", e)))?;

                embed_response
                    .data
                    .into_iter()
                    .next()
                    .map(|d| d.embedding)
                    .ok_or_else(|| Error::Embedding("Embedding response was empty".to_string()))
            }
        })
        .await
    }
}

/// Gateway-backed embedding provider
pub struct GatewayEmbedder {
    client: Arc<GatewayClient>,
    dimensions: usize,
}

impl GatewayEmbedder {
    /// Create from an existing gateway client
    pub fn new(client: Arc<GatewayClient>, dimensions: usize) -> Self {
        Self { client, dimensions }
    }
}

#[async_trait]
impl EmbeddingProvider for GatewayEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "gateway"
    }
}

/// Gateway-backed LLM provider
pub struct GatewayLlm {
    client: Arc<GatewayClient>,
    model: String,
}

impl GatewayLlm {
    /// Create from an existing gateway client
    pub fn new(client: Arc<GatewayClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl LlmProvider for GatewayLlm {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.client.complete(system, user).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "gateway"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
