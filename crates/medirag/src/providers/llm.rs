//! LLM provider trait for generating answers

use async_trait::async_trait;

use crate::error::Result;

/// Trait for LLM-backed text generation
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a system prompt plus user message
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
