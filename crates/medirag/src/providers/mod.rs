//! Provider traits and implementations
//!
//! The agent pipeline and the document store depend on these seams rather
//! than on concrete clients, so tests can substitute mocks.

pub mod embedding;
pub mod gateway;
pub mod llm;
pub mod retriever;

pub use embedding::EmbeddingProvider;
pub use gateway::{GatewayClient, GatewayEmbedder, GatewayLlm};
pub use llm::LlmProvider;
pub use retriever::ContextRetriever;
