//! Retrieval seam between the agent pipeline and the document store

use async_trait::async_trait;

use crate::error::Result;
use crate::retrieval::SearchResult;

/// Trait for retrieving relevant chunks for a query
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    /// Retrieve the top-k most relevant chunks for a query
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>>;
}
