//! Application state for the HTTP server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::agent::AssistantAgent;
use crate::config::AssistantConfig;
use crate::error::Result;
use crate::providers::{GatewayClient, GatewayEmbedder, GatewayLlm};
use crate::storage::PatientStore;
use crate::store::DocumentStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AssistantConfig,
    /// Document store (ingestion + retrieval)
    store: Arc<DocumentStore>,
    /// Agent pipeline
    agent: AssistantAgent,
    /// Patient registry
    patients: PatientStore,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create new application state from configuration
    pub fn new(config: AssistantConfig) -> Result<Self> {
        tracing::info!("Initializing assistant application state...");

        let gateway = Arc::new(GatewayClient::new(&config.gateway, &config.embeddings)?);
        let embedder = Arc::new(GatewayEmbedder::new(
            Arc::clone(&gateway),
            config.embeddings.dimensions,
        ));
        let llm = Arc::new(GatewayLlm::new(
            Arc::clone(&gateway),
            config.gateway.model.clone(),
        ));
        tracing::info!(
            "Gateway client initialized (model: {}, embeddings: {})",
            config.gateway.model,
            config.embeddings.model
        );

        let store = Arc::new(DocumentStore::new(&config, embedder)?);
        tracing::info!("Document store initialized");

        let retriever: Arc<dyn crate::providers::ContextRetriever> = store.clone();
        let agent = AssistantAgent::new(retriever, llm, &config.retrieval);

        let patients = PatientStore::open(&config.storage)?;
        tracing::info!("Patient registry initialized");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                agent,
                patients,
                ready: RwLock::new(true),
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &AssistantConfig {
        &self.inner.config
    }

    /// Get the document store
    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.inner.store
    }

    /// Get the agent pipeline
    pub fn agent(&self) -> &AssistantAgent {
        &self.inner.agent
    }

    /// Get the patient registry
    pub fn patients(&self) -> &PatientStore {
        &self.inner.patients
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
