//! medirag: retrieval-augmented medical dosage assistant
//!
//! Documents (clinical guidelines, drug references) are chunked, embedded and
//! stored in an embedded SQLite-backed vector store. Questions run through a
//! fixed three-step agent pipeline (retrieve context, analyze query, respond)
//! that delegates all reasoning to a hosted LLM gateway. The crate ships the
//! HTTP server; the companion `medirag-cli` crate ships the command line.

pub mod agent;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod store;
pub mod types;

pub use config::AssistantConfig;
pub use error::{Error, Result};
pub use store::DocumentStore;
pub use types::{
    document::{Chunk, ChunkSource, Document, FileType},
    query::QueryRequest,
    response::{Citation, QueryResponse},
};
