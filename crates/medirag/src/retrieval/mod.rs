//! Chunk storage and similarity search

mod vector_store;

pub use vector_store::{SearchResult, VectorStore};
