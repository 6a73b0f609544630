//! Document store adapter
//!
//! Facade over parser, chunker, embedding provider and vector store. This is
//! the only component that touches all four; the agent pipeline sees it
//! through the `ContextRetriever` trait.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

use crate::config::AssistantConfig;
use crate::error::{Error, Result};
use crate::ingestion::{FileParser, TextChunker};
use crate::providers::{ContextRetriever, EmbeddingProvider};
use crate::retrieval::{SearchResult, VectorStore};
use crate::types::{
    response::{DocumentSummary, IngestError},
    Document, FileType,
};

/// Outcome of ingesting a single file
#[derive(Debug)]
pub enum IngestOutcome {
    /// New document, chunks stored
    New(Document),
    /// Existing document replaced (content changed under the same filename)
    Replaced(Document, usize),
    /// File skipped (content already ingested)
    Skipped(String),
}

/// Aggregated report over an ingest run
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Documents that were (re)ingested
    pub documents: Vec<DocumentSummary>,
    /// Total chunks created
    pub total_chunks: u32,
    /// Files that were skipped as duplicates
    pub skipped: Vec<String>,
    /// Per-file failures
    pub errors: Vec<IngestError>,
}

/// Document store: ingestion and retrieval over one collection
pub struct DocumentStore {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    vectors: Arc<VectorStore>,
    similarity_threshold: f32,
}

impl DocumentStore {
    /// Create a store from configuration and an embedding provider
    pub fn new(config: &AssistantConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let vectors = Arc::new(VectorStore::open(&config.storage)?);
        Ok(Self::with_vector_store(config, embedder, vectors))
    }

    /// Create a store over an existing vector store (used by tests)
    pub fn with_vector_store(
        config: &AssistantConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        vectors: Arc<VectorStore>,
    ) -> Self {
        Self {
            chunker: TextChunker::new(
                config.chunking.chunk_size,
                config.chunking.chunk_overlap,
                config.chunking.min_chunk_size,
            ),
            embedder,
            vectors,
            similarity_threshold: config.retrieval.similarity_threshold,
        }
    }

    /// Ingest a file or recursively a directory of files
    pub async fn ingest(&self, path: &Path) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        if path.is_file() {
            self.ingest_into_report(path, &mut report).await;
            return Ok(report);
        }

        if path.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let file_path = entry.path();
                let file_type = file_path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(FileType::from_extension)
                    .unwrap_or(FileType::Unknown);
                if !file_type.is_supported() {
                    tracing::debug!("Skipping unsupported file: {}", file_path.display());
                    continue;
                }
                self.ingest_into_report(file_path, &mut report).await;
            }
            return Ok(report);
        }

        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("No such file or directory: {}", path.display()),
        )))
    }

    async fn ingest_into_report(&self, path: &Path, report: &mut IngestReport) {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();

        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) => {
                report.errors.push(IngestError {
                    filename,
                    error: e.to_string(),
                });
                return;
            }
        };

        match self.ingest_bytes(&filename, &data).await {
            Ok(IngestOutcome::New(doc)) => {
                report.total_chunks += doc.total_chunks;
                report.documents.push(DocumentSummary::from(&doc));
                tracing::info!("Ingested '{}': {} chunks", doc.filename, doc.total_chunks);
            }
            Ok(IngestOutcome::Replaced(doc, old_chunks)) => {
                report.total_chunks += doc.total_chunks;
                report.documents.push(DocumentSummary::from(&doc));
                tracing::info!(
                    "Reingested '{}': {} chunks ({} old chunks replaced)",
                    doc.filename,
                    doc.total_chunks,
                    old_chunks
                );
            }
            Ok(IngestOutcome::Skipped(reason)) => {
                tracing::info!("Skipped '{}': {}", filename, reason);
                report.skipped.push(filename);
            }
            Err(e) => {
                tracing::error!("Failed to ingest '{}': {}", filename, e);
                report.errors.push(IngestError {
                    filename,
                    error: e.to_string(),
                });
            }
        }
    }

    /// Ingest a single file from raw bytes
    pub async fn ingest_bytes(&self, filename: &str, data: &[u8]) -> Result<IngestOutcome> {
        let parsed = FileParser::parse(filename, data)?;

        // Dedup by content hash; replace when the same filename carries new content
        if let Some(existing) = self.vectors.find_by_hash(&parsed.content_hash)? {
            let reason = if existing.filename == filename {
                format!("unchanged (hash: {}...)", &parsed.content_hash[..12])
            } else {
                format!("duplicate of '{}'", existing.filename)
            };
            return Ok(IngestOutcome::Skipped(reason));
        }

        let replaced = match self.vectors.find_by_filename(filename)? {
            Some(existing) => Some(self.vectors.delete_document(&existing.id)?),
            None => None,
        };

        let mut doc = Document::new(
            filename.to_string(),
            parsed.file_type.clone(),
            parsed.content_hash.clone(),
            data.len() as u64,
        );
        doc.total_pages = parsed.total_pages;

        let mut chunks = self.chunker.chunk_document(&doc, &parsed);
        for chunk in chunks.iter_mut() {
            chunk.embedding = self.embedder.embed(&chunk.content).await?;
        }

        doc.total_chunks = chunks.len() as u32;
        self.vectors.insert_document(&doc)?;
        self.vectors.insert_chunks(&chunks)?;

        match replaced {
            Some(old_chunks) => Ok(IngestOutcome::Replaced(doc, old_chunks)),
            None => Ok(IngestOutcome::New(doc)),
        }
    }

    /// Query the store for the top-k most similar chunks
    pub async fn query(&self, text: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let embedding = self.embedder.embed(text).await?;
        let mut results = self.vectors.search(&embedding, top_k)?;
        results.retain(|r| r.similarity >= self.similarity_threshold);
        Ok(results)
    }

    /// List ingested documents
    pub fn documents(&self) -> Result<Vec<Document>> {
        self.vectors.list_documents()
    }

    /// Get a document by ID
    pub fn get_document(&self, id: &uuid::Uuid) -> Result<Option<Document>> {
        self.vectors.get_document(id)
    }

    /// Delete a document and its chunks
    pub fn delete_document(&self, id: &uuid::Uuid) -> Result<usize> {
        self.vectors.delete_document(id)
    }

    /// Number of chunks in the collection
    pub fn chunk_count(&self) -> Result<usize> {
        self.vectors.chunk_count()
    }

    /// Remove every document and chunk in the collection
    pub fn clear(&self) -> Result<()> {
        self.vectors.clear()
    }
}

#[async_trait]
impl ContextRetriever for DocumentStore {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        self.query(query, top_k).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssistantConfig;

    /// Deterministic embedder: counts occurrences of a fixed vocabulary so
    /// related texts land near each other without a network call.
    struct KeywordEmbedder;

    const VOCAB: [&str; 4] = ["metformin", "insulin", "glucose", "renal"];

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(VOCAB
                .iter()
                .map(|word| lower.matches(word).count() as f32)
                .collect())
        }

        fn dimensions(&self) -> usize {
            VOCAB.len()
        }

        fn name(&self) -> &str {
            "keyword"
        }
    }

    fn make_store(dir: &tempfile::TempDir) -> DocumentStore {
        let mut config = AssistantConfig::default();
        config.chunking.chunk_size = 200;
        config.chunking.chunk_overlap = 40;
        config.chunking.min_chunk_size = 10;
        config.retrieval.similarity_threshold = 0.1;
        let vectors =
            Arc::new(VectorStore::open_at(&dir.path().join("vectors.db"), "test_docs").unwrap());
        DocumentStore::with_vector_store(&config, Arc::new(KeywordEmbedder), vectors)
    }

    #[tokio::test]
    async fn ingest_then_query_returns_related_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);

        let docs_dir = dir.path().join("docs");
        std::fs::create_dir_all(&docs_dir).unwrap();
        std::fs::write(
            docs_dir.join("metformin.txt"),
            "Metformin is first-line therapy for type 2 diabetes. \
             Start metformin at 500mg once daily and titrate weekly.",
        )
        .unwrap();
        std::fs::write(
            docs_dir.join("insulin.txt"),
            "Basal insulin is started at 10 units at bedtime. \
             Adjust insulin by fasting glucose readings.",
        )
        .unwrap();

        let report = store.ingest(&docs_dir).await.unwrap();
        assert_eq!(report.documents.len(), 2);
        assert!(report.total_chunks >= 2);
        assert!(report.errors.is_empty());

        let results = store.query("metformin titration", 3).await.unwrap();
        assert!(!results.is_empty());
        assert!(results[0].chunk.content.to_lowercase().contains("metformin"));
    }

    #[tokio::test]
    async fn reingesting_identical_content_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);

        let outcome = store
            .ingest_bytes("dosing.txt", b"Metformin 500mg twice daily with meals.")
            .await
            .unwrap();
        assert!(matches!(outcome, IngestOutcome::New(_)));
        let count = store.chunk_count().unwrap();

        let outcome = store
            .ingest_bytes("dosing.txt", b"Metformin 500mg twice daily with meals.")
            .await
            .unwrap();
        assert!(matches!(outcome, IngestOutcome::Skipped(_)));
        assert_eq!(store.chunk_count().unwrap(), count);
    }

    #[tokio::test]
    async fn changed_content_replaces_previous_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);

        store
            .ingest_bytes("dosing.txt", b"Metformin 500mg once daily to start with.")
            .await
            .unwrap();
        let outcome = store
            .ingest_bytes("dosing.txt", b"Metformin 1000mg twice daily after titration.")
            .await
            .unwrap();

        assert!(matches!(outcome, IngestOutcome::Replaced(_, _)));
        assert_eq!(store.documents().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        let err = store.ingest(Path::new("/nonexistent/path")).await;
        assert!(err.is_err());
    }
}
