//! SQLite-backed vector store for chunks and document records
//!
//! Embeddings are stored as little-endian f32 blobs next to the chunk text;
//! search loads the collection and ranks by cosine similarity in process.
//! The on-disk format is plain SQLite, owned entirely by the library.

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkSource, Document, FileType};

/// Search result with chunk and similarity
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Similarity score (0.0-1.0, higher is better)
    pub similarity: f32,
}

/// Vector store over a single SQLite database file
pub struct VectorStore {
    conn: Mutex<Connection>,
    collection: String,
}

impl VectorStore {
    /// Open (or create) the vector store under the configured storage directory
    pub fn open(config: &StorageConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.storage_dir)?;
        let path = config.storage_dir.join("vectors.db");
        Self::open_at(&path, &config.collection)
    }

    /// Open a store at an explicit path (used by tests)
    pub fn open_at(path: &Path, collection: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                id            TEXT PRIMARY KEY,
                collection    TEXT NOT NULL,
                filename      TEXT NOT NULL,
                file_type     TEXT NOT NULL,
                content_hash  TEXT NOT NULL,
                total_pages   INTEGER,
                total_chunks  INTEGER NOT NULL DEFAULT 0,
                file_size     INTEGER NOT NULL DEFAULT 0,
                ingested_at   TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS chunks (
                id           TEXT PRIMARY KEY,
                document_id  TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                collection   TEXT NOT NULL,
                chunk_index  INTEGER NOT NULL,
                content      TEXT NOT NULL,
                embedding    BLOB NOT NULL,
                filename     TEXT NOT NULL,
                file_type    TEXT NOT NULL,
                page_number  INTEGER,
                page_count   INTEGER,
                char_start   INTEGER NOT NULL,
                char_end     INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
            CREATE INDEX IF NOT EXISTS idx_documents_hash ON documents(collection, content_hash);
            CREATE INDEX IF NOT EXISTS idx_chunks_collection ON chunks(collection);
            CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id);",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            collection: collection.to_string(),
        })
    }

    /// Insert a document record
    pub fn insert_document(&self, doc: &Document) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO documents
                (id, collection, filename, file_type, content_hash,
                 total_pages, total_chunks, file_size, ingested_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                doc.id.to_string(),
                self.collection,
                doc.filename,
                serde_json::to_string(&doc.file_type)?,
                doc.content_hash,
                doc.total_pages,
                doc.total_chunks,
                doc.file_size as i64,
                doc.ingested_at,
            ],
        )?;
        Ok(())
    }

    /// Insert chunks with their embeddings
    pub fn insert_chunks(&self, chunks: &[Chunk]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO chunks
                    (id, document_id, collection, chunk_index, content, embedding,
                     filename, file_type, page_number, page_count, char_start, char_end)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for chunk in chunks {
                if chunk.embedding.is_empty() {
                    return Err(Error::vector_store("Chunk has no embedding"));
                }
                stmt.execute(params![
                    chunk.id.to_string(),
                    chunk.document_id.to_string(),
                    self.collection,
                    chunk.chunk_index,
                    chunk.content,
                    embedding_to_blob(&chunk.embedding),
                    chunk.source.filename,
                    serde_json::to_string(&chunk.source.file_type)?,
                    chunk.source.page_number,
                    chunk.source.page_count,
                    chunk.char_start as i64,
                    chunk.char_end as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Search for the top-k chunks most similar to the query embedding
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, document_id, chunk_index, content, embedding,
                    filename, file_type, page_number, page_count, char_start, char_end
             FROM chunks WHERE collection = ?1",
        )?;

        let rows = stmt.query_map(params![self.collection], |row| {
            let embedding: Vec<u8> = row.get(4)?;
            Ok((row_to_chunk(row)?, embedding))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (mut chunk, blob) = row?;
            let embedding = blob_to_embedding(&blob);
            let similarity = cosine_similarity(query_embedding, &embedding);
            chunk.embedding = embedding;
            results.push(SearchResult { chunk, similarity });
        }

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    /// Find a document by content hash
    pub fn find_by_hash(&self, content_hash: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("{} WHERE collection = ?1 AND content_hash = ?2", SELECT_DOCUMENT),
            params![self.collection, content_hash],
            row_to_document,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Find a document by filename
    pub fn find_by_filename(&self, filename: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("{} WHERE collection = ?1 AND filename = ?2", SELECT_DOCUMENT),
            params![self.collection, filename],
            row_to_document,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Get a document by ID
    pub fn get_document(&self, id: &Uuid) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("{} WHERE collection = ?1 AND id = ?2", SELECT_DOCUMENT),
            params![self.collection, id.to_string()],
            row_to_document,
        )
        .optional()
        .map_err(Error::from)
    }

    /// List all documents in the collection
    pub fn list_documents(&self) -> Result<Vec<Document>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "{} WHERE collection = ?1 ORDER BY ingested_at DESC",
            SELECT_DOCUMENT
        ))?;
        let rows = stmt.query_map(params![self.collection], row_to_document)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Delete a document and its chunks; returns the number of chunks removed
    pub fn delete_document(&self, id: &Uuid) -> Result<usize> {
        let conn = self.conn.lock();
        let deleted = conn.execute(
            "DELETE FROM chunks WHERE collection = ?1 AND document_id = ?2",
            params![self.collection, id.to_string()],
        )?;
        conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![self.collection, id.to_string()],
        )?;
        Ok(deleted)
    }

    /// Number of chunks in the collection
    pub fn chunk_count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
            params![self.collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Remove every document and chunk in the collection
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM chunks WHERE collection = ?1",
            params![self.collection],
        )?;
        conn.execute(
            "DELETE FROM documents WHERE collection = ?1",
            params![self.collection],
        )?;
        Ok(())
    }
}

const SELECT_DOCUMENT: &str = "SELECT id, filename, file_type, content_hash,
        total_pages, total_chunks, file_size, ingested_at FROM documents";

fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    let id: String = row.get(0)?;
    let file_type: String = row.get(2)?;
    let file_size: i64 = row.get(6)?;

    Ok(Document {
        id: Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::new_v4()),
        filename: row.get(1)?,
        file_type: serde_json::from_str(&file_type).unwrap_or(FileType::Unknown),
        content_hash: row.get(3)?,
        total_pages: row.get(4)?,
        total_chunks: row.get(5)?,
        file_size: file_size as u64,
        ingested_at: row.get(7)?,
    })
}

fn row_to_chunk(row: &rusqlite::Row<'_>) -> rusqlite::Result<Chunk> {
    let id: String = row.get(0)?;
    let document_id: String = row.get(1)?;
    let file_type: String = row.get(6)?;
    let char_start: i64 = row.get(9)?;
    let char_end: i64 = row.get(10)?;

    Ok(Chunk {
        id: Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::new_v4()),
        document_id: Uuid::parse_str(&document_id).unwrap_or_else(|_| Uuid::new_v4()),
        chunk_index: row.get(2)?,
        content: row.get(3)?,
        embedding: Vec::new(),
        source: ChunkSource {
            filename: row.get(5)?,
            file_type: serde_json::from_str(&file_type).unwrap_or(FileType::Unknown),
            page_number: row.get(7)?,
            page_count: row.get(8)?,
        },
        char_start: char_start as usize,
        char_end: char_end as usize,
    })
}

/// Encode an embedding as a little-endian f32 blob
fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

/// Decode a little-endian f32 blob back into an embedding
fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Cosine similarity between two vectors, 0.0 when either is degenerate
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileType;

    fn open_store() -> (tempfile::TempDir, VectorStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open_at(&dir.path().join("vectors.db"), "test_docs").unwrap();
        (dir, store)
    }

    fn make_chunk(doc: &Document, index: u32, content: &str, embedding: Vec<f32>) -> Chunk {
        let mut chunk = Chunk::new(
            doc.id,
            content.to_string(),
            ChunkSource::text(doc.filename.clone(), FileType::Txt),
            0,
            content.len(),
            index,
        );
        chunk.embedding = embedding;
        chunk
    }

    #[test]
    fn blob_round_trip() {
        let embedding = vec![0.25f32, -1.5, 3.0];
        let blob = embedding_to_blob(&embedding);
        assert_eq!(blob_to_embedding(&blob), embedding);
    }

    #[test]
    fn cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn insert_and_search_returns_nearest_chunks() {
        let (_dir, store) = open_store();

        let mut doc = Document::new(
            "dosing.txt".to_string(),
            FileType::Txt,
            "hash-1".to_string(),
            128,
        );
        doc.total_chunks = 2;
        store.insert_document(&doc).unwrap();

        let chunks = vec![
            make_chunk(&doc, 0, "metformin 500mg twice daily", vec![1.0, 0.0, 0.0]),
            make_chunk(&doc, 1, "insulin glargine at bedtime", vec![0.0, 1.0, 0.0]),
        ];
        store.insert_chunks(&chunks).unwrap();
        assert_eq!(store.chunk_count().unwrap(), 2);

        let results = store.search(&[0.9, 0.1, 0.0], 1).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].chunk.content.contains("metformin"));
        assert!(results[0].similarity > 0.9);
    }

    #[test]
    fn delete_document_removes_chunks() {
        let (_dir, store) = open_store();

        let doc = Document::new(
            "dosing.txt".to_string(),
            FileType::Txt,
            "hash-1".to_string(),
            128,
        );
        store.insert_document(&doc).unwrap();
        store
            .insert_chunks(&[make_chunk(&doc, 0, "chunk", vec![1.0, 0.0])])
            .unwrap();

        let deleted = store.delete_document(&doc.id).unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.chunk_count().unwrap(), 0);
        assert!(store.get_document(&doc.id).unwrap().is_none());
    }

    #[test]
    fn documents_are_looked_up_by_hash_and_filename() {
        let (_dir, store) = open_store();

        let doc = Document::new(
            "dosing.txt".to_string(),
            FileType::Txt,
            "hash-abc".to_string(),
            64,
        );
        store.insert_document(&doc).unwrap();

        assert!(store.find_by_hash("hash-abc").unwrap().is_some());
        assert!(store.find_by_hash("other").unwrap().is_none());
        assert_eq!(
            store.find_by_filename("dosing.txt").unwrap().unwrap().id,
            doc.id
        );

        store.clear().unwrap();
        assert!(store.list_documents().unwrap().is_empty());
    }
}
