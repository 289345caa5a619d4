//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! Metadata filters are evaluated in Rust as well, after rows are loaded.

use super::{rank, FilterExpr, ScoredChunk, StoredChunk, VectorStore};
use crate::chunking::Chunk;
use crate::error::{ContrailError, Result};
use crate::reviews::ReviewMetadata;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS chunks (
    document_id TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    content TEXT NOT NULL,
    airline_name TEXT NOT NULL,
    overall_rating REAL NOT NULL,
    review_title TEXT NOT NULL,
    seat_type TEXT NOT NULL,
    route TEXT NOT NULL,
    recommended INTEGER NOT NULL,
    embedding BLOB NOT NULL,
    indexed_at TEXT NOT NULL,
    PRIMARY KEY (document_id, chunk_index)
);

CREATE INDEX IF NOT EXISTS idx_chunks_airline ON chunks(airline_name);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a vector store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ContrailError::StoreUnavailable(format!("cannot create {:?}: {}", parent, e))
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            ContrailError::StoreUnavailable(format!("cannot open {:?}: {}", path, e))
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ContrailError::StoreUnavailable(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredChunk> {
        let embedding_bytes: Vec<u8> = row.get(9)?;
        let indexed_at_str: String = row.get(10)?;

        let metadata = ReviewMetadata {
            document_id: row.get(0)?,
            airline_name: row.get(3)?,
            overall_rating: row.get(4)?,
            review_title: row.get(5)?,
            seat_type: row.get(6)?,
            route: row.get(7)?,
            recommended: row.get(8)?,
        };

        Ok(StoredChunk {
            chunk: Chunk::new(row.get(2)?, metadata, row.get(1)?),
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, chunks))]
    async fn upsert_batch(&self, chunks: &[StoredChunk]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for stored in chunks {
            let chunk = &stored.chunk;
            let meta = &chunk.metadata;

            tx.execute(
                r#"
                INSERT OR REPLACE INTO chunks
                (document_id, chunk_index, content, airline_name, overall_rating, review_title,
                 seat_type, route, recommended, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
                params![
                    meta.document_id,
                    chunk.chunk_index,
                    chunk.content,
                    meta.airline_name,
                    meta.overall_rating,
                    meta.review_title,
                    meta.seat_type,
                    meta.route,
                    meta.recommended,
                    Self::embedding_to_bytes(&stored.embedding),
                    stored.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Batch upserted {} chunks", chunks.len());
        Ok(chunks.len())
    }

    #[instrument(skip(self, query_embedding, filter))]
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
        filter: Option<&FilterExpr>,
    ) -> Result<Vec<ScoredChunk>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT document_id, chunk_index, content, airline_name, overall_rating,
                   review_title, seat_type, route, recommended, embedding, indexed_at
            FROM chunks
            "#,
        )?;

        let rows = stmt
            .query_map([], Self::read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let results = rank(&rows, query_embedding, limit, min_score, filter);
        debug!("Found {} matching chunks out of {}", results.len(), rows.len());
        Ok(results)
    }

    async fn chunk_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
