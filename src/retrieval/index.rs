//! In-memory vector index over the reference corpus.
//!
//! Chunks are embedded in batches at ingestion time and searched by
//! brute-force cosine distance. When no source document is available (or it
//! yields nothing), the built-in fallback corpus is ingested through the
//! same path, so search never silently returns zero passages while the
//! fallback is available.

use std::path::Path;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::chunker::{Chunk, chunk_text};
use super::corpus::{FALLBACK_PASSAGES, FALLBACK_SOURCE};
use super::embedding::{Embedder, cosine_distance, create_embedder};

/// Source label for chunks derived from the reference document.
pub const DOCUMENT_SOURCE: &str = "Comprehensive Clinical Nephrology";

/// Metadata stored alongside each indexed chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Label of the originating document or corpus.
    pub source: String,
    /// Sequential position within the originating document.
    pub chunk_index: usize,
}

/// A single nearest-neighbor search result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Chunk text.
    pub content: String,
    /// Chunk provenance.
    pub metadata: ChunkMetadata,
    /// Cosine distance from the query (0.0 = identical).
    pub distance: f32,
}

/// Read-only index statistics for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    /// Number of indexed chunks.
    pub document_count: usize,
    /// Embedder in use.
    pub embedder: &'static str,
    /// Whether the index is serving the fallback corpus instead of a
    /// source document.
    pub degraded: bool,
}

struct IndexEntry {
    id: usize,
    embedding: Vec<f32>,
    content: String,
    metadata: ChunkMetadata,
}

struct IndexState {
    entries: Vec<IndexEntry>,
    degraded: bool,
}

/// Embeds and serves nearest-neighbor search over reference chunks.
pub struct RetrievalIndex {
    embedder: Box<dyn Embedder>,
    state: RwLock<IndexState>,
    chunk_size: usize,
    chunk_overlap: usize,
    embed_batch_size: usize,
}

impl RetrievalIndex {
    /// Creates an empty index with the default embedder.
    #[must_use]
    pub fn new(chunk_size: usize, chunk_overlap: usize, embed_batch_size: usize) -> Self {
        Self::with_embedder(create_embedder(), chunk_size, chunk_overlap, embed_batch_size)
    }

    /// Creates an empty index with a specific embedder.
    #[must_use]
    pub fn with_embedder(
        embedder: Box<dyn Embedder>,
        chunk_size: usize,
        chunk_overlap: usize,
        embed_batch_size: usize,
    ) -> Self {
        Self {
            embedder,
            state: RwLock::new(IndexState {
                entries: Vec::new(),
                degraded: false,
            }),
            chunk_size,
            chunk_overlap,
            embed_batch_size,
        }
    }

    /// Embeds and stores chunks, assigning ids that continue from the
    /// current index size. Embedding is batched to bound per-call memory.
    pub fn add(&self, chunks: Vec<Chunk>) {
        if chunks.is_empty() {
            return;
        }

        let embeddings = self.embed_chunks(&chunks);
        let added = chunks.len();
        let mut state = self.write_state();
        Self::append_entries(&mut state, chunks, embeddings);
        info!(added, total = state.entries.len(), "indexed chunks");
    }

    fn embed_chunks(&self, chunks: &[Chunk]) -> Vec<Vec<f32>> {
        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.embed_batch_size.max(1)) {
            let texts: Vec<&str> = batch.iter().map(|c| c.content.as_str()).collect();
            embeddings.extend(self.embedder.embed_batch(&texts));
        }
        embeddings
    }

    fn append_entries(state: &mut IndexState, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) {
        let next_id = state.entries.len();
        for (offset, (chunk, embedding)) in chunks.into_iter().zip(embeddings).enumerate() {
            state.entries.push(IndexEntry {
                id: next_id + offset,
                embedding,
                content: chunk.content,
                metadata: ChunkMetadata {
                    source: chunk.source,
                    chunk_index: chunk.index,
                },
            });
        }
    }

    /// Returns up to `k` nearest chunks for the query, closest first.
    ///
    /// An empty index ingests the fallback corpus before searching, so the
    /// caller always gets passages while the fallback is available.
    pub fn search(&self, query: &str, k: usize) -> Vec<SearchHit> {
        if self.is_empty() {
            warn!("retrieval index empty at query time, ingesting fallback corpus");
            self.ingest_fallback();
        }

        let query_embedding = self.embedder.embed(query);
        let state = self.read_state();

        let mut scored: Vec<(f32, usize)> = state
            .entries
            .iter()
            .enumerate()
            .map(|(pos, entry)| (cosine_distance(&query_embedding, &entry.embedding), pos))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        let limit = k.min(state.entries.len());
        let hits: Vec<SearchHit> = scored[..limit]
            .iter()
            .map(|&(distance, pos)| {
                let entry = &state.entries[pos];
                SearchHit {
                    content: entry.content.clone(),
                    metadata: entry.metadata.clone(),
                    distance,
                }
            })
            .collect();

        info!(
            query_len = query.len(),
            results = hits.len(),
            degraded = state.degraded,
            "retrieval query"
        );
        hits
    }

    /// Populates the index from a source document, falling back to the
    /// built-in corpus on any extraction failure or zero-chunk result.
    ///
    /// Returns `true` when the index ends up populated from either source;
    /// a no-op success when the index is already non-empty.
    pub fn initialize(&self, source_document: Option<&Path>) -> bool {
        if !self.is_empty() {
            info!(
                document_count = self.stats().document_count,
                "retrieval index already initialized"
            );
            return true;
        }

        if let Some(path) = source_document {
            match std::fs::read_to_string(path) {
                Ok(text) => {
                    let chunks =
                        chunk_text(&text, DOCUMENT_SOURCE, self.chunk_size, self.chunk_overlap);
                    if chunks.is_empty() {
                        warn!(path = %path.display(), "source document produced no chunks");
                    } else {
                        let count = chunks.len();
                        self.add(chunks);
                        info!(path = %path.display(), chunks = count, "indexed source document");
                        return true;
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read source document");
                }
            }
        }

        self.ingest_fallback();
        !self.is_empty()
    }

    /// Returns read-only index statistics.
    pub fn stats(&self) -> IndexStats {
        let state = self.read_state();
        IndexStats {
            document_count: state.entries.len(),
            embedder: self.embedder.name(),
            degraded: state.degraded,
        }
    }

    /// Returns `true` if the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.read_state().entries.is_empty()
    }

    /// Ingests the built-in fallback corpus and marks the index degraded.
    ///
    /// Emptiness is re-checked under the write lock: concurrent searches on
    /// an empty index may all reach this point, and only the first may
    /// ingest, or the corpus would be duplicated.
    fn ingest_fallback(&self) {
        let chunks: Vec<Chunk> = FALLBACK_PASSAGES
            .iter()
            .enumerate()
            .map(|(index, passage)| Chunk {
                content: (*passage).to_string(),
                source: FALLBACK_SOURCE.to_string(),
                index,
            })
            .collect();
        let count = chunks.len();
        let embeddings = self.embed_chunks(&chunks);

        let mut state = self.write_state();
        if !state.entries.is_empty() {
            return;
        }
        Self::append_entries(&mut state, chunks, embeddings);
        state.degraded = true;
        warn!(passages = count, "serving fallback knowledge corpus");
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, IndexState> {
        // Lock poisoning only occurs if another thread panicked mid-write;
        // the entries are still structurally sound, so recover the guard.
        self.state.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, IndexState> {
        self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RetrievalIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("RetrievalIndex")
            .field("document_count", &stats.document_count)
            .field("embedder", &stats.embedder)
            .field("degraded", &stats.degraded)
            .finish()
    }
}
