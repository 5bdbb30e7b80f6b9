//! Retrieval subsystem: chunking, embedding, and nearest-neighbor search.
//!
//! A reference document is chunked with overlap, embedded once at ingestion
//! time, and served through brute-force cosine search. A built-in fallback
//! corpus guarantees the clinical handler always has passages to cite.

pub mod chunker;
pub mod corpus;
pub mod embedding;
pub mod index;

pub use chunker::{Chunk, chunk_text, normalize_whitespace};
pub use corpus::{FALLBACK_PASSAGES, FALLBACK_SOURCE};
pub use embedding::{Embedder, HashEmbedder, cosine_distance, create_embedder};
pub use index::{ChunkMetadata, DOCUMENT_SOURCE, IndexStats, RetrievalIndex, SearchHit};
