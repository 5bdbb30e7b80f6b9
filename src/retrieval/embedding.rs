//! Text embedding behind a trait seam.
//!
//! The default embedder hashes lowercase tokens into a fixed-dimension
//! bag-of-words vector and L2-normalizes it. It is deterministic, needs no
//! model download, and is adequate for lexical nearest-neighbor retrieval
//! over a domain corpus; a learned embedder can be slotted in behind the
//! same trait without touching the index.

/// Embedding dimension for the hashed embedder.
const HASH_DIMENSION: usize = 384;

/// FNV-1a offset basis.
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
/// FNV-1a prime.
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Produces fixed-dimension embeddings for text.
pub trait Embedder: Send + Sync {
    /// Embedder name for logging and status reporting.
    fn name(&self) -> &'static str;

    /// Output vector dimension.
    fn dimension(&self) -> usize;

    /// Embeds a single text into an L2-normalized vector.
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Embeds a batch of texts. The default implementation maps
    /// [`Embedder::embed`] over the slice.
    fn embed_batch(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Deterministic hashed bag-of-words embedder.
///
/// Each lowercase alphanumeric token is FNV-hashed to a bucket; a second
/// hash bit decides the sign so vectors are not all-positive. Token counts
/// accumulate and the vector is L2-normalized, making the dot product of
/// two embeddings a cosine similarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashEmbedder;

impl HashEmbedder {
    /// FNV-1a hash of a token.
    fn fnv1a(token: &str) -> u64 {
        let mut hash = FNV_OFFSET;
        for byte in token.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }
}

impl Embedder for HashEmbedder {
    fn name(&self) -> &'static str {
        "hashed-bow"
    }

    fn dimension(&self) -> usize {
        HASH_DIMENSION
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; HASH_DIMENSION];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let lowered = token.to_lowercase();
            let hash = Self::fnv1a(&lowered);
            #[allow(clippy::cast_possible_truncation)]
            let bucket = (hash % HASH_DIMENSION as u64) as usize;
            let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

/// Creates the default embedder.
#[must_use]
pub fn create_embedder() -> Box<dyn Embedder> {
    Box::new(HashEmbedder)
}

/// Cosine distance between two L2-normalized vectors (0.0 = identical).
#[must_use]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    1.0 - dot
}
