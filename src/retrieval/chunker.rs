//! Sliding-window text chunking with sentence-boundary snapping.
//!
//! Splits a whitespace-normalized document into overlapping windows. When a
//! window would cut mid-sentence, the window is trimmed back to the last
//! sentence terminator found in its second half, so chunks end on complete
//! sentences wherever the text allows it.

/// A bounded, overlap-preserving slice of a reference document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk text (whitespace-normalized).
    pub content: String,
    /// Label of the document this chunk came from.
    pub source: String,
    /// Sequential position within the source document (0-based).
    pub index: usize,
}

/// Collapses all whitespace runs to single spaces.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits `text` into overlapping chunks of at most `size` characters.
///
/// The window advances by `size - overlap` characters each step. When a
/// window ends before the end of the text, it is trimmed back to the last
/// `'.'` in the window's second half. Empty windows are dropped. Every
/// character run of the input longer than `overlap` appears in at least
/// one chunk.
///
/// `overlap` must be less than `size`; the step is clamped to at least one
/// character so the window always advances.
#[must_use]
pub fn chunk_text(text: &str, source: &str, size: usize, overlap: usize) -> Vec<Chunk> {
    debug_assert!(overlap < size, "overlap must be less than chunk size");

    let normalized = normalize_whitespace(text);
    let chars: Vec<char> = normalized.chars().collect();
    let total = chars.len();

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < total {
        let mut end = (start + size).min(total);

        // Snap back to a sentence boundary when the window cuts the text
        // short, but only if the boundary falls in the second half of the
        // window (otherwise the chunk would shrink too far).
        if end < total {
            let window = &chars[start..end];
            if let Some(last_period) = window.iter().rposition(|&c| c == '.')
                && last_period > size / 2
            {
                end = start + last_period + 1;
            }
        }

        let content: String = chars[start..end].iter().collect();
        let trimmed = content.trim();
        if !trimmed.is_empty() {
            chunks.push(Chunk {
                content: trimmed.to_string(),
                source: source.to_string(),
                index: chunks.len(),
            });
        }

        if end >= total {
            break;
        }
        // Advance by at least one character so the loop always terminates,
        // even when the trimmed window is shorter than the overlap.
        start = (end.saturating_sub(overlap)).max(start + 1);
    }

    chunks
}
