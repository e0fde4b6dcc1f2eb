//! Chunker: splits cleaned text into contiguous slices sized for one model call.
//!
//! Short texts use a small fixed chunk size; longer texts are divided into a
//! fixed number of roughly equal pieces, which bounds the fan-out width.
//! Lengths are counted in chars so slices never split a UTF-8 sequence.

#[derive(Debug, Clone)]
pub struct ChunkPolicy {
    pub threshold_chars: usize,
    pub small_chunk_chars: usize,
    pub large_piece_count: usize,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            threshold_chars: 5_000,
            small_chunk_chars: 2_000,
            large_piece_count: 5,
        }
    }
}

impl ChunkPolicy {
    pub fn chunk_size(&self, len_chars: usize) -> usize {
        let size = if len_chars <= self.threshold_chars {
            self.small_chunk_chars
        } else {
            len_chars.div_ceil(self.large_piece_count.max(1))
        };
        size.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

/// Empty input yields no chunks; callers treat that as an extraction failure.
pub fn chunk_text(text: &str, policy: &ChunkPolicy) -> Vec<Chunk> {
    let len = text.chars().count();
    if len == 0 {
        return Vec::new();
    }
    let size = policy.chunk_size(len);

    let mut chunks = Vec::with_capacity(len.div_ceil(size));
    let mut start = 0;
    for (n, (byte_idx, _)) in text.char_indices().enumerate() {
        if n > 0 && n % size == 0 {
            chunks.push(Chunk {
                index: chunks.len(),
                text: text[start..byte_idx].to_string(),
            });
            start = byte_idx;
        }
    }
    chunks.push(Chunk {
        index: chunks.len(),
        text: text[start..].to_string(),
    });
    chunks
}
