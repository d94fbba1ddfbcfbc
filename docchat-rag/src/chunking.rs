//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`RecursiveChunker`] — splits hierarchically at paragraph, line,
//!   sentence, and word boundaries, falling back to raw characters
//! - [`FixedSizeChunker`] — splits by size with a sliding window
//!
//! Chunking is pure and makes no network calls.

use crate::document::Chunk;

/// A strategy for splitting source text into retrievable chunks.
///
/// Implementations return chunks in source order with sequential ids.
/// Empty input text yields an empty sequence.
pub trait Chunker: Send + Sync {
    /// Split text into ordered chunks.
    fn split(&self, text: &str) -> Vec<Chunk>;
}

/// Separator ladder, coarsest first. Segments that still exceed the size
/// limit after the last level are split at raw character boundaries.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Splits text at the coarsest boundary that keeps chunks within
/// `chunk_size`, descending paragraph → line → sentence → word → character.
///
/// Adjacent chunks share `chunk_overlap` trailing/leading bytes of context:
/// every chunk after the first is prefixed with the tail of its
/// predecessor, so stripping those prefixes reconstructs the input exactly.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(1000, 100);
/// let chunks = chunker.split(&text);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum chunk size in bytes of UTF-8 text
    /// * `chunk_overlap` — bytes of shared context between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for RecursiveChunker {
    fn split(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let pieces = split_recursive(text, self.chunk_size, &SEPARATORS);
        let pieces = apply_overlap(pieces, self.chunk_overlap);

        pieces.into_iter().enumerate().map(|(i, text)| Chunk::new(i, text)).collect()
    }
}

/// Split text at `separators[0]`, merging segments up to `chunk_size` and
/// recursing with the remaining separators on segments that are still too
/// large. Concatenating the returned pieces reproduces `text` exactly.
fn split_recursive(text: &str, chunk_size: usize, separators: &[&str]) -> Vec<String> {
    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let Some((separator, rest)) = separators.split_first() else {
        return split_by_size(text, chunk_size);
    };

    let segments = split_keeping_separator(text, separator);
    if segments.len() <= 1 {
        return split_recursive(text, chunk_size, rest);
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    for segment in segments {
        if !current.is_empty() && current.len() + segment.len() > chunk_size {
            flush(&mut pieces, std::mem::take(&mut current), chunk_size, rest);
        }
        current.push_str(segment);
    }
    if !current.is_empty() {
        flush(&mut pieces, current, chunk_size, rest);
    }

    pieces
}

/// Emit a merged piece, recursing at the next separator level if it still
/// exceeds the size limit.
fn flush(pieces: &mut Vec<String>, piece: String, chunk_size: usize, rest: &[&str]) {
    if piece.len() > chunk_size {
        pieces.extend(split_recursive(&piece, chunk_size, rest));
    } else {
        pieces.push(piece);
    }
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment, so no bytes are lost.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Raw size-based splitting at character boundaries, no overlap.
fn split_by_size(text: &str, chunk_size: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + chunk_size).min(text.len());
        while end < text.len() && !text.is_char_boundary(end) {
            end -= 1;
        }
        if end <= start {
            // a single char wider than the limit; take it whole
            end = start + text[start..].chars().next().map(char::len_utf8).unwrap_or(1);
        }
        pieces.push(text[start..end].to_string());
        start = end;
    }

    pieces
}

/// Prefix every piece after the first with the tail of its predecessor.
///
/// The carried tail is taken from the predecessor's source text, never from
/// a previously added prefix, so overlap does not compound.
fn apply_overlap(pieces: Vec<String>, overlap: usize) -> Vec<String> {
    if overlap == 0 || pieces.len() <= 1 {
        return pieces;
    }

    let mut out = Vec::with_capacity(pieces.len());
    let mut carry = String::new();
    for (i, piece) in pieces.iter().enumerate() {
        if i == 0 {
            out.push(piece.clone());
        } else {
            let mut prefixed = String::with_capacity(carry.len() + piece.len());
            prefixed.push_str(&carry);
            prefixed.push_str(piece);
            out.push(prefixed);
        }
        carry = tail(piece, overlap).to_string();
    }

    out
}

/// Last `max_bytes` of `s`, snapped forward to a character boundary.
fn tail(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut idx = s.len() - max_bytes;
    while !s.is_char_boundary(idx) {
        idx += 1;
    }
    &s[idx..]
}

/// Splits text into fixed-size chunks with a sliding window.
///
/// Windows advance by `chunk_size - chunk_overlap` bytes, snapped to
/// character boundaries. Useful when deterministic window positions matter
/// more than natural boundaries.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum chunk size in bytes of UTF-8 text
    /// * `chunk_overlap` — bytes shared between consecutive windows
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn split(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let step = self.chunk_size.saturating_sub(self.chunk_overlap);
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut order = 0;

        while start < text.len() {
            let mut end = (start + self.chunk_size).min(text.len());
            while end < text.len() && !text.is_char_boundary(end) {
                end -= 1;
            }
            if end <= start {
                end = start + text[start..].chars().next().map(char::len_utf8).unwrap_or(1);
            }
            chunks.push(Chunk::new(order, &text[start..end]));
            order += 1;

            if step == 0 || end == text.len() {
                break;
            }
            let mut next = start + step;
            while next < text.len() && !text.is_char_boundary(next) {
                next += 1;
            }
            start = next;
        }

        chunks
    }
}
