//! Fixed-window splitting on whitespace boundaries

use crate::error::Result;

use super::{validate_window, TextSplitter};

/// Character-count splitter with trailing overlap.
///
/// Whitespace runs are collapsed to single spaces before windowing, and
/// window ends are pulled back to the last space so words stay intact.
#[derive(Debug, Clone)]
pub struct FixedWindowSplitter {
    /// Maximum chunk length in characters
    chunk_size: usize,
    /// Characters shared by consecutive chunks
    chunk_overlap: usize,
}

impl FixedWindowSplitter {
    /// Create a new splitter, rejecting `chunk_overlap >= chunk_size`
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_window(chunk_size, chunk_overlap)?;
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    fn split_normalized(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();

        if total <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < total {
            let mut end = start + self.chunk_size;

            if end >= total {
                push_trimmed(&mut chunks, &chars[start..]);
                break;
            }

            // A space at the window start would give an empty chunk
            if let Some(pos) = chars[start + 1..end].iter().rposition(|&c| c == ' ') {
                end = start + 1 + pos;
            }

            push_trimmed(&mut chunks, &chars[start..end]);

            // Overlap must never stall or rewind the window
            let next = end.saturating_sub(self.chunk_overlap);
            start = if next > start { next } else { end };
        }

        chunks
    }
}

impl Default for FixedWindowSplitter {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl TextSplitter for FixedWindowSplitter {
    fn name(&self) -> &str {
        "fixed_window"
    }

    fn split_text(&self, text: &str) -> Result<Vec<String>> {
        let normalized = normalize_whitespace(text);
        let chunks = self.split_normalized(&normalized);
        tracing::trace!(
            chars = normalized.chars().count(),
            chunks = chunks.len(),
            "fixed-window split"
        );
        Ok(chunks)
    }
}

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_trimmed(chunks: &mut Vec<String>, window: &[char]) {
    let chunk: String = window.iter().collect();
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        chunks.push(chunk.to_string());
    }
}
