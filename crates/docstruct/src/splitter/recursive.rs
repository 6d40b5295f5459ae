//! Recursive separator splitting with greedy, overlap-aware merging
//!
//! Separators are tried from coarsest to finest (paragraph, line, word,
//! grapheme). Fragments that are still too long are re-split with the
//! remaining separators, then adjacent fragments are merged back together
//! until the next one would overflow `chunk_size`.

use std::borrow::Cow;
use std::collections::VecDeque;

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};

use super::{validate_window, TextSplitter};

/// Default separators: paragraph, line, word, then single graphemes
pub fn default_separators() -> Vec<String> {
    vec![
        "\n\n".to_string(),
        "\n".to_string(),
        " ".to_string(),
        String::new(),
    ]
}

/// Recursive character splitter
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    /// Target chunk length in characters
    chunk_size: usize,
    /// Best-effort characters carried into the next chunk
    chunk_overlap: usize,
    /// Separators in priority order; `""` splits into graphemes
    separators: Vec<String>,
}

impl RecursiveSplitter {
    /// Create a splitter with the default separators
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Self::with_separators(chunk_size, chunk_overlap, default_separators())
    }

    /// Create a splitter with custom separators
    pub fn with_separators(
        chunk_size: usize,
        chunk_overlap: usize,
        separators: Vec<String>,
    ) -> Result<Self> {
        validate_window(chunk_size, chunk_overlap)?;
        if separators.is_empty() {
            return Err(Error::config("separators must not be empty"));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn separators(&self) -> &[String] {
        &self.separators
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = select_separator(text, separators);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.graphemes(true).collect()
        } else {
            text.split(separator).collect()
        };

        let mut fragments: Vec<Cow<'_, str>> = Vec::with_capacity(pieces.len());
        for piece in pieces {
            if piece.is_empty() {
                continue;
            }
            if char_len(piece) < self.chunk_size || remaining.is_empty() {
                fragments.push(Cow::Borrowed(piece));
            } else {
                fragments.extend(
                    self.split_with(piece, remaining)
                        .into_iter()
                        .map(Cow::Owned),
                );
            }
        }

        self.merge(&fragments, separator)
    }

    /// Greedily join fragments into chunks of at most `chunk_size` characters.
    ///
    /// After each flush, fragments are dropped from the front of the window
    /// until what is left fits within `chunk_overlap` and leaves room for the
    /// incoming fragment. The retained tail seeds the next chunk.
    fn merge<S: AsRef<str>>(&self, fragments: &[S], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for fragment in fragments {
            let fragment = fragment.as_ref();
            let len = char_len(fragment);

            if !window.is_empty() && total + separator_len + len > self.chunk_size {
                push_joined(&mut chunks, &window, separator);

                while total > self.chunk_overlap
                    || (total > 0 && total + separator_len + len > self.chunk_size)
                {
                    let Some((_, front_len)) = window.pop_front() else {
                        break;
                    };
                    total -= front_len;
                    if !window.is_empty() {
                        total -= separator_len;
                    }
                }
            }

            if !window.is_empty() {
                total += separator_len;
            }
            total += len;
            window.push_back((fragment, len));
        }

        push_joined(&mut chunks, &window, separator);
        chunks
    }
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: default_separators(),
        }
    }
}

impl TextSplitter for RecursiveSplitter {
    fn name(&self) -> &str {
        "recursive"
    }

    fn split_text(&self, text: &str) -> Result<Vec<String>> {
        let chunks = self.split_with(text, &self.separators);
        tracing::trace!(chunks = chunks.len(), "recursive split");
        Ok(chunks)
    }
}

/// Pick the first separator present in `text`; the empty sentinel always matches.
fn select_separator<'s>(text: &str, separators: &'s [String]) -> (&'s str, &'s [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator.as_str(), &separators[i + 1..]);
        }
    }

    (separators.last().map(String::as_str).unwrap_or(""), &[])
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<(&str, usize)>, separator: &str) {
    if window.is_empty() {
        return;
    }
    let joined = window
        .iter()
        .map(|(fragment, _)| *fragment)
        .collect::<Vec<_>>()
        .join(separator);
    if !joined.trim().is_empty() {
        chunks.push(joined);
    }
}

#[inline]
fn char_len(text: &str) -> usize {
    text.chars().count()
}
