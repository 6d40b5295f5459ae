//! Text splitters: fixed-window, recursive separator and token-budget
//!
//! Every splitter implements [`TextSplitter`], turning one text into an
//! ordered list of bounded-size strings. Splitters hold only immutable
//! configuration, so a single instance can be shared across threads.

mod fixed;
mod recursive;
mod token;
pub mod tokenizer;

pub use fixed::{normalize_whitespace, FixedWindowSplitter};
pub use recursive::{default_separators, RecursiveSplitter};
pub use token::TokenSplitter;
pub use tokenizer::{HfTokenizer, Tokenizer};

use crate::error::{Error, Result};
use crate::orchestrator;
use crate::types::Unit;

/// Capability shared by all splitters
pub trait TextSplitter: Send + Sync {
    /// Stable splitter name used in logs and output
    fn name(&self) -> &str;

    /// Split text into an ordered sequence of chunks.
    ///
    /// Empty or undersized input yields at most one chunk.
    fn split_text(&self, text: &str) -> Result<Vec<String>>;

    /// Split every unit, emitting chunks in parent-major order
    fn split_units(&self, units: &[Unit]) -> Result<Vec<Unit>> {
        orchestrator::split_units(self, units)
    }
}

impl<S: TextSplitter + ?Sized> TextSplitter for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn split_text(&self, text: &str) -> Result<Vec<String>> {
        (**self).split_text(text)
    }
}

impl<S: TextSplitter + ?Sized> TextSplitter for std::sync::Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn split_text(&self, text: &str) -> Result<Vec<String>> {
        (**self).split_text(text)
    }
}

/// Reject sizes no splitter can work with.
pub(crate) fn validate_window(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(Error::config("chunk_size must be positive"));
    }
    if chunk_overlap >= chunk_size {
        return Err(Error::config(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            chunk_overlap, chunk_size
        )));
    }
    Ok(())
}
