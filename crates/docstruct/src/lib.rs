//! docstruct: document chunking for retrieval pipelines
//!
//! This crate turns loaded documents into bounded-size chunks that keep their
//! provenance (id, source, page, metadata) and their position in the parent.
//! Three strategies are provided: whitespace-aligned fixed windows, recursive
//! separator splitting, and token-budget windows over a pluggable tokenizer.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod splitter;
pub mod types;

pub use config::{ChunkingConfig, DocstructConfig, SplitterConfig, TokenizerConfig};
pub use error::{Error, Result};
pub use orchestrator::{par_split_units, split_units, split_units_cancellable, ChunkPipeline};
pub use splitter::{
    FixedWindowSplitter, HfTokenizer, RecursiveSplitter, TextSplitter, TokenSplitter, Tokenizer,
};
pub use types::{Metadata, Unit};
