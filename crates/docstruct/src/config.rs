//! Configuration for splitters

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::splitter::{
    default_separators, FixedWindowSplitter, RecursiveSplitter, TextSplitter, TokenSplitter,
};

/// Environment variable overriding the tokenizer directory
pub const TOKENIZER_DIR_ENV: &str = "DOCSTRUCT_TOKENIZER_DIR";

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocstructConfig {
    /// Splitter selection and sizes
    #[serde(default)]
    pub splitter: SplitterConfig,
    /// Orchestration options
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

impl DocstructConfig {
    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

/// Chunk size and overlap shared by every strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size (characters, or tokens for the token strategy)
    pub chunk_size: usize,
    /// Overlap between consecutive chunks; must be below `chunk_size`
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    /// Character-based defaults
    pub fn characters() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }

    /// Token-based defaults
    pub fn tokens() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self::characters()
    }
}

/// Tokenizer selection for the token strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Model whose tokenizer is preferred
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Encoding used when the model tokenizer is unavailable
    #[serde(default = "default_encoding_name")]
    pub encoding_name: String,
    /// Directory holding tokenizer files
    #[serde(default)]
    pub tokenizer_dir: Option<PathBuf>,
}

fn default_model_name() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_encoding_name() -> String {
    "cl100k_base".to_string()
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            encoding_name: default_encoding_name(),
            tokenizer_dir: None,
        }
    }
}

impl TokenizerConfig {
    /// Directory to search: explicit setting, then `DOCSTRUCT_TOKENIZER_DIR`,
    /// then the user cache directory.
    pub fn resolved_dir(&self) -> PathBuf {
        if let Some(dir) = &self.tokenizer_dir {
            return dir.clone();
        }
        if let Some(dir) = std::env::var_os(TOKENIZER_DIR_ENV) {
            return PathBuf::from(dir);
        }
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docstruct")
            .join("tokenizers")
    }
}

/// Splitter strategy with its settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SplitterConfig {
    /// Whitespace-normalized fixed windows
    Fixed {
        #[serde(default = "default_char_chunk_size")]
        chunk_size: usize,
        #[serde(default = "default_char_chunk_overlap")]
        chunk_overlap: usize,
    },
    /// Recursive separator splitting
    Recursive {
        #[serde(default = "default_char_chunk_size")]
        chunk_size: usize,
        #[serde(default = "default_char_chunk_overlap")]
        chunk_overlap: usize,
        #[serde(default = "default_separators")]
        separators: Vec<String>,
    },
    /// Token-budget windows
    Token {
        #[serde(default = "default_token_chunk_size")]
        chunk_size: usize,
        #[serde(default = "default_token_chunk_overlap")]
        chunk_overlap: usize,
        #[serde(default)]
        tokenizer: TokenizerConfig,
    },
}

fn default_char_chunk_size() -> usize {
    ChunkingConfig::characters().chunk_size
}

fn default_char_chunk_overlap() -> usize {
    ChunkingConfig::characters().chunk_overlap
}

fn default_token_chunk_size() -> usize {
    ChunkingConfig::tokens().chunk_size
}

fn default_token_chunk_overlap() -> usize {
    ChunkingConfig::tokens().chunk_overlap
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self::Recursive {
            chunk_size: default_char_chunk_size(),
            chunk_overlap: default_char_chunk_overlap(),
            separators: default_separators(),
        }
    }
}

impl SplitterConfig {
    /// Strategy name
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed",
            Self::Recursive { .. } => "recursive",
            Self::Token { .. } => "token",
        }
    }

    /// Size settings
    pub fn chunking(&self) -> ChunkingConfig {
        let (chunk_size, chunk_overlap) = match self {
            Self::Fixed {
                chunk_size,
                chunk_overlap,
            }
            | Self::Recursive {
                chunk_size,
                chunk_overlap,
                ..
            }
            | Self::Token {
                chunk_size,
                chunk_overlap,
                ..
            } => (*chunk_size, *chunk_overlap),
        };

        ChunkingConfig {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Override chunk size and overlap, keeping the strategy
    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        match &mut self {
            Self::Fixed {
                chunk_size,
                chunk_overlap,
            }
            | Self::Recursive {
                chunk_size,
                chunk_overlap,
                ..
            }
            | Self::Token {
                chunk_size,
                chunk_overlap,
                ..
            } => {
                *chunk_size = chunking.chunk_size;
                *chunk_overlap = chunking.chunk_overlap;
            }
        }
        self
    }

    /// Validate and construct the configured splitter
    pub fn build(&self) -> Result<Box<dyn TextSplitter>> {
        let splitter: Box<dyn TextSplitter> = match self {
            Self::Fixed {
                chunk_size,
                chunk_overlap,
            } => Box::new(FixedWindowSplitter::new(*chunk_size, *chunk_overlap)?),
            Self::Recursive {
                chunk_size,
                chunk_overlap,
                separators,
            } => Box::new(RecursiveSplitter::with_separators(
                *chunk_size,
                *chunk_overlap,
                separators.clone(),
            )?),
            Self::Token {
                chunk_size,
                chunk_overlap,
                tokenizer,
            } => Box::new(TokenSplitter::from_config(
                *chunk_size,
                *chunk_overlap,
                tokenizer,
            )?),
        };

        let chunking = self.chunking();
        tracing::debug!(
            "Built {} splitter (chunk_size={}, chunk_overlap={})",
            splitter.name(),
            chunking.chunk_size,
            chunking.chunk_overlap
        );
        Ok(splitter)
    }
}

/// Orchestration options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Split units on the rayon thread pool
    #[serde(default)]
    pub parallel: bool,
}
