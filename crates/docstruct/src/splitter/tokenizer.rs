//! Tokenizer capability used by the token-budget splitter
//!
//! The splitter only needs `encode` and `decode`. [`HfTokenizer`] provides
//! them from a HuggingFace `tokenizer.json`, resolved by model name with a
//! fallback to a named encoding.

use std::path::{Path, PathBuf};

use crate::config::TokenizerConfig;
use crate::error::{Error, Result};

/// Encode text to token ids and back
pub trait Tokenizer: Send + Sync {
    /// Convert text to token ids
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Convert token ids back to text
    fn decode(&self, ids: &[u32]) -> Result<String>;
}

/// Tokenizer backed by the HuggingFace `tokenizers` crate
pub struct HfTokenizer {
    /// HuggingFace tokenizer
    inner: tokenizers::Tokenizer,
    /// Name the tokenizer was resolved under
    name: String,
}

impl std::fmt::Debug for HfTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfTokenizer").field("name", &self.name).finish()
    }
}

impl HfTokenizer {
    /// Load a tokenizer from a `tokenizer.json` file.
    ///
    /// Truncation and padding are disabled so long texts keep every token.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut inner = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            Error::dependency(format!(
                "Failed to load tokenizer from {}: {}",
                path.display(),
                e
            ))
        })?;

        inner
            .with_truncation(None)
            .map_err(|e| Error::dependency(format!("Failed to disable truncation: {}", e)))?;
        inner.with_padding(None);

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self { inner, name })
    }

    /// Resolve the tokenizer for `model_name`, falling back to `encoding_name`.
    ///
    /// Fails with [`Error::DependencyUnavailable`] when neither can be loaded.
    pub fn resolve(config: &TokenizerConfig) -> Result<Self> {
        let dir = config.resolved_dir();

        match Self::load_named(&dir, &config.model_name) {
            Ok(tokenizer) => {
                tracing::info!(
                    "Loaded tokenizer for model {} from {}",
                    config.model_name,
                    dir.display()
                );
                return Ok(tokenizer.named(&config.model_name));
            }
            Err(e) => {
                tracing::warn!(
                    "No tokenizer for model {} ({}), falling back to encoding {}",
                    config.model_name,
                    e,
                    config.encoding_name
                );
            }
        }

        let tokenizer = Self::load_named(&dir, &config.encoding_name).map_err(|e| {
            Error::dependency(format!(
                "No tokenizer available for model '{}' or encoding '{}' in {}: {}",
                config.model_name,
                config.encoding_name,
                dir.display(),
                e
            ))
        })?;

        tracing::info!(
            "Loaded tokenizer for encoding {} from {}",
            config.encoding_name,
            dir.display()
        );
        Ok(tokenizer.named(&config.encoding_name))
    }

    /// Name the tokenizer was resolved under
    pub fn name(&self) -> &str {
        &self.name
    }

    fn load_named(dir: &Path, name: &str) -> Result<Self> {
        let candidates = candidate_paths(dir, name);
        let path = candidates.iter().find(|p| p.is_file()).ok_or_else(|| {
            Error::dependency(format!("no tokenizer file for '{}'", name))
        })?;
        Self::from_file(path)
    }

    fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

impl Tokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| Error::tokenizer(format!("Tokenization failed: {}", e)))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.inner
            .decode(ids, false)
            .map_err(|e| Error::tokenizer(format!("Decoding failed: {}", e)))
    }
}

/// Locations probed for a named tokenizer: `<dir>/<name>/tokenizer.json`
/// then `<dir>/<name>.json`.
fn candidate_paths(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![
        dir.join(name).join("tokenizer.json"),
        dir.join(format!("{}.json", name)),
    ]
}
