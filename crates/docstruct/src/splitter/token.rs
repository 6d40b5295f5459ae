//! Token-budget splitting over an injected tokenizer

use std::sync::Arc;

use crate::config::TokenizerConfig;
use crate::error::Result;

use super::tokenizer::{HfTokenizer, Tokenizer};
use super::{validate_window, TextSplitter};

/// Splitter measuring chunks in tokens instead of characters.
///
/// Text is encoded once; windows of `chunk_size` tokens, each sharing
/// `chunk_overlap` tokens with the previous one, are decoded back to text.
#[derive(Clone)]
pub struct TokenSplitter {
    /// Maximum tokens per chunk
    chunk_size: usize,
    /// Tokens shared by consecutive chunks
    chunk_overlap: usize,
    /// Encoder/decoder
    tokenizer: Arc<dyn Tokenizer>,
}

impl std::fmt::Debug for TokenSplitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSplitter")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .finish_non_exhaustive()
    }
}

impl TokenSplitter {
    /// Create a splitter around an existing tokenizer
    pub fn new(
        chunk_size: usize,
        chunk_overlap: usize,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Result<Self> {
        validate_window(chunk_size, chunk_overlap)?;
        Ok(Self {
            chunk_size,
            chunk_overlap,
            tokenizer,
        })
    }

    /// Create a splitter whose tokenizer is resolved from `config`.
    ///
    /// Sizes are validated before any tokenizer file is touched.
    pub fn from_config(
        chunk_size: usize,
        chunk_overlap: usize,
        config: &TokenizerConfig,
    ) -> Result<Self> {
        validate_window(chunk_size, chunk_overlap)?;
        let tokenizer = HfTokenizer::resolve(config)?;
        Self::new(chunk_size, chunk_overlap, Arc::new(tokenizer))
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }
}

impl TextSplitter for TokenSplitter {
    fn name(&self) -> &str {
        "token"
    }

    fn split_text(&self, text: &str) -> Result<Vec<String>> {
        let ids = self.tokenizer.encode(text)?;

        // Undersized text is returned as-is to avoid a lossy round trip
        if ids.len() <= self.chunk_size {
            return Ok(vec![text.to_string()]);
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < ids.len() {
            let end = (start + self.chunk_size).min(ids.len());
            chunks.push(self.tokenizer.decode(&ids[start..end])?);

            if end >= ids.len() {
                break;
            }
            start = end - self.chunk_overlap;
        }

        tracing::trace!(
            tokens = ids.len(),
            chunks = chunks.len(),
            "token split"
        );
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Mutex;

    /// One token per whitespace-separated word
    #[derive(Default)]
    struct WordTokenizer {
        vocab: Mutex<Vec<String>>,
    }

    impl Tokenizer for WordTokenizer {
        fn encode(&self, text: &str) -> Result<Vec<u32>> {
            let mut vocab = self.vocab.lock().unwrap();
            Ok(text
                .split_whitespace()
                .map(|word| match vocab.iter().position(|w| w == word) {
                    Some(id) => id as u32,
                    None => {
                        vocab.push(word.to_string());
                        (vocab.len() - 1) as u32
                    }
                })
                .collect())
        }

        fn decode(&self, ids: &[u32]) -> Result<String> {
            let vocab = self.vocab.lock().unwrap();
            ids.iter()
                .map(|&id| {
                    vocab
                        .get(id as usize)
                        .cloned()
                        .ok_or_else(|| Error::tokenizer(format!("unknown id {}", id)))
                })
                .collect::<Result<Vec<_>>>()
                .map(|words| words.join(" "))
        }
    }

    fn splitter(size: usize, overlap: usize) -> TokenSplitter {
        TokenSplitter::new(size, overlap, Arc::new(WordTokenizer::default())).unwrap()
    }

    #[test]
    fn test_undersized_text_is_untouched() {
        let text = "  spaced   out\ntext ";
        let chunks = splitter(10, 2).split_text(text).unwrap();
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn test_windows_with_overlap() {
        let chunks = splitter(4, 1).split_text("a b c d e f g h i j").unwrap();
        assert_eq!(chunks, vec!["a b c d", "d e f g", "g h i j"]);
    }

    #[test]
    fn test_windows_without_overlap() {
        let chunks = splitter(3, 0).split_text("a b c d e f g").unwrap();
        assert_eq!(chunks, vec!["a b c", "d e f", "g"]);
    }

    #[test]
    fn test_token_count_includes_overlap() {
        let splitter = splitter(5, 2);
        let text = (0..23).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let chunks = splitter.split_text(&text).unwrap();

        let total: usize = chunks
            .iter()
            .map(|c| splitter.tokenizer().encode(c).unwrap().len())
            .sum();
        assert_eq!(total, 23 + 2 * (chunks.len() - 1));
        assert!(chunks.last().unwrap().ends_with("w22"));
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(splitter(3, 1).split_text("").unwrap(), vec![""]);
    }

    #[test]
    fn test_invalid_configuration() {
        let result = TokenSplitter::new(5, 5, Arc::new(WordTokenizer::default()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_configuration_checked_before_tokenizer() {
        let config = TokenizerConfig {
            tokenizer_dir: Some("/nonexistent".into()),
            ..Default::default()
        };
        let err = TokenSplitter::from_config(0, 0, &config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = TokenSplitter::from_config(10, 2, &config).unwrap_err();
        assert!(matches!(err, Error::DependencyUnavailable(_)));
    }
}
