//! Property-based tests for splitter and orchestration invariants

use std::sync::Arc;

use docstruct::splitter::tokenizer::Tokenizer;
use docstruct::{
    split_units, Error, FixedWindowSplitter, RecursiveSplitter, Result, TextSplitter,
    TokenSplitter, TokenizerConfig, Unit,
};
use proptest::prelude::*;

/// One token per byte; only safe for ASCII input
struct ByteTokenizer;

impl Tokenizer for ByteTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        Ok(text.bytes().map(u32::from).collect())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        let bytes: Vec<u8> = ids.iter().map(|&id| id as u8).collect();
        String::from_utf8(bytes).map_err(|e| Error::tokenizer(e.to_string()))
    }
}

fn sizes() -> impl Strategy<Value = (usize, usize)> {
    (1usize..60).prop_flat_map(|size| (Just(size), 0..size))
}

// ============================================================================
// Fixed-window properties
// ============================================================================

/// Property: text no longer than the window comes back as one normalized chunk
#[test]
fn proptest_fixed_short_text_single_chunk() {
    proptest!(|(text in "[a-z \n\t]{0,40}")| {
        let splitter = FixedWindowSplitter::new(40, 5).unwrap();
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

        let chunks = splitter.split_text(&text).unwrap();
        prop_assert_eq!(chunks, vec![normalized]);
    });
}

/// Property: no chunk exceeds the window and none is blank
#[test]
fn proptest_fixed_chunk_bounds() {
    proptest!(|(text in "[a-z \n]{0,400}", (size, overlap) in sizes())| {
        let splitter = FixedWindowSplitter::new(size, overlap).unwrap();
        let chunks = splitter.split_text(&text).unwrap();

        prop_assert!(!chunks.is_empty());
        if chunks.len() > 1 {
            for chunk in &chunks {
                prop_assert!(chunk.chars().count() <= size);
                prop_assert!(!chunk.trim().is_empty());
            }
        }
    });
}

/// Property: without overlap and with words shorter than the window,
/// chunks rejoin into the normalized text
#[test]
fn proptest_fixed_zero_overlap_covers_text() {
    proptest!(|(words in prop::collection::vec("[a-z]{1,5}", 1..60), size in 7usize..40)| {
        let text = words.join(" ");
        let splitter = FixedWindowSplitter::new(size, 0).unwrap();

        let chunks = splitter.split_text(&text).unwrap();
        prop_assert_eq!(chunks.join(" "), text);
    });
}

// ============================================================================
// Recursive properties
// ============================================================================

/// Property: every chunk fits the limit when graphemes are single characters
#[test]
fn proptest_recursive_chunk_bounds() {
    proptest!(|(text in "[a-z \n]{0,400}", (size, overlap) in sizes())| {
        let splitter = RecursiveSplitter::new(size, overlap).unwrap();

        for chunk in splitter.split_text(&text).unwrap() {
            prop_assert!(chunk.chars().count() <= size, "chunk {:?} exceeds {}", chunk, size);
            prop_assert!(!chunk.trim().is_empty());
        }
    });
}

/// Property: an oversized chunk is always a single grapheme
#[test]
fn proptest_recursive_oversize_only_for_graphemes() {
    use unicode_segmentation::UnicodeSegmentation;

    proptest!(|(text in "\\PC{0,120}", size in 1usize..6)| {
        let splitter = RecursiveSplitter::new(size, 0).unwrap();

        for chunk in splitter.split_text(&text).unwrap() {
            if chunk.chars().count() > size {
                prop_assert_eq!(chunk.graphemes(true).count(), 1);
            }
        }
    });
}

/// Property: re-splitting a chunk never splits it further
#[test]
fn proptest_recursive_chunks_are_stable() {
    proptest!(|(text in "[a-z \n]{0,300}", (size, overlap) in sizes())| {
        let splitter = RecursiveSplitter::new(size, overlap).unwrap();

        for chunk in splitter.split_text(&text).unwrap() {
            prop_assert_eq!(splitter.split_text(&chunk).unwrap().len(), 1);
        }
    });
}

// ============================================================================
// Token-budget properties
// ============================================================================

/// Property: token windows stay within budget and cover the text
#[test]
fn proptest_token_windows() {
    proptest!(|(text in "[a-z ]{0,200}", (size, overlap) in sizes())| {
        let tokenizer: Arc<dyn Tokenizer> = Arc::new(ByteTokenizer);
        let splitter = TokenSplitter::new(size, overlap, tokenizer.clone()).unwrap();
        let chunks = splitter.split_text(&text).unwrap();

        let counts: Vec<usize> = chunks
            .iter()
            .map(|c| tokenizer.encode(c).unwrap().len())
            .collect();

        if text.len() <= size {
            prop_assert_eq!(chunks, vec![text.clone()]);
        } else {
            prop_assert!(counts.iter().all(|&n| n <= size));
            prop_assert_eq!(
                counts.iter().sum::<usize>(),
                text.len() + overlap * (chunks.len() - 1)
            );
            prop_assert!(text.ends_with(chunks.last().unwrap().as_str()));
        }
    });
}

// ============================================================================
// Orchestration and configuration properties
// ============================================================================

/// Property: chunk indices are contiguous per parent and totals agree
#[test]
fn proptest_chunk_positions() {
    proptest!(|(texts in prop::collection::vec("[a-z \n]{0,120}", 0..12))| {
        let splitter = RecursiveSplitter::new(16, 4).unwrap();
        let units: Vec<Unit> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Unit::new(t.as_str()).id(format!("doc-{}", i)))
            .collect();

        let chunks = split_units(&splitter, &units).unwrap();

        let mut expected = 0;
        let mut current: Option<String> = None;
        for chunk in &chunks {
            if chunk.id != current {
                prop_assert_eq!(expected, 0);
                current = chunk.id.clone();
            }
            let total = chunk.chunk_total().unwrap();
            prop_assert_eq!(chunk.chunk_index, Some(expected));
            expected = if expected + 1 == total { 0 } else { expected + 1 };
        }
        prop_assert_eq!(expected, 0);
    });
}

/// Property: overlap at or above the size is rejected by every strategy
#[test]
fn proptest_invalid_overlap_rejected() {
    proptest!(|(size in 0usize..100, extra in 0usize..50)| {
        let overlap = size + extra;

        prop_assert!(matches!(FixedWindowSplitter::new(size, overlap), Err(Error::Config(_))));
        prop_assert!(matches!(RecursiveSplitter::new(size, overlap), Err(Error::Config(_))));

        let config = TokenizerConfig {
            tokenizer_dir: Some("/nonexistent".into()),
            ..Default::default()
        };
        prop_assert!(matches!(
            TokenSplitter::from_config(size, overlap, &config),
            Err(Error::Config(_))
        ));
    });
}
