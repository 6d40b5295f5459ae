//! Unit (document / chunk) type with provenance for traceability

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Ordered metadata mapping carried by every unit
pub type Metadata = IndexMap<String, serde_json::Value>;

/// Metadata key holding the number of siblings split from the same parent
pub const CHUNK_TOTAL_KEY: &str = "chunk_total";

/// Metadata key holding the creation timestamp (RFC 3339, UTC)
pub const CREATED_AT_KEY: &str = "created_at";

/// A unit of text: either a loaded document or a chunk split from one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Text content
    pub content: String,
    /// Additional metadata (author, filename, chunk_total, ...)
    #[serde(default)]
    pub metadata: Metadata,
    /// Opaque identifier, shared by every chunk of the same parent
    #[serde(default)]
    pub id: Option<String>,
    /// Origin of the text (file path, URL)
    #[serde(default)]
    pub source: Option<String>,
    /// Page number (if applicable)
    #[serde(default)]
    pub page_number: Option<u32>,
    /// Position among siblings; absent for unsplit units
    #[serde(default)]
    pub chunk_index: Option<usize>,
}

impl Unit {
    /// Create a new unit, stamping `created_at` into its metadata
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_metadata(content, Metadata::new())
    }

    /// Create a new unit with metadata; `created_at` is added only if missing
    pub fn with_metadata(content: impl Into<String>, mut metadata: Metadata) -> Self {
        if !metadata.contains_key(CREATED_AT_KEY) {
            metadata.insert(
                CREATED_AT_KEY.to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }

        Self {
            content: content.into(),
            metadata,
            id: None,
            source: None,
            page_number: None,
            chunk_index: None,
        }
    }

    /// Set the identifier
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the source
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the page number
    pub fn page_number(mut self, page: u32) -> Self {
        self.page_number = Some(page);
        self
    }

    /// Insert a metadata entry
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Build the `index`-th of `total` chunks derived from this unit.
    ///
    /// Metadata is copied and extended with `chunk_total`; provenance is
    /// copied verbatim. No timestamp is added.
    pub fn derive_chunk(&self, content: String, index: usize, total: usize) -> Self {
        let mut metadata = self.metadata.clone();
        metadata.insert(CHUNK_TOTAL_KEY.to_string(), serde_json::json!(total));

        Self {
            content,
            metadata,
            id: self.id.clone(),
            source: self.source.clone(),
            page_number: self.page_number,
            chunk_index: Some(index),
        }
    }

    /// Number of siblings recorded on a chunk, if any
    pub fn chunk_total(&self) -> Option<usize> {
        self.metadata
            .get(CHUNK_TOTAL_KEY)
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
    }

    /// True if this unit was produced by splitting
    pub fn is_chunk(&self) -> bool {
        self.chunk_index.is_some()
    }

    /// Convert to a JSON object
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Build a unit from a JSON object
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
