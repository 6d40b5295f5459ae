//! Core types for docstruct

pub mod unit;

pub use unit::{Metadata, Unit, CHUNK_TOTAL_KEY, CREATED_AT_KEY};
