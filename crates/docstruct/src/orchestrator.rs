//! Chunk orchestration: apply a splitter to every unit
//!
//! Each parent unit is split independently. Chunks inherit a copy of the
//! parent's metadata and provenance, carry their position in the parent as
//! `chunk_index`, and record the parent's chunk count under `chunk_total`.
//! Output is parent-major: all chunks of unit 0, then unit 1, and so on.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::config::DocstructConfig;
use crate::error::{Error, Result};
use crate::splitter::TextSplitter;
use crate::types::Unit;

/// Split every unit in order.
///
/// Fails on the first unit whose text cannot be split; the error carries
/// that unit's position.
pub fn split_units<S: TextSplitter + ?Sized>(
    splitter: &S,
    units: &[Unit],
) -> Result<Vec<Unit>> {
    let mut chunks = Vec::with_capacity(units.len());
    for (index, unit) in units.iter().enumerate() {
        chunks.extend(split_unit(splitter, index, unit)?);
    }

    tracing::debug!(
        "{} split {} units into {} chunks",
        splitter.name(),
        units.len(),
        chunks.len()
    );
    Ok(chunks)
}

/// Split units on the rayon pool, keeping parent-major order.
pub fn par_split_units<S: TextSplitter + ?Sized>(
    splitter: &S,
    units: &[Unit],
) -> Result<Vec<Unit>> {
    let per_unit = units
        .par_iter()
        .enumerate()
        .map(|(index, unit)| split_unit(splitter, index, unit))
        .collect::<Result<Vec<Vec<Unit>>>>()?;

    let chunks: Vec<Unit> = per_unit.into_iter().flatten().collect();
    tracing::debug!(
        "{} split {} units into {} chunks (parallel)",
        splitter.name(),
        units.len(),
        chunks.len()
    );
    Ok(chunks)
}

/// Split units in order, checking `cancel` before each unit.
///
/// Returns [`Error::Cancelled`] with the number of fully processed units once
/// the flag is raised; chunks produced so far are discarded.
pub fn split_units_cancellable<S: TextSplitter + ?Sized>(
    splitter: &S,
    units: &[Unit],
    cancel: &AtomicBool,
) -> Result<Vec<Unit>> {
    let mut chunks = Vec::with_capacity(units.len());
    for (index, unit) in units.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            tracing::warn!("Splitting cancelled after {} of {} units", index, units.len());
            return Err(Error::Cancelled { completed: index });
        }
        chunks.extend(split_unit(splitter, index, unit)?);
    }
    Ok(chunks)
}

fn split_unit<S: TextSplitter + ?Sized>(
    splitter: &S,
    index: usize,
    unit: &Unit,
) -> Result<Vec<Unit>> {
    let pieces = splitter
        .split_text(&unit.content)
        .map_err(|e| Error::split(index, e))?;
    let total = pieces.len();

    tracing::debug!(unit = index, chunks = total, "split unit");

    Ok(pieces
        .into_iter()
        .enumerate()
        .map(|(i, piece)| unit.derive_chunk(piece, i, total))
        .collect())
}

/// Configured splitter plus execution mode
pub struct ChunkPipeline {
    /// Splitter applied to every unit
    splitter: Box<dyn TextSplitter>,
    /// Use the rayon pool
    parallel: bool,
}

impl ChunkPipeline {
    /// Create a sequential pipeline around a splitter
    pub fn new(splitter: Box<dyn TextSplitter>) -> Self {
        Self {
            splitter,
            parallel: false,
        }
    }

    /// Build the splitter described by `config`
    pub fn from_config(config: &DocstructConfig) -> Result<Self> {
        Ok(Self::new(config.splitter.build()?).parallel(config.orchestrator.parallel))
    }

    /// Toggle parallel execution
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn splitter(&self) -> &dyn TextSplitter {
        self.splitter.as_ref()
    }

    /// Split all units with the configured mode
    pub fn run(&self, units: &[Unit]) -> Result<Vec<Unit>> {
        if self.parallel {
            par_split_units(self.splitter.as_ref(), units)
        } else {
            split_units(self.splitter.as_ref(), units)
        }
    }

    /// Split all units sequentially, stopping when `cancel` is raised
    pub fn run_cancellable(&self, units: &[Unit], cancel: &AtomicBool) -> Result<Vec<Unit>> {
        split_units_cancellable(self.splitter.as_ref(), units, cancel)
    }
}
