//! Similarity between two sets, estimated from their summaries.
//!
//! `reference.similarity(&other)` is `|reference ∩ other| / |other|`: the
//! share of `other` that also belongs to `reference`. The measure is
//! directional, and it is `0.0` whenever `other` is empty.
//!
//! [`SparseBitSet`] summaries give the exact ratio (up to fingerprint
//! collisions). [`HyperLogLog`] summaries estimate the intersection by
//! inclusion-exclusion over the union sketch, so the error shrinks as the
//! precision grows.

pub mod build;

use hll::HyperLogLog;
use sketch_traits::CardinalitySketch;
use sparse_bitset::SparseBitSet;

pub use crate::build::{
    build_exact_summary, build_exact_summary_from_file, build_probabilistic_summary,
    build_probabilistic_summary_from_file, build_summary, build_summary_from_file, BuildError,
    DEFAULT_BATCH_SIZE,
};

pub trait Similarity {
    type Error;

    /// Share of `other` also present in `self`.
    fn similarity(&self, other: &Self) -> Result<f32, Self::Error>;
}

impl Similarity for SparseBitSet {
    type Error = sparse_bitset::MergeError;

    fn similarity(&self, other: &Self) -> Result<f32, Self::Error> {
        if self.config() != other.config() {
            return Err(sparse_bitset::MergeError::ConfigMismatch);
        }
        let denominator = other.cardinality();
        if denominator == 0 {
            return Ok(0.0);
        }

        let (smaller, larger) = if self.cardinality() <= denominator {
            (self, other)
        } else {
            (other, self)
        };
        let common = smaller.iter().filter(|&i| larger.contains(i)).count();
        Ok((common as f64 / denominator as f64) as f32)
    }
}

impl Similarity for HyperLogLog {
    type Error = hll::MergeError;

    fn similarity(&self, other: &Self) -> Result<f32, Self::Error> {
        let union = self.merged(other)?;
        let denominator = other.cardinality();
        if denominator <= 0.0 {
            return Ok(0.0);
        }
        let intersection = self.cardinality() + denominator - union.cardinality();
        Ok((intersection / denominator) as f32)
    }
}

/// Free-function form of [`Similarity::similarity`].
#[inline]
pub fn similarity<S: Similarity>(reference: &S, other: &S) -> Result<f32, S::Error> {
    reference.similarity(other)
}
