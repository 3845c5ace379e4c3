use std::{error, fmt};

use hll::HyperLogLog;
use jaccard::Similarity;
use sketch_traits::{CardinalitySketch, New};
use sparse_bitset::SparseBitSet;

use crate::memory::MemorySize;

pub trait Algorithm: fmt::Display {
    type Summary: CardinalitySketch<Item = [u8]>
        + New
        + Similarity<Error = Self::Error>
        + MemorySize
        + Clone;
    type Error: error::Error + 'static;

    fn config(&self) -> &<Self::Summary as New>::Config;

    fn new_summary(&self) -> Self::Summary {
        <Self::Summary as New>::new(self.config())
    }

    fn estimate(&self, summary: &Self::Summary) -> f64;
}

#[derive(Clone, Debug, Default)]
pub struct Exact {
    config: sparse_bitset::Config,
}

impl Algorithm for Exact {
    type Summary = SparseBitSet;
    type Error = sparse_bitset::MergeError;

    fn config(&self) -> &sparse_bitset::Config {
        &self.config
    }

    fn estimate(&self, summary: &SparseBitSet) -> f64 {
        summary.cardinality() as f64
    }
}

impl fmt::Display for Exact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitSet")
    }
}

#[derive(Clone, Debug)]
pub struct Probabilistic {
    config: hll::Config,
}

impl Probabilistic {
    pub fn new(precision: u8) -> Result<Self, hll::ConfigError> {
        Ok(Self {
            config: hll::Config::new(precision)?,
        })
    }
}

impl Algorithm for Probabilistic {
    type Summary = HyperLogLog;
    type Error = hll::MergeError;

    fn config(&self) -> &hll::Config {
        &self.config
    }

    fn estimate(&self, summary: &HyperLogLog) -> f64 {
        summary.cardinality()
    }
}

impl fmt::Display for Probabilistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HLL(p={})", self.config.precision())
    }
}

/// Runs `$fn` once with each summary kind, propagating its error.
macro_rules! for_all_algorithms {
    ($precision:expr, $fn:expr) => {{
        $fn(&crate::algo::Exact::default())?;
        $fn(&crate::algo::Probabilistic::new($precision)?)?;
    }};
}
pub(crate) use for_all_algorithms;
