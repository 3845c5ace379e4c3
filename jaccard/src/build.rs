//! Building summaries from in-memory datasets and from record files.

use std::{error, fmt, path::Path};

use dataset::stream::{for_each_batch, BatchStats};
use hll::HyperLogLog;
use sketch_traits::{CardinalitySketch, New};
use sparse_bitset::SparseBitSet;

/// Records per batch when building from a file.
pub const DEFAULT_BATCH_SIZE: usize = 1_000_000;

/// Inserts every record of `dataset` into a fresh sketch.
pub fn build_summary<S, T>(config: &S::Config, dataset: impl IntoIterator<Item = T>) -> S
where
    S: CardinalitySketch<Item = [u8]> + New,
    T: AsRef<[u8]>,
{
    let mut sketch = S::new(config);
    dataset
        .into_iter()
        .for_each(|record| sketch.insert(record.as_ref()));
    sketch
}

/// Streams the records of `source` into a fresh sketch, `batch_size`
/// records at a time.
pub fn build_summary_from_file<S>(
    config: &S::Config,
    source: impl AsRef<Path>,
    batch_size: usize,
) -> Result<(S, BatchStats), dataset::Error>
where
    S: CardinalitySketch<Item = [u8]> + New,
{
    let mut sketch = S::new(config);
    let stats = for_each_batch(source, batch_size, |batch| {
        batch.iter().for_each(|record| sketch.insert(record.as_slice()))
    })?;
    Ok((sketch, stats))
}

pub fn build_exact_summary<T: AsRef<[u8]>>(dataset: impl IntoIterator<Item = T>) -> SparseBitSet {
    build_summary(&sparse_bitset::Config::default(), dataset)
}

pub fn build_probabilistic_summary<T: AsRef<[u8]>>(
    dataset: impl IntoIterator<Item = T>,
    precision: u8,
) -> Result<HyperLogLog, BuildError> {
    let config = hll::Config::new(precision)?;
    Ok(build_summary(&config, dataset))
}

pub fn build_exact_summary_from_file(
    source: impl AsRef<Path>,
    batch_size: usize,
) -> Result<(SparseBitSet, BatchStats), BuildError> {
    Ok(build_summary_from_file(
        &sparse_bitset::Config::default(),
        source,
        batch_size,
    )?)
}

pub fn build_probabilistic_summary_from_file(
    source: impl AsRef<Path>,
    precision: u8,
    batch_size: usize,
) -> Result<(HyperLogLog, BatchStats), BuildError> {
    let config = hll::Config::new(precision)?;
    Ok(build_summary_from_file(&config, source, batch_size)?)
}

#[derive(Debug)]
pub enum BuildError {
    Config(hll::ConfigError),
    Dataset(dataset::Error),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Config(e) => write!(f, "invalid sketch config: {}", e),
            BuildError::Dataset(e) => write!(f, "cannot read dataset: {}", e),
        }
    }
}

impl error::Error for BuildError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            BuildError::Config(e) => Some(e),
            BuildError::Dataset(e) => Some(e),
        }
    }
}

impl From<hll::ConfigError> for BuildError {
    fn from(e: hll::ConfigError) -> Self {
        BuildError::Config(e)
    }
}

impl From<dataset::Error> for BuildError {
    fn from(e: dataset::Error) -> Self {
        BuildError::Dataset(e)
    }
}
