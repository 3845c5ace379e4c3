use std::collections::HashSet;

use ahash::RandomState;
use dataset::Element;

/// The distinct records of a dataset, kept in full.
#[derive(Clone, Debug)]
pub struct GroundTruth {
    records: HashSet<Element, RandomState>,
}

impl Default for GroundTruth {
    fn default() -> Self {
        Self::new()
    }
}

impl GroundTruth {
    pub fn new() -> Self {
        Self {
            records: HashSet::with_hasher(RandomState::new()),
        }
    }

    #[inline]
    pub fn insert(&mut self, record: &[u8]) {
        if !self.records.contains(record) {
            self.records.insert(record.to_vec());
        }
    }

    pub fn extend<T: AsRef<[u8]>>(&mut self, records: impl IntoIterator<Item = T>) {
        records
            .into_iter()
            .for_each(|record| self.insert(record.as_ref()));
    }

    #[inline]
    pub fn cardinality(&self) -> usize {
        self.records.len()
    }

    /// Share of `other` also present in `self`, `0.0` when `other` is empty.
    pub fn similarity(&self, other: &Self) -> f64 {
        if other.records.is_empty() {
            return 0.0;
        }
        let (smaller, larger) = if self.records.len() <= other.records.len() {
            (&self.records, &other.records)
        } else {
            (&other.records, &self.records)
        };
        let common = smaller.iter().filter(|r| larger.contains(*r)).count();
        common as f64 / other.records.len() as f64
    }

    /// Bytes held by the records themselves.
    pub fn record_bytes(&self) -> usize {
        self.records.iter().map(Vec::len).sum()
    }
}

/// `|estimate - truth| / truth`, or the absolute error when `truth` is zero.
pub fn rel_error(estimate: f64, truth: f64) -> f64 {
    if truth == 0.0 {
        estimate.abs()
    } else {
        (estimate - truth).abs() / truth
    }
}
