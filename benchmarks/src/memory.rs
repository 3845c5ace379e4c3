use std::mem::size_of;

use ahash::RandomState;
use hll::HyperLogLog;
use sparse_bitset::SparseBitSet;

use crate::exact::GroundTruth;

pub const KILOBYTE: usize = 1024;
pub const MEGABYTE: usize = 1_048_576;

pub trait MemorySize {
    /// Estimates the memory footprint of the object.
    // Collections are counted by their payload; allocator slack is ignored.
    fn mem_size(&self) -> usize;
}

impl MemorySize for SparseBitSet {
    fn mem_size(&self) -> usize {
        let constants = size_of::<u32>() + size_of::<usize>() * 2;
        let word = size_of::<u32>() + size_of::<u64>();
        constants + word * self.num_words()
    }
}

impl MemorySize for HyperLogLog {
    fn mem_size(&self) -> usize {
        let constants = size_of::<hll::Config>() + size_of::<usize>() + size_of::<f64>();
        constants + size_of::<u8>() * self.num_registers()
    }
}

impl MemorySize for GroundTruth {
    fn mem_size(&self) -> usize {
        let per_record = size_of::<Vec<u8>>();
        size_of::<RandomState>() + per_record * self.cardinality() + self.record_bytes()
    }
}

/// Formats a byte count the way the reports print it.
pub fn format_size(bytes: usize) -> String {
    format!(
        "{:.1} MB ({:.0} kB)",
        bytes as f64 / MEGABYTE as f64,
        bytes as f64 / KILOBYTE as f64
    )
}

#[cfg(test)]
mod tests {
    use sketch_traits::{CardinalitySketch, New};

    use super::{format_size, MemorySize, KILOBYTE, MEGABYTE};
    use hll::HyperLogLog;
    use sparse_bitset::SparseBitSet;

    #[test]
    fn probabilistic_summaries_have_a_fixed_size() {
        for precision in hll::Config::PRECISIONS {
            let mut sketch = HyperLogLog::new(&hll::Config::new(precision).unwrap());
            let empty = sketch.mem_size();
            (0..10_000).for_each(|i| sketch.insert(format!("{}", i).as_bytes()));
            assert_eq!(sketch.mem_size(), empty);
            assert!(empty >= 1 << precision);
            assert!(empty < MEGABYTE);
        }
    }

    #[test]
    fn exact_summaries_grow_with_their_contents() {
        let mut bitset = SparseBitSet::default();
        let empty = bitset.mem_size();
        (0..10_000).for_each(|i| bitset.insert(format!("{}", i).as_bytes()));
        assert!(bitset.mem_size() > empty);
        assert!(bitset.mem_size() <= empty + 12 * bitset.cardinality());
    }

    #[test]
    fn formats_sizes() {
        assert_eq!(format_size(MEGABYTE), "1.0 MB (1024 kB)");
        assert_eq!(format_size(3 * KILOBYTE), "0.0 MB (3 kB)");
    }
}
