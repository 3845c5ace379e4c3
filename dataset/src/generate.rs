//! Datasets with a controlled overlap.
//!
//! A destination dataset of `dest_size` records starts with
//! `round(dest_size * similarity)` records copied from the front of an origin
//! dataset, re-reading the origin from its start as many times as needed,
//! and is filled up with values from a caller-supplied generator. Generators
//! are plain iterators; [`Duplicates`] turns a generator of unique values
//! into one with a fixed share of repeats.

use std::path::Path;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{stream, Error};

/// Number of values over which [`Duplicates`] keeps its duplicate ratio.
pub const DUPLICATE_BATCH_SIZE: usize = 100;

/// Number of destination records copied from the origin.
pub fn overlap_count(dest_size: usize, similarity: f32) -> Result<usize, Error> {
    if !(0.0..=1.0).contains(&similarity) {
        return Err(Error::InvalidArgument(format!(
            "the similarity should be in [0, 1], got {}",
            similarity
        )));
    }
    let overlap = (dest_size as f64 * f64::from(similarity)).round() as usize;
    Ok(overlap.min(dest_size))
}

/// Collects `size` values from `generator`.
pub fn generate<T>(generator: impl Iterator<Item = T>, size: usize) -> Result<Vec<T>, Error> {
    let values = generator.take(size).collect::<Vec<_>>();
    if values.len() < size {
        return Err(Error::GeneratorExhausted {
            expected: size,
            actual: values.len(),
        });
    }
    Ok(values)
}

/// Writes `size` values from `generator` to `dest`, one per line.
pub fn generate_file<T>(
    dest: impl AsRef<Path>,
    size: usize,
    generator: impl Iterator<Item = T>,
    append: bool,
) -> Result<(), Error>
where
    T: AsRef<[u8]>,
{
    stream::append_generated(dest, size, generator, append)
}

/// Builds a dataset of `dest_size` values sharing `similarity` of its
/// values with `origin`.
pub fn generate_similar<T>(
    origin: &[T],
    dest_size: usize,
    similarity: f32,
    generator: impl Iterator<Item = T>,
) -> Result<Vec<T>, Error>
where
    T: Clone,
{
    let overlap = overlap_count(dest_size, similarity)?;
    if overlap > 0 && origin.is_empty() {
        return Err(empty_origin());
    }

    let mut dest = Vec::with_capacity(dest_size);
    dest.extend(origin.iter().cycle().take(overlap).cloned());
    dest.extend(generator.take(dest_size - overlap));
    if dest.len() < dest_size {
        return Err(Error::GeneratorExhausted {
            expected: dest_size - overlap,
            actual: dest.len() - overlap,
        });
    }
    Ok(dest)
}

/// [`generate_similar`] between two record files. `dest` is truncated first.
pub fn generate_similar_file<T>(
    origin: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    dest_size: usize,
    similarity: f32,
    generator: impl Iterator<Item = T>,
) -> Result<(), Error>
where
    T: AsRef<[u8]>,
{
    let (origin, dest) = (origin.as_ref(), dest.as_ref());
    let overlap = overlap_count(dest_size, similarity)?;

    let origin_size = stream::copy_chunk(origin, dest, 0, overlap, false)?;
    let mut copied = origin_size;
    // The origin is shorter than the overlap: copy it again from the start.
    while copied < overlap {
        let chunk = (overlap - copied).min(origin_size);
        let n = stream::copy_chunk(origin, dest, 0, chunk, true)?;
        if n == 0 {
            return Err(empty_origin());
        }
        copied += n;
    }

    stream::append_generated(dest, dest_size - overlap, generator, true)
}

fn empty_origin() -> Error {
    Error::InvalidArgument("cannot copy an overlap from an empty origin".into())
}

/// Wraps a generator of unique values so that, within every run of
/// [`DUPLICATE_BATCH_SIZE`] values, only `round(100 * (1 - duplicate_fraction))`
/// are fresh; the rest of the run repeats values drawn uniformly from the
/// fresh values of that same run.
///
/// The number of distinct values in the first `n` outputs is therefore
/// `u * (n / 100) + min(n % 100, u)` for `u` fresh values per batch,
/// regardless of the total size.
pub struct Duplicates<I>
where
    I: Iterator,
{
    unique: I,
    unique_per_batch: usize,
    batch: Vec<I::Item>,
    position: usize,
    rng: StdRng,
}

impl<I> Duplicates<I>
where
    I: Iterator,
    I::Item: Clone,
{
    pub fn new(unique: I, duplicate_fraction: f32) -> Result<Self, Error> {
        Self::with_rng(unique, duplicate_fraction, StdRng::from_entropy())
    }

    pub fn with_rng(unique: I, duplicate_fraction: f32, rng: StdRng) -> Result<Self, Error> {
        if !(0.0..1.0).contains(&duplicate_fraction) {
            return Err(Error::InvalidArgument(format!(
                "the duplicate fraction should be in [0, 1), got {}",
                duplicate_fraction
            )));
        }
        // At least one fresh value, or there is nothing to repeat.
        let unique_per_batch = ((DUPLICATE_BATCH_SIZE as f32 * (1.0 - duplicate_fraction))
            .round() as usize)
            .max(1);
        Ok(Self {
            unique,
            unique_per_batch,
            batch: Vec::with_capacity(unique_per_batch),
            position: 0,
            rng,
        })
    }

    pub fn unique_per_batch(&self) -> usize {
        self.unique_per_batch
    }
}

impl<I> Iterator for Duplicates<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position % DUPLICATE_BATCH_SIZE == 0 {
            self.batch.clear();
        }
        self.position += 1;

        if self.batch.len() < self.unique_per_batch {
            let value = self.unique.next()?;
            self.batch.push(value.clone());
            Some(value)
        } else {
            self.batch.choose(&mut self.rng).cloned()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn seeded<I>(unique: I, duplicate_fraction: f32) -> Duplicates<I>
    where
        I: Iterator,
        I::Item: Clone,
    {
        Duplicates::with_rng(unique, duplicate_fraction, StdRng::seed_from_u64(42)).unwrap()
    }

    #[test]
    fn copies_a_prefix_at_full_similarity() {
        let origin = ["a", "b", "c"];
        let dest = generate_similar(&origin, 2, 1.0, std::iter::repeat("z")).unwrap();
        assert_eq!(dest, vec!["a", "b"]);
    }

    #[test]
    fn generates_everything_at_zero_similarity() {
        let origin = [1, 2, 3];
        let dest = generate_similar(&origin, 5, 0.0, 100..).unwrap();
        assert_eq!(dest, vec![100, 101, 102, 103, 104]);
    }

    #[test]
    fn copies_then_fills() {
        let origin = (0..100).collect::<Vec<_>>();
        let dest = generate_similar(&origin, 120, 0.5, 1000..).unwrap();
        assert_eq!(dest.len(), 120);
        assert_eq!(&dest[..60], &origin[..60]);
        assert!(dest[60..].iter().all(|v| !origin.contains(v)));
        assert_eq!(dest[60..], (1000..1060).collect::<Vec<_>>());
    }

    #[test]
    fn rounds_the_overlap() {
        let origin = (0..100).collect::<Vec<_>>();
        let dest = generate_similar(&origin, 60, 0.75, 1000..).unwrap();
        assert_eq!(dest.iter().filter(|&&v| v < 100).count(), 45);
        assert_eq!(overlap_count(5, 0.5).unwrap(), 3);
        assert_eq!(overlap_count(7, 0.1).unwrap(), 1);
    }

    #[test]
    fn wraps_around_a_short_origin() {
        let origin = (0..100).collect::<Vec<_>>();
        let dest = generate_similar(&origin, 300, 0.5, 1000..).unwrap();
        let expected = (0..100).chain(0..50).chain(1000..1150).collect::<Vec<_>>();
        assert_eq!(dest, expected);
    }

    #[test]
    fn rejects_invalid_similarities() {
        for similarity in [-0.1, 1.01, f32::NAN] {
            assert!(matches!(
                generate_similar(&[1], 10, similarity, 0..),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn rejects_empty_origins_only_when_copying() {
        let origin: [u32; 0] = [];
        assert!(generate_similar(&origin, 10, 0.5, 0..).is_err());
        assert_eq!(generate_similar(&origin, 3, 0.0, 0..).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn reports_exhausted_generators() {
        assert!(matches!(
            generate_similar(&[1, 2], 10, 0.0, 0..4),
            Err(Error::GeneratorExhausted {
                expected: 10,
                actual: 4
            })
        ));
        assert!(matches!(
            generate(0..4, 5),
            Err(Error::GeneratorExhausted {
                expected: 5,
                actual: 4
            })
        ));
    }

    #[test]
    fn duplicates_keep_batches_apart() {
        let mut duplicates = seeded(0..100, 0.5);
        assert_eq!(duplicates.unique_per_batch(), 50);

        let first = duplicates.by_ref().take(50).collect::<Vec<_>>();
        assert_eq!(first, (0..50).collect::<Vec<_>>());
        assert!(duplicates.by_ref().take(50).all(|v| (0..50).contains(&v)));

        let second = duplicates.by_ref().take(50).collect::<Vec<_>>();
        assert_eq!(second, (50..100).collect::<Vec<_>>());
        assert!(duplicates.by_ref().take(50).all(|v| (50..100).contains(&v)));
    }

    #[test]
    fn duplicates_control_the_distinct_count() {
        for duplicate_fraction in [0.1, 0.25, 0.5, 0.6, 0.75] {
            for size in [1_000, 1_050, 1_099] {
                let duplicates = seeded(1_000_000.., duplicate_fraction);
                let unique = duplicates.unique_per_batch();
                let expected = unique * (size / DUPLICATE_BATCH_SIZE)
                    + (size % DUPLICATE_BATCH_SIZE).min(unique);
                let distinct = duplicates.take(size).collect::<HashSet<_>>().len();
                assert_eq!(distinct, expected);
            }
        }
    }

    #[test]
    fn duplicates_without_repeats_pass_through() {
        let duplicates = seeded(0..250, 0.0);
        assert_eq!(duplicates.collect::<Vec<_>>(), (0..250).collect::<Vec<_>>());
    }

    #[test]
    fn duplicates_reject_invalid_fractions() {
        for duplicate_fraction in [-0.5, 1.0, 2.0, f32::NAN] {
            assert!(matches!(
                Duplicates::new(0.., duplicate_fraction),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn duplicates_are_reproducible() {
        let a = seeded(0.., 0.9).take(500).collect::<Vec<_>>();
        let b = seeded(0.., 0.9).take(500).collect::<Vec<_>>();
        assert_eq!(a, b);
    }
}
