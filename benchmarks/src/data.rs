/// Utilities to read record files or generate records to be used as an input to the summaries.
use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader},
    iter,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use dataset::{
    generate::Duplicates,
    stream::{for_each_batch_in, BatchStats},
    Element, Error,
};
use flate2::read::GzDecoder;
use rand::{rngs::StdRng, SeedableRng};
use sketch_traits::{CardinalitySketch, New};
use uuid::Uuid;

/// A newline-delimited record file, gzip-compressed when its name ends in `.gz`.
#[derive(Clone, Debug)]
pub struct RecordFile {
    path: PathBuf,
}

impl RecordFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_compressed(&self) -> bool {
        self.path.extension().map_or(false, |ext| ext == "gz")
    }

    fn reader(&self) -> Result<Box<dyn BufRead>, Error> {
        let file = File::open(&self.path).map_err(|e| Error::io(&self.path, e))?;
        Ok(if self.is_compressed() {
            Box::new(BufReader::new(GzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        })
    }

    pub fn for_each_batch(
        &self,
        batch_size: usize,
        callback: impl FnMut(Vec<Element>),
    ) -> Result<BatchStats, Error> {
        let batch_size = NonZeroUsize::new(batch_size)
            .ok_or_else(|| Error::InvalidArgument("the batch size should not be zero".into()))?;
        for_each_batch_in(self.reader()?, batch_size, callback)
            .map_err(|e| Error::io(&self.path, e))
    }

    /// Streams the file into a fresh summary.
    pub fn summarize<S>(&self, config: &S::Config, batch_size: usize) -> Result<(S, BatchStats), Error>
    where
        S: CardinalitySketch<Item = [u8]> + New,
    {
        let mut summary = S::new(config);
        let stats = self.for_each_batch(batch_size, |batch| {
            batch.iter().for_each(|record| summary.insert(record.as_slice()))
        })?;
        Ok((summary, stats))
    }
}

impl fmt::Display for RecordFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path.file_name() {
            Some(name) => write!(f, "{}", name.to_string_lossy()),
            None => write!(f, "{}", self.path.display()),
        }
    }
}

/// Random v4 UUIDs, one per record.
pub fn uuids() -> impl Iterator<Item = String> {
    iter::repeat_with(|| Uuid::new_v4().to_string())
}

/// Two concatenated v4 UUIDs per record. Never equal to a record of [`uuids`].
pub fn double_uuids() -> impl Iterator<Item = String> {
    iter::repeat_with(|| format!("{}{}", Uuid::new_v4(), Uuid::new_v4()))
}

/// Wraps `unique` so that a `duplicates` share of its records are repeats.
/// A `seed` makes the choice of repeats reproducible.
pub fn with_duplicates<I>(
    unique: I,
    duplicates: f32,
    seed: Option<u64>,
) -> Result<Box<dyn Iterator<Item = String>>, Error>
where
    I: Iterator<Item = String> + 'static,
{
    if duplicates == 0.0 {
        return Ok(Box::new(unique));
    }
    let duplicates = match seed {
        Some(seed) => Duplicates::with_rng(unique, duplicates, StdRng::seed_from_u64(seed))?,
        None => Duplicates::new(unique, duplicates)?,
    };
    Ok(Box::new(duplicates))
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, io::Write};

    use flate2::{write::GzEncoder, Compression};
    use sparse_bitset::SparseBitSet;

    use super::*;

    fn write_records(path: &Path, records: &[&str], compress: bool) {
        let mut contents = records.join("\n");
        contents.push('\n');
        let file = File::create(path).unwrap();
        if compress {
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(contents.as_bytes()).unwrap();
            encoder.finish().unwrap();
        } else {
            let mut file = file;
            file.write_all(contents.as_bytes()).unwrap();
        }
    }

    #[test]
    fn reads_plain_and_compressed_files_alike() {
        let dir = tempfile::tempdir().unwrap();
        let records = ["a", "b", "c", "a", "d"];
        let plain = RecordFile::new(dir.path().join("records.txt"));
        let compressed = RecordFile::new(dir.path().join("records.txt.gz"));
        write_records(plain.path(), &records, false);
        write_records(compressed.path(), &records, true);
        assert!(!plain.is_compressed());
        assert!(compressed.is_compressed());

        for file in [&plain, &compressed] {
            let mut seen = Vec::new();
            let stats = file.for_each_batch(2, |batch| seen.extend(batch)).unwrap();
            assert_eq!(stats.batches, 3);
            assert_eq!(
                seen,
                records.iter().map(|r| r.as_bytes().to_vec()).collect::<Vec<_>>()
            );

            let (summary, _) = file
                .summarize::<SparseBitSet>(&Default::default(), 2)
                .unwrap();
            assert_eq!(summary.cardinality(), 4);
        }
        assert_eq!(format!("{}", compressed), "records.txt.gz");
    }

    #[test]
    fn rejects_missing_files() {
        let file = RecordFile::new("/nonexistent/records.gz");
        assert!(matches!(
            file.for_each_batch(10, |_| {}),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn generators_never_overlap() {
        let singles = uuids().take(1000).collect::<HashSet<_>>();
        let doubles = double_uuids().take(1000).collect::<HashSet<_>>();
        assert_eq!(singles.len(), 1000);
        assert_eq!(doubles.len(), 1000);
        assert!(singles.is_disjoint(&doubles));
    }

    #[test]
    fn duplicates_are_optional() {
        let records = with_duplicates(uuids(), 0.0, None)
            .unwrap()
            .take(500)
            .collect::<HashSet<_>>();
        assert_eq!(records.len(), 500);

        let records = with_duplicates(uuids(), 0.5, Some(7))
            .unwrap()
            .take(500)
            .collect::<HashSet<_>>();
        assert_eq!(records.len(), 250);

        assert!(with_duplicates(uuids(), 1.5, None).is_err());
    }
}
