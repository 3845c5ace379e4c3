//! Batch-wise reading and writing of record files.
//!
//! Every operation opens its files, streams through them and closes them
//! again; nothing but the current batch is held in memory.

use std::{
    fs::{File, OpenOptions},
    io::{self, BufRead, BufReader, BufWriter, Write},
    num::NonZeroUsize,
    path::Path,
    time::{Duration, Instant},
};

use crate::{Element, Error};

const NEW_LINE: u8 = b'\n';

/// What [`for_each_batch`] went through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub batches: usize,
    pub records: usize,
    /// Time spent inside the callback, summed over all batches.
    pub elapsed: Duration,
}

/// Reads up to `batch_size` records starting at record `from_line`.
///
/// A short or empty batch means the end of the file was reached.
pub fn read_batch(
    source: impl AsRef<Path>,
    from_line: usize,
    batch_size: usize,
) -> Result<Vec<Element>, Error> {
    let source = source.as_ref();
    let mut records = open(source)?.split(NEW_LINE);
    skip(&mut records, from_line).map_err(|e| Error::io(source, e))?;
    records
        .take(batch_size)
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| Error::io(source, e))
}

/// Calls `callback` on consecutive batches of `batch_size` records, in file
/// order, until the file is exhausted. The callback never sees an empty batch.
pub fn for_each_batch(
    source: impl AsRef<Path>,
    batch_size: usize,
    callback: impl FnMut(Vec<Element>),
) -> Result<BatchStats, Error> {
    let source = source.as_ref();
    let batch_size = NonZeroUsize::new(batch_size)
        .ok_or_else(|| Error::InvalidArgument("the batch size should not be zero".into()))?;
    for_each_batch_in(open(source)?, batch_size, callback).map_err(|e| Error::io(source, e))
}

/// [`for_each_batch`] over any buffered reader.
pub fn for_each_batch_in(
    reader: impl BufRead,
    batch_size: NonZeroUsize,
    mut callback: impl FnMut(Vec<Element>),
) -> io::Result<BatchStats> {
    let mut records = reader.split(NEW_LINE);
    let mut stats = BatchStats::default();
    loop {
        let batch = records
            .by_ref()
            .take(batch_size.get())
            .collect::<io::Result<Vec<_>>>()?;
        if batch.is_empty() {
            break;
        }
        stats.batches += 1;
        stats.records += batch.len();
        let start = Instant::now();
        callback(batch);
        stats.elapsed += start.elapsed();
    }
    Ok(stats)
}

/// Copies up to `chunk_size` records starting at record `from_line` of
/// `source` to `dest`, truncating `dest` first unless `append` is set.
///
/// Returns the number of records actually copied, which is short when
/// `source` runs out first.
pub fn copy_chunk(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    from_line: usize,
    chunk_size: usize,
    append: bool,
) -> Result<usize, Error> {
    let (source, dest) = (source.as_ref(), dest.as_ref());
    let mut records = open(source)?.split(NEW_LINE);
    let mut writer = create(dest, append)?;

    skip(&mut records, from_line).map_err(|e| Error::io(source, e))?;
    let mut copied = 0;
    for record in records.take(chunk_size) {
        let record = record.map_err(|e| Error::io(source, e))?;
        write_record(&mut writer, &record).map_err(|e| Error::io(dest, e))?;
        copied += 1;
    }
    writer.flush().map_err(|e| Error::io(dest, e))?;
    Ok(copied)
}

/// Writes `count` records taken from `generator` to `dest`, truncating
/// `dest` first unless `append` is set.
pub fn append_generated<T>(
    dest: impl AsRef<Path>,
    count: usize,
    generator: impl Iterator<Item = T>,
    append: bool,
) -> Result<(), Error>
where
    T: AsRef<[u8]>,
{
    let dest = dest.as_ref();
    let mut writer = create(dest, append)?;
    let mut written = 0;
    for record in generator.take(count) {
        write_record(&mut writer, record.as_ref()).map_err(|e| Error::io(dest, e))?;
        written += 1;
    }
    writer.flush().map_err(|e| Error::io(dest, e))?;
    if written < count {
        return Err(Error::GeneratorExhausted {
            expected: count,
            actual: written,
        });
    }
    Ok(())
}

/// Number of records in `source`.
pub fn count_records(source: impl AsRef<Path>) -> Result<usize, Error> {
    let source = source.as_ref();
    open(source)?
        .split(NEW_LINE)
        .try_fold(0, |count, record| record.map(|_| count + 1))
        .map_err(|e| Error::io(source, e))
}

fn open(path: &Path) -> Result<BufReader<File>, Error> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| Error::io(path, e))
}

fn create(path: &Path, append: bool) -> Result<BufWriter<File>, Error> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map(BufWriter::new)
        .map_err(|e| Error::io(path, e))
}

/// Skips `n` records, surfacing read errors instead of dropping them.
fn skip(records: &mut impl Iterator<Item = io::Result<Element>>, n: usize) -> io::Result<()> {
    records.take(n).try_for_each(|record| record.map(drop))
}

fn write_record(writer: &mut impl Write, record: &[u8]) -> io::Result<()> {
    writer.write_all(record)?;
    writer.write_all(&[NEW_LINE])
}
