use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use dataset::generate::{generate, generate_file, generate_similar, generate_similar_file};
use itertools::Itertools;
use jaccard::Similarity;
use num_format::{Locale, ToFormattedString};
use sketch_traits::CardinalitySketch;
use uuid::Uuid;

use crate::{
    algo::{for_all_algorithms, Algorithm},
    data::{double_uuids, uuids, with_duplicates, RecordFile},
    exact::{rel_error, GroundTruth},
    memory::{format_size, MemorySize},
};

pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Settings shared by every experiment.
#[derive(Clone, Debug)]
pub struct Settings {
    pub precision: u8,
    pub batch_size: usize,
    /// Share of repeated records in generated origins.
    pub duplicates: f32,
    pub seed: Option<u64>,
    /// Where generated record files go.
    pub workdir: PathBuf,
    pub verbose: bool,
}

/// A generated record file, removed when dropped.
struct Scratch(PathBuf);

impl Scratch {
    fn new(workdir: &Path, name: &str) -> Self {
        Self(workdir.join(format!("{}-{}.txt", name, Uuid::new_v4())))
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

fn file_ground_truth(file: &RecordFile, settings: &Settings) -> Result<GroundTruth> {
    let mut ground_truth = GroundTruth::new();
    let start = Instant::now();
    let stats = file.for_each_batch(settings.batch_size, |batch| ground_truth.extend(batch))?;
    if settings.verbose {
        println!(
            "{}: {} records, {} distinct, {} batches ({:.2?})",
            file,
            stats.records.to_formatted_string(&Locale::en),
            ground_truth.cardinality().to_formatted_string(&Locale::en),
            stats.batches,
            start.elapsed(),
        );
        println!("Ground Truth Memory: {}", format_size(ground_truth.mem_size()));
    }
    Ok(ground_truth)
}

/// Compares the cardinality of both summary kinds against the exact count
/// over `runs` freshly generated files of `size` UUID records.
pub fn run_cardinality(size: usize, runs: usize, settings: &Settings) -> Result<()> {
    let mut deviations = Vec::new();

    for run in 0..runs {
        let scratch = Scratch::new(&settings.workdir, "cardinality");
        let generator = with_duplicates(
            uuids(),
            settings.duplicates,
            settings.seed.map(|seed| seed + run as u64),
        )?;
        let start = Instant::now();
        generate_file(&scratch.0, size, generator, false)?;
        if settings.verbose {
            println!("Run {}: generated in {:.2?}", run, start.elapsed());
        }

        let file = RecordFile::new(&scratch.0);
        let ground_truth = file_ground_truth(&file, settings)?;
        for_all_algorithms!(settings.precision, |algorithm| cardinality_with(
            algorithm,
            &file,
            &ground_truth,
            settings,
            &mut deviations,
        ));
    }

    println!();
    for (name, errors) in deviations
        .into_iter()
        .into_group_map()
        .into_iter()
        .sorted_by(|a, b| a.0.cmp(&b.0))
    {
        let sum = errors.iter().sum::<f64>();
        println!(
            "{}: deviation sum {:.4}; mean {:.4}; per run [{}]",
            name,
            sum,
            sum / errors.len() as f64,
            errors.iter().map(|e| format!("{:.4}", e)).join(", "),
        );
    }
    Ok(())
}

fn cardinality_with<A: Algorithm>(
    algorithm: &A,
    file: &RecordFile,
    ground_truth: &GroundTruth,
    settings: &Settings,
    deviations: &mut Vec<(String, f64)>,
) -> Result<()> {
    let (summary, stats) = file.summarize::<A::Summary>(algorithm.config(), settings.batch_size)?;
    let estimate = algorithm.estimate(&summary);
    let truth = ground_truth.cardinality() as f64;
    let deviation = rel_error(estimate, truth);
    println!(
        "{}: estimate {:.0}; actual {}; deviation {:.4}; memory {}; insertion time {:.2?}",
        algorithm,
        estimate,
        ground_truth.cardinality().to_formatted_string(&Locale::en),
        deviation,
        format_size(summary.mem_size()),
        stats.elapsed,
    );
    deviations.push((algorithm.to_string(), deviation));
    Ok(())
}

/// Generates an origin of UUID records and a destination sharing
/// `similarity` of its rows with it, then estimates their similarity with
/// both summary kinds.
pub fn run_similarity(
    similarity: f32,
    origin_rows: usize,
    dest_rows: usize,
    on_disk: bool,
    settings: &Settings,
) -> Result<()> {
    let generator = with_duplicates(uuids(), settings.duplicates, settings.seed)?;
    println!(
        "Similarity {}; origin rows {}; destination rows {}; {}",
        similarity,
        origin_rows.to_formatted_string(&Locale::en),
        dest_rows.to_formatted_string(&Locale::en),
        if on_disk { "on disk" } else { "in memory" },
    );

    if on_disk {
        let (origin, dest) = (
            Scratch::new(&settings.workdir, "input-1"),
            Scratch::new(&settings.workdir, "input-2"),
        );
        let start = Instant::now();
        generate_file(&origin.0, origin_rows, generator, false)?;
        generate_similar_file(&origin.0, &dest.0, dest_rows, similarity, double_uuids())?;
        if settings.verbose {
            println!("Generated in {:.2?}", start.elapsed());
        }

        let (origin, dest) = (RecordFile::new(&origin.0), RecordFile::new(&dest.0));
        let expected = file_ground_truth(&origin, settings)?
            .similarity(&file_ground_truth(&dest, settings)?);
        for_all_algorithms!(settings.precision, |algorithm| similarity_on_disk(
            algorithm, &origin, &dest, similarity, expected, settings,
        ));
    } else {
        let start = Instant::now();
        let origin = generate(generator, origin_rows)?;
        let dest = generate_similar(&origin, dest_rows, similarity, double_uuids())?;
        if settings.verbose {
            println!("Generated in {:.2?}", start.elapsed());
        }

        let expected = {
            let (mut reference, mut other) = (GroundTruth::new(), GroundTruth::new());
            reference.extend(&origin);
            other.extend(&dest);
            reference.similarity(&other)
        };
        for_all_algorithms!(settings.precision, |algorithm| similarity_in_memory(
            algorithm, &origin, &dest, similarity, expected,
        ));
    }
    Ok(())
}

fn similarity_in_memory<A: Algorithm>(
    algorithm: &A,
    origin: &[String],
    dest: &[String],
    target: f32,
    expected: f64,
) -> Result<()> {
    let build = |records: &[String]| {
        let mut summary = algorithm.new_summary();
        records
            .iter()
            .for_each(|record| summary.insert(record.as_bytes()));
        summary
    };
    let start = Instant::now();
    let (reference, other) = (build(origin), build(dest));
    print_similarity(algorithm, &reference, &other, target, expected, start.elapsed())
}

fn similarity_on_disk<A: Algorithm>(
    algorithm: &A,
    origin: &RecordFile,
    dest: &RecordFile,
    target: f32,
    expected: f64,
    settings: &Settings,
) -> Result<()> {
    let (reference, reference_stats) =
        origin.summarize::<A::Summary>(algorithm.config(), settings.batch_size)?;
    let (other, other_stats) =
        dest.summarize::<A::Summary>(algorithm.config(), settings.batch_size)?;
    print_similarity(
        algorithm,
        &reference,
        &other,
        target,
        expected,
        reference_stats.elapsed + other_stats.elapsed,
    )
}

fn print_similarity<A: Algorithm>(
    algorithm: &A,
    reference: &A::Summary,
    other: &A::Summary,
    target: f32,
    expected: f64,
    insertion_time: Duration,
) -> Result<()> {
    let start = Instant::now();
    let estimate = reference.similarity(other)?;
    let query_time = start.elapsed();
    println!(
        "{}: similarity {:.4}; deviation {:.4} from target {}, {:.4} from actual {:.4}; \
         memory {}; insertion time {:.2?}; query time {:.2?}",
        algorithm,
        estimate,
        (f64::from(estimate) - f64::from(target)).abs(),
        target,
        (f64::from(estimate) - expected).abs(),
        expected,
        format_size(reference.mem_size() + other.mem_size()),
        insertion_time,
        query_time,
    );
    Ok(())
}

/// Estimates the similarity between two existing record files, both ways.
pub fn run_sketch(reference: &Path, other: &Path, settings: &Settings) -> Result<()> {
    let (reference, other) = (RecordFile::new(reference), RecordFile::new(other));
    let (reference_truth, other_truth) = (
        file_ground_truth(&reference, settings)?,
        file_ground_truth(&other, settings)?,
    );
    println!(
        "{} -> {}: actual {:.4}; {} -> {}: actual {:.4}",
        reference,
        other,
        reference_truth.similarity(&other_truth),
        other,
        reference,
        other_truth.similarity(&reference_truth),
    );
    for_all_algorithms!(settings.precision, |algorithm| sketch_with(
        algorithm, &reference, &other, settings,
    ));
    Ok(())
}

fn sketch_with<A: Algorithm>(
    algorithm: &A,
    reference: &RecordFile,
    other: &RecordFile,
    settings: &Settings,
) -> Result<()> {
    let (reference_summary, _) =
        reference.summarize::<A::Summary>(algorithm.config(), settings.batch_size)?;
    let (other_summary, _) =
        other.summarize::<A::Summary>(algorithm.config(), settings.batch_size)?;
    println!(
        "{}: {} -> {}: {:.4}; {} -> {}: {:.4}; cardinalities {:.0} / {:.0}",
        algorithm,
        reference,
        other,
        reference_summary.similarity(&other_summary)?,
        other,
        reference,
        other_summary.similarity(&reference_summary)?,
        algorithm.estimate(&reference_summary),
        algorithm.estimate(&other_summary),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(workdir: &Path) -> Settings {
        Settings {
            precision: 12,
            batch_size: 1_000,
            duplicates: 0.25,
            seed: Some(1),
            workdir: workdir.to_path_buf(),
            verbose: true,
        }
    }

    #[test]
    fn runs_every_experiment() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());

        run_cardinality(2_000, 2, &settings).unwrap();
        run_similarity(0.5, 1_000, 2_000, false, &settings).unwrap();
        run_similarity(0.5, 1_000, 2_000, true, &settings).unwrap();

        let (reference, other) = (dir.path().join("a.txt"), dir.path().join("b.txt"));
        generate_file(&reference, 1_000, uuids(), false).unwrap();
        generate_similar_file(&reference, &other, 1_000, 0.3, double_uuids()).unwrap();
        run_sketch(&reference, &other, &settings).unwrap();

        // Only the two files written here are left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn reports_invalid_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(dir.path());
        assert!(run_similarity(1.5, 10, 10, false, &settings).is_err());

        settings.precision = 2;
        assert!(run_cardinality(10, 1, &settings).is_err());

        settings.precision = 12;
        settings.batch_size = 0;
        assert!(run_similarity(0.5, 10, 10, true, &settings).is_err());
    }
}
