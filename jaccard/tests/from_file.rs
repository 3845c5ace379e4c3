use dataset::{
    generate::{generate_file, generate_similar_file, Duplicates},
    stream::read_batch,
};
use jaccard::{
    build_exact_summary, build_exact_summary_from_file, build_probabilistic_summary,
    build_probabilistic_summary_from_file, similarity, BuildError,
};
use sketch_traits::CardinalitySketch;

fn words(prefix: &'static str) -> impl Iterator<Item = String> {
    (0..).map(move |i| format!("{}-{}", prefix, i))
}

#[test]
fn file_summaries_match_in_memory_ones() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records");
    generate_file(&path, 2_500, words("record"), false).unwrap();
    let records = read_batch(&path, 0, 2_500).unwrap();

    for batch_size in [1, 100, 2_500, 10_000] {
        let (exact, stats) = build_exact_summary_from_file(&path, batch_size).unwrap();
        assert_eq!(exact, build_exact_summary(&records));
        assert_eq!(stats.records, 2_500);
        assert_eq!(stats.batches, (2_500 + batch_size - 1) / batch_size);

        let (sketch, _) = build_probabilistic_summary_from_file(&path, 12, batch_size).unwrap();
        assert_eq!(sketch, build_probabilistic_summary(&records, 12).unwrap());
    }
}

#[test]
fn estimates_similarity_between_files() {
    let dir = tempfile::tempdir().unwrap();
    let (origin, dest) = (dir.path().join("input-1"), dir.path().join("input-2"));
    generate_file(&origin, 20_000, words("origin"), false).unwrap();
    generate_similar_file(&origin, &dest, 40_000, 0.5, words("filler")).unwrap();

    let (reference, _) = build_exact_summary_from_file(&origin, 5_000).unwrap();
    let (other, _) = build_exact_summary_from_file(&dest, 5_000).unwrap();
    let exact = similarity(&reference, &other).unwrap();
    assert!((exact - 0.5).abs() < 1e-3, "exact {}", exact);

    let (reference, _) = build_probabilistic_summary_from_file(&origin, 16, 5_000).unwrap();
    let (other, _) = build_probabilistic_summary_from_file(&dest, 16, 5_000).unwrap();
    let estimate = similarity(&reference, &other).unwrap();
    assert!((estimate - 0.5).abs() < 0.03, "estimate {}", estimate);
}

#[test]
fn duplicates_do_not_change_the_summaries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records");
    let generator = Duplicates::new(words("dup"), 0.5).unwrap();
    generate_file(&path, 10_000, generator, false).unwrap();

    let (exact, _) = build_exact_summary_from_file(&path, 1_000).unwrap();
    assert_eq!(exact.cardinality(), 5_000);

    let (sketch, _) = build_probabilistic_summary_from_file(&path, 16, 1_000).unwrap();
    let unique = build_probabilistic_summary(words("dup").take(5_000), 16).unwrap();
    assert_eq!(sketch, unique);
}

#[test]
fn reports_missing_files_and_bad_precisions() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    assert!(matches!(
        build_exact_summary_from_file(&missing, 10),
        Err(BuildError::Dataset(dataset::Error::Io { .. }))
    ));
    assert!(matches!(
        build_probabilistic_summary_from_file(&missing, 30, 10),
        Err(BuildError::Config(_))
    ));
    assert!(matches!(
        build_exact_summary_from_file(&missing, 0),
        Err(BuildError::Dataset(dataset::Error::InvalidArgument(_)))
    ));
}
