//! Integration tests: rating tables through Parquet, traces through JSON.

use ndarray::Array2;
use ratingcurve_io::{
    Compression, IoError, WriterConfig, read_rating_table, read_trace, write_rating_table,
    write_trace,
};
use ratingcurve_model::trace::{BREAKPOINTS, INTERCEPT, SCALE, SLOPES};
use ratingcurve_model::{PosteriorTrace, RatingTable};

fn table() -> RatingTable {
    let stage: Vec<f64> = (0..25).map(|i| 0.5 + i as f64 * 0.1).collect();
    let discharge = stage.iter().map(|h| 2.0 * (h - 0.3_f64).powf(1.7)).collect();
    let sigma = vec![1.05; stage.len()];
    RatingTable::new(stage, discharge, sigma).expect("valid table")
}

#[test]
fn rating_table_round_trip_every_compression() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let original = table();

    for (i, compression) in [Compression::None, Compression::Snappy, Compression::Zstd]
        .into_iter()
        .enumerate()
    {
        let path = dir.path().join(format!("rating_{i}.parquet"));
        let config = WriterConfig::default().with_compression(compression);
        write_rating_table(&path, &original, &config).expect("write succeeds");

        let restored = read_rating_table(&path).expect("read succeeds");
        assert_eq!(restored, original, "{compression:?}");
    }
}

#[test]
fn small_row_groups_are_reassembled() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("rating.parquet");
    let original = table();

    let config = WriterConfig::default().with_row_group_size(4);
    write_rating_table(&path, &original, &config).expect("write succeeds");
    assert_eq!(read_rating_table(&path).expect("read succeeds"), original);
}

#[test]
fn zero_row_group_size_is_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("rating.parquet");
    let config = WriterConfig::default().with_row_group_size(0);

    let err = write_rating_table(&path, &table(), &config).unwrap_err();
    assert!(matches!(err, IoError::Validation { .. }));
    assert!(!path.exists());
}

#[test]
fn trace_round_trip() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("trace.json");

    let trace = PosteriorTrace::new(2)
        .with_variable(INTERCEPT, Array2::from_shape_vec((4, 1), vec![0.1, 0.2, 0.3, 0.4]).unwrap())
        .with_variable(SLOPES, Array2::from_elem((4, 2), 1.6))
        .with_variable(
            BREAKPOINTS,
            Array2::from_shape_vec((4, 2), vec![0.1, 1.0, 0.2, 1.1, 0.15, 1.2, 0.12, 0.9])
                .unwrap(),
        )
        .with_variable(SCALE, Array2::from_elem((4, 1), 0.05));

    write_trace(&path, &trace).expect("write succeeds");
    let restored = read_trace(&path).expect("read succeeds");

    assert_eq!(restored, trace);
    assert_eq!(restored.check_rating(2).expect("consistent trace"), 4);
}
