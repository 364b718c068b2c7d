use metrics_live::chart::color::{ColorWheel, Palette};
use metrics_live::chart::event::Point;
use metrics_live::chart::matrix::SeriesMatrix;
use metrics_live::chart::surface::{RecordingSurface, SurfaceCall};

fn pt(key: &str, value: f64, t: f64) -> Point {
    Point::new(key, value, t)
}

#[test]
fn test_columns_stay_aligned_across_batches() {
    let mut matrix = SeriesMatrix::new();
    let mut surface = RecordingSurface::new();

    let batches = vec![
        vec![pt("a", 1.0, 0.0)],
        vec![pt("b", 2.0, 1.0), pt("c", 3.0, 2.0), pt("a", 4.0, 3.0)],
        vec![pt("d", 5.0, 4.0), pt("d", 6.0, 5.0)],
    ];

    let mut rows = 0;
    for batch in &batches {
        matrix.ingest_batch(batch, &mut surface, &ColorWheel);
        rows += batch.len();

        let cols = matrix.columns();
        assert!(cols.iter().all(|c| c.len() == rows), "all columns must have {} rows", rows);
        assert!(matrix.is_aligned());
    }

    assert_eq!(matrix.keys(), vec!["a", "b", "c", "d"]);
    assert_eq!(matrix.column("d").unwrap(), &[None, None, None, None, Some(5.0), Some(6.0)]);
}

#[test]
fn test_repeated_key_yields_two_rows_and_backfilled_column() {
    let mut matrix = SeriesMatrix::new();
    let mut surface = RecordingSurface::new();

    let created = matrix.ingest_batch(
        &[pt("a", 1.0, 10.0), pt("a", 2.0, 11.0), pt("b", 3.0, 12.0)],
        &mut surface,
        &ColorWheel,
    );

    assert_eq!(created, 2);
    assert_eq!(matrix.series_count(), 2);
    assert_eq!(matrix.column("a").unwrap(), &[Some(1.0), Some(2.0), None]);
    assert_eq!(matrix.column("b").unwrap(), &[None, None, Some(3.0)]);
}

#[test]
fn test_duplicate_timestamps_are_not_merged() {
    let mut matrix = SeriesMatrix::new();
    let mut surface = RecordingSurface::new();

    matrix.ingest_batch(&[pt("k", 1.0, 5.0), pt("k", 2.0, 5.0)], &mut surface, &ColorWheel);

    assert_eq!(matrix.rows(), 2);
    assert_eq!(matrix.timestamps(), &[5.0, 5.0]);
    assert_eq!(matrix.column("k").unwrap(), &[Some(1.0), Some(2.0)]);
}

#[test]
fn test_one_render_per_batch_and_series_registered_first() {
    let mut matrix = SeriesMatrix::new();
    let mut surface = RecordingSurface::new();

    matrix.ingest_batch(&[pt("x", 1.0, 0.0), pt("y", 2.0, 1.0)], &mut surface, &ColorWheel);

    assert_eq!(surface.set_data_count(), 1);
    assert_eq!(
        surface.calls[0],
        SurfaceCall::AddSeries { index: 1, label: "x".into(), style: ColorWheel.at(0) }
    );
    assert_eq!(
        surface.calls[1],
        SurfaceCall::AddSeries { index: 2, label: "y".into(), style: ColorWheel.at(1) }
    );
    assert!(matches!(surface.calls[2], SurfaceCall::SetData(_)));
    assert_eq!(surface.series_labels(), vec!["x".to_string(), "y".to_string()]);
}

#[test]
fn test_empty_batch_does_not_render() {
    let mut matrix = SeriesMatrix::new();
    let mut surface = RecordingSurface::new();

    assert_eq!(matrix.ingest_batch(&[], &mut surface, &ColorWheel), 0);
    assert!(surface.calls.is_empty());
    assert_eq!(matrix.rows(), 0);
}

#[test]
fn test_payload_is_pure_function_of_state() {
    let mut matrix = SeriesMatrix::new();
    let mut surface = RecordingSurface::new();
    matrix.ingest_batch(&[pt("a", 1.0, 0.0), pt("b", 2.0, 1.0)], &mut surface, &ColorWheel);

    let first = matrix.columns();
    let second = matrix.columns();
    assert_eq!(first, second);
    assert_eq!(surface.last_data(), Some(&first));
}
