//! Gap filling over whole grids, field sets and grid documents.

use chrono::{DateTime, Duration, Utc};
use grid_processor::{
    read_field_set, regrid_nearest, write_field_set, Axis, FieldSet, GapFiller,
    GridProcessorConfig, GridProcessorError, ScalarGrid,
};
use test_utils::{
    axis_values, create_temperature_grid, create_test_grid, mask_edge_ring, mask_scattered,
    REFERENCE_DAY,
};

fn days(n: usize) -> Vec<DateTime<Utc>> {
    let start: DateTime<Utc> = REFERENCE_DAY.parse().unwrap();
    (0..n).map(|d| start + Duration::days(d as i64)).collect()
}

fn grid(width: usize, height: usize, values: Vec<f32>) -> ScalarGrid {
    ScalarGrid::new(
        axis_values(40.0, -0.25, height),
        axis_values(-100.0, 0.25, width),
        values,
    )
    .unwrap()
}

fn sequential() -> GapFiller {
    GapFiller::new(GridProcessorConfig {
        parallel: false,
        ..Default::default()
    })
}

#[test]
fn test_fill_is_total_and_keeps_defined_cells() {
    let original = create_temperature_grid(24, 18);
    let mut values = original.clone();
    mask_scattered(&mut values, 24, 60, 11);
    let input = grid(24, 18, values.clone());

    let filled = GapFiller::default().fill(&input).unwrap();
    assert_eq!(filled.missing_count(), 0);
    for (before, after) in values.iter().zip(filled.values()) {
        if !before.is_nan() {
            assert_eq!(before, after);
        }
    }
    // Every filled value is one of the defined input values.
    for after in filled.values() {
        assert!(values.iter().any(|v| v == after));
    }
}

#[test]
fn test_fill_is_idempotent() {
    let mut values = create_test_grid(16, 12);
    mask_edge_ring(&mut values, 16, 12, 3);
    let input = grid(16, 12, values);

    let filler = GapFiller::default();
    let once = filler.fill(&input).unwrap();
    let twice = filler.fill(&once).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_clean_grid_is_unchanged() {
    let input = grid(6, 5, create_test_grid(6, 5));
    assert_eq!(GapFiller::default().fill(&input).unwrap(), input);
}

#[test]
fn test_parallel_matches_sequential() {
    let mut values = Vec::new();
    for t in 0..4u32 {
        let mut slice = create_temperature_grid(20, 15);
        mask_scattered(&mut slice, 20, 70, t);
        values.extend(slice);
    }
    let input = ScalarGrid::with_time(
        axis_values(40.0, -0.25, 15),
        axis_values(-100.0, 0.25, 20),
        days(4),
        values,
    )
    .unwrap();

    let parallel = GapFiller::default().fill(&input).unwrap();
    let serial = sequential().fill(&input).unwrap();
    assert_eq!(parallel, serial);
    assert_eq!(parallel.time_index(), input.time_index());
}

#[test]
fn test_slices_filled_independently() {
    let nan = f32::NAN;
    // Slice 0 defines only its first cell, slice 1 only its last.
    let values = vec![1.0, nan, nan, nan, nan, nan, nan, 2.0];
    let input =
        ScalarGrid::with_time(vec![0.0, 1.0], vec![0.0, 1.0], days(2), values).unwrap();

    let filled = GapFiller::default().fill(&input).unwrap();
    assert_eq!(filled.slice(0), Some(&[1.0, 1.0, 1.0, 1.0][..]));
    assert_eq!(filled.slice(1), Some(&[2.0, 2.0, 2.0, 2.0][..]));
}

#[test]
fn test_unfillable_slice_reports_field_and_slice() {
    let nan = f32::NAN;
    let values = vec![1.0, 2.0, 3.0, nan, nan, nan, nan, nan];
    let input =
        ScalarGrid::with_time(vec![0.0, 1.0], vec![0.0, 1.0], days(2), values).unwrap();

    let err = GapFiller::default().fill_field("mrt", &input).unwrap_err();
    assert_eq!(
        err,
        GridProcessorError::UnfillableField {
            field: "mrt".to_string(),
            slice: Some(1),
        }
    );
}

#[test]
fn test_sentinel_treated_as_missing() {
    let input = grid(2, 2, vec![-9999.0, 20.0, 30.0, 40.0]);
    let filler = GapFiller::new(GridProcessorConfig {
        missing_value: Some(-9999.0),
        ..Default::default()
    });
    assert_eq!(filler.fill(&input).unwrap().values(), &[20.0, 20.0, 30.0, 40.0]);
}

#[test]
fn test_regrid_then_fill_repairs_edge_ring() {
    let coarse = ScalarGrid::new(
        axis_values(40.0, -1.0, 4),
        axis_values(-100.0, 1.0, 5),
        create_temperature_grid(5, 4),
    )
    .unwrap();
    // Finer grid reaching half a degree past the coarse cell centres.
    let lats = Axis::regular(40.5, -0.25, 18).unwrap();
    let lons = Axis::regular(-100.5, 0.25, 22).unwrap();

    let fine = regrid_nearest(&coarse, &lats, &lons).unwrap();
    assert!(fine.missing_count() > 0);
    let filled = GapFiller::default().fill(&fine).unwrap();
    assert_eq!(filled.missing_count(), 0);
    assert!(filled.same_axes(&fine));
}

#[test]
fn test_fill_named_fields_only() {
    let nan = f32::NAN;
    let a = grid(2, 2, vec![nan, 1.0, 1.0, 1.0]);
    let b = grid(2, 2, vec![nan, 2.0, 2.0, 2.0]);
    let set = FieldSet::new([("mrt", a), ("t2m", b)]).unwrap();

    let filled = GapFiller::default()
        .fill_fields(&set, &["mrt".to_string()])
        .unwrap();
    assert_eq!(filled.get("mrt").unwrap().missing_count(), 0);
    assert_eq!(filled.get("t2m").unwrap().missing_count(), 1);

    let err = GapFiller::default()
        .fill_fields(&set, &["utci".to_string()])
        .unwrap_err();
    assert!(matches!(err, GridProcessorError::InvalidGrid(_)));
}

#[test]
fn test_document_file_roundtrip_after_fill() {
    let mut values = create_temperature_grid(8, 6);
    mask_edge_ring(&mut values, 8, 6, 1);
    let set = FieldSet::single("mrt", grid(8, 6, values));

    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("grid.json");
    write_field_set(&input_path, &set).unwrap();

    let config = GridProcessorConfig::default();
    let loaded = read_field_set(&input_path, &config).unwrap();
    assert_eq!(loaded.get("mrt").unwrap().missing_count(), 8 * 6 - 6 * 4);

    let filled = GapFiller::new(config.clone()).fill_fields(&loaded, &[]).unwrap();
    let output_path = dir.path().join("filled.json");
    write_field_set(&output_path, &filled).unwrap();

    let reloaded = read_field_set(&output_path, &config).unwrap();
    assert_eq!(reloaded.get("mrt").unwrap().missing_count(), 0);
}
