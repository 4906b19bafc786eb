#[allow(dead_code)]
mod common;

use flicker_core::analysis::{aggregate, summarize, BatchSummary, DatasetSummary};
use flicker_core::consts::{BAR_CHART_SIZE, PLOT_PANEL_SIZE, PLOT_TITLE_HEIGHT};
use flicker_core::report::plot::{
    grid_size, IMAGE_SPECTRA_FILE, MEAN_INTENSITY_FILE, MEAN_SPECTRA_FILE,
};
use flicker_core::report::{
    read_summary_json, read_table, write_image_table, write_plots, write_statistic_tables,
    write_summary_json, write_table, Statistic, TableRow,
};
use flicker_core::stack::ImageInput;

fn dataset(name: &str, id: i64, amplitudes: &[f64]) -> DatasetSummary {
    let images: Vec<ImageInput> = amplitudes
        .iter()
        .enumerate()
        .map(|(i, &a)| {
            ImageInput::new(id * 1000 + i as i64 + 1, common::cosine_stack(20, 4, 5.6, 3, a))
        })
        .collect();
    let agg = aggregate(name, &images, 5.6).unwrap();
    summarize(name, id, agg).unwrap()
}

fn sample_batch() -> BatchSummary {
    let mut batch = BatchSummary::new();
    batch.insert("control".into(), dataset("control", 1, &[4.0, 6.0]));
    batch.insert("treated".into(), dataset("treated", 2, &[10.0, 12.0, 14.0]));
    batch
}

#[test]
fn test_table_round_trip_scalar_and_vector_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.tsv");
    let rows = vec![
        TableRow::scalar("scalar set", 1.25),
        TableRow::new("profile", vec![0.0, -3.5, 1e-7, 42.0]),
        TableRow::new("empty", vec![]),
    ];
    write_table(&path, &rows).unwrap();
    assert_eq!(read_table(&path).unwrap(), rows);
}

#[test]
fn test_statistic_tables() {
    let dir = tempfile::tempdir().unwrap();
    let batch = sample_batch();
    let files = write_statistic_tables(dir.path(), &batch).unwrap();
    assert_eq!(files.len(), Statistic::ALL.len());
    for stat in Statistic::ALL {
        assert!(dir.path().join(stat.file_name()).is_file());
    }

    let velocity = read_table(&dir.path().join("mean_velocity.tsv")).unwrap();
    assert_eq!(velocity.len(), 2);
    assert_eq!(velocity[0].key, "control");
    assert_eq!(velocity[1].key, "treated");
    assert_eq!(velocity[0].values.len(), 1);
    assert!((velocity[0].values[0] - 100.0).abs() < 1e-9);

    let amplitude = read_table(&dir.path().join("mean_amplitude.tsv")).unwrap();
    assert_eq!(amplitude[1].values.len(), 10);
    assert!((amplitude[1].values[3] - 12.0).abs() < 1e-9);

    let spread = read_table(&dir.path().join("std_amplitude.tsv")).unwrap();
    assert!((spread[0].values[3] - 1.0).abs() < 1e-9);

    let freq = read_table(&dir.path().join("mean_frequency.tsv")).unwrap();
    assert_eq!(freq[0].values, batch["control"].mean_frequency_profile.to_vec());
}

#[test]
fn test_image_table_lists_every_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("images.tsv");
    write_image_table(&path, &sample_batch()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("dataset\timage_id"));
    assert!(lines[1].starts_with("control\t1001\t"));
    assert!(lines[5].starts_with("treated\t2003\t"));
}

#[test]
fn test_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.json");
    let batch = sample_batch();
    write_summary_json(&path, &batch).unwrap();

    let loaded = read_summary_json(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    let treated = &loaded["treated"];
    assert_eq!(treated.dataset_id, 2);
    assert_eq!(treated.images.image_ids(), vec![2001, 2002, 2003]);
    for (a, b) in treated
        .mean_amplitude_profile
        .iter()
        .zip(batch["treated"].mean_amplitude_profile.iter())
    {
        assert!((a - b).abs() < 1e-12);
    }
    assert!((treated.mean_velocity_scalar - batch["treated"].mean_velocity_scalar).abs() < 1e-12);
}

#[test]
fn test_plots_written() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_plots(dir.path(), &sample_batch()).unwrap();
    assert_eq!(
        files,
        vec![
            dir.path().join(IMAGE_SPECTRA_FILE),
            dir.path().join(MEAN_SPECTRA_FILE),
            dir.path().join(MEAN_INTENSITY_FILE),
        ]
    );

    // Two datasets sit side by side under the title band.
    let (panel_w, panel_h) = PLOT_PANEL_SIZE;
    for file in &files[..2] {
        let img = image::open(file).unwrap();
        assert_eq!((img.width(), img.height()), (2 * panel_w, panel_h + PLOT_TITLE_HEIGHT));
    }
    let bars = image::open(&files[2]).unwrap();
    assert_eq!((bars.width(), bars.height()), BAR_CHART_SIZE);
}

#[test]
fn test_grid_wraps_after_three_panels() {
    let (panel_w, panel_h) = PLOT_PANEL_SIZE;
    assert_eq!(grid_size(1), (panel_w, panel_h + PLOT_TITLE_HEIGHT));
    assert_eq!(grid_size(3), (3 * panel_w, panel_h + PLOT_TITLE_HEIGHT));
    assert_eq!(grid_size(4), (3 * panel_w, 2 * panel_h + PLOT_TITLE_HEIGHT));
}

#[test]
fn test_similar_dataset_names_do_not_collide() {
    let dir = tempfile::tempdir().unwrap();
    let mut batch = BatchSummary::new();
    batch.insert("ctrl a".into(), dataset("ctrl a", 1, &[4.0]));
    batch.insert("ctrl_a".into(), dataset("ctrl_a", 2, &[8.0]));
    batch.insert("ctrl/a".into(), dataset("ctrl/a", 3, &[12.0]));

    let files = write_plots(dir.path(), &batch).unwrap();
    assert_eq!(files.len(), 3);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    let spectra = image::open(dir.path().join(MEAN_SPECTRA_FILE)).unwrap();
    assert_eq!(spectra.width(), 3 * PLOT_PANEL_SIZE.0);
}

#[test]
fn test_plots_need_datasets() {
    let dir = tempfile::tempdir().unwrap();
    assert!(write_plots(dir.path(), &BatchSummary::new()).is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_image_table_quotes_awkward_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("images.tsv");
    let mut batch = BatchSummary::new();
    batch.insert("a\tb".into(), dataset("a\tb", 1, &[4.0]));
    write_image_table(&path, &batch).unwrap();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)
        .unwrap();
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][0], "a\tb");
    assert_eq!(&records[0][1], "1001");
}
