//! Multi-station and multi-month processing tests

use super::{hour_of_reports, write_batch};
use crate::config::ProcessorConfig;
use crate::processor::BatchProcessor;
use std::fs;
use tempfile::TempDir;

/// KPDX across a month boundary with an hour missing, plus one KSEA month
fn create_archive(temp_dir: &TempDir) -> std::path::PathBuf {
    let input = temp_dir.path().join("6401-2016");

    write_batch(
        &input,
        "KPDX",
        2016,
        1,
        &hour_of_reports("KPDX", (2016, 1, 31), 23, 12, |_| 0),
    );
    write_batch(
        &input,
        "KPDX",
        2016,
        2,
        &hour_of_reports("KPDX", (2016, 2, 1), 1, 12, |_| 0),
    );
    write_batch(
        &input,
        "KSEA",
        2016,
        1,
        &hour_of_reports("KSEA", (2016, 1, 10), 12, 6, |i| i),
    );

    input
}

#[tokio::test]
async fn test_one_file_per_station() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_archive(&temp_dir);
    let output = temp_dir.path().join("out");

    let mut processor = BatchProcessor::new(input, Some(output.clone())).unwrap();
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.files_processed, 3);
    assert_eq!(stats.stations_written, 2);
    assert_eq!(
        stats.output_paths,
        vec![output.join("KPDX.csv"), output.join("KSEA.csv")]
    );

    // 12 + 12 missing slots + 12 for KPDX, 6 for KSEA
    assert_eq!(stats.total_rows, 42);

    let kpdx = fs::read_to_string(output.join("KPDX.csv")).unwrap();
    let kpdx_lines: Vec<&str> = kpdx.lines().collect();
    assert_eq!(kpdx_lines.len(), 37);
    assert!(kpdx_lines[1].starts_with("2016-01-31T23:00:00Z,"));
    assert!(kpdx_lines[13].starts_with("2016-02-01T00:00:00Z,,"));
    assert!(kpdx_lines[36].starts_with("2016-02-01T01:55:00Z,"));
}

#[tokio::test]
async fn test_concurrency_does_not_change_output() {
    let serial_dir = TempDir::new().unwrap();
    let parallel_dir = TempDir::new().unwrap();

    let mut outputs = Vec::new();
    for (temp_dir, workers) in [(&serial_dir, 1), (&parallel_dir, 4)] {
        let input = create_archive(temp_dir);
        let output = temp_dir.path().join("out");
        let config = ProcessorConfig::default().with_max_concurrent_batches(workers);
        let mut processor = BatchProcessor::new(input, Some(output.clone()))
            .unwrap()
            .with_config(config);
        processor.process().await.unwrap();

        outputs.push((
            fs::read_to_string(output.join("KPDX.csv")).unwrap(),
            fs::read_to_string(output.join("KSEA.csv")).unwrap(),
        ));
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[tokio::test]
async fn test_recursive_discovery() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("archive");
    write_batch(
        &root.join("2016"),
        "KBOI",
        2016,
        3,
        &hour_of_reports("KBOI", (2016, 3, 2), 6, 4, |_| 0),
    );
    let output = temp_dir.path().join("out");

    let mut flat = BatchProcessor::new(root.clone(), Some(output.clone())).unwrap();
    assert_eq!(flat.process().await.unwrap().files_processed, 0);

    let mut recursive = BatchProcessor::new(root, Some(output.clone()))
        .unwrap()
        .with_config(ProcessorConfig::default().with_recursive());
    let stats = recursive.process().await.unwrap();
    assert_eq!(stats.files_processed, 1);
    assert!(output.join("KBOI.csv").exists());
}
