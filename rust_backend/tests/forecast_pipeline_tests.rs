//! End-to-end tests for forecast runs from CSV files on disk.
//!
//! These tests ensure that:
//! 1. Files with either header spelling produce the expected forecasts
//! 2. Unusable rows are dropped without failing the run
//! 3. Configuration files drive capacity, ordering and failure handling
//! 4. Exported CSV and JSON match the in-memory results

use std::io::Write;
use tempfile::NamedTempFile;

use course_forecast::algorithms::FailurePolicy;
use course_forecast::config::ForecastConfig;
use course_forecast::io::export;
use course_forecast::preprocessing::{forecast_file, ForecastPipeline};
use course_forecast::ForecastError;

// ==================== Helper Functions ====================

fn create_temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn history_csv(rows: &[(&str, &str, u32)]) -> String {
    let mut csv = String::from("Semester,Course Code,Total Students\n");
    for (term, course, count) in rows {
        csv.push_str(&format!("{},{},{}\n", term, course, count));
    }
    csv
}

// ==================== Forecast Runs ====================

#[test]
fn test_reference_file() {
    let file = create_temp_file(&history_csv(&[
        ("2022-1", "C1", 10),
        ("2022-2", "C1", 12),
        ("2022-3", "C1", 14),
        ("2022-1", "C2", 5),
    ]));

    let run = forecast_file(file.path(), ForecastConfig::default()).unwrap();
    let results = run.results();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].course_id(), "C1");
    assert_eq!(results[0].predicted_enrollment(), 20);
    assert_eq!(results[0].predicted_sections(), 1);
    assert_eq!(results[1].course_id(), "C2");
    assert_eq!(results[1].predicted_enrollment(), 4);
    assert_eq!(results[1].predicted_sections(), 1);
}

#[test]
fn test_lowercase_headers_and_dirty_rows() {
    let file = create_temp_file(
        "semester,coursecode,totalstudents\n\
         2021-1,MATH1,100\n\
         2021-2,MATH1,80\n\
         2021-3,MATH1,abc\n\
         2021-3,MATH1,60\n\
         2021-4,,70\n\
         2021-4,MATH1,40\n\
         2021-5,MATH1,20\n\
         2021-6,MATH1,0\n",
    );

    let run = ForecastPipeline::new().process(file.path()).unwrap();
    assert_eq!(run.rows_read, 8);
    assert_eq!(run.records_used, 6);
    assert_eq!(run.courses, 1);
    assert_eq!(run.results()[0].predicted_enrollment(), 17);
}

#[test]
fn test_file_without_usable_rows_yields_empty_results() {
    let file = create_temp_file("Semester,Course Code,Total Students\n2022-1,C1,n/a\n");
    let run = ForecastPipeline::new().process(file.path()).unwrap();
    assert!(run.results().is_empty());
    assert_eq!(run.rows_read, 1);
}

#[test]
fn test_missing_file_is_input_error() {
    let result = ForecastPipeline::new().process(std::path::Path::new("/nonexistent/history.csv"));
    assert!(matches!(result, Err(ForecastError::InputFormat(_))));
}

// ==================== Configuration ====================

#[test]
fn test_config_file_drives_run() {
    let config_file = create_temp_file(
        "[forecast]\n\
         section_capacity = 8\n\
         sort_by_term = true\n",
    );
    let config = ForecastConfig::from_file(config_file.path()).unwrap();

    let csv = create_temp_file(&history_csv(&[
        ("2022-3", "C1", 14),
        ("2022-1", "C1", 10),
        ("2022-2", "C1", 12),
    ]));

    let run = ForecastPipeline::with_config(config).process(csv.path()).unwrap();
    assert_eq!(run.results()[0].predicted_enrollment(), 20);
    assert_eq!(run.results()[0].predicted_sections(), 3);
}

fn long_and_short_csv() -> NamedTempFile {
    let mut rows: Vec<(String, &str, u32)> =
        (0..20).map(|i| (format!("T{}", i), "LONG", 50)).collect();
    rows.push(("T0".to_string(), "SHORT", 9));
    let borrowed: Vec<(&str, &str, u32)> =
        rows.iter().map(|(t, c, n)| (t.as_str(), *c, *n)).collect();
    create_temp_file(&history_csv(&borrowed))
}

#[test]
fn test_long_series_forecast_with_default_config() {
    let csv = long_and_short_csv();
    let run = ForecastPipeline::new().process(csv.path()).unwrap();

    let ids: Vec<&str> = run.results().iter().map(|r| r.course_id()).collect();
    assert_eq!(ids, vec!["LONG", "SHORT"]);
    assert!(run.report.is_complete());
}

#[test]
fn test_long_increasing_series_trends_upward() {
    for len in [18u32, 19, 20, 24, 40] {
        let rows: Vec<(String, &str, u32)> =
            (0..len).map(|i| (format!("T{}", i), "C1", 30 + i)).collect();
        let borrowed: Vec<(&str, &str, u32)> =
            rows.iter().map(|(t, c, n)| (t.as_str(), *c, *n)).collect();
        let csv = create_temp_file(&history_csv(&borrowed));

        let run = ForecastPipeline::new().process(csv.path()).unwrap();
        let enrollment = run.results()[0].predicted_enrollment();
        assert!(enrollment >= 29 + len, "len={} enrollment={}", len, enrollment);
    }
}

#[test]
fn test_abort_and_collect_policies_with_uncapped_step() {
    let csv = long_and_short_csv();
    let uncapped = ForecastConfig::from_toml_str("[trend]\nlimit_step = false\n").unwrap();

    match ForecastPipeline::with_config(uncapped.clone()).process(csv.path()) {
        Err(ForecastError::Course { course_id, .. }) => assert_eq!(course_id, "LONG"),
        other => panic!("Expected course failure, got {:?}", other),
    }

    let mut config = uncapped;
    config.forecast.failure_policy = FailurePolicy::Collect;
    let run = ForecastPipeline::with_config(config).process(csv.path()).unwrap();
    assert_eq!(run.results().len(), 1);
    assert_eq!(run.results()[0].course_id(), "SHORT");
    assert_eq!(run.report.failures[0].course_id, "LONG");
}

#[test]
fn test_smaller_uncapped_learning_rate_handles_long_series() {
    let csv = long_and_short_csv();
    let config =
        ForecastConfig::from_toml_str("[trend]\nlearning_rate = 0.001\nlimit_step = false\n")
            .unwrap();
    let run = ForecastPipeline::with_config(config).process(csv.path()).unwrap();
    assert_eq!(run.results().len(), 2);
}

// ==================== Export ====================

#[test]
fn test_export_round_trip_through_files() {
    let csv = create_temp_file(&history_csv(&[("1", "A", 31), ("2", "A", 33), ("1", "B", 7)]));
    let run = ForecastPipeline::new().process(csv.path()).unwrap();

    let out = NamedTempFile::new().unwrap();
    export::write_csv(run.results(), out.path()).unwrap();
    let written = std::fs::read_to_string(out.path()).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("A,"));
    assert!(lines[2].starts_with("B,"));

    let json: serde_json::Value =
        serde_json::from_str(&export::to_json(run.results()).unwrap()).unwrap();
    assert_eq!(json[0]["courseCode"], "A");
    assert_eq!(
        json[0]["predictedEnrollment"],
        run.results()[0].predicted_enrollment()
    );
}
