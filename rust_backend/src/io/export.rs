use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::core::domain::ForecastResult;
use crate::core::error::{ForecastError, ForecastOutcome};

pub const COURSE_COLUMN: &str = "course_code";
pub const ENROLLMENT_COLUMN: &str = "predicted_enrollment";
pub const SECTIONS_COLUMN: &str = "predicted_sections";

/// Convert forecast results to a Polars DataFrame, one row per course in
/// result order.
pub fn forecasts_to_dataframe(results: &[ForecastResult]) -> ForecastOutcome<DataFrame> {
    let n = results.len();
    let mut courses = Vec::with_capacity(n);
    let mut enrollments = Vec::with_capacity(n);
    let mut sections = Vec::with_capacity(n);

    for result in results {
        courses.push(result.course_id().to_string());
        enrollments.push(result.predicted_enrollment());
        sections.push(result.predicted_sections());
    }

    df!(
        COURSE_COLUMN => courses,
        ENROLLMENT_COLUMN => enrollments,
        SECTIONS_COLUMN => sections,
    )
    .map_err(|e| ForecastError::Internal(format!("Failed to build result frame: {}", e)))
}

/// Write results as CSV with a header row to any writer.
pub fn write_csv_to<W: Write>(results: &[ForecastResult], writer: &mut W) -> ForecastOutcome<()> {
    let mut df = forecasts_to_dataframe(results)?;
    CsvWriter::new(writer)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| ForecastError::Internal(format!("Failed to write CSV: {}", e)))
}

/// Write results as a CSV file, replacing any existing file.
pub fn write_csv(results: &[ForecastResult], path: &Path) -> ForecastOutcome<()> {
    let mut file = File::create(path).map_err(|e| {
        ForecastError::Internal(format!(
            "Failed to create output file '{}': {}",
            path.display(),
            e
        ))
    })?;
    write_csv_to(results, &mut file)
}

/// Pretty-printed JSON array of results.
pub fn to_json(results: &[ForecastResult]) -> ForecastOutcome<String> {
    serde_json::to_string_pretty(results)
        .map_err(|e| ForecastError::Internal(format!("Failed to serialize results: {}", e)))
}
