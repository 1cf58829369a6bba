use log::{debug, warn};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

use crate::core::domain::HistoricalRecord;
use crate::core::error::{ForecastError, ForecastOutcome};
use crate::parsing::headers::{parse_enrollment, HeaderMap};

/// Records recovered from one tabular source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecords {
    pub records: Vec<HistoricalRecord>,
    /// Data rows present in the source, before filtering.
    pub rows_read: usize,
}

impl ParsedRecords {
    /// Rows excluded because their enrollment or course identifier was unusable.
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.records.len()
    }
}

fn csv_options() -> CsvReadOptions {
    // Schema inference is disabled so every column arrives as a string and
    // enrollment parsing stays under our control.
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
}

fn input_format_error(err: PolarsError) -> ForecastError {
    ForecastError::InputFormat(format!("Failed to parse CSV: {}", err))
}

/// Read an enrollment CSV file into a DataFrame of string columns
pub fn read_enrollment_csv(csv_path: &Path) -> ForecastOutcome<DataFrame> {
    csv_options()
        .try_into_reader_with_file_path(Some(csv_path.into()))
        .and_then(|reader| reader.finish())
        .map_err(|e| {
            ForecastError::InputFormat(format!(
                "Failed to parse CSV '{}': {}",
                csv_path.display(),
                e
            ))
        })
}

/// Read enrollment CSV content held in memory into a DataFrame of string columns
pub fn read_enrollment_csv_bytes(bytes: impl Into<Vec<u8>>) -> ForecastOutcome<DataFrame> {
    csv_options()
        .into_reader_with_file_handle(Cursor::new(bytes.into()))
        .finish()
        .map_err(input_format_error)
}

/// Parse an enrollment CSV file into historical records
pub fn parse_enrollment_csv(csv_path: &Path) -> ForecastOutcome<ParsedRecords> {
    let df = read_enrollment_csv(csv_path)?;
    dataframe_to_records(&df)
}

/// Parse enrollment CSV text into historical records
pub fn parse_enrollment_csv_str(csv: &str) -> ForecastOutcome<ParsedRecords> {
    let df = read_enrollment_csv_bytes(csv.as_bytes())?;
    dataframe_to_records(&df)
}

/// Convert a DataFrame with aliased headers into historical records.
///
/// Columns of any type are accepted; values are read through their string form.
/// Rows whose enrollment does not parse are skipped without error. On top of that
/// enrollment filter, rows with no course identifier are skipped too: they have no
/// grouping key, so they are dropped here instead of being pooled under an
/// empty course code.
pub fn dataframe_to_records(df: &DataFrame) -> ForecastOutcome<ParsedRecords> {
    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let headers = HeaderMap::resolve(column_names.as_slice());
    if !headers.is_usable() {
        warn!(
            "No course or enrollment column recognised among headers {:?}; every row will be dropped",
            column_names
        );
    }

    let terms = string_columns(df, &headers.term)?;
    let course_ids = string_columns(df, &headers.course_id)?;
    let enrollments = string_columns(df, &headers.enrollment)?;

    let rows_read = df.height();
    let mut records = Vec::with_capacity(rows_read);

    for i in 0..rows_read {
        let Some(enrollment_count) = first_present(&enrollments, i).and_then(parse_enrollment)
        else {
            continue;
        };
        let Some(course_id) = first_present(&course_ids, i) else {
            continue;
        };
        let term = first_present(&terms, i).unwrap_or_default();

        records.push(HistoricalRecord::new(term, course_id, enrollment_count));
    }

    let parsed = ParsedRecords { records, rows_read };
    debug!(
        "Parsed {} record(s) from {} row(s), dropped {}",
        parsed.records.len(),
        parsed.rows_read,
        parsed.rows_dropped()
    );

    Ok(parsed)
}

fn string_columns(df: &DataFrame, names: &[String]) -> ForecastOutcome<Vec<StringChunked>> {
    names
        .iter()
        .map(|name| {
            let column = df.column(name)?.cast(&DataType::String)?;
            Ok(column.str()?.clone())
        })
        .collect::<PolarsResult<Vec<_>>>()
        .map_err(input_format_error)
}

/// First non-blank value among the alias columns for a row.
fn first_present(columns: &[StringChunked], row: usize) -> Option<&str> {
    columns
        .iter()
        .filter_map(|column| column.get(row))
        .map(str::trim)
        .find(|value| !value.is_empty())
}
