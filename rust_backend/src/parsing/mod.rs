//! Parsers for historical enrollment tables.
//!
//! This module turns raw tabular input into normalized [`HistoricalRecord`]s.
//! Rows whose enrollment does not parse are dropped; only a source that cannot be
//! read at all is reported as an error.
//!
//! # Parsers
//!
//! - [`csv_parser`]: Read CSV files or in-memory CSV text into records
//! - [`headers`]: Header alias resolution and enrollment value parsing
//!
//! # Example
//!
//! ```no_run
//! use course_forecast::parsing::csv_parser::parse_enrollment_csv;
//! use std::path::Path;
//!
//! let parsed = parse_enrollment_csv(Path::new("enrollment.csv"))
//!     .expect("Failed to parse enrollment history");
//! println!("{} of {} rows usable", parsed.records.len(), parsed.rows_read);
//! ```
//!
//! [`HistoricalRecord`]: crate::core::domain::HistoricalRecord

pub mod csv_parser;
pub mod headers;


pub use csv_parser::{
    dataframe_to_records, parse_enrollment_csv, parse_enrollment_csv_str, ParsedRecords,
};
pub use headers::{parse_enrollment, HeaderMap};
