//! Preprocessing between parsed records and the forecaster.
//!
//! [`grouper`] turns the flat record list into ordered per-course series, and
//! [`pipeline`] chains parsing, grouping and forecasting into a single run.

pub mod grouper;
pub mod pipeline;

pub use grouper::{compare_terms, group_records, sort_chronologically};
pub use pipeline::{forecast_csv_str, forecast_file, ForecastPipeline, ForecastRun};
