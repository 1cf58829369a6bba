//! Output of forecast results.
//!
//! Results convert to a Polars DataFrame for tabular output, which is also how
//! they are written as CSV. JSON output keeps the camelCase field names of
//! [`ForecastResult`](crate::core::domain::ForecastResult).
//!
//! # Example
//!
//! ```no_run
//! use course_forecast::io::export;
//! use course_forecast::preprocessing::ForecastPipeline;
//! use std::path::Path;
//!
//! let run = ForecastPipeline::new()
//!     .process(Path::new("enrollment.csv"))
//!     .expect("forecast failed");
//! export::write_csv(run.results(), Path::new("forecast.csv")).expect("write failed");
//! ```

pub mod export;


pub use export::{forecasts_to_dataframe, to_json, write_csv, write_csv_to};
