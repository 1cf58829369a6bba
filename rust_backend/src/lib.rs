//! Course enrollment forecasting.
//!
//! Reads historical per-term enrollment records, fits an independent linear trend
//! to each course's series, and predicts next-term enrollment together with the
//! number of sections needed at a fixed section capacity.
//!
//! ```no_run
//! use course_forecast::config::ForecastConfig;
//! use course_forecast::preprocessing::ForecastPipeline;
//! use std::path::Path;
//!
//! let run = ForecastPipeline::with_config(ForecastConfig::default())
//!     .process(Path::new("enrollment.csv"))
//!     .unwrap();
//! for result in run.results() {
//!     println!(
//!         "{}: {} students, {} section(s)",
//!         result.course_id(),
//!         result.predicted_enrollment(),
//!         result.predicted_sections()
//!     );
//! }
//! ```

pub mod algorithms;
pub mod config;
pub mod core;
pub mod io;
pub mod parsing;
pub mod preprocessing;
pub mod services;

pub use crate::config::ForecastConfig;
pub use crate::core::{ForecastError, ForecastOutcome, ForecastResult, SectionCapacity};
