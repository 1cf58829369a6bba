//! Forecasting algorithms.
//!
//! This module provides the per-course trend model and the aggregator that drives
//! it across every course of a run.
//!
//! # Components
//!
//! - [`trend`]: Linear trend model over the ordinal index of a course series
//! - [`forecast`]: Sequential per-course training, rounding and section counts
//!
//! # Example
//!
//! ```
//! use course_forecast::algorithms::{Forecaster, FailurePolicy};
//! use course_forecast::core::domain::{CourseSeries, SectionCapacity};
//!
//! let mut series = CourseSeries::new();
//! series.push("CS101", "2023-1", 28);
//! series.push("CS101", "2023-2", 33);
//!
//! let report = Forecaster::linear(SectionCapacity::default())
//!     .run(&series, FailurePolicy::Collect)
//!     .unwrap();
//! println!("{:?}", report.results);
//! ```

pub mod forecast;
pub mod trend;

pub use forecast::{
    forecast, CancelFlag, CourseFailure, FailurePolicy, ForecastReport, Forecaster,
};
pub use trend::{
    to_enrollment, LinearTrendModel, TrendModel, TrendModelFactory, TrendParams, TrendWeights,
};
