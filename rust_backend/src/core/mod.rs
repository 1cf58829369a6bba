//! Core domain models for enrollment forecasting.
//!
//! This module defines the data structures that flow through a forecast run and
//! the error taxonomy shared by every stage.

pub mod domain;
pub mod error;

pub use domain::{CourseHistory, CourseSeries, ForecastResult, HistoricalRecord, SectionCapacity};
pub use error::{ForecastError, ForecastOutcome, TrendError};
