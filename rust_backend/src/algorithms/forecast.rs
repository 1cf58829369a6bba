//! Forecast aggregation across courses.
//!
//! Drives one fresh [`TrendModel`] per course, strictly one course at a time, and
//! turns each continuous prediction into an enrollment count and a section count.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize, Serializer};

use crate::algorithms::trend::{
    to_enrollment, LinearTrendModel, TrendModel, TrendModelFactory, TrendParams,
};
use crate::core::domain::{CourseSeries, ForecastResult, SectionCapacity};
use crate::core::error::{ForecastError, ForecastOutcome, TrendError};

/// What to do when one course's fit or prediction fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the whole run on the first failing course.
    #[default]
    Abort,
    /// Attempt every course and report failures alongside the results.
    Collect,
}

/// Cooperative cancellation shared between a run and whoever started it.
///
/// Checked between courses; a fit already in progress always completes.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Whether both handles refer to the same flag.
    pub fn same_flag(&self, other: &CancelFlag) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A course that could not be forecast in a collecting run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFailure {
    #[serde(rename = "courseCode")]
    pub course_id: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: TrendError,
}

fn serialize_display<S: Serializer>(error: &TrendError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Outcome of a forecast run: results in first-appearance order, plus failures
/// when running under [`FailurePolicy::Collect`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastReport {
    pub results: Vec<ForecastResult>,
    pub failures: Vec<CourseFailure>,
}

impl ForecastReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Per-course trend forecaster.
pub struct Forecaster<F> {
    capacity: SectionCapacity,
    factory: F,
    cancel: Option<CancelFlag>,
}

impl Forecaster<fn() -> LinearTrendModel> {
    /// Forecaster backed by [`LinearTrendModel`] with default hyperparameters.
    pub fn linear(capacity: SectionCapacity) -> Self {
        fn default_model() -> LinearTrendModel {
            LinearTrendModel::new(TrendParams::default())
        }
        Forecaster::new(capacity, default_model as fn() -> LinearTrendModel)
    }
}

impl<F: TrendModelFactory> Forecaster<F> {
    pub fn new(capacity: SectionCapacity, factory: F) -> Self {
        Self {
            capacity,
            factory,
            cancel: None,
        }
    }

    /// Stop the run between courses once `flag` is raised.
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn capacity(&self) -> SectionCapacity {
        self.capacity
    }

    /// Forecast every course, failing the whole run on the first course error.
    pub fn forecast(&self, series: &CourseSeries) -> ForecastOutcome<Vec<ForecastResult>> {
        self.run(series, FailurePolicy::Abort)
            .map(|report| report.results)
    }

    /// Forecast every course, collecting per-course failures instead of aborting.
    pub fn forecast_collecting(&self, series: &CourseSeries) -> ForecastOutcome<ForecastReport> {
        self.run(series, FailurePolicy::Collect)
    }

    /// Forecast every course under the given failure policy.
    pub fn run(&self, series: &CourseSeries, policy: FailurePolicy) -> ForecastOutcome<ForecastReport> {
        info!(
            "Forecasting {} course(s) with section capacity {} ({:?} on failure)",
            series.len(),
            self.capacity,
            policy
        );

        let mut report = ForecastReport {
            results: Vec::with_capacity(series.len()),
            failures: Vec::new(),
        };

        for (completed, (course_id, counts)) in series.iter().enumerate() {
            if self.is_cancelled() {
                info!("Forecast run cancelled after {} course(s)", completed);
                return Err(ForecastError::Cancelled { completed });
            }
            if counts.is_empty() {
                continue;
            }

            match self.forecast_course(course_id, counts) {
                Ok(result) => report.results.push(result),
                Err(error) => match policy {
                    FailurePolicy::Abort => {
                        return Err(ForecastError::Course {
                            course_id: course_id.to_string(),
                            source: error,
                        })
                    }
                    FailurePolicy::Collect => {
                        warn!("Skipping course '{}': {}", course_id, error);
                        report.failures.push(CourseFailure {
                            course_id: course_id.to_string(),
                            error,
                        });
                    }
                },
            }
        }

        info!(
            "Forecast run finished: {} forecast(s), {} failure(s)",
            report.results.len(),
            report.failures.len()
        );
        Ok(report)
    }

    fn forecast_course(&self, course_id: &str, counts: &[u32]) -> Result<ForecastResult, TrendError> {
        // The model lives only for this course and is dropped before the next one.
        let mut model = self.factory.create();
        model.fit(counts)?;
        let raw = model.predict(counts.len())?;
        let enrollment = to_enrollment(raw)?;

        let result = ForecastResult::new(course_id, enrollment, self.capacity);
        debug!(
            "Course '{}': {} observation(s), raw={:.3}, enrollment={}, sections={}",
            course_id,
            counts.len(),
            raw,
            result.predicted_enrollment(),
            result.predicted_sections()
        );
        Ok(result)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }
}

/// Forecast every course with the default linear trend model.
///
/// Fails with [`ForecastError::InvalidConfiguration`] before any training when
/// `capacity` is zero.
///
/// # Examples
///
/// ```
/// use course_forecast::algorithms::forecast::forecast;
/// use course_forecast::core::domain::CourseSeries;
///
/// let mut series = CourseSeries::new();
/// for (term, count) in [("1", 10), ("2", 12), ("3", 14)] {
///     series.push("C1", term, count);
/// }
/// series.push("C2", "1", 5);
///
/// let results = forecast(&series, 30).unwrap();
/// assert_eq!(results.len(), 2);
/// assert_eq!(results[0].course_id(), "C1");
/// assert!(results[0].predicted_enrollment() >= 14);
/// assert_eq!(results[1].predicted_sections(), 1);
/// ```
pub fn forecast(series: &CourseSeries, capacity: u32) -> ForecastOutcome<Vec<ForecastResult>> {
    let capacity = SectionCapacity::new(capacity)?;
    Forecaster::linear(capacity).forecast(series)
}
