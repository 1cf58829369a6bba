//! Error types for forecast runs.

/// Result type for forecast operations
pub type ForecastOutcome<T> = Result<T, ForecastError>;

/// Failure of a single course's trend model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrendError {
    #[error("Degenerate series: cannot fit a trend to zero observations")]
    DegenerateSeries,

    #[error("Model used for prediction before it was fitted")]
    NotFitted,

    #[error("Training diverged at epoch {epoch}: loss rose above the untrained baseline")]
    Diverged { epoch: usize },

    #[error("Prediction is not a finite number: {0}")]
    NonFinitePrediction(f64),
}

/// Error type for a forecast run.
///
/// Any of these aborts the whole run; row-level parse problems never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Input format error: {0}")]
    InputFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Forecast failed for course '{course_id}': {source}")]
    Course {
        course_id: String,
        #[source]
        source: TrendError,
    },

    #[error("Forecast run cancelled after {completed} course(s)")]
    Cancelled { completed: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ForecastError {
    /// The course whose fit or prediction failed, if this is a per-course failure.
    pub fn course_id(&self) -> Option<&str> {
        match self {
            ForecastError::Course { course_id, .. } => Some(course_id),
            _ => None,
        }
    }
}
