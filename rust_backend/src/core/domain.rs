//! Domain models for historical enrollment and per-course forecasts.
//!
//! This module provides the core data structures that flow through a forecast run:
//! normalized enrollment observations, per-course ordered series, the section
//! capacity setting, and the forecast emitted for each course.

use std::collections::HashMap;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::error::{ForecastError, ForecastOutcome};

/// A single normalized enrollment observation.
///
/// Produced by the record parser only when the enrollment field holds a valid
/// non-negative integer; rows that fail parsing never become records.
///
/// # Examples
///
/// ```
/// use course_forecast::core::domain::HistoricalRecord;
///
/// let record = HistoricalRecord::new("2023-1", "CS101", 42);
/// assert_eq!(record.course_id, "CS101");
/// assert_eq!(record.enrollment_count, 42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub term: String,
    pub course_id: String,
    pub enrollment_count: u32,
}

impl HistoricalRecord {
    /// Creates a new record.
    pub fn new(term: impl Into<String>, course_id: impl Into<String>, enrollment_count: u32) -> Self {
        Self {
            term: term.into(),
            course_id: course_id.into(),
            enrollment_count,
        }
    }
}

/// The observations collected for one course, in series order.
///
/// `terms[i]` is the term label of the observation whose count is `counts[i]`.
/// Both vectors always have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseHistory {
    pub course_id: String,
    pub terms: Vec<String>,
    pub counts: Vec<u32>,
}

impl CourseHistory {
    fn new(course_id: &str) -> Self {
        Self {
            course_id: course_id.to_string(),
            terms: Vec::new(),
            counts: Vec::new(),
        }
    }

    /// Number of observations in this course's series.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns `true` if the course has no observations.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Mapping from course identifier to its ordered enrollment series.
///
/// Courses are kept in first-appearance order, which is the order forecasts are
/// emitted in. Every course held here has at least one observation.
///
/// # Examples
///
/// ```
/// use course_forecast::core::domain::CourseSeries;
///
/// let mut series = CourseSeries::new();
/// series.push("C1", "2022-1", 10);
/// series.push("C2", "2022-1", 5);
/// series.push("C1", "2022-2", 12);
///
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.get("C1"), Some(&[10, 12][..]));
/// assert_eq!(series.course_ids().collect::<Vec<_>>(), vec!["C1", "C2"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseSeries {
    courses: Vec<CourseHistory>,
    index: HashMap<String, usize>,
}

impl CourseSeries {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping from pre-assembled histories.
    ///
    /// Histories with no observations are omitted. A course identifier that appears
    /// more than once has its observations appended to its first occurrence.
    pub fn from_histories(histories: impl IntoIterator<Item = CourseHistory>) -> Self {
        let mut series = Self::new();
        for history in histories.into_iter().filter(|h| !h.is_empty()) {
            for (term, count) in history.terms.iter().zip(&history.counts) {
                series.push(&history.course_id, term, *count);
            }
        }
        series
    }

    /// Appends one observation to a course, creating the course on first occurrence.
    pub fn push(&mut self, course_id: &str, term: &str, count: u32) {
        let position = match self.index.get(course_id) {
            Some(&position) => position,
            None => {
                self.courses.push(CourseHistory::new(course_id));
                let position = self.courses.len() - 1;
                self.index.insert(course_id.to_string(), position);
                position
            }
        };

        let history = &mut self.courses[position];
        history.terms.push(term.to_string());
        history.counts.push(count);
    }

    /// Returns the ordered counts for a course, if present.
    pub fn get(&self, course_id: &str) -> Option<&[u32]> {
        self.index
            .get(course_id)
            .map(|&position| self.courses[position].counts.as_slice())
    }

    /// Number of distinct courses.
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Total number of observations across all courses.
    pub fn observation_count(&self) -> usize {
        self.courses.iter().map(CourseHistory::len).sum()
    }

    /// Course identifiers in first-appearance order.
    pub fn course_ids(&self) -> impl Iterator<Item = &str> {
        self.courses.iter().map(|h| h.course_id.as_str())
    }

    /// Iterates `(course_id, counts)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u32])> {
        self.courses
            .iter()
            .map(|h| (h.course_id.as_str(), h.counts.as_slice()))
    }

    /// Full per-course histories, including term labels.
    pub fn histories(&self) -> &[CourseHistory] {
        &self.courses
    }

    /// Mutable access for in-place reordering of each course's observations.
    ///
    /// Course order and identifiers cannot be changed through this slice's items
    /// without breaking the index, so callers must only reorder within a history.
    pub(crate) fn histories_mut(&mut self) -> &mut [CourseHistory] {
        &mut self.courses
    }
}

/// Maximum number of students permitted in one course section.
///
/// Always a positive integer. The default capacity is 30.
///
/// # Examples
///
/// ```
/// use course_forecast::core::domain::SectionCapacity;
///
/// let capacity = SectionCapacity::new(30).unwrap();
/// assert_eq!(capacity.sections_for(0), 0);
/// assert_eq!(capacity.sections_for(30), 1);
/// assert_eq!(capacity.sections_for(31), 2);
///
/// assert!(SectionCapacity::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct SectionCapacity(NonZeroU32);

const DEFAULT_CAPACITY: NonZeroU32 = match NonZeroU32::new(SectionCapacity::DEFAULT) {
    Some(capacity) => capacity,
    None => panic!("default capacity must be non-zero"),
};

impl SectionCapacity {
    pub const DEFAULT: u32 = 30;

    /// Creates a capacity, rejecting zero.
    pub fn new(value: u32) -> ForecastOutcome<Self> {
        NonZeroU32::new(value).map(Self).ok_or_else(|| {
            ForecastError::InvalidConfiguration(
                "section capacity must be a positive integer, got 0".to_string(),
            )
        })
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Number of sections needed to host `enrollment` students: `ceil(enrollment / capacity)`.
    pub fn sections_for(self, enrollment: u32) -> u32 {
        enrollment.div_ceil(self.get())
    }
}

impl Default for SectionCapacity {
    fn default() -> Self {
        Self(DEFAULT_CAPACITY)
    }
}

impl TryFrom<i64> for SectionCapacity {
    type Error = ForecastError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let value = u32::try_from(value).map_err(|_| {
            ForecastError::InvalidConfiguration(format!(
                "section capacity must be a positive integer, got {}",
                value
            ))
        })?;
        Self::new(value)
    }
}

impl From<SectionCapacity> for u32 {
    fn from(capacity: SectionCapacity) -> Self {
        capacity.get()
    }
}

impl std::fmt::Display for SectionCapacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Predicted next-term enrollment and section count for one course.
///
/// `predicted_sections` is derived from `predicted_enrollment` and the run's
/// [`SectionCapacity`]; it cannot be set independently.
///
/// # Examples
///
/// ```
/// use course_forecast::core::domain::{ForecastResult, SectionCapacity};
///
/// let result = ForecastResult::new("CS101", 61, SectionCapacity::default());
/// assert_eq!(result.predicted_enrollment(), 61);
/// assert_eq!(result.predicted_sections(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    #[serde(rename = "courseCode")]
    course_id: String,
    predicted_enrollment: u32,
    predicted_sections: u32,
}

impl ForecastResult {
    pub fn new(course_id: impl Into<String>, predicted_enrollment: u32, capacity: SectionCapacity) -> Self {
        Self {
            course_id: course_id.into(),
            predicted_enrollment,
            predicted_sections: capacity.sections_for(predicted_enrollment),
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn predicted_enrollment(&self) -> u32 {
        self.predicted_enrollment
    }

    pub fn predicted_sections(&self) -> u32 {
        self.predicted_sections
    }
}
