use log::info;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::path::Path;

use crate::algorithms::forecast::{CancelFlag, ForecastReport, Forecaster};
use crate::algorithms::trend::LinearTrendModel;
use crate::config::ForecastConfig;
use crate::core::domain::{CourseSeries, ForecastResult, HistoricalRecord};
use crate::core::error::{ForecastError, ForecastOutcome};
use crate::parsing::csv_parser::{self, ParsedRecords};
use crate::preprocessing::grouper;

/// Result of one forecast run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRun {
    pub rows_read: usize,
    pub records_used: usize,
    pub courses: usize,
    pub report: ForecastReport,
}

impl ForecastRun {
    pub fn results(&self) -> &[ForecastResult] {
        &self.report.results
    }
}

/// End-to-end forecast pipeline: parse, group, then forecast each course
pub struct ForecastPipeline {
    config: ForecastConfig,
    cancel: Option<CancelFlag>,
}

impl ForecastPipeline {
    /// Create a new pipeline with default configuration
    pub fn new() -> Self {
        Self {
            config: ForecastConfig::default(),
            cancel: None,
        }
    }

    /// Create a pipeline with custom configuration
    pub fn with_config(config: ForecastConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Stop between courses once `flag` is raised
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Run a forecast over an enrollment CSV file
    ///
    /// # Arguments
    /// * `csv_path` - Path to the historical enrollment CSV
    ///
    /// # Returns
    /// ForecastRun with per-course results and row statistics
    pub fn process(&self, csv_path: &Path) -> ForecastOutcome<ForecastRun> {
        // Configuration problems stop the run before the input is even read.
        self.config.validate()?;
        let parsed = csv_parser::parse_enrollment_csv(csv_path)?;
        self.process_parsed(parsed)
    }

    /// Run a forecast over CSV text (useful for testing or API usage)
    pub fn process_csv_str(&self, csv: &str) -> ForecastOutcome<ForecastRun> {
        self.config.validate()?;
        let parsed = csv_parser::parse_enrollment_csv_str(csv)?;
        self.process_parsed(parsed)
    }

    /// Run a forecast over an already loaded DataFrame
    pub fn process_dataframe(&self, df: &DataFrame) -> ForecastOutcome<ForecastRun> {
        self.config.validate()?;
        let parsed = csv_parser::dataframe_to_records(df)?;
        self.process_parsed(parsed)
    }

    /// Run a forecast over records that were parsed elsewhere
    pub fn process_records(&self, records: Vec<HistoricalRecord>) -> ForecastOutcome<ForecastRun> {
        self.config.validate()?;
        let rows_read = records.len();
        self.process_parsed(ParsedRecords { records, rows_read })
    }

    fn process_parsed(&self, parsed: ParsedRecords) -> ForecastOutcome<ForecastRun> {
        // Step 1: Group into per-course series
        let series = self.group(&parsed.records);

        // Step 2: Train and predict course by course
        let report = self.forecast(&series)?;

        // Step 3: Collect statistics
        let run = ForecastRun {
            rows_read: parsed.rows_read,
            records_used: parsed.records.len(),
            courses: series.len(),
            report,
        };
        info!(
            "Forecast run complete: {} row(s) read, {} used, {} course(s), {} forecast(s)",
            run.rows_read,
            run.records_used,
            run.courses,
            run.report.results.len()
        );

        Ok(run)
    }

    fn group(&self, records: &[HistoricalRecord]) -> CourseSeries {
        let mut series = grouper::group_records(records);
        if self.config.forecast.sort_by_term {
            grouper::sort_chronologically(&mut series);
        }
        series
    }

    fn forecast(&self, series: &CourseSeries) -> ForecastOutcome<ForecastReport> {
        let params = self.config.trend;
        let mut forecaster = Forecaster::new(self.config.section_capacity(), move || {
            LinearTrendModel::new(params)
        });
        if let Some(flag) = &self.cancel {
            forecaster = forecaster.with_cancel_flag(flag.clone());
        }

        forecaster.run(series, self.config.forecast.failure_policy)
    }
}

impl Default for ForecastPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to forecast an enrollment CSV file
pub fn forecast_file(csv_path: &Path, config: ForecastConfig) -> ForecastOutcome<ForecastRun> {
    ForecastPipeline::with_config(config).process(csv_path)
}

/// Convenience function returning only the results, failing on any course error
pub fn forecast_csv_str(csv: &str, config: ForecastConfig) -> ForecastOutcome<Vec<ForecastResult>> {
    let run = ForecastPipeline::with_config(config).process_csv_str(csv)?;
    match run.report.failures.into_iter().next() {
        Some(failure) => Err(ForecastError::Course {
            course_id: failure.course_id,
            source: failure.error,
        }),
        None => Ok(run.report.results),
    }
}
