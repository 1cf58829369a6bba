use log::{debug, info};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::algorithms::forecast::CancelFlag;
use crate::config::ForecastConfig;
use crate::core::domain::HistoricalRecord;
use crate::core::error::{ForecastError, ForecastOutcome};
use crate::preprocessing::pipeline::{ForecastPipeline, ForecastRun};

/// Runs forecasts off the async executor, one live run at a time.
///
/// Cloning a session shares its current run, so a submit through any clone
/// supersedes runs started through the others. Runs never overlap: a new run
/// waits on the blocking pool until the run it superseded has returned.
#[derive(Clone)]
pub struct ForecastSession {
    config: ForecastConfig,
    current: Arc<Mutex<Option<CancelFlag>>>,
    run_lock: Arc<Mutex<()>>,
}

/// A submitted run.
pub struct RunHandle<T> {
    flag: CancelFlag,
    current: Arc<Mutex<Option<CancelFlag>>>,
    task: JoinHandle<ForecastOutcome<T>>,
}

impl ForecastSession {
    pub fn new(config: ForecastConfig) -> Self {
        Self {
            config,
            current: Arc::new(Mutex::new(None)),
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Start `job` on the blocking pool with a pipeline wired to a fresh cancel
    /// flag, cancelling whatever run was live before.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit<F, T>(&self, job: F) -> RunHandle<T>
    where
        F: FnOnce(ForecastPipeline) -> ForecastOutcome<T> + Send + 'static,
        T: Send + 'static,
    {
        let flag = CancelFlag::new();
        if let Some(previous) = self.current.lock().replace(flag.clone()) {
            info!("Superseding the forecast run in progress");
            previous.cancel();
        }

        let pipeline = ForecastPipeline::with_config(self.config.clone()).with_cancel_flag(flag.clone());
        let run_lock = Arc::clone(&self.run_lock);
        let queued = flag.clone();
        let task = tokio::task::spawn_blocking(move || {
            let _running = run_lock.lock();
            // Superseded while waiting for the previous run.
            if queued.is_cancelled() {
                return Err(ForecastError::Cancelled { completed: 0 });
            }
            job(pipeline)
        });

        RunHandle {
            flag,
            current: Arc::clone(&self.current),
            task,
        }
    }

    /// Forecast from CSV text.
    pub async fn run_csv_str(&self, csv: impl Into<String>) -> ForecastOutcome<ForecastRun> {
        let csv = csv.into();
        self.submit(move |pipeline| pipeline.process_csv_str(&csv))
            .join()
            .await
    }

    /// Forecast from a CSV file.
    pub async fn run_file(&self, path: impl Into<PathBuf>) -> ForecastOutcome<ForecastRun> {
        let path = path.into();
        self.submit(move |pipeline| pipeline.process(&path))
            .join()
            .await
    }

    /// Forecast from records parsed elsewhere.
    pub async fn run_records(&self, records: Vec<HistoricalRecord>) -> ForecastOutcome<ForecastRun> {
        self.submit(move |pipeline| pipeline.process_records(records))
            .join()
            .await
    }

    /// Cancel the live run, if any.
    pub fn cancel_current(&self) {
        if let Some(flag) = self.current.lock().take() {
            flag.cancel();
        }
    }

    /// Whether a submitted run has not yet been joined or cancelled.
    pub fn has_live_run(&self) -> bool {
        self.current.lock().is_some()
    }
}

impl<T> RunHandle<T> {
    /// Cancel this run between courses.
    pub fn cancel(&self) {
        self.flag.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.is_cancelled()
    }

    /// Wait for the run to finish.
    pub async fn join(self) -> ForecastOutcome<T> {
        let outcome = self
            .task
            .await
            .map_err(|e| ForecastError::Internal(format!("Task join error: {}", e)));

        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|live| live.same_flag(&self.flag)) {
            *current = None;
        }
        drop(current);

        if let Ok(Err(ForecastError::Cancelled { completed })) = &outcome {
            debug!("Superseded run stopped after {} course(s)", completed);
        }
        outcome?
    }
}
