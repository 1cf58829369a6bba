//! Asynchronous driver for forecast runs.
//!
//! The forecasting core is synchronous and CPU-bound. [`session::ForecastSession`]
//! moves each run onto tokio's blocking pool and keeps at most one run live:
//! submitting a new run cancels the one before it.

pub mod session;

pub use session::{ForecastSession, RunHandle};
