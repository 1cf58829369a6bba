//! Univariate linear trend model trained by gradient descent.
//!
//! The model maps an observation's zero-based position in its course series to an
//! enrollment count: `y = slope * x + intercept`. Training runs a fixed number of
//! full-batch SGD steps on the mean squared error, starting from zero weights, so
//! identical input always yields identical output.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::error::TrendError;

/// A trainable scalar regressor over the ordinal index of a course series.
pub trait TrendModel {
    /// Train on an ordered series; the feature of `series[i]` is `i`.
    fn fit(&mut self, series: &[u32]) -> Result<(), TrendError>;

    /// Continuous model output at the given ordinal index.
    fn predict(&self, index: usize) -> Result<f64, TrendError>;
}

/// Produces a fresh, untrained model for each course.
pub trait TrendModelFactory {
    type Model: TrendModel;

    fn create(&self) -> Self::Model;
}

impl<F, M> TrendModelFactory for F
where
    F: Fn() -> M,
    M: TrendModel,
{
    type Model = M;

    fn create(&self) -> M {
        self()
    }
}

/// Training hyperparameters for [`LinearTrendModel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendParams {
    /// Full passes over the series.
    pub epochs: usize,
    /// SGD step size.
    pub learning_rate: f64,
    /// Cap the step at `1 / λmax` of the loss Hessian for the series being fit.
    /// With the cap off, a rate that is too large for a series fails with
    /// [`TrendError::Diverged`].
    pub limit_step: bool,
}

impl TrendParams {
    pub const DEFAULT_EPOCHS: usize = 100;
    pub const DEFAULT_LEARNING_RATE: f64 = 0.01;
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            epochs: Self::DEFAULT_EPOCHS,
            learning_rate: Self::DEFAULT_LEARNING_RATE,
            limit_step: true,
        }
    }
}

/// Fitted parameters of a linear trend.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrendWeights {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendWeights {
    fn evaluate(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    fn is_finite(&self) -> bool {
        self.slope.is_finite() && self.intercept.is_finite()
    }
}

/// Single-input, single-output linear unit.
#[derive(Debug, Clone, Default)]
pub struct LinearTrendModel {
    params: TrendParams,
    weights: Option<TrendWeights>,
}

impl LinearTrendModel {
    pub fn new(params: TrendParams) -> Self {
        Self {
            params,
            weights: None,
        }
    }

    /// Fitted weights, or `None` before a successful `fit`.
    pub fn weights(&self) -> Option<TrendWeights> {
        self.weights
    }

    pub fn params(&self) -> TrendParams {
        self.params
    }

    /// Step size used when fitting a series of `len` observations.
    pub fn step_size(&self, len: usize) -> f64 {
        if self.params.limit_step {
            self.params.learning_rate.min(1.0 / max_curvature(len))
        } else {
            self.params.learning_rate
        }
    }
}

/// Largest eigenvalue of the MSE Hessian over features `0..len`.
///
/// The Hessian is `2/n * [[Σx², Σx], [Σx, n]]` and does not depend on the targets.
fn max_curvature(len: usize) -> f64 {
    let n = len as f64;
    let sum_x: f64 = (0..len).map(|i| i as f64).sum();
    let sum_x2: f64 = (0..len).map(|i| (i as f64).powi(2)).sum();

    let a = 2.0 * sum_x2 / n;
    let b = 2.0 * sum_x / n;
    let c = 2.0;
    (a + c) / 2.0 + (((a - c) / 2.0).powi(2) + b * b).sqrt()
}

impl TrendModel for LinearTrendModel {
    fn fit(&mut self, series: &[u32]) -> Result<(), TrendError> {
        if series.is_empty() {
            return Err(TrendError::DegenerateSeries);
        }
        self.weights = None;

        let n = series.len() as f64;
        let xs: Vec<f64> = (0..series.len()).map(|i| i as f64).collect();
        let ys: Vec<f64> = series.iter().map(|&y| f64::from(y)).collect();

        // Zero weights predict zero everywhere, so their loss is the mean of y^2.
        // Plain gradient descent never exceeds it unless the step size is unstable.
        let baseline_loss = ys.iter().map(|y| y * y).sum::<f64>() / n;

        let step = self.step_size(series.len());
        let mut weights = TrendWeights::default();
        for epoch in 0..self.params.epochs {
            let (mut grad_slope, mut grad_intercept, mut loss) = (0.0, 0.0, 0.0);
            for (&x, &y) in xs.iter().zip(&ys) {
                let residual = weights.evaluate(x) - y;
                grad_slope += residual * x;
                grad_intercept += residual;
                loss += residual * residual;
            }
            if !(loss / n <= baseline_loss) {
                return Err(TrendError::Diverged { epoch });
            }

            // d/dw mean((wx + b - y)^2) = 2/n * sum((wx + b - y) * x)
            weights.slope -= step * 2.0 * grad_slope / n;
            weights.intercept -= step * 2.0 * grad_intercept / n;
        }

        let final_loss = mean_squared_error(weights, &xs, &ys);
        if !weights.is_finite() || !(final_loss <= baseline_loss) {
            return Err(TrendError::Diverged {
                epoch: self.params.epochs,
            });
        }

        debug!(
            "Fitted trend over {} observation(s) with step {}: slope={:.4}, intercept={:.4}",
            series.len(),
            step,
            weights.slope,
            weights.intercept
        );
        self.weights = Some(weights);
        Ok(())
    }

    fn predict(&self, index: usize) -> Result<f64, TrendError> {
        let weights = self.weights.ok_or(TrendError::NotFitted)?;
        let value = weights.evaluate(index as f64);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(TrendError::NonFinitePrediction(value))
        }
    }
}

fn mean_squared_error(weights: TrendWeights, xs: &[f64], ys: &[f64]) -> f64 {
    let total: f64 = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (weights.evaluate(x) - y).powi(2))
        .sum();
    total / xs.len() as f64
}

/// Convert a raw prediction to an enrollment count.
///
/// Negative values clamp to zero, then the value is rounded half away from zero,
/// which on non-negative input is round-half-up. Values beyond `u32::MAX` saturate.
///
/// # Examples
///
/// ```
/// use course_forecast::algorithms::trend::to_enrollment;
///
/// assert_eq!(to_enrollment(-3.2).unwrap(), 0);
/// assert_eq!(to_enrollment(19.5).unwrap(), 20);
/// assert_eq!(to_enrollment(19.49).unwrap(), 19);
/// assert!(to_enrollment(f64::NAN).is_err());
/// ```
pub fn to_enrollment(prediction: f64) -> Result<u32, TrendError> {
    if !prediction.is_finite() {
        return Err(TrendError::NonFinitePrediction(prediction));
    }
    Ok(prediction.max(0.0).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted(series: &[u32]) -> LinearTrendModel {
        let mut model = LinearTrendModel::new(TrendParams::default());
        model.fit(series).expect("fit should succeed");
        model
    }

    #[test]
    fn test_fit_rejects_empty_series() {
        let mut model = LinearTrendModel::default();
        assert_eq!(model.fit(&[]), Err(TrendError::DegenerateSeries));
        assert!(model.weights().is_none());
    }

    #[test]
    fn test_predict_before_fit() {
        let model = LinearTrendModel::new(TrendParams::default());
        assert_eq!(model.predict(0), Err(TrendError::NotFitted));
    }

    #[test]
    fn test_single_observation_is_not_degenerate() {
        let model = fitted(&[5]);
        let weights = model.weights().unwrap();
        // Index 0 carries no slope gradient.
        assert_eq!(weights.slope, 0.0);
        let prediction = model.predict(1).unwrap();
        assert!(prediction > 0.0 && prediction <= 5.0, "{}", prediction);
        assert_eq!(to_enrollment(prediction).unwrap(), 4);
    }

    #[test]
    fn test_increasing_series_trends_upward() {
        let model = fitted(&[10, 12, 14]);
        let weights = model.weights().unwrap();
        assert!(weights.slope > 0.0);

        let prediction = model.predict(3).unwrap();
        assert!(prediction >= 14.0, "{}", prediction);
        assert_eq!(to_enrollment(prediction).unwrap(), 20);
    }

    #[test]
    fn test_all_zero_series_predicts_zero() {
        let model = fitted(&[0, 0, 0]);
        assert_eq!(model.weights(), Some(TrendWeights::default()));
        assert_eq!(to_enrollment(model.predict(3).unwrap()).unwrap(), 0);
    }

    #[test]
    fn test_decreasing_series_trends_downward() {
        let model = fitted(&[100, 80, 60, 40, 20, 0]);
        assert!(model.weights().unwrap().slope < 0.0);
        assert_eq!(to_enrollment(model.predict(6).unwrap()).unwrap(), 17);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let series = [25, 28, 31, 29, 35, 40, 38, 42];
        let a = fitted(&series).predict(series.len()).unwrap();
        let b = fitted(&series).predict(series.len()).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_refit_discards_previous_weights() {
        let mut model = fitted(&[10, 12, 14]);
        assert_eq!(model.fit(&[]), Err(TrendError::DegenerateSeries));
        assert_eq!(model.predict(0), Err(TrendError::NotFitted));
    }

    #[test]
    fn test_long_series_stays_stable_with_default_step() {
        for len in [18u32, 19, 20, 24, 40, 120] {
            let series: Vec<u32> = (0..len).map(|i| 30 + i).collect();
            let model = fitted(&series);
            let enrollment = to_enrollment(model.predict(series.len()).unwrap()).unwrap();
            assert!(
                enrollment >= 29 + len,
                "len={} enrollment={}",
                len,
                enrollment
            );
        }
    }

    #[test]
    fn test_flat_long_series_forecasts_finite() {
        let model = fitted(&[50; 20]);
        let prediction = model.predict(20).unwrap();
        assert!(prediction.is_finite() && prediction > 0.0, "{}", prediction);
    }

    #[test]
    fn test_step_is_capped_only_for_long_series() {
        let model = LinearTrendModel::default();
        assert_eq!(model.step_size(3), TrendParams::DEFAULT_LEARNING_RATE);
        assert_eq!(model.step_size(8), TrendParams::DEFAULT_LEARNING_RATE);
        assert!(model.step_size(20) < TrendParams::DEFAULT_LEARNING_RATE);
        assert!(model.step_size(200) < model.step_size(20));
    }

    #[test]
    fn test_uncapped_step_diverges_on_long_series() {
        let mut model = LinearTrendModel::new(TrendParams {
            limit_step: false,
            ..TrendParams::default()
        });
        let result = model.fit(&[50; 20]);
        assert!(matches!(result, Err(TrendError::Diverged { .. })), "{:?}", result);
        assert!(model.weights().is_none());
    }

    #[test]
    fn test_uncapped_smaller_step_converges_on_long_series() {
        let mut model = LinearTrendModel::new(TrendParams {
            learning_rate: 0.001,
            limit_step: false,
            ..TrendParams::default()
        });
        model.fit(&[50; 20]).unwrap();
        assert!(model.predict(20).unwrap().is_finite());
    }

    #[test]
    fn test_zero_epochs_leave_zero_weights() {
        let mut model = LinearTrendModel::new(TrendParams {
            epochs: 0,
            ..TrendParams::default()
        });
        model.fit(&[7, 8]).unwrap();
        assert_eq!(model.predict(2).unwrap(), 0.0);
    }

    #[test]
    fn test_to_enrollment_rounding() {
        assert_eq!(to_enrollment(0.0).unwrap(), 0);
        assert_eq!(to_enrollment(-0.4).unwrap(), 0);
        assert_eq!(to_enrollment(0.5).unwrap(), 1);
        assert_eq!(to_enrollment(2.5).unwrap(), 3);
        assert_eq!(to_enrollment(1e12).unwrap(), u32::MAX);
        assert!(to_enrollment(f64::INFINITY).is_err());
    }

    #[test]
    fn test_closure_factory_creates_fresh_models() {
        let factory = || LinearTrendModel::new(TrendParams::default());
        let mut first = factory.create();
        first.fit(&[1, 2, 3]).unwrap();
        let second = factory.create();
        assert!(second.weights().is_none());
    }
}
