use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RegressionError {
    #[error("cannot fit a regression without samples")]
    NoSamples,
    #[error("feature and target lengths differ: {features} vs {targets}")]
    LengthMismatch { features: usize, targets: usize },
}

/// Ordinary least squares with one feature and an intercept:
/// `y = slope * x + intercept`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct LinearRegression {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearRegression {
    /// Fits the closed-form OLS solution on centered data.
    ///
    /// When the feature has zero variance the minimum-norm solution is
    /// returned: slope 0 and the mean target as intercept.
    pub fn fit(features: &[f64], targets: &[f64]) -> Result<Self, RegressionError> {
        if features.len() != targets.len() {
            return Err(RegressionError::LengthMismatch {
                features: features.len(),
                targets: targets.len(),
            });
        }
        if features.is_empty() {
            return Err(RegressionError::NoSamples);
        }

        let n = features.len() as f64;
        let x_mean = features.iter().sum::<f64>() / n;
        let y_mean = targets.iter().sum::<f64>() / n;

        let (sxx, sxy) = features
            .iter()
            .zip(targets)
            .fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
                let dx = x - x_mean;
                (sxx + dx * dx, sxy + dx * (y - y_mean))
            });

        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        let intercept = y_mean - slope * x_mean;

        debug!(
            "Fitted OLS on {} samples - slope: {:.6}, intercept: {:.6}",
            features.len(),
            slope,
            intercept
        );

        Ok(LinearRegression { slope, intercept })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Coefficient of determination on the given samples. `None` when the
    /// targets have no variance.
    pub fn r_squared(&self, features: &[f64], targets: &[f64]) -> Option<f64> {
        if targets.is_empty() {
            return None;
        }
        let y_mean = targets.iter().sum::<f64>() / targets.len() as f64;
        let ss_tot: f64 = targets.iter().map(|y| (y - y_mean).powi(2)).sum();
        if ss_tot == 0.0 {
            return None;
        }
        let ss_res: f64 = features
            .iter()
            .zip(targets)
            .map(|(x, y)| (y - self.predict(*x)).powi(2))
            .sum();
        Some(1.0 - ss_res / ss_tot)
    }
}
