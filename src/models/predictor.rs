use log::{debug, info};
use thiserror::Error;

use crate::models::regression::RegressionError;
use crate::models::{LinearRegression, PredictionResult, PriceSeries};
use crate::utils::training_pairs;

/// Fewest `(close_t, close_t+1)` pairs the regression is fitted on.
pub const MIN_TRAINING_PAIRS: usize = 2;

#[derive(Debug, Error, PartialEq)]
pub enum PredictionError {
    #[error("need at least 2 training pairs, have {pairs}")]
    InsufficientData { pairs: usize },
    #[error(transparent)]
    Regression(#[from] RegressionError),
}

/// Fits `close_t+1 = slope * close_t + intercept` on the whole series and
/// applies it to the latest close.
pub fn predict(series: &PriceSeries) -> Result<PredictionResult, PredictionError> {
    let pairs = training_pairs(series);
    if pairs.len() < MIN_TRAINING_PAIRS {
        return Err(PredictionError::InsufficientData { pairs: pairs.len() });
    }

    let (features, targets): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
    let model = LinearRegression::fit(&features, &targets)?;

    if let Some(r2) = model.r_squared(&features, &targets) {
        debug!("In-sample R^2: {:.4}", r2);
    }

    let Some(current_close) = series.last_close() else {
        return Err(PredictionError::InsufficientData { pairs: 0 });
    };
    let predicted_next_close = model.predict(current_close);
    // Not finite when the latest close is zero.
    let percent_change = (predicted_next_close - current_close) / current_close * 100.0;

    info!(
        "Predicted next close {:.4} from {:.4} ({:+.2}%)",
        predicted_next_close, current_close, percent_change
    );

    Ok(PredictionResult {
        predicted_next_close,
        current_close,
        percent_change,
        slope: model.slope,
        intercept: model.intercept,
    })
}
