// src/utils/presentation.rs

use crate::models::signal::LONG_WINDOW;
use crate::models::{Currency, PredictionResult, SignalResult};

/// Rows shown in the latest-data preview.
pub const PREVIEW_ROWS: usize = 5;

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter stock symbol";
pub const NO_DATA_MESSAGE: &str = "Invalid stock symbol or no data available";
pub const PREDICTION_UNAVAILABLE_MESSAGE: &str = "Not enough data for prediction";

pub fn format_predicted_price(currency: Currency, prediction: &PredictionResult) -> String {
    format!(
        "Next Day Predicted Price: {}{:.2}",
        currency.symbol(),
        prediction.predicted_next_close
    )
}

pub fn format_expected_change(prediction: &PredictionResult) -> String {
    if prediction.percent_change.is_finite() {
        format!("Expected change: {:+.2}%", prediction.percent_change)
    } else {
        "Expected change: n/a".to_string()
    }
}

pub fn format_signal(signal: SignalResult) -> String {
    match signal {
        SignalResult::Buy => "BUY Signal (Golden Cross)".to_string(),
        SignalResult::Sell => "SELL Signal (Death Cross)".to_string(),
        SignalResult::InsufficientData { records } if records < LONG_WINDOW => format!(
            "Need {}+ days of data for signals (have {} days)",
            LONG_WINDOW, records
        ),
        SignalResult::InsufficientData { .. } => {
            "Not enough data for moving average signals".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(predicted: f64, current: f64) -> PredictionResult {
        PredictionResult {
            predicted_next_close: predicted,
            current_close: current,
            percent_change: (predicted - current) / current * 100.0,
            slope: 1.0,
            intercept: 0.0,
        }
    }

    #[test]
    fn prediction_lines() {
        let p = prediction(20.0, 18.0);
        assert_eq!(format_predicted_price(Currency::Dollar, &p), "Next Day Predicted Price: $20.00");
        assert_eq!(format_expected_change(&p), "Expected change: +11.11%");

        let p = prediction(2450.5, 2500.0);
        assert_eq!(format_predicted_price(Currency::Rupee, &p), "Next Day Predicted Price: ₹2450.50");
        assert_eq!(format_expected_change(&p), "Expected change: -1.98%");
    }

    #[test]
    fn change_from_a_zero_close_is_not_a_number() {
        assert_eq!(format_expected_change(&prediction(-1.0, 0.0)), "Expected change: n/a");
        assert_eq!(format_expected_change(&prediction(0.0, 0.0)), "Expected change: n/a");
    }

    #[test]
    fn signal_lines() {
        assert_eq!(format_signal(SignalResult::Buy), "BUY Signal (Golden Cross)");
        assert_eq!(format_signal(SignalResult::Sell), "SELL Signal (Death Cross)");
        assert_eq!(
            format_signal(SignalResult::InsufficientData { records: 120 }),
            "Need 200+ days of data for signals (have 120 days)"
        );
        assert_eq!(
            format_signal(SignalResult::InsufficientData { records: 480 }),
            "Not enough data for moving average signals"
        );
    }
}
