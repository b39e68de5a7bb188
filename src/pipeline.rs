// src/pipeline.rs

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::models::{predict, signal, Currency, MarketData, PredictionError, PredictionResult, SignalResult};
use crate::utils::presentation::{
    format_expected_change, format_predicted_price, format_signal, EMPTY_INPUT_MESSAGE,
    NO_DATA_MESSAGE, PREDICTION_UNAVAILABLE_MESSAGE, PREVIEW_ROWS,
};
use crate::utils::{fetch, render_close_chart, FetchError, PriceSource};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("ticker is empty")]
    EmptyInput,
    #[error("no data for {ticker}")]
    NoData { ticker: String },
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl PipelineError {
    /// Text shown to the user in place of a report.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::EmptyInput => EMPTY_INPUT_MESSAGE.to_string(),
            PipelineError::NoData { .. } => NO_DATA_MESSAGE.to_string(),
            PipelineError::Fetch(e) => format!("Could not download data: {}", e),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionOutcome {
    Ready {
        result: PredictionResult,
        price_message: String,
        change_message: String,
    },
    InsufficientData {
        pairs: usize,
        message: String,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SignalOutcome {
    pub result: SignalResult,
    pub message: String,
}

/// Everything the page needs to render one Predict request.
#[derive(Debug, Serialize, Clone)]
pub struct Report {
    pub ticker: String,
    pub currency: Currency,
    pub currency_symbol: &'static str,
    pub records: usize,
    pub latest: Vec<MarketData>,
    pub chart_svg: Option<String>,
    pub prediction: PredictionOutcome,
    pub signal: SignalOutcome,
}

/// One Predict action: validate, fetch, then present, predict and signal
/// over the same series.
pub fn run(source: &dyn PriceSource, ticker: &str) -> Result<Report, PipelineError> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let series = fetch(source, ticker)?;
    if series.is_empty() {
        warn!("No data returned for {}", ticker);
        return Err(PipelineError::NoData {
            ticker: ticker.to_string(),
        });
    }

    let currency = Currency::from_ticker(ticker);

    let chart_svg = match render_close_chart(ticker, &series) {
        Ok(svg) => Some(svg),
        Err(e) => {
            warn!("Chart for {} not rendered: {}", ticker, e);
            None
        }
    };

    let prediction = match predict(&series) {
        Ok(result) => PredictionOutcome::Ready {
            price_message: format_predicted_price(currency, &result),
            change_message: format_expected_change(&result),
            result,
        },
        Err(PredictionError::InsufficientData { pairs }) => {
            info!("Skipping prediction for {}: {} training pairs", ticker, pairs);
            PredictionOutcome::InsufficientData {
                pairs,
                message: PREDICTION_UNAVAILABLE_MESSAGE.to_string(),
            }
        }
        Err(e) => {
            warn!("Prediction for {} failed: {}", ticker, e);
            PredictionOutcome::Failed {
                message: format!("Prediction failed: {}", e),
            }
        }
    };

    let signal_result = signal(&series);
    info!("Signal for {}: {:?}", ticker, signal_result);

    Ok(Report {
        ticker: ticker.to_string(),
        currency,
        currency_symbol: currency.symbol(),
        records: series.len(),
        latest: series.tail(PREVIEW_ROWS).to_vec(),
        chart_svg,
        prediction,
        signal: SignalOutcome {
            result: signal_result,
            message: format_signal(signal_result),
        },
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::NaiveDate;

    use crate::utils::data_processing::{ColumnKey, RawFrame};
    use crate::utils::{FetchError, PriceSource};

    /// Serves the same closes for every ticker and counts downloads.
    pub struct FixedSource {
        pub closes: Vec<Option<f64>>,
        pub calls: AtomicUsize,
    }

    impl FixedSource {
        pub fn new(closes: Vec<f64>) -> Self {
            Self::with_gaps(closes.into_iter().map(Some).collect())
        }

        /// `None` entries become trading days without a close.
        pub fn with_gaps(closes: Vec<Option<f64>>) -> Self {
            FixedSource {
                closes,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PriceSource for FixedSource {
        fn download(&self, ticker: &str, _range: &str, _interval: &str) -> Result<RawFrame, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
            let index = (0..self.closes.len())
                .map(|i| start + chrono::Days::new(i as u64))
                .collect();
            let key = |field: &str| ColumnKey(vec![field.to_string(), ticker.to_string()]);
            Ok(RawFrame {
                index,
                columns: vec![
                    (key("Close"), self.closes.clone()),
                    (key("Volume"), vec![Some(1_000.0); self.closes.len()]),
                ],
            })
        }
    }

    /// Always fails as an unreachable upstream would.
    pub struct FailingSource;

    impl PriceSource for FailingSource {
        fn download(&self, _ticker: &str, _range: &str, _interval: &str) -> Result<RawFrame, FetchError> {
            Err(FetchError::Status(503))
        }
    }
}
