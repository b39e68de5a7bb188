// src/models/mod.rs

pub mod predictor;
pub mod regression;
pub mod signal;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily bar, holding whatever the upstream table carried for that day.
/// A missing close is kept so gaps stay visible to pairing and averaging.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MarketData {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Daily bars ordered by date, one per date.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct PriceSeries {
    records: Vec<MarketData>,
}

impl PriceSeries {
    /// Builds a series from bars in any order. When a date appears more than
    /// once the bar that came last in `records` wins.
    pub fn from_records(records: Vec<MarketData>) -> Self {
        let mut records = records;
        // Stable sort keeps the input order among equal dates.
        records.sort_by_key(|bar| bar.date);

        let mut deduped: Vec<MarketData> = Vec::with_capacity(records.len());
        for bar in records {
            match deduped.last_mut() {
                Some(prev) if prev.date == bar.date => *prev = bar,
                _ => deduped.push(bar),
            }
        }

        PriceSeries { records: deduped }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MarketData] {
        &self.records
    }

    /// Closes in date order, `NaN` where the bar has none.
    pub fn closes(&self) -> Vec<f64> {
        self.records
            .iter()
            .map(|bar| bar.close.unwrap_or(f64::NAN))
            .collect()
    }

    /// The most recent finite close.
    pub fn last_close(&self) -> Option<f64> {
        self.records
            .iter()
            .rev()
            .find_map(|bar| bar.close.filter(|c| c.is_finite()))
    }

    /// The most recent `n` bars, oldest first.
    pub fn tail(&self, n: usize) -> &[MarketData] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }
}

/// Output of the next-day predictor.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PredictionResult {
    pub predicted_next_close: f64,
    pub current_close: f64,
    pub percent_change: f64,
    pub slope: f64,
    pub intercept: f64,
}

/// Moving-average crossover verdict for the latest bar.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalResult {
    Buy,
    Sell,
    InsufficientData { records: usize },
}

/// Display symbol picked from the ticker's exchange suffix.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Rupee,
    Dollar,
}

impl Currency {
    /// `.NS` (NSE) and `.BO` (BSE) listings are quoted in rupees; anything
    /// else is shown in dollars.
    pub fn from_ticker(ticker: &str) -> Self {
        if ticker.ends_with(".NS") || ticker.ends_with(".BO") {
            Currency::Rupee
        } else {
            Currency::Dollar
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Rupee => "₹",
            Currency::Dollar => "$",
        }
    }
}

pub use predictor::{predict, PredictionError};
pub use regression::LinearRegression;
pub use signal::signal;
