// src/utils/data_processing.rs

use chrono::{DateTime, NaiveDate};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::{MarketData, PriceSeries};

/// Lookback requested from the upstream source.
pub const HISTORY_RANGE: &str = "2y";
/// Bar size requested from the upstream source.
pub const BAR_INTERVAL: &str = "1d";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to market data source failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid market data url: {0}")]
    InvalidUrl(String),
    #[error("market data source answered with status {0}")]
    Status(u16),
    #[error("market data source error {code}: {description}")]
    Upstream { code: String, description: String },
    #[error("malformed market data payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("market data has no {0} column")]
    MissingColumn(&'static str),
    #[error("column {column} has {got} values for {expected} dates")]
    ShapeMismatch {
        column: String,
        expected: usize,
        got: usize,
    },
}

/// Column label of an upstream table, outermost level first. A plain table
/// has one level (`["Close"]`); multi-ticker downloads group columns by
/// field and then by ticker (`["Close", "AAPL"]`).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnKey(pub Vec<String>);

impl ColumnKey {
    /// The outermost level of the label.
    pub fn first_level(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }
}

/// A date-indexed table as delivered by a market data source, before any
/// shape normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    pub index: Vec<NaiveDate>,
    pub columns: Vec<(ColumnKey, Vec<Option<f64>>)>,
}

impl RawFrame {
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Replaces every column label with its outermost level. When several
    /// columns flatten to the same name the first one is kept.
    pub fn flatten_columns(self) -> Vec<(String, Vec<Option<f64>>)> {
        let mut flat: Vec<(String, Vec<Option<f64>>)> = Vec::with_capacity(self.columns.len());
        for (key, values) in self.columns {
            let Some(name) = key.first_level() else {
                warn!("Dropping column with an empty label");
                continue;
            };
            if flat.iter().any(|(existing, _)| existing == name) {
                debug!("Column {:?} flattens onto an existing {} column; keeping the first", key, name);
                continue;
            }
            flat.push((name.to_string(), values));
        }
        flat
    }
}

/// Anything able to deliver daily history for a ticker.
pub trait PriceSource: Send + Sync {
    fn download(&self, ticker: &str, range: &str, interval: &str) -> Result<RawFrame, FetchError>;
}

/// Fetches roughly two years of daily bars for `ticker` and normalizes them.
/// An empty series means the source had nothing for this ticker.
pub fn fetch(source: &dyn PriceSource, ticker: &str) -> Result<PriceSeries, FetchError> {
    info!("Downloading {} of {} bars for {}", HISTORY_RANGE, BAR_INTERVAL, ticker);
    let frame = source.download(ticker, HISTORY_RANGE, BAR_INTERVAL)?;
    let series = normalize(frame)?;
    info!("Received {} daily records for {}", series.len(), ticker);
    Ok(series)
}

/// Turns an upstream table into a `PriceSeries`: flattens nested column
/// labels and requires `Close`. Rows with no value at all are dropped; a row
/// that only lacks its close is kept with `close: None`.
pub fn normalize(frame: RawFrame) -> Result<PriceSeries, FetchError> {
    if frame.is_empty() {
        return Ok(PriceSeries::default());
    }

    let index = frame.index.clone();
    let columns = frame.flatten_columns();

    for (name, values) in &columns {
        if values.len() != index.len() {
            return Err(FetchError::ShapeMismatch {
                column: name.clone(),
                expected: index.len(),
                got: values.len(),
            });
        }
    }

    let column = |name: &str| {
        columns
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, values)| values.as_slice())
    };

    let closes = column("Close").ok_or(FetchError::MissingColumn("Close"))?;
    let open = column("Open");
    let high = column("High");
    let low = column("Low");
    let volume = column("Volume");

    let value_at = |values: Option<&[Option<f64>]>, i: usize| {
        values.and_then(|v| v[i]).filter(|x| x.is_finite())
    };

    let mut records = Vec::with_capacity(index.len());
    let mut dropped = 0;
    let mut missing_close = 0;
    for (i, date) in index.into_iter().enumerate() {
        let bar = MarketData {
            date,
            open: value_at(open, i),
            high: value_at(high, i),
            low: value_at(low, i),
            close: value_at(Some(closes), i),
            volume: value_at(volume, i),
        };
        let fields = [bar.open, bar.high, bar.low, bar.close, bar.volume];
        if fields.iter().all(Option::is_none) {
            dropped += 1;
            continue;
        }
        if bar.close.is_none() {
            missing_close += 1;
        }
        records.push(bar);
    }

    if dropped > 0 {
        debug!("Dropped {} empty rows", dropped);
    }
    if missing_close > 0 {
        warn!("{} rows have no close price", missing_close);
    }

    Ok(PriceSeries::from_records(records))
}

/// `(close_t, close_t+1)` for every pair of adjacent bars where both closes
/// are finite. A gap removes both pairs touching it; no pair spans it.
pub fn training_pairs(series: &PriceSeries) -> Vec<(f64, f64)> {
    series
        .records()
        .windows(2)
        .filter_map(|pair| match (pair[0].close, pair[1].close) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
            _ => None,
        })
        .collect()
}

/// Simple mean of the trailing `window` values. `None` when there are fewer
/// values than the window or any of them is not finite.
pub fn trailing_mean(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    if tail.iter().any(|x| !x.is_finite()) {
        return None;
    }
    Some(tail.iter().sum::<f64>() / window as f64)
}

// Yahoo Finance chart API payload
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartApiError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    pub timestamp: Option<Vec<i64>>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartMeta {
    pub symbol: String,
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
    #[serde(default)]
    pub adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct ChartAdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Converts the payload into a frame whose columns are grouped by
    /// ticker. A "Not Found" error is an empty frame, not a failure.
    pub fn into_frame(self) -> Result<RawFrame, FetchError> {
        if let Some(error) = self.chart.error {
            if error.code.eq_ignore_ascii_case("Not Found") {
                return Ok(RawFrame::default());
            }
            return Err(FetchError::Upstream {
                code: error.code,
                description: error.description,
            });
        }

        let Some(result) = self.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(RawFrame::default());
        };
        let Some(timestamps) = result.timestamp else {
            return Ok(RawFrame::default());
        };

        // Bars are stamped at the session open in UTC; shift to the
        // exchange's local date.
        let offset = result.meta.gmtoffset;
        let mut index = Vec::with_capacity(timestamps.len());
        for ts in timestamps {
            let date = DateTime::from_timestamp(ts + offset, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| FetchError::Upstream {
                    code: "Bad Timestamp".to_string(),
                    description: format!("timestamp {} is out of range", ts),
                })?;
            index.push(date);
        }

        let symbol = result.meta.symbol;
        let key = |field: &str| ColumnKey(vec![field.to_string(), symbol.clone()]);
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

        let mut columns = vec![
            (key("Open"), quote.open),
            (key("High"), quote.high),
            (key("Low"), quote.low),
            (key("Close"), quote.close),
            (key("Volume"), quote.volume),
        ];
        if let Some(adj) = result.indicators.adjclose.into_iter().next() {
            columns.push((key("Adj Close"), adj.adjclose));
        }
        // Absent fields come back as empty arrays; leave them out entirely.
        columns.retain(|(_, values)| !values.is_empty());

        Ok(RawFrame { index, columns })
    }
}

/// Daily history from the Yahoo Finance chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooSource {
    base_url: String,
    timeout: Duration,
}

impl YahooSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        YahooSource {
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.chart_url.clone(), config.fetch_timeout)
    }

    fn chart_url(&self, ticker: &str, range: &str, interval: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(ticker);
        url.query_pairs_mut()
            .append_pair("range", range)
            .append_pair("interval", interval);
        Ok(url)
    }
}

impl PriceSource for YahooSource {
    fn download(&self, ticker: &str, range: &str, interval: &str) -> Result<RawFrame, FetchError> {
        let url = self.chart_url(ticker, range, interval)?;
        debug!("GET {}", url);

        // Built per call: the blocking client owns a runtime and must be
        // created and dropped off the async executor.
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent("Mozilla/5.0")
            .build()?;
        let response = client.get(url).send()?;
        let status = response.status();
        let body = response.text()?;

        match serde_json::from_str::<ChartResponse>(&body) {
            Ok(payload) => payload.into_frame(),
            Err(_) if !status.is_success() => Err(FetchError::Status(status.as_u16())),
            Err(e) => Err(FetchError::Decode(e)),
        }
    }
}
