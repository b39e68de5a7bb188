// src/utils/mod.rs

pub mod charting;
pub mod data_processing;
pub mod presentation;

pub use charting::render_close_chart;
pub use data_processing::{
    fetch,
    training_pairs,
    trailing_mean,
    FetchError,
    PriceSource,
    YahooSource,
};
