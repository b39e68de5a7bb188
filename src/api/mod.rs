// src/api/mod.rs

use actix_web::web;
use std::sync::Arc;

use crate::utils::PriceSource;

/// Shared, read-only application state. Every request fetches fresh data
/// through `source`; nothing is cached between requests.
pub struct AppState {
    pub source: Arc<dyn PriceSource>,
}

/// Re-export handlers
pub mod handlers;

pub use handlers::predict_ticker;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/predict", web::post().to(predict_ticker));
}
