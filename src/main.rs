// src/main.rs

use actix_web::web;
use log::{error, info};
use std::sync::Arc;

// Import modules
mod api;
mod config;
mod models;
mod pipeline;
mod server;
mod utils;

use api::AppState;
use config::AppConfig;
use utils::YahooSource;

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    // Initialize environment variables
    dotenv::dotenv().ok();

    // Initialize the logger
    env_logger::init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };
    info!("Market data source: {} (timeout {:?})", config.chart_url, config.fetch_timeout);

    let app_state = web::Data::new(AppState {
        source: Arc::new(YahooSource::from_config(&config)),
    });

    server::run_server(config, app_state).await
}
