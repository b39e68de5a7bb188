use actix_cors::Cors;
use actix_files as fs;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::{info, warn};

use crate::api::{self, AppState};
use crate::config::AppConfig;

// Running the Actix web server
pub async fn run_server(config: AppConfig, app_state: web::Data<AppState>) -> std::io::Result<()> {
    let frontend_dir = config.frontend_dir.clone();
    if !frontend_dir.join("index.html").is_file() {
        warn!("No index.html under {}; only the API will be served", frontend_dir.display());
    }

    info!("Listening on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(app_state.clone())
            .configure(api::configure)
            .service(fs::Files::new("/", frontend_dir.clone()).index_file("index.html")) // Serve frontend
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
