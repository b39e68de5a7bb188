// src/api/handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task;

use crate::api::AppState;
use crate::pipeline::{self, PipelineError};

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub ticker: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

fn error_status(err: &PipelineError) -> (StatusCode, &'static str) {
    match err {
        PipelineError::EmptyInput => (StatusCode::BAD_REQUEST, "empty_input"),
        PipelineError::NoData { .. } => (StatusCode::NOT_FOUND, "no_data"),
        PipelineError::Fetch(_) => (StatusCode::BAD_GATEWAY, "fetch_failed"),
    }
}

/// Runs the pipeline for one Predict click. The fetch is blocking, so the
/// whole run happens on the blocking pool.
pub async fn predict_ticker(
    data: web::Data<AppState>,
    body: web::Json<PredictRequest>,
) -> impl Responder {
    let source = Arc::clone(&data.source);
    let ticker = body.into_inner().ticker;

    let outcome = task::spawn_blocking(move || pipeline::run(source.as_ref(), &ticker)).await;

    match outcome {
        Ok(Ok(report)) => HttpResponse::Ok().json(report),
        Ok(Err(e)) => {
            warn!("Predict request failed: {}", e);
            let (status, code) = error_status(&e);
            HttpResponse::build(status).json(ErrorResponse {
                error: code,
                message: e.user_message(),
            })
        }
        Err(e) => {
            error!("Pipeline task did not complete: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "internal",
                message: "Prediction could not be completed".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{FailingSource, FixedSource};
    use crate::utils::PriceSource;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    async fn post_ticker(source: Arc<dyn PriceSource>, ticker: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState { source }))
                .configure(crate::api::configure),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(json!({ "ticker": ticker }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn returns_report() {
        let closes: Vec<f64> = (0..260).map(|i| 300.0 - i as f64 * 0.25).collect();
        let (status, body) = post_ticker(Arc::new(FixedSource::new(closes)), "AAPL").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticker"], "AAPL");
        assert_eq!(body["currency_symbol"], "$");
        assert_eq!(body["records"], 260);
        assert_eq!(body["latest"].as_array().map(Vec::len), Some(5));
        assert_eq!(body["prediction"]["status"], "ready");
        assert_eq!(body["signal"]["result"]["kind"], "sell");
        assert_eq!(body["signal"]["message"], "SELL Signal (Death Cross)");
    }

    #[actix_web::test]
    async fn blank_ticker_is_bad_request() {
        let source = Arc::new(FixedSource::new(vec![1.0, 2.0, 3.0]));
        let (status, body) = post_ticker(source.clone(), "").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "empty_input");
        assert_eq!(body["message"], "Please enter stock symbol");
        assert_eq!(source.calls(), 0);
    }

    #[actix_web::test]
    async fn unknown_ticker_is_not_found() {
        let (status, body) = post_ticker(Arc::new(FixedSource::new(vec![])), "NOPE").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no_data");
        assert_eq!(body["message"], "Invalid stock symbol or no data available");
    }

    #[actix_web::test]
    async fn upstream_failure_is_bad_gateway() {
        let (status, body) = post_ticker(Arc::new(FailingSource), "AAPL").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "fetch_failed");
    }
}
