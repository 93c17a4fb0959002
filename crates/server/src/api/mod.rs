//! HTTP routes
//!
//! | Route            | Purpose                                   |
//! |------------------|-------------------------------------------|
//! | `GET /predict`   | run the pipeline on the latest stored row |
//! | `POST /feed/*`   | upsert daily rows                         |
//! | `GET /data/*`    | read a slice of a stored series           |
//! | `GET /health`    | liveness plus model registry state        |

pub mod error;
pub mod handlers;
pub mod routes;
pub mod wire;

use prediction::PredictionService;
use std::sync::Arc;

use crate::health::ServiceInfo;

pub use error::ApiError;
pub use routes::create_router;

/// Shared state handed to every handler
pub struct AppState {
    pub service: PredictionService,
    pub info: ServiceInfo,
}

impl AppState {
    pub fn new(service: PredictionService, info: ServiceInfo) -> Arc<Self> {
        Arc::new(Self { service, info })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::Router;
    use axum::http::{Request, StatusCode};
    use inference::ModelRegistry;
    use market_data::VolatilityForecaster;
    use serde_json::{json, Value};
    use std::time::Duration;
    use storage::{InMemorySeriesStore, SeriesStore};
    use tower::ServiceExt;

    fn app(store: InMemorySeriesStore) -> Router {
        let store: Arc<dyn SeriesStore> = Arc::new(store);
        let service = PredictionService::new(
            store,
            Arc::new(ModelRegistry::disabled("vol_model.json not found")),
            VolatilityForecaster::default(),
            Duration::from_secs(5),
        );
        create_router(AppState::new(service, ServiceInfo::new("volregime", "1.0.0")), true)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn nifty_row(date: &str, close: f64) -> Value {
        json!({
            "Date": date, "Open": close, "High": close + 40.0, "Low": close - 40.0,
            "Close": close, "Shares Traded": 250000000, "Turnover (₹ Cr)": 21000.0
        })
    }

    #[tokio::test]
    async fn test_predict_without_models_is_503() {
        let (status, body) = send(app(InMemorySeriesStore::new()), get("/predict")).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["detail"].as_str().unwrap().starts_with("AI models not loaded"));
    }

    #[tokio::test]
    async fn test_health_reports_registry() {
        let (status, body) = send(app(InMemorySeriesStore::new()), get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["models"]["loaded"], false);
        assert_eq!(body["models"]["reason"], "vol_model.json not found");
    }

    #[tokio::test]
    async fn test_feed_then_read_nifty() {
        let app = app(InMemorySeriesStore::new());
        let rows = json!([
            nifty_row("03-01-2024", 21500.0),
            nifty_row("02-01-2024", 21600.0),
            nifty_row("04-01-2024", 21650.0),
        ]);

        let (status, body) = send(app.clone(), post("/feed/nifty", rows)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "success", "rows_processed": 3, "action": "upsert"}));

        let (status, body) = send(app.clone(), get("/data/nifty?days=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "NIFTY");
        assert_eq!(body["rows_returned"], 2);
        assert_eq!(body["data"][0]["Date"], "03-01-2024");
        assert_eq!(body["data"][1]["Close"], 21650.0);

        let (_, body) = send(app, get("/data/nifty?days=1&from_=start")).await;
        assert_eq!(body["data"][0]["Date"], "02-01-2024");
    }

    #[tokio::test]
    async fn test_feed_vix_derives_change() {
        let app = app(InMemorySeriesStore::new());
        let rows = json!([{
            "Date": "05-01-2024", "Open": 13.0, "High": 13.5, "Low": 12.8,
            "Close": 13.2, "Prev. Close": 13.0
        }]);

        let (status, _) = send(app.clone(), post("/feed/vix", rows)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(app, get("/data/vix?days=5")).await;
        assert_eq!(body["symbol"], "INDIA_VIX");
        assert_eq!(body["data"][0]["Change"], 0.2);
        assert_eq!(body["data"][0]["% Change"], 1.54);
    }

    #[tokio::test]
    async fn test_feed_rejects_bad_date() {
        let rows = json!([nifty_row("2024-01-05", 21500.0)]);
        let (status, body) = send(app(InMemorySeriesStore::new()), post("/feed/nifty", rows)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Date '2024-01-05' must be in DD-MM-YYYY format");
    }

    #[tokio::test]
    async fn test_feed_rejects_empty_batch() {
        let (status, body) = send(app(InMemorySeriesStore::new()), post("/feed/vix", json!([]))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "No rows provided");
    }

    #[tokio::test]
    async fn test_missing_volatility_series_is_404() {
        let store = InMemorySeriesStore::without_volatility(Vec::new());
        let (status, _) = send(app(store), get("/data/vix?days=5")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
