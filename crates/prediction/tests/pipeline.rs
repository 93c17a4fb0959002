//! End-to-end runs of the prediction pipeline against hand-written tree
//! artifacts.

use assert_matches::assert_matches;
use chrono::{Datelike, NaiveDate};
use common::{Bar, SeriesKind, VixBar, VixQuote};
use inference::{ModelPaths, ModelRegistry, ScoringModel, TreeEnsemble};
use market_data::VolatilityForecaster;
use prediction::{PredictError, PredictionService};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use storage::{CsvSeriesStore, InMemorySeriesStore, SeriesStore};
use strategy::{ExpiryType, LegAction, Strategy};

const VOL_FEATURES: &str = r#"["HV_5", "HV_20", "Range_Vol", "ATR_Pct", "VIX_vs_HV", "Log_GARCH_Vol"]"#;
const DIR_FEATURES: &str = r#"["Ret_5", "Ret_20", "Price_vs_SMA20", "Price_vs_SMA50", "Log_Pred_Vol"]"#;

/// Always ln(0.25): both branches of the split lead to a zero leaf
fn vol_model() -> String {
    format!(
        r#"{{
            "objective": "reg:squarederror",
            "base_score": {},
            "trees": [
                {{ "nodeid": 0, "split": "Log_GARCH_Vol", "split_condition": -1.5,
                   "yes": 1, "no": 2, "missing": 1,
                   "children": [ {{ "nodeid": 1, "leaf": 0.0 }}, {{ "nodeid": 2, "leaf": 0.0 }} ] }}
            ]
        }}"#,
        0.25f64.ln()
    )
}

/// Always 0.72 bullish
const DIR_MODEL: &str = r#"{
    "objective": "binary:logistic",
    "base_score": 0.72,
    "trees": [
        { "nodeid": 0, "split": "Log_Pred_Vol", "split_condition": 0.0,
          "yes": 1, "no": 2, "missing": 2,
          "children": [ { "nodeid": 1, "leaf": 0.0 }, { "nodeid": 2, "leaf": 0.0 } ] }
    ]
}"#;

fn write_artifacts(dir: &Path, dir_features: &str) -> ModelPaths {
    let paths = ModelPaths {
        vol_model: dir.join("vol_model.json"),
        dir_model: dir.join("dir_model.json"),
        vol_features: dir.join("vol_features.json"),
        dir_features: dir.join("dir_features.json"),
    };
    fs::write(&paths.vol_model, vol_model()).unwrap();
    fs::write(&paths.dir_model, DIR_MODEL).unwrap();
    fs::write(&paths.vol_features, VOL_FEATURES).unwrap();
    fs::write(&paths.dir_features, dir_features).unwrap();
    paths
}

/// `days` weekday bars ending on Wednesday 2024-01-10, IV ending at 18.0
fn history(days: usize) -> (Vec<Bar>, Vec<VixBar>) {
    let mut dates = Vec::new();
    let mut date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    while dates.len() < days {
        if date.weekday().number_from_monday() <= 5 {
            dates.push(date);
        }
        date = date.pred_opt().unwrap();
    }
    dates.reverse();

    let mut primary = Vec::new();
    let mut volatility = Vec::new();
    let mut close = 18_000.0;
    let mut state = 0x2545_f491_4f6c_dd1du64;
    for (t, date) in dates.iter().enumerate() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let uniform = (state >> 11) as f64 / (1u64 << 53) as f64;
        close *= 1.0 + (uniform - 0.5) * 0.03;
        primary.push(Bar {
            date: *date,
            open: close * 0.997,
            high: close * 1.007,
            low: close * 0.991,
            close,
            volume: 3.1e8,
            turnover: 2.4e4,
        });
        let iv = if t + 1 == days { 18.0 } else { 12.0 + (t % 11) as f64 * 0.5 };
        volatility.push(VixBar {
            date: *date,
            open: iv,
            high: iv,
            low: iv,
            close: iv,
            prev_close: iv,
            change: 0.0,
            pct_change: 0.0,
        });
    }
    (primary, volatility)
}

fn service(store: Arc<dyn SeriesStore>, registry: ModelRegistry) -> PredictionService {
    service_with_timeout(store, registry, Duration::from_secs(30))
}

fn service_with_timeout(
    store: Arc<dyn SeriesStore>,
    registry: ModelRegistry,
    fit_timeout: Duration,
) -> PredictionService {
    PredictionService::new(store, Arc::new(registry), VolatilityForecaster::default(), fit_timeout)
}

#[tokio::test]
async fn test_rising_vol_bullish_recommendation() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::load(&write_artifacts(dir.path(), DIR_FEATURES));
    assert!(registry.is_ready());

    let (primary, volatility) = history(260);
    let last = *primary.last().unwrap();
    let store = Arc::new(InMemorySeriesStore::with_series(primary, volatility));

    let report = service(store, registry).predict().await.unwrap();

    assert_eq!(report.date, last.date);
    assert_eq!(report.nifty_spot, last.close);
    assert_eq!(report.india_vix, 18.0);
    assert_eq!(report.metrics.predicted_annualized_vol, 0.25);
    assert_eq!(report.metrics.bull_probability, 0.72);
    assert_eq!(report.recommendation.strategy, Strategy::LongCall);
    assert_eq!(report.recommendation.expiry_type, ExpiryType::Weekly);
    assert_eq!(
        report.recommendation.expiry_date,
        NaiveDate::from_ymd_opt(2024, 1, 11).unwrap()
    );
    let atm = strategy::legs::atm_strike(last.close).unwrap();
    assert_eq!(report.recommendation.legs.get(&LegAction::BuyCall), Some(&atm));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["regime"]["volatility"], "RISING_VOL");
    assert_eq!(json["regime"]["direction"], "BULLISH");
    assert_eq!(json["date"], "2024-01-10");
}

#[tokio::test]
async fn test_disabled_registry_is_unavailable() {
    let (primary, volatility) = history(100);
    let store = Arc::new(InMemorySeriesStore::with_series(primary, volatility));

    let result = service(store, ModelRegistry::disabled("models missing")).predict().await;
    assert_matches!(result, Err(PredictError::ServiceUnavailable(_)));
}

#[tokio::test]
async fn test_missing_volatility_series() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::load(&write_artifacts(dir.path(), DIR_FEATURES));
    let (primary, _) = history(100);
    let store = Arc::new(InMemorySeriesStore::without_volatility(primary));

    let result = service(store, registry).predict().await;
    assert_matches!(result, Err(PredictError::NotFound(SeriesKind::Volatility)));
}

#[tokio::test]
async fn test_short_history_is_insufficient() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::load(&write_artifacts(dir.path(), DIR_FEATURES));
    let (primary, volatility) = history(40);
    let store = Arc::new(InMemorySeriesStore::with_series(primary, volatility));

    let result = service(store, registry).predict().await;
    assert_matches!(result, Err(PredictError::InsufficientData(_)));
}

#[tokio::test]
async fn test_undeclared_direction_feature_is_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let features = r#"["Ret_5", "Log_Pred_Vol", "Put_Call_Ratio"]"#;
    let registry = ModelRegistry::load(&write_artifacts(dir.path(), features));
    let (primary, volatility) = history(120);
    let store = Arc::new(InMemorySeriesStore::with_series(primary, volatility));

    let result = service(store, registry).predict().await;
    assert_matches!(
        result,
        Err(PredictError::SchemaMismatch { ref stage, ref missing })
            if stage == "direction" && missing == &vec!["Put_Call_Ratio".to_string()]
    );
}

#[tokio::test]
async fn test_flat_closes_are_fit_failure() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::load(&write_artifacts(dir.path(), DIR_FEATURES));
    let (mut primary, volatility) = history(120);
    for bar in &mut primary {
        bar.open = 21_000.0;
        bar.high = 21_050.0;
        bar.low = 20_950.0;
        bar.close = 21_000.0;
    }
    let store = Arc::new(InMemorySeriesStore::with_series(primary, volatility));

    let result = service(store, registry).predict().await;
    assert_matches!(result, Err(PredictError::FitFailure(ref msg)) if msg.contains("zero variance"));
}

#[tokio::test]
async fn test_fit_timeout_is_fit_failure() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::load(&write_artifacts(dir.path(), DIR_FEATURES));
    let (primary, volatility) = history(260);
    let store = Arc::new(InMemorySeriesStore::with_series(primary, volatility));

    let result = service_with_timeout(store, registry, Duration::ZERO).predict().await;
    assert_matches!(result, Err(PredictError::FitFailure(ref msg)) if msg.starts_with("timed out"));
}

#[tokio::test]
async fn test_csv_store_round_trip_feeds_prediction() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::load(&write_artifacts(dir.path(), DIR_FEATURES));
    let store = Arc::new(CsvSeriesStore::new(
        dir.path().join("data/nifty.csv"),
        dir.path().join("data/vix.csv"),
    ));
    store.init().unwrap();

    let (primary, volatility) = history(120);
    let last = *primary.last().unwrap();
    store.upsert_primary(primary).await.unwrap();
    let quotes: Vec<VixQuote> = volatility
        .iter()
        .map(|v| VixQuote {
            date: v.date,
            open: v.open,
            high: v.high,
            low: v.low,
            close: v.close,
            prev_close: v.prev_close,
        })
        .collect();
    store.upsert_volatility(quotes).await.unwrap();

    let stored = store.read_primary().await.unwrap();
    assert_eq!(stored.last(), Some(&last));

    let report = service(store, registry).predict().await.unwrap();
    assert_eq!(report.nifty_spot, last.close);
    assert_eq!(report.india_vix, 18.0);
}

#[test]
fn test_artifacts_parse_standalone() {
    let names: Vec<String> = serde_json::from_str(DIR_FEATURES).unwrap();
    let model = TreeEnsemble::from_json(DIR_MODEL, names).unwrap();
    assert!((model.predict(&[0.0, 0.0, 0.0, 0.0, -1.0]) - 0.72).abs() < 1e-12);
}
