use axum::extract::{Query, State};
use axum::Json;
use common::SeriesKind;
use prediction::PredictionReport;
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use super::wire::{DataQuery, DataResponse, FeedResponse, NiftyRecord, VixQuoteRecord, VixRecord};
use super::AppState;

pub async fn predict(State(state): State<Arc<AppState>>) -> Result<Json<PredictionReport>, ApiError> {
    let report = state.service.predict().await?;
    Ok(Json(report))
}

pub async fn feed_nifty(
    State(state): State<Arc<AppState>>,
    Json(rows): Json<Vec<NiftyRecord>>,
) -> Result<Json<FeedResponse>, ApiError> {
    if rows.is_empty() {
        return Err(ApiError::BadRequest("No rows provided".to_string()));
    }
    let bars = rows
        .into_iter()
        .map(NiftyRecord::into_bar)
        .collect::<common::Result<Vec<_>>>()?;

    let processed = state.service.store().upsert_primary(bars).await?;
    info!(kind = %SeriesKind::Primary, processed, "Feed upserted");

    Ok(Json(FeedResponse::upserted(processed)))
}

pub async fn feed_vix(
    State(state): State<Arc<AppState>>,
    Json(rows): Json<Vec<VixQuoteRecord>>,
) -> Result<Json<FeedResponse>, ApiError> {
    if rows.is_empty() {
        return Err(ApiError::BadRequest("No rows provided".to_string()));
    }
    let quotes = rows
        .into_iter()
        .map(VixQuoteRecord::into_quote)
        .collect::<common::Result<Vec<_>>>()?;

    let processed = state.service.store().upsert_volatility(quotes).await?;
    info!(kind = %SeriesKind::Volatility, processed, "Feed upserted");

    Ok(Json(FeedResponse::upserted(processed)))
}

pub async fn data_nifty(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DataQuery>,
) -> Result<Json<DataResponse<NiftyRecord>>, ApiError> {
    let rows = state.service.store().slice_primary(query.days, query.from).await?;
    let data = rows.iter().map(NiftyRecord::from).collect();
    Ok(Json(DataResponse::new(SeriesKind::Primary.symbol(), data)))
}

pub async fn data_vix(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DataQuery>,
) -> Result<Json<DataResponse<VixRecord>>, ApiError> {
    let rows = state.service.store().slice_volatility(query.days, query.from).await?;
    let data = rows.iter().map(VixRecord::from).collect();
    Ok(Json(DataResponse::new(SeriesKind::Volatility.symbol(), data)))
}
