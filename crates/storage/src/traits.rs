use async_trait::async_trait;
use chrono::NaiveDate;
use common::{Bar, Dated, SeriesKind, VixBar, VixQuote};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Result;

/// Which end of a series a slice is taken from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceFrom {
    Start,
    #[default]
    End,
}

/// Source of truth for both daily series.
///
/// Reads return ascending, date-unique rows. Upserts overwrite rows with an
/// equal date, insert the rest, and return how many input rows were applied.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    async fn read_primary(&self) -> Result<Vec<Bar>>;

    async fn read_volatility(&self) -> Result<Vec<VixBar>>;

    async fn upsert_primary(&self, rows: Vec<Bar>) -> Result<usize>;

    /// Change columns are derived from each quote's previous close.
    async fn upsert_volatility(&self, quotes: Vec<VixQuote>) -> Result<usize>;

    async fn slice_primary(&self, days: usize, from: SliceFrom) -> Result<Vec<Bar>> {
        let rows = self.read_primary().await?;
        Ok(slice_rows(rows, days, from))
    }

    async fn slice_volatility(&self, days: usize, from: SliceFrom) -> Result<Vec<VixBar>> {
        let rows = self.read_volatility().await?;
        Ok(slice_rows(rows, days, from))
    }

    /// Row count per series, used by health reporting
    async fn row_count(&self, kind: SeriesKind) -> Result<usize> {
        match kind {
            SeriesKind::Primary => Ok(self.read_primary().await?.len()),
            SeriesKind::Volatility => Ok(self.read_volatility().await?.len()),
        }
    }
}

/// First or last `days` rows of an ascending series.
pub fn slice_rows<T>(mut rows: Vec<T>, days: usize, from: SliceFrom) -> Vec<T> {
    if days >= rows.len() {
        return rows;
    }
    match from {
        SliceFrom::Start => {
            rows.truncate(days);
            rows
        }
        SliceFrom::End => rows.split_off(rows.len() - days),
    }
}

/// Upsert `incoming` into `existing` keyed by date; the later row wins.
pub fn merge_by_date<T: Dated>(existing: Vec<T>, incoming: Vec<T>) -> Vec<T> {
    let mut by_date: BTreeMap<NaiveDate, T> = BTreeMap::new();
    for row in existing.into_iter().chain(incoming) {
        by_date.insert(row.date(), row);
    }
    by_date.into_values().collect()
}
