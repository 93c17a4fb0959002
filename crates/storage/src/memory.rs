use async_trait::async_trait;
use common::{Bar, SeriesKind, VixBar, VixQuote};
use parking_lot::RwLock;

use crate::traits::{merge_by_date, SeriesStore};
use crate::{Result, StorageError};

/// Series store held in memory.
///
/// `None` models a series whose backing data does not exist.
pub struct InMemorySeriesStore {
    primary: RwLock<Option<Vec<Bar>>>,
    volatility: RwLock<Option<Vec<VixBar>>>,
}

impl InMemorySeriesStore {
    /// Both series present and empty
    pub fn new() -> Self {
        Self {
            primary: RwLock::new(Some(Vec::new())),
            volatility: RwLock::new(Some(Vec::new())),
        }
    }

    pub fn with_series(primary: Vec<Bar>, volatility: Vec<VixBar>) -> Self {
        Self {
            primary: RwLock::new(Some(merge_by_date(Vec::new(), primary))),
            volatility: RwLock::new(Some(merge_by_date(Vec::new(), volatility))),
        }
    }

    /// Primary series only; reads of the volatility series fail
    pub fn without_volatility(primary: Vec<Bar>) -> Self {
        Self {
            primary: RwLock::new(Some(merge_by_date(Vec::new(), primary))),
            volatility: RwLock::new(None),
        }
    }
}

impl Default for InMemorySeriesStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SeriesStore for InMemorySeriesStore {
    async fn read_primary(&self) -> Result<Vec<Bar>> {
        self.primary
            .read()
            .clone()
            .ok_or(StorageError::NotFound(SeriesKind::Primary))
    }

    async fn read_volatility(&self) -> Result<Vec<VixBar>> {
        self.volatility
            .read()
            .clone()
            .ok_or(StorageError::NotFound(SeriesKind::Volatility))
    }

    async fn upsert_primary(&self, rows: Vec<Bar>) -> Result<usize> {
        if rows.is_empty() {
            return Err(StorageError::EmptyBatch);
        }
        let count = rows.len();
        let mut guard = self.primary.write();
        let existing = guard.take().unwrap_or_default();
        *guard = Some(merge_by_date(existing, rows));
        Ok(count)
    }

    async fn upsert_volatility(&self, quotes: Vec<VixQuote>) -> Result<usize> {
        if quotes.is_empty() {
            return Err(StorageError::EmptyBatch);
        }
        let count = quotes.len();
        let rows = quotes.into_iter().map(VixQuote::into_bar).collect();
        let mut guard = self.volatility.write();
        let existing = guard.take().unwrap_or_default();
        *guard = Some(merge_by_date(existing, rows));
        Ok(count)
    }
}
