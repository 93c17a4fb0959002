//! CSV files as the series store.
//!
//! One file per series, header row first, dates as `DD-MM-YYYY`. Every
//! upsert rewrites the whole file through a temp file in the same
//! directory followed by a rename, so concurrent readers never observe a
//! partial write.

use async_trait::async_trait;
use common::dates::{format_wire_date, parse_wire_date};
use common::{Bar, SeriesKind, VixBar, VixQuote};
use csv::{ReaderBuilder, StringRecord, Writer};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::traits::{merge_by_date, SeriesStore};
use crate::{Result, StorageError};

pub const PRIMARY_HEADER: [&str; 7] = [
    "Date",
    "Open",
    "High",
    "Low",
    "Close",
    "Shares Traded",
    "Turnover (₹ Cr)",
];

pub const VOLATILITY_HEADER: [&str; 8] = [
    "Date",
    "Open",
    "High",
    "Low",
    "Close",
    "Prev. Close",
    "Change",
    "% Change",
];

/// Store backed by two CSV files
pub struct CsvSeriesStore {
    primary_path: PathBuf,
    volatility_path: PathBuf,
    /// Serializes read-modify-write cycles; plain reads do not take it
    write_lock: Mutex<()>,
}

impl CsvSeriesStore {
    pub fn new(primary_path: impl Into<PathBuf>, volatility_path: impl Into<PathBuf>) -> Self {
        Self {
            primary_path: primary_path.into(),
            volatility_path: volatility_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self, kind: SeriesKind) -> &Path {
        match kind {
            SeriesKind::Primary => &self.primary_path,
            SeriesKind::Volatility => &self.volatility_path,
        }
    }

    /// Create parent directories and header-only files where missing.
    #[instrument(skip(self))]
    pub fn init(&self) -> Result<()> {
        ensure_file(&self.primary_path, &PRIMARY_HEADER)?;
        ensure_file(&self.volatility_path, &VOLATILITY_HEADER)?;
        Ok(())
    }
}

#[async_trait]
impl SeriesStore for CsvSeriesStore {
    async fn read_primary(&self) -> Result<Vec<Bar>> {
        let path = self.primary_path.clone();
        blocking(move || read_primary_file(&path)).await
    }

    async fn read_volatility(&self) -> Result<Vec<VixBar>> {
        let path = self.volatility_path.clone();
        blocking(move || read_volatility_file(&path)).await
    }

    async fn upsert_primary(&self, rows: Vec<Bar>) -> Result<usize> {
        if rows.is_empty() {
            return Err(StorageError::EmptyBatch);
        }
        let count = rows.len();
        let path = self.primary_path.clone();

        let _guard = self.write_lock.lock().await;
        let total = blocking(move || {
            let existing = match read_primary_file(&path) {
                Ok(existing) => existing,
                Err(StorageError::NotFound(_)) => Vec::new(),
                Err(e) => return Err(e),
            };
            let merged = merge_by_date(existing, rows);
            write_atomic(&path, &PRIMARY_HEADER, merged.iter().map(primary_record))?;
            Ok(merged.len())
        })
        .await?;

        info!(rows = count, total, "Upserted primary series");
        Ok(count)
    }

    async fn upsert_volatility(&self, quotes: Vec<VixQuote>) -> Result<usize> {
        if quotes.is_empty() {
            return Err(StorageError::EmptyBatch);
        }
        let count = quotes.len();
        let rows: Vec<VixBar> = quotes.into_iter().map(VixQuote::into_bar).collect();
        let path = self.volatility_path.clone();

        let _guard = self.write_lock.lock().await;
        let total = blocking(move || {
            let existing = match read_volatility_file(&path) {
                Ok(existing) => existing,
                Err(StorageError::NotFound(_)) => Vec::new(),
                Err(e) => return Err(e),
            };
            let merged = merge_by_date(existing, rows);
            write_atomic(&path, &VOLATILITY_HEADER, merged.iter().map(volatility_record))?;
            Ok(merged.len())
        })
        .await?;

        info!(rows = count, total, "Upserted volatility series");
        Ok(count)
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
}

fn ensure_file(path: &Path, header: &[&str]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    if path.exists() {
        return Ok(());
    }
    let mut writer = Writer::from_path(path)?;
    writer.write_record(header)?;
    writer.flush()?;
    info!(path = %path.display(), "Created series file");
    Ok(())
}

fn write_atomic<I>(path: &Path, header: &[&str], records: I) -> Result<()>
where
    I: Iterator<Item = Vec<String>>,
{
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.to_path_buf(),
        None => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    {
        let mut writer = Writer::from_writer(tmp.as_file_mut());
        writer.write_record(header)?;
        for record in records {
            writer.write_record(&record)?;
        }
        writer.flush()?;
    }
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StorageError::Io(e.error))?;

    debug!(path = %path.display(), "Series file replaced");
    Ok(())
}

fn open_reader(path: &Path, kind: SeriesKind) -> Result<csv::Reader<fs::File>> {
    match fs::File::open(path) {
        Ok(file) => Ok(ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(file)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound(kind)),
        Err(e) => Err(e.into()),
    }
}

struct RecordCursor<'a> {
    record: &'a StringRecord,
    kind: SeriesKind,
    line: u64,
}

impl RecordCursor<'_> {
    fn malformed(&self, message: String) -> StorageError {
        StorageError::Malformed {
            kind: self.kind,
            line: self.line,
            message,
        }
    }

    fn field(&self, index: usize, name: &str) -> Result<&str> {
        self.record
            .get(index)
            .ok_or_else(|| self.malformed(format!("missing column '{}'", name)))
    }

    fn date(&self) -> Result<chrono::NaiveDate> {
        let raw = self.field(0, "Date")?;
        parse_wire_date(raw).map_err(|e| self.malformed(e.to_string()))
    }

    fn number(&self, index: usize, name: &str) -> Result<f64> {
        let raw = self.field(index, name)?;
        raw.replace(',', "")
            .parse::<f64>()
            .map_err(|_| self.malformed(format!("'{}' is not a number in column '{}'", raw, name)))
    }
}

fn read_primary_file(path: &Path) -> Result<Vec<Bar>> {
    let mut reader = open_reader(path, SeriesKind::Primary)?;
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let cursor = RecordCursor {
            line: record.position().map(|p| p.line()).unwrap_or(0),
            record: &record,
            kind: SeriesKind::Primary,
        };
        rows.push(Bar {
            date: cursor.date()?,
            open: cursor.number(1, PRIMARY_HEADER[1])?,
            high: cursor.number(2, PRIMARY_HEADER[2])?,
            low: cursor.number(3, PRIMARY_HEADER[3])?,
            close: cursor.number(4, PRIMARY_HEADER[4])?,
            volume: cursor.number(5, PRIMARY_HEADER[5])?,
            turnover: cursor.number(6, PRIMARY_HEADER[6])?,
        });
    }

    // Hand-edited files may be unsorted or repeat a date
    Ok(merge_by_date(Vec::new(), rows))
}

fn read_volatility_file(path: &Path) -> Result<Vec<VixBar>> {
    let mut reader = open_reader(path, SeriesKind::Volatility)?;
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let cursor = RecordCursor {
            line: record.position().map(|p| p.line()).unwrap_or(0),
            record: &record,
            kind: SeriesKind::Volatility,
        };
        rows.push(VixBar {
            date: cursor.date()?,
            open: cursor.number(1, VOLATILITY_HEADER[1])?,
            high: cursor.number(2, VOLATILITY_HEADER[2])?,
            low: cursor.number(3, VOLATILITY_HEADER[3])?,
            close: cursor.number(4, VOLATILITY_HEADER[4])?,
            prev_close: cursor.number(5, VOLATILITY_HEADER[5])?,
            change: cursor.number(6, VOLATILITY_HEADER[6])?,
            pct_change: cursor.number(7, VOLATILITY_HEADER[7])?,
        });
    }

    Ok(merge_by_date(Vec::new(), rows))
}

fn primary_record(bar: &Bar) -> Vec<String> {
    vec![
        format_wire_date(bar.date),
        bar.open.to_string(),
        bar.high.to_string(),
        bar.low.to_string(),
        bar.close.to_string(),
        bar.volume.to_string(),
        bar.turnover.to_string(),
    ]
}

fn volatility_record(bar: &VixBar) -> Vec<String> {
    vec![
        format_wire_date(bar.date),
        bar.open.to_string(),
        bar.high.to_string(),
        bar.low.to_string(),
        bar.close.to_string(),
        bar.prev_close.to_string(),
        bar.change.to_string(),
        bar.pct_change.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SliceFrom;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    fn store_in(dir: &Path) -> CsvSeriesStore {
        CsvSeriesStore::new(dir.join("data/nifty.csv"), dir.join("data/vix.csv"))
    }

    fn bar(y: i32, m: u32, d: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open: close - 10.0,
            high: close + 25.5,
            low: close - 30.25,
            close,
            volume: 250_000_000.0,
            turnover: 21_345.67,
        }
    }

    #[tokio::test]
    async fn test_init_creates_header_only_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.init().unwrap();

        let text = fs::read_to_string(store.path(SeriesKind::Primary)).unwrap();
        assert_eq!(text.trim_end(), "Date,Open,High,Low,Close,Shares Traded,Turnover (₹ Cr)");
        assert!(store.read_primary().await.unwrap().is_empty());
        assert!(store.read_volatility().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_files_report_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        assert_matches!(
            store.read_volatility().await,
            Err(StorageError::NotFound(SeriesKind::Volatility))
        );
        assert_matches!(
            store.read_primary().await,
            Err(StorageError::NotFound(SeriesKind::Primary))
        );
    }

    #[tokio::test]
    async fn test_upsert_round_trip_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.init().unwrap();

        let row = bar(2024, 2, 14, 21_840.05);
        assert_eq!(store.upsert_primary(vec![row]).await.unwrap(), 1);

        let rows = store.read_primary().await.unwrap();
        assert_eq!(rows, vec![row]);

        let text = fs::read_to_string(store.path(SeriesKind::Primary)).unwrap();
        assert!(text.contains("14-02-2024,"));
    }

    #[tokio::test]
    async fn test_upsert_overwrites_same_date_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.init().unwrap();

        store
            .upsert_primary(vec![bar(2024, 1, 3, 100.0), bar(2024, 1, 1, 98.0)])
            .await
            .unwrap();
        store
            .upsert_primary(vec![bar(2024, 1, 3, 105.0), bar(2024, 1, 2, 99.0)])
            .await
            .unwrap();

        let closes: Vec<f64> = store
            .read_primary()
            .await
            .unwrap()
            .iter()
            .map(|b| b.close)
            .collect();
        assert_eq!(closes, vec![98.0, 99.0, 105.0]);
    }

    #[tokio::test]
    async fn test_volatility_upsert_derives_change() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.init().unwrap();

        let quote = VixQuote {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            open: 14.1,
            high: 14.9,
            low: 13.8,
            close: 14.5,
            prev_close: 14.0,
        };
        store.upsert_volatility(vec![quote]).await.unwrap();

        let rows = store.read_volatility().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].change - 0.5).abs() < 1e-12);
        assert!((rows[0].pct_change - 3.57).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert_matches!(store.upsert_primary(vec![]).await, Err(StorageError::EmptyBatch));
        assert_matches!(store.upsert_volatility(vec![]).await, Err(StorageError::EmptyBatch));
    }

    #[tokio::test]
    async fn test_upsert_without_init_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        store.upsert_primary(vec![bar(2024, 3, 1, 22_000.0)]).await.unwrap();
        assert_eq!(store.read_primary().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_slice_reads_tail() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let rows: Vec<Bar> = (1..=9).map(|d| bar(2024, 4, d, 100.0 + d as f64)).collect();
        store.upsert_primary(rows).await.unwrap();

        let tail = store.slice_primary(2, SliceFrom::End).await.unwrap();
        assert_eq!(tail.iter().map(|b| b.close).collect::<Vec<_>>(), vec![108.0, 109.0]);
        let head = store.slice_primary(1, SliceFrom::Start).await.unwrap();
        assert_eq!(head[0].close, 101.0);
    }

    #[tokio::test]
    async fn test_malformed_row_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.init().unwrap();
        let path = store.path(SeriesKind::Primary).to_path_buf();
        let mut text = fs::read_to_string(&path).unwrap();
        text.push_str("2024-01-01,1,2,3,4,5,6\n");
        fs::write(&path, text).unwrap();

        assert_matches!(
            store.read_primary().await,
            Err(StorageError::Malformed { kind: SeriesKind::Primary, line: 2, .. })
        );
    }
}
