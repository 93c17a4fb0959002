//! Daily series types shared across VolRegime
//!
//! Both series are keyed by calendar date. Within one series dates are
//! unique and rows are kept in ascending date order; calendar gaps
//! (weekends, holidays) are simply absent rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which of the two stored series a row or error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    /// The equity index OHLCV series
    Primary,
    /// The volatility index series
    Volatility,
}

impl SeriesKind {
    /// Symbol reported for the series in data responses
    pub fn symbol(&self) -> &'static str {
        match self {
            SeriesKind::Primary => "NIFTY",
            SeriesKind::Volatility => "INDIA_VIX",
        }
    }
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesKind::Primary => write!(f, "primary"),
            SeriesKind::Volatility => write!(f, "volatility"),
        }
    }
}

/// One daily bar of the primary instrument
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Shares traded
    pub volume: f64,
    /// Turnover in crore
    pub turnover: f64,
}

/// One daily bar of the volatility index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VixBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub prev_close: f64,
    pub change: f64,
    pub pct_change: f64,
}

/// A volatility index quote as fed in, before the derived change columns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VixQuote {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub prev_close: f64,
}

impl VixQuote {
    /// Derive `change` (4 dp) and `pct_change` (2 dp) from the previous close
    pub fn into_bar(self) -> VixBar {
        let change = round_dp(self.close - self.prev_close, 4);
        let pct_change = round_dp(change / self.prev_close * 100.0, 2);

        VixBar {
            date: self.date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            prev_close: self.prev_close,
            change,
            pct_change,
        }
    }
}

/// Anything carrying a calendar date key
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for Bar {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for VixBar {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Round to `decimals` places, ties to even.
///
/// Only used at presentation and storage boundaries; internal computation
/// keeps full precision.
pub fn round_dp(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round_ties_even() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_kind_display() {
        assert_eq!(SeriesKind::Primary.to_string(), "primary");
        assert_eq!(SeriesKind::Volatility.to_string(), "volatility");
        assert_eq!(SeriesKind::Volatility.symbol(), "INDIA_VIX");
    }

    #[test]
    fn test_vix_quote_derives_change() {
        let quote = VixQuote {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            open: 15.0,
            high: 16.2,
            low: 14.8,
            close: 15.9,
            prev_close: 15.0,
        };

        let bar = quote.into_bar();
        assert!((bar.change - 0.9).abs() < 1e-12);
        assert!((bar.pct_change - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_dp() {
        assert_eq!(round_dp(0.123456, 4), 0.1235);
        assert_eq!(round_dp(0.725, 2), 0.72);
        assert_eq!(round_dp(-1.5, 0), -2.0);
    }
}
