//! JSON shapes of the feed and data routes.
//!
//! Field names follow the CSV column headers; dates travel as
//! `DD-MM-YYYY` strings and are validated in the handler so a bad date is
//! a 400 with a readable message.

use common::dates::{format_wire_date, parse_wire_date};
use common::{Bar, VixBar, VixQuote};
use serde::{Deserialize, Serialize};
use storage::SliceFrom;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NiftyRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Shares Traded", alias = "Shares_Traded")]
    pub shares_traded: f64,
    #[serde(rename = "Turnover (₹ Cr)", alias = "Turnover_Cr")]
    pub turnover: f64,
}

impl NiftyRecord {
    pub fn into_bar(self) -> common::Result<Bar> {
        Ok(Bar {
            date: parse_wire_date(&self.date)?,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.shares_traded,
            turnover: self.turnover,
        })
    }
}

impl From<&Bar> for NiftyRecord {
    fn from(bar: &Bar) -> Self {
        Self {
            date: format_wire_date(bar.date),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            shares_traded: bar.volume,
            turnover: bar.turnover,
        }
    }
}

/// Volatility index quote as fed; the change columns are derived on write.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VixQuoteRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Prev. Close", alias = "Prev_Close")]
    pub prev_close: f64,
}

impl VixQuoteRecord {
    pub fn into_quote(self) -> common::Result<VixQuote> {
        Ok(VixQuote {
            date: parse_wire_date(&self.date)?,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            prev_close: self.prev_close,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VixRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Prev. Close")]
    pub prev_close: f64,
    #[serde(rename = "Change")]
    pub change: f64,
    #[serde(rename = "% Change")]
    pub pct_change: f64,
}

impl From<&VixBar> for VixRecord {
    fn from(bar: &VixBar) -> Self {
        Self {
            date: format_wire_date(bar.date),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            prev_close: bar.prev_close,
            change: bar.change,
            pct_change: bar.pct_change,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub status: String,
    pub rows_processed: usize,
    pub action: String,
}

impl FeedResponse {
    pub fn upserted(rows_processed: usize) -> Self {
        Self {
            status: "success".to_string(),
            rows_processed,
            action: "upsert".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub symbol: String,
    pub rows_returned: usize,
    pub data: Vec<T>,
}

impl<T> DataResponse<T> {
    pub fn new(symbol: &str, data: Vec<T>) -> Self {
        Self {
            symbol: symbol.to_string(),
            rows_returned: data.len(),
            data,
        }
    }
}

/// `?days=N&from_=end|start`
#[derive(Debug, Clone, Deserialize)]
pub struct DataQuery {
    pub days: usize,
    #[serde(default, rename = "from_")]
    pub from: SliceFrom,
}
