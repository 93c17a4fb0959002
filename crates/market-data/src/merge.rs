//! Left join of the volatility index close onto the primary series.

use chrono::NaiveDate;
use common::{Bar, VixBar};
use std::collections::HashMap;

/// A primary bar with the implied volatility known as of its date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedRow {
    pub bar: Bar,
    /// Volatility index close, forward-filled; `None` before the first
    /// known value
    pub implied_vol: Option<f64>,
}

impl MergedRow {
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }
}

/// Primary series with an implied-volatility column, ascending by date
#[derive(Debug, Clone, Default)]
pub struct MergedSeries {
    rows: Vec<MergedRow>,
}

impl MergedSeries {
    /// Join on exact date, then forward-fill gaps along the primary dates.
    ///
    /// Volatility rows on dates the primary series lacks are dropped; they
    /// do not seed the fill.
    pub fn build(primary: &[Bar], volatility: &[VixBar]) -> Self {
        let closes: HashMap<NaiveDate, f64> = volatility
            .iter()
            .filter(|v| v.close.is_finite())
            .map(|v| (v.date, v.close))
            .collect();

        let mut last_known = None;
        let rows = primary
            .iter()
            .map(|bar| {
                if let Some(close) = closes.get(&bar.date) {
                    last_known = Some(*close);
                }
                MergedRow {
                    bar: *bar,
                    implied_vol: last_known,
                }
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[MergedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&MergedRow> {
        self.rows.last()
    }
}
