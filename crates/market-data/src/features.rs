//! Derived feature columns over a merged series.
//!
//! Every column has one value per input row. Values that cannot be
//! computed (the start of a rolling window, a missing implied volatility,
//! a division by zero) are `None`; a rolling window is only defined when
//! all of its inputs are.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::merge::MergedSeries;

/// Column names as seen by model artifacts
pub mod names {
    pub const OPEN: &str = "Open";
    pub const HIGH: &str = "High";
    pub const LOW: &str = "Low";
    pub const CLOSE: &str = "Close";
    pub const SHARES_TRADED: &str = "Shares_Traded";
    pub const TURNOVER: &str = "Turnover";
    pub const INDIA_VIX: &str = "India_VIX";

    pub const LOG_RET: &str = "Log_Ret";
    pub const HV_5: &str = "HV_5";
    pub const HV_20: &str = "HV_20";
    pub const RANGE_VOL: &str = "Range_Vol";
    pub const ATR_PCT: &str = "ATR_Pct";
    pub const BB_WIDTH: &str = "BB_Width";
    pub const RET_SQ: &str = "Ret_Sq";
    pub const VIX_CHANGE: &str = "VIX_Change";
    pub const VIX_MOMENTUM: &str = "VIX_Momentum";
    pub const VIX_VS_HV: &str = "VIX_vs_HV";
    pub const RET_5: &str = "Ret_5";
    pub const RET_20: &str = "Ret_20";
    pub const PRICE_VS_SMA20: &str = "Price_vs_SMA20";
    pub const PRICE_VS_SMA50: &str = "Price_vs_SMA50";
    pub const VOL_RATIO: &str = "Vol_Ratio";
    pub const RANGE_SPIKE: &str = "Range_Spike";
    pub const NEG_RET_SQ: &str = "Neg_Ret_Sq";

    /// ln of the GARCH forecast, added before the volatility model runs
    pub const LOG_GARCH_VOL: &str = "Log_GARCH_Vol";
    /// Volatility model output, added before the direction model runs
    pub const LOG_PRED_VOL: &str = "Log_Pred_Vol";
}

/// Rows needed before every rolling feature can be defined
pub const LONGEST_WINDOW: usize = 50;

const TRADING_DAYS: f64 = 252.0;

pub type Column = Vec<Option<f64>>;

/// Column-oriented feature table aligned with the merged series
#[derive(Debug, Clone, Default)]
pub struct FeatureFrame {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<&'static str, Column>,
}

impl FeatureFrame {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.keys().copied()
    }

    /// The most recent row with its defined values only
    pub fn latest(&self) -> Option<FeatureRow> {
        let index = self.len().checked_sub(1)?;
        let mut row = FeatureRow::new(self.dates[index]);
        for (name, column) in &self.columns {
            if let Some(value) = column[index] {
                row.insert(name, value);
            }
        }
        Some(row)
    }

    fn insert(&mut self, name: &'static str, column: Column) {
        debug_assert_eq!(column.len(), self.dates.len());
        self.columns.insert(name, column);
    }
}

/// A single row of named feature values.
///
/// Only defined, finite values are stored; an absent name means the value
/// is unknown for this row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    date: NaiveDate,
    values: BTreeMap<String, f64>,
}

impl FeatureRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Set a value; non-finite values leave the name undefined.
    pub fn insert(&mut self, name: &str, value: f64) {
        if value.is_finite() {
            self.values.insert(name.to_string(), value);
        } else {
            self.values.remove(name);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Computes the derived columns from a merged series
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEngine;

impl FeatureEngine {
    pub fn compute(series: &MergedSeries) -> FeatureFrame {
        use names::*;

        let rows = series.rows();
        let mut frame = FeatureFrame {
            dates: rows.iter().map(|r| r.date()).collect(),
            columns: BTreeMap::new(),
        };

        let open: Column = rows.iter().map(|r| Some(r.bar.open)).collect();
        let high: Column = rows.iter().map(|r| Some(r.bar.high)).collect();
        let low: Column = rows.iter().map(|r| Some(r.bar.low)).collect();
        let close: Column = rows.iter().map(|r| Some(r.bar.close)).collect();
        let volume: Column = rows.iter().map(|r| Some(r.bar.volume)).collect();
        let turnover: Column = rows.iter().map(|r| Some(r.bar.turnover)).collect();
        let iv: Column = rows.iter().map(|r| r.implied_vol).collect();

        let prev_close = shift(&close);
        let log_ret = zip_with(&close, &prev_close, |c, p| (c / p).ln());

        let annualize = TRADING_DAYS.sqrt();
        let hv_5 = map(&rolling(&log_ret, 5, sample_std), |s| s * annualize);
        let hv_20 = map(&rolling(&log_ret, 20, sample_std), |s| s * annualize);
        let range_vol = zip_with(&high, &low, |h, l| (h / l).ln());

        let true_range: Column = rows
            .iter()
            .zip(&prev_close)
            .map(|(r, prev)| {
                let spread = r.bar.high - r.bar.low;
                let tr = match prev {
                    Some(p) => spread.max((r.bar.high - p).abs()).max((r.bar.low - p).abs()),
                    None => spread,
                };
                finite(tr)
            })
            .collect();
        let atr_pct = zip_with(&rolling(&true_range, 14, mean), &close, |atr, c| atr / c);

        let sma_20 = rolling(&close, 20, mean);
        let std_20 = rolling(&close, 20, sample_std);
        let bb_width = zip_with(&sma_20, &std_20, |sma, std| {
            ((sma + 2.0 * std) - (sma - 2.0 * std)) / sma
        });
        let sma_50 = rolling(&close, 50, mean);

        let ret_sq = map(&log_ret, |r| r * r);
        let neg_ret_sq = map(&log_ret, |r| r.min(0.0).powi(2));

        let vix_change = zip_with(&iv, &shift(&iv), |v, p| v / p - 1.0);
        let vix_momentum = rolling(&vix_change, 3, mean);
        let vix_vs_hv = zip_with(&iv, &hv_20, |v, hv| v / (hv * 100.0));

        let ret_5 = rolling(&log_ret, 5, sum);
        let ret_20 = rolling(&log_ret, 20, sum);
        let price_vs_sma20 = zip_with(&close, &sma_20, |c, s| c / s - 1.0);
        let price_vs_sma50 = zip_with(&close, &sma_50, |c, s| c / s - 1.0);
        let vol_ratio = zip_with(&hv_5, &hv_20, |a, b| a / b);
        let range_spike = zip_with(&range_vol, &hv_20, |a, b| a / b);

        frame.insert(OPEN, open);
        frame.insert(HIGH, high);
        frame.insert(LOW, low);
        frame.insert(CLOSE, close);
        frame.insert(SHARES_TRADED, volume);
        frame.insert(TURNOVER, turnover);
        frame.insert(INDIA_VIX, iv);
        frame.insert(LOG_RET, log_ret);
        frame.insert(HV_5, hv_5);
        frame.insert(HV_20, hv_20);
        frame.insert(RANGE_VOL, range_vol);
        frame.insert(ATR_PCT, atr_pct);
        frame.insert(BB_WIDTH, bb_width);
        frame.insert(RET_SQ, ret_sq);
        frame.insert(VIX_CHANGE, vix_change);
        frame.insert(VIX_MOMENTUM, vix_momentum);
        frame.insert(VIX_VS_HV, vix_vs_hv);
        frame.insert(RET_5, ret_5);
        frame.insert(RET_20, ret_20);
        frame.insert(PRICE_VS_SMA20, price_vs_sma20);
        frame.insert(PRICE_VS_SMA50, price_vs_sma50);
        frame.insert(VOL_RATIO, vol_ratio);
        frame.insert(RANGE_SPIKE, range_spike);
        frame.insert(NEG_RET_SQ, neg_ret_sq);

        frame
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn shift(values: &[Option<f64>]) -> Column {
    std::iter::once(None)
        .chain(values.iter().copied())
        .take(values.len())
        .collect()
}

fn map(values: &[Option<f64>], f: impl Fn(f64) -> f64) -> Column {
    values.iter().map(|v| v.and_then(|x| finite(f(x)))).collect()
}

fn zip_with(a: &[Option<f64>], b: &[Option<f64>], f: impl Fn(f64, f64) -> f64) -> Column {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => finite(f(*x, *y)),
            _ => None,
        })
        .collect()
}

/// Trailing window reduction; undefined unless every input in the window is.
fn rolling(values: &[Option<f64>], window: usize, reduce: fn(&[f64]) -> f64) -> Column {
    let mut out = vec![None; values.len()];
    if window == 0 || window > values.len() {
        return out;
    }

    let mut buf = Vec::with_capacity(window);
    for end in window..=values.len() {
        buf.clear();
        buf.extend(values[end - window..end].iter().map_while(|v| *v));
        if buf.len() == window {
            out[end - 1] = finite(reduce(&buf));
        }
    }
    out
}

fn sum(xs: &[f64]) -> f64 {
    xs.iter().sum()
}

fn mean(xs: &[f64]) -> f64 {
    sum(xs) / xs.len() as f64
}

/// Sample standard deviation (n - 1)
fn sample_std(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return f64::NAN;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (xs.len() - 1) as f64).sqrt()
}
