//! Expiry cycle buckets and weekly/monthly expiry dates.
//!
//! Expiries fall on Thursdays. The weekly expiry is always strictly after
//! the trade date: trading on a Thursday rolls to the following week.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::types::ExpiryType;

/// Predicted-volatility floors, checked in order; below all of them the
/// monthly cycle is used
const EXPIRY_BUCKETS: [(f64, ExpiryType); 2] = [
    (0.22, ExpiryType::Weekly),
    (0.15, ExpiryType::NextWeekly),
];

pub fn expiry_type_for(predicted_vol: f64) -> ExpiryType {
    EXPIRY_BUCKETS
        .iter()
        .find(|(floor, _)| predicted_vol > *floor)
        .map(|(_, expiry)| *expiry)
        .unwrap_or(ExpiryType::Monthly)
}

/// Next Thursday strictly after `trade_date`
pub fn next_weekly_expiry(trade_date: NaiveDate) -> NaiveDate {
    let weekday = trade_date.weekday().num_days_from_monday() as i64;
    let thursday = Weekday::Thu.num_days_from_monday() as i64;
    let days = match (thursday - weekday).rem_euclid(7) {
        0 => 7,
        d => d,
    };
    trade_date + Duration::days(days)
}

/// Last Thursday on or before the end of `date`'s month
pub fn monthly_expiry(date: NaiveDate) -> NaiveDate {
    let month_end = last_day_of_month(date);
    let days_from_thursday = (month_end.weekday().num_days_from_monday() + 7
        - Weekday::Thu.num_days_from_monday())
        % 7;
    month_end - Duration::days(days_from_thursday as i64)
}

pub fn expiry_date(expiry_type: ExpiryType, trade_date: NaiveDate) -> NaiveDate {
    match expiry_type {
        ExpiryType::Weekly => next_weekly_expiry(trade_date),
        ExpiryType::NextWeekly => next_weekly_expiry(trade_date) + Duration::days(7),
        ExpiryType::Monthly => monthly_expiry(trade_date),
    }
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let first_of_next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    first_of_next.and_then(|d| d.pred_opt()).unwrap_or(date)
}
