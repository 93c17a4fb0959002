use chrono::NaiveDate;
use tracing::debug;

use crate::error::{Result, StrategyError};
use crate::expiry::{expiry_date, expiry_type_for};
use crate::legs::{atm_strike, legs_for};
use crate::regime::{strategy_for, vol_ratio};
use crate::types::{DirectionRegime, Recommendation, VolRegime};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectorInputs {
    /// Decimal annualized volatility forecast
    pub predicted_vol: f64,
    pub bull_probability: f64,
    /// Volatility index level in percent
    pub implied_vol: f64,
    pub spot: f64,
    pub trade_date: NaiveDate,
}

/// Pure: equal inputs always give equal recommendations.
///
/// Fails only when the spot cannot be turned into an ATM strike.
pub fn select(inputs: &SelectorInputs) -> Result<Recommendation> {
    let ratio = vol_ratio(inputs.predicted_vol, inputs.implied_vol);
    let volatility_regime = VolRegime::from_ratio(ratio);
    let direction_regime = DirectionRegime::from_probability(inputs.bull_probability);
    let strategy = strategy_for(volatility_regime, direction_regime);

    let expiry_type = expiry_type_for(inputs.predicted_vol);
    let atm = atm_strike(inputs.spot).ok_or(StrategyError::InvalidSpot(inputs.spot))?;

    debug!(
        ratio,
        ?volatility_regime,
        ?direction_regime,
        ?strategy,
        atm,
        "Strategy selected"
    );

    Ok(Recommendation {
        volatility_regime,
        direction_regime,
        strategy,
        expiry_type,
        expiry_date: expiry_date(expiry_type, inputs.trade_date),
        legs: legs_for(strategy, atm),
    })
}
