//! Threshold rules mapping continuous model outputs onto labels.
//!
//! Boundaries are strict: a value exactly on a threshold is neutral.

use crate::types::{DirectionRegime, Strategy, VolRegime};

pub const RISING_VOL_RATIO: f64 = 1.15;
pub const FALLING_VOL_RATIO: f64 = 0.85;
pub const BULLISH_PROBABILITY: f64 = 0.6;
pub const BEARISH_PROBABILITY: f64 = 0.4;

/// Regime pair to strategy; pairs not listed trade nothing
const STRATEGY_TABLE: [(VolRegime, DirectionRegime, Strategy); 6] = [
    (VolRegime::RisingVol, DirectionRegime::Bullish, Strategy::LongCall),
    (VolRegime::RisingVol, DirectionRegime::Bearish, Strategy::LongPut),
    (VolRegime::RisingVol, DirectionRegime::Neutral, Strategy::Straddle),
    (VolRegime::FallingVol, DirectionRegime::Bullish, Strategy::BullPutSpread),
    (VolRegime::FallingVol, DirectionRegime::Bearish, Strategy::BearCallSpread),
    (VolRegime::FallingVol, DirectionRegime::Neutral, Strategy::IronCondor),
];

/// Predicted volatility relative to implied volatility (in percent)
pub fn vol_ratio(predicted_vol: f64, implied_vol_pct: f64) -> f64 {
    predicted_vol / (implied_vol_pct / 100.0)
}

impl VolRegime {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > RISING_VOL_RATIO {
            Self::RisingVol
        } else if ratio < FALLING_VOL_RATIO {
            Self::FallingVol
        } else {
            Self::NeutralVol
        }
    }
}

impl DirectionRegime {
    pub fn from_probability(bull_probability: f64) -> Self {
        if bull_probability > BULLISH_PROBABILITY {
            Self::Bullish
        } else if bull_probability < BEARISH_PROBABILITY {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }
}

pub fn strategy_for(vol: VolRegime, direction: DirectionRegime) -> Strategy {
    STRATEGY_TABLE
        .iter()
        .find(|(v, d, _)| *v == vol && *d == direction)
        .map(|(_, _, s)| *s)
        .unwrap_or(Strategy::NoTrade)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vol_regime_thresholds() {
        assert_eq!(VolRegime::from_ratio(1.3889), VolRegime::RisingVol);
        assert_eq!(VolRegime::from_ratio(1.15), VolRegime::NeutralVol);
        assert_eq!(VolRegime::from_ratio(0.85), VolRegime::NeutralVol);
        assert_eq!(VolRegime::from_ratio(0.8499), VolRegime::FallingVol);
        assert_eq!(VolRegime::from_ratio(f64::NAN), VolRegime::NeutralVol);
    }

    #[test]
    fn test_direction_thresholds() {
        assert_eq!(DirectionRegime::from_probability(0.72), DirectionRegime::Bullish);
        assert_eq!(DirectionRegime::from_probability(0.6), DirectionRegime::Neutral);
        assert_eq!(DirectionRegime::from_probability(0.4), DirectionRegime::Neutral);
        assert_eq!(DirectionRegime::from_probability(0.39), DirectionRegime::Bearish);
    }

    #[test]
    fn test_strategy_table() {
        use DirectionRegime::*;

        assert_eq!(strategy_for(VolRegime::RisingVol, Bullish), Strategy::LongCall);
        assert_eq!(strategy_for(VolRegime::RisingVol, Bearish), Strategy::LongPut);
        assert_eq!(strategy_for(VolRegime::RisingVol, Neutral), Strategy::Straddle);
        assert_eq!(strategy_for(VolRegime::FallingVol, Bullish), Strategy::BullPutSpread);
        assert_eq!(strategy_for(VolRegime::FallingVol, Bearish), Strategy::BearCallSpread);
        assert_eq!(strategy_for(VolRegime::FallingVol, Neutral), Strategy::IronCondor);
        for direction in [Bullish, Bearish, Neutral] {
            assert_eq!(strategy_for(VolRegime::NeutralVol, direction), Strategy::NoTrade);
        }
    }

    #[test]
    fn test_vol_ratio() {
        assert!((vol_ratio(0.25, 18.0) - 0.25 / 0.18).abs() < 1e-12);
    }
}
