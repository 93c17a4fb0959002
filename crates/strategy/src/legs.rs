//! Strike construction

use crate::types::{LegAction, Legs, Strategy};

pub const STRIKE_STEP: f64 = 50.0;

/// Nearest multiple of 50, ties to even (19875 -> 19900, 19825 -> 19800).
///
/// `None` when the spot is not a positive finite price.
pub fn atm_strike(spot: f64) -> Option<i64> {
    if !spot.is_finite() || spot <= 0.0 {
        return None;
    }
    let strike = (spot / STRIKE_STEP).round_ties_even() * STRIKE_STEP;
    (strike < i64::MAX as f64).then_some(strike as i64)
}

/// Offsets from ATM per leg
fn template(strategy: Strategy) -> &'static [(LegAction, i64)] {
    use LegAction::*;

    match strategy {
        Strategy::LongCall => &[(BuyCall, 0)],
        Strategy::LongPut => &[(BuyPut, 0)],
        Strategy::Straddle => &[(BuyCall, 0), (BuyPut, 0)],
        Strategy::BullPutSpread => &[(SellPut, 0), (BuyPut, -300)],
        Strategy::BearCallSpread => &[(SellCall, 0), (BuyCall, 300)],
        Strategy::IronCondor => &[(SellPut, -200), (BuyPut, -400), (SellCall, 200), (BuyCall, 400)],
        Strategy::NoTrade => &[],
    }
}

pub fn legs_for(strategy: Strategy, atm: i64) -> Legs {
    template(strategy)
        .iter()
        .map(|(action, offset)| (*action, atm + offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atm_rounding_ties_to_even() {
        assert_eq!(atm_strike(19875.0), Some(19900));
        assert_eq!(atm_strike(19825.0), Some(19800));
        assert_eq!(atm_strike(19925.0), Some(19900));
        assert_eq!(atm_strike(19880.4), Some(19900));
        assert_eq!(atm_strike(19874.9), Some(19850));
    }

    #[test]
    fn test_non_finite_spot_has_no_strike() {
        assert_eq!(atm_strike(f64::NAN), None);
        assert_eq!(atm_strike(f64::INFINITY), None);
        assert_eq!(atm_strike(f64::NEG_INFINITY), None);
        assert_eq!(atm_strike(0.0), None);
        assert_eq!(atm_strike(-19_875.0), None);
        assert_eq!(atm_strike(1e300), None);
    }

    #[test]
    fn test_iron_condor_wings() {
        let legs = legs_for(Strategy::IronCondor, 22_000);
        assert_eq!(legs.len(), 4);
        assert_eq!(legs[&LegAction::SellPut], 21_800);
        assert_eq!(legs[&LegAction::BuyPut], 21_600);
        assert_eq!(legs[&LegAction::SellCall], 22_200);
        assert_eq!(legs[&LegAction::BuyCall], 22_400);
    }

    #[test]
    fn test_spreads_and_single_legs() {
        let bull = legs_for(Strategy::BullPutSpread, 19_900);
        assert_eq!(bull[&LegAction::SellPut], 19_900);
        assert_eq!(bull[&LegAction::BuyPut], 19_600);

        let bear = legs_for(Strategy::BearCallSpread, 19_900);
        assert_eq!(bear[&LegAction::BuyCall], 20_200);

        let straddle = legs_for(Strategy::Straddle, 19_900);
        assert_eq!(straddle[&LegAction::BuyCall], straddle[&LegAction::BuyPut]);

        assert!(legs_for(Strategy::NoTrade, 19_900).is_empty());
    }
}
