use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolRegime {
    RisingVol,
    FallingVol,
    NeutralVol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectionRegime {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    LongCall,
    LongPut,
    Straddle,
    BullPutSpread,
    BearCallSpread,
    IronCondor,
    NoTrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpiryType {
    Weekly,
    NextWeekly,
    Monthly,
}

/// Side and option type of one leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegAction {
    BuyCall,
    BuyPut,
    SellCall,
    SellPut,
}

/// Strike per leg action
pub type Legs = BTreeMap<LegAction, i64>;

/// Output of the rule engine for one trade date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub volatility_regime: VolRegime,
    pub direction_regime: DirectionRegime,
    pub strategy: Strategy,
    pub expiry_type: ExpiryType,
    /// Serialized as `YYYY-MM-DD`
    pub expiry_date: NaiveDate,
    pub legs: Legs,
}
