//! Response assembly: presentation rounding happens here and nowhere else.

use chrono::NaiveDate;
use common::round_dp;
use market_data::LatestInputs;
use serde::{Deserialize, Serialize};
use strategy::{DirectionRegime, ExpiryType, Legs, Recommendation, Strategy, VolRegime};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Trade date of the latest row, `YYYY-MM-DD`
    pub date: NaiveDate,
    pub nifty_spot: f64,
    pub india_vix: f64,
    pub metrics: ReportMetrics,
    pub regime: ReportRegime,
    pub recommendation: ReportRecommendation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportMetrics {
    /// 4 decimal places
    pub predicted_annualized_vol: f64,
    /// 2 decimal places
    pub bull_probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportRegime {
    pub volatility: VolRegime,
    pub direction: DirectionRegime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecommendation {
    pub strategy: Strategy,
    pub expiry_type: ExpiryType,
    pub expiry_date: NaiveDate,
    pub legs: Legs,
}

impl PredictionReport {
    pub fn assemble(
        inputs: &LatestInputs,
        predicted_vol: f64,
        bull_probability: f64,
        recommendation: Recommendation,
    ) -> Self {
        Self {
            date: inputs.trade_date,
            nifty_spot: inputs.spot,
            india_vix: inputs.implied_vol,
            metrics: ReportMetrics {
                predicted_annualized_vol: round_dp(predicted_vol, 4),
                bull_probability: round_dp(bull_probability, 2),
            },
            regime: ReportRegime {
                volatility: recommendation.volatility_regime,
                direction: recommendation.direction_regime,
            },
            recommendation: ReportRecommendation {
                strategy: recommendation.strategy,
                expiry_type: recommendation.expiry_type,
                expiry_date: recommendation.expiry_date,
                legs: recommendation.legs,
            },
        }
    }
}
