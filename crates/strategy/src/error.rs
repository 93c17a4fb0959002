//! Strategy selection errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    /// Spot cannot be rounded to a listed strike
    #[error("Spot {0} has no ATM strike")]
    InvalidSpot(f64),
}

pub type Result<T> = std::result::Result<T, StrategyError>;
