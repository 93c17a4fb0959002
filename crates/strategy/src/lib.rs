//! Strategy selection for VolRegime
//!
//! A pure rule engine: model outputs and market levels in, a labeled
//! regime and an options recommendation out. Every rule is a table
//! lookup so each branch can be tested on its own.
//!
//! - [`regime`] - volatility and direction thresholds
//! - [`expiry`] - expiry cycle buckets and expiry dates
//! - [`legs`] - ATM strike and per-strategy leg templates
//! - [`selector`] - the combined selection

pub mod error;
pub mod expiry;
pub mod legs;
pub mod regime;
pub mod selector;
pub mod types;

pub use error::{Result, StrategyError};
pub use selector::{select, SelectorInputs};
pub use types::{DirectionRegime, ExpiryType, LegAction, Legs, Recommendation, Strategy, VolRegime};
