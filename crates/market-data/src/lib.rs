//! Market data preparation for VolRegime
//!
//! - [`merge`] joins the volatility index onto the primary series
//! - [`features`] derives the named model input columns
//! - [`garch`] forecasts short-horizon volatility
//! - [`optimize`] is the simplex minimizer behind the GARCH fit
//! - [`prepare`] runs all of the above for the most recent row
//!
//! Everything here is a pure function of the history it is given; no
//! state survives a call.

pub mod error;
pub mod features;
pub mod garch;
pub mod merge;
pub mod optimize;
pub mod prepare;

pub use error::MarketDataError;
pub use features::{names, FeatureEngine, FeatureFrame, FeatureRow, LONGEST_WINDOW};
pub use garch::{GarchError, GarchFit, GarchParams, GarchSettings, VolForecast, VolatilityForecaster};
pub use merge::{MergedRow, MergedSeries};
pub use prepare::{prepare_latest, LatestInputs};

pub type Result<T> = std::result::Result<T, MarketDataError>;
