//! Common types and utilities for VolRegime
//!
//! This crate provides the daily series types and helpers shared by the
//! storage, analytics, and serving crates.
//!
//! # Modules
//!
//! - [`error`] - Common error types
//! - [`types`] - Series bar types (`Bar`, `VixBar`, `SeriesKind`)
//! - [`dates`] - Calendar-date wire format (DD-MM-YYYY)

pub mod dates;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
