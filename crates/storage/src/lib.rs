//! Daily series store for VolRegime
//!
//! Holds the primary index bars and the volatility index bars. Readers
//! always see a complete, date-sorted snapshot: writers replace the
//! backing file atomically.

pub mod csv_store;
pub mod error;
pub mod memory;
pub mod traits;

pub use csv_store::CsvSeriesStore;
pub use error::StorageError;
pub use memory::InMemorySeriesStore;
pub use traits::{merge_by_date, slice_rows, SeriesStore, SliceFrom};

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
