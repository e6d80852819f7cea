//! Cleans IRS exempt-organization registry extracts into one normalized table.

pub mod config;
pub mod error;
pub mod process;
pub mod schema;
pub mod summary;
pub mod write;

pub use config::{CleanerConfig, OutputFormat, RegionFile};
pub use error::{CleanError, Result};
pub use process::{clean_records, run};
pub use summary::CleanSummary;
