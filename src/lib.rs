//! nutrisync - Ingestion and aggregation engine for diet-tracker CSV exports
//!
//! nutrisync turns raw per-food export rows into two canonical time series
//! through a deterministic pipeline: UTF-8 decode → row normalization →
//! per-day aggregation → cross-file merge.
//!
//! ## Outputs
//!
//! - **Daily series**: one [`DailyNutrition`] per calendar day, with summed
//!   nutrition and the day's last weigh-in
//! - **Food entries**: one [`FoodEntry`] per logged line item, never merged
//!
//! The engine is a pure in-memory transformation: no network, no
//! persistence, safe to re-run over overlapping export batches.

pub mod aggregator;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod schema;
pub mod types;

pub use error::IngestError;
pub use pipeline::{parse_export, parse_exports, ExportProcessor, IngestConfig};
pub use types::{DailyBatch, DailyNutrition, FoodEntry, MergedExport};

/// Engine version embedded in CLI reports
pub const NUTRISYNC_VERSION: &str = env!("CARGO_PKG_VERSION");
