//! Batch mode: many images per vehicle panel, with rollup statistics.

mod aggregator;
mod ingest;

pub use aggregator::{BatchError, ImageResult, PanelBatch, PanelRecord, PanelStats};
pub use ingest::{BatchFailure, BatchOutcome, BatchProgress, ingest_panel};
