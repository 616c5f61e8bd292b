//! Export reports and document generation.
//!
//! The [`ExportAssembler`] turns session or batch state into an
//! [`ExportReport`]. Document generators implementing [`DocumentGenerator`]
//! encode that report without touching annotation state.
//!
//! ## Built-in generators
//!
//! - **JSON**: the report serialized as-is
//! - **ZIP**: a summary plus one JSON entry per image, grouped by panel
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dentlens::format::{ExportAssembler, FormatRegistry, now_timestamp};
//!
//! let report = ExportAssembler::assemble_batch(&batch, now_timestamp());
//! let registry = FormatRegistry::new();
//! let document = registry.require("zip")?.document(&report, "dent-report")?;
//! ```

mod error;
pub mod formats;
mod registry;
mod report;
mod traits;

pub use error::FormatError;
pub use registry::FormatRegistry;
pub use report::{
    AnnotationEntry, CategoryCount, ExportAssembler, ExportReport, ImageBreakdown,
    PanelBreakdown, REPORT_VERSION, format_timestamp, now_timestamp,
};
pub use traits::{Document, DocumentGenerator};
