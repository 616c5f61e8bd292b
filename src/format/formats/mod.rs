//! Document generator implementations.

mod archive;
mod json;

#[cfg(test)]
mod tests;

pub use archive::{ANNOTATIONS_ENTRY, ArchiveFormat, SUMMARY_ENTRY, image_entry_name};
pub use json::JsonReportFormat;
