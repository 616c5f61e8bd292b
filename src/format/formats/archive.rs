//! Compressed archive document.
//!
//! Layout for a batch report:
//!
//! ```text
//! summary.json
//! hood/001_door.json
//! hood/002_hood_left.json
//! trunk/001_trunk.json
//! ```
//!
//! A single-image report holds `summary.json` and `annotations.json`.

use std::io::{Cursor, Seek, Write};

use serde::Serialize;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::format::error::FormatError;
use crate::format::report::{CategoryCount, ExportReport, PanelBreakdown};
use crate::format::traits::DocumentGenerator;
use crate::model::{DentCategory, ImageDimensions, VehiclePanel};

/// Name of the top-level summary entry.
pub const SUMMARY_ENTRY: &str = "summary.json";

/// Name of the annotation list entry in single-image archives.
pub const ANNOTATIONS_ENTRY: &str = "annotations.json";

/// ZIP archive generator.
pub struct ArchiveFormat;

#[derive(Serialize)]
struct ArchiveSummary<'a> {
    version: &'a str,
    timestamp: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_dimensions: Option<ImageDimensions>,
    total_dents: usize,
    average_dent_size: f64,
    per_category: &'a [CategoryCount],
    #[serde(skip_serializing_if = "Option::is_none")]
    panels: Option<Vec<PanelSummary<'a>>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: &'a Vec<String>,
}

#[derive(Serialize)]
struct PanelSummary<'a> {
    panel: VehiclePanel,
    label: &'a str,
    image_count: usize,
    total_dents: usize,
    average_dent_size: f64,
    top_category: Option<DentCategory>,
    per_category: &'a [CategoryCount],
}

impl<'a> From<&'a PanelBreakdown> for PanelSummary<'a> {
    fn from(panel: &'a PanelBreakdown) -> Self {
        Self {
            panel: panel.panel,
            label: &panel.label,
            image_count: panel.image_count,
            total_dents: panel.total_dents,
            average_dent_size: panel.average_dent_size,
            top_category: panel.top_category,
            per_category: &panel.per_category,
        }
    }
}

impl<'a> ArchiveSummary<'a> {
    fn of(report: &'a ExportReport) -> Self {
        Self {
            version: &report.version,
            timestamp: &report.timestamp,
            image_name: report.image_name.as_deref(),
            image_dimensions: report.image_dimensions,
            total_dents: report.total_dents,
            average_dent_size: report.average_dent_size,
            per_category: &report.per_category,
            panels: report
                .per_panel
                .as_ref()
                .map(|panels| panels.iter().map(PanelSummary::from).collect()),
            warnings: &report.warnings,
        }
    }
}

/// Archive path for the `index`th image (zero-based) of a panel.
pub fn image_entry_name(panel: VehiclePanel, index: usize, file_name: &str) -> String {
    let stem = std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    format!("{}/{:03}_{}.json", panel.name(), index + 1, stem)
}

impl ArchiveFormat {
    fn write_entry<W: Write + Seek, T: Serialize + ?Sized>(
        zip: &mut ZipWriter<W>,
        name: String,
        value: &T,
    ) -> Result<(), FormatError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(name, options)?;
        zip.write_all(&serde_json::to_vec_pretty(value)?)?;
        Ok(())
    }
}

impl DocumentGenerator for ArchiveFormat {
    fn id(&self) -> &'static str {
        "zip"
    }

    fn display_name(&self) -> &'static str {
        "ZIP Archive"
    }

    fn extensions(&self) -> &[&'static str] {
        &["zip"]
    }

    fn mime_type(&self) -> &'static str {
        "application/zip"
    }

    fn generate(&self, report: &ExportReport) -> Result<Vec<u8>, FormatError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut entries = 1;

        Self::write_entry(&mut zip, SUMMARY_ENTRY.to_string(), &ArchiveSummary::of(report))?;

        match &report.per_panel {
            Some(panels) => {
                for panel in panels {
                    for (index, image) in panel.images.iter().enumerate() {
                        let name = image_entry_name(panel.panel, index, &image.file_name);
                        Self::write_entry(&mut zip, name, image)?;
                        entries += 1;
                    }
                }
            }
            None => {
                Self::write_entry(&mut zip, ANNOTATIONS_ENTRY.to_string(), &report.annotations)?;
                entries += 1;
            }
        }

        let bytes = zip.finish()?.into_inner();
        log::debug!(
            "Generated ZIP report with {} entries ({} bytes)",
            entries,
            bytes.len()
        );
        Ok(bytes)
    }
}
