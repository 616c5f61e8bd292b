//! Trait definitions for document generators.

use crate::format::error::FormatError;
use crate::format::report::ExportReport;

/// Trait for turning an export report into a downloadable document.
///
/// Generators never modify annotation state; a failed generation can simply
/// be retried.
pub trait DocumentGenerator: Send + Sync {
    /// Unique identifier for this generator (e.g., "json", "zip").
    fn id(&self) -> &'static str;

    /// Human-readable name for UI display.
    fn display_name(&self) -> &'static str;

    /// File extensions this generator produces, preferred first.
    fn extensions(&self) -> &[&'static str];

    /// MIME type of the generated document.
    fn mime_type(&self) -> &'static str;

    /// Encode the report.
    fn generate(&self, report: &ExportReport) -> Result<Vec<u8>, FormatError>;

    /// Encode the report into a named document.
    fn document(&self, report: &ExportReport, base_name: &str) -> Result<Document, FormatError> {
        let bytes = self.generate(report)?;
        let extension = self.extensions().first().copied().unwrap_or("bin");
        Ok(Document {
            file_name: format!("{base_name}.{extension}"),
            mime_type: self.mime_type(),
            bytes,
        })
    }
}

/// A generated document ready to be saved or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Document {
    /// Write the document into a directory, returning the full path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_in(&self, dir: &std::path::Path) -> Result<std::path::PathBuf, FormatError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        log::info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}
