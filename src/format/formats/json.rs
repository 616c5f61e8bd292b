//! Tabular JSON document: the report serialized as-is.

use crate::format::error::FormatError;
use crate::format::report::ExportReport;
use crate::format::traits::DocumentGenerator;

/// JSON document generator.
pub struct JsonReportFormat;

impl DocumentGenerator for JsonReportFormat {
    fn id(&self) -> &'static str {
        "json"
    }

    fn display_name(&self) -> &'static str {
        "JSON Report"
    }

    fn extensions(&self) -> &[&'static str] {
        &["json"]
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn generate(&self, report: &ExportReport) -> Result<Vec<u8>, FormatError> {
        let bytes = serde_json::to_vec_pretty(report)?;
        log::debug!(
            "Generated JSON report with {} annotations ({} bytes)",
            report.annotations.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}
