//! Format-agnostic export report.
//!
//! The report is built from the merged annotation view of a single image or
//! from a whole panel batch, then handed unchanged to a document generator.
//! Assembly is a pure function of its inputs: the same state and timestamp
//! always give an equal report.

use serde::Serialize;

use crate::batch::{PanelBatch, PanelRecord, PanelStats};
use crate::model::{
    Annotation, AnnotationId, AnnotationOrigin, CategoryHistogram, DentCategory, ImageDimensions,
    Point, VehiclePanel,
};
use crate::service::ImageUrl;
use crate::state::ImageSession;
use crate::validation::review_annotations;

/// Version of the report layout.
pub const REPORT_VERSION: &str = "1.0.0";

/// Complete export report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportReport {
    pub version: String,
    /// ISO 8601 UTC creation time.
    pub timestamp: String,
    /// Set for single-image reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_dimensions: Option<ImageDimensions>,
    pub total_dents: usize,
    pub average_dent_size: f64,
    /// Every known category in declaration order, zeros included.
    pub per_category: Vec<CategoryCount>,
    /// Set for batch reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_panel: Option<Vec<PanelBreakdown>>,
    pub annotations: Vec<AnnotationEntry>,
    /// Review notes; these never block an export.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Count for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: DentCategory,
    pub label: String,
    pub count: usize,
}

impl CategoryCount {
    fn list(histogram: &CategoryHistogram) -> Vec<Self> {
        histogram
            .complete()
            .into_iter()
            .map(|(category, count)| Self {
                category,
                label: category.label().to_string(),
                count,
            })
            .collect()
    }
}

/// Summary and images of one panel in a batch report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelBreakdown {
    pub panel: VehiclePanel,
    pub label: String,
    pub image_count: usize,
    pub total_dents: usize,
    pub average_dent_size: f64,
    pub top_category: Option<DentCategory>,
    pub per_category: Vec<CategoryCount>,
    pub images: Vec<ImageBreakdown>,
}

/// One image within a panel breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageBreakdown {
    pub file_name: String,
    pub image_url: ImageUrl,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<ImageDimensions>,
    pub total_dents: usize,
    pub annotations: Vec<AnnotationEntry>,
}

/// One annotation as it appears in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationEntry {
    pub id: AnnotationId,
    pub category: DentCategory,
    pub center: Point,
    pub width: f64,
    pub height: f64,
    pub area: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<AnnotationOrigin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel: Option<VehiclePanel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl AnnotationEntry {
    pub fn from_annotation(annotation: &Annotation) -> Self {
        Self {
            id: annotation.id.clone(),
            category: annotation.category,
            center: annotation.center,
            width: annotation.size.width,
            height: annotation.size.height,
            area: annotation.area(),
            origin: None,
            panel: None,
            image: None,
        }
    }

    fn with_origin(mut self, origin: AnnotationOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    fn located(mut self, panel: VehiclePanel, image: &str) -> Self {
        self.panel = Some(panel);
        self.image = Some(image.to_string());
        self
    }
}

/// Builds export reports from session or batch state.
pub struct ExportAssembler;

impl ExportAssembler {
    /// Report for the merged annotation view of one image.
    ///
    /// The session's category filter is ignored; every active annotation is
    /// exported.
    pub fn assemble_image(session: &ImageSession, timestamp: impl Into<String>) -> ExportReport {
        let active = session.store().active_with_origin();
        let annotations: Vec<Annotation> = active.iter().map(|(a, _)| (*a).clone()).collect();
        let stats = PanelStats::from_annotations(annotations.iter());

        let entries = active
            .iter()
            .map(|(annotation, origin)| {
                AnnotationEntry::from_annotation(annotation).with_origin(*origin)
            })
            .collect();

        let report = ExportReport {
            version: REPORT_VERSION.to_string(),
            timestamp: timestamp.into(),
            image_name: Some(session.file_name().to_string()),
            image_dimensions: Some(session.dimensions()),
            total_dents: stats.total_dents,
            average_dent_size: stats.average_dent_size,
            per_category: CategoryCount::list(&stats.dents_by_category),
            per_panel: None,
            annotations: entries,
            warnings: review_messages(&annotations),
        };
        log::debug!(
            "Assembled image report for '{}' with {} dents",
            session.file_name(),
            report.total_dents
        );
        report
    }

    /// Report for every panel in a batch.
    pub fn assemble_batch(batch: &PanelBatch, timestamp: impl Into<String>) -> ExportReport {
        let overall = batch.overall();
        let per_panel: Vec<PanelBreakdown> = batch.panels().map(panel_breakdown).collect();

        let annotations = per_panel
            .iter()
            .flat_map(|panel| panel.images.iter())
            .flat_map(|image| image.annotations.iter().cloned())
            .collect();

        // Unlabeled images are normal in a batch, so only review labeled ones
        let mut warnings = Vec::new();
        for record in batch.panels() {
            for image in record.images.iter().filter(|i| !i.annotations.is_empty()) {
                let prefix = format!("{} / {}", record.panel.label(), image.file_name);
                warnings.extend(
                    review_messages(&image.annotations)
                        .into_iter()
                        .map(|message| format!("{prefix}: {message}")),
                );
            }
        }

        log::debug!(
            "Assembled batch report with {} panels and {} dents",
            per_panel.len(),
            overall.total_dents
        );

        ExportReport {
            version: REPORT_VERSION.to_string(),
            timestamp: timestamp.into(),
            image_name: None,
            image_dimensions: None,
            total_dents: overall.total_dents,
            average_dent_size: overall.average_dent_size,
            per_category: CategoryCount::list(&overall.dents_by_category),
            per_panel: Some(per_panel),
            annotations,
            warnings,
        }
    }
}

fn review_messages(annotations: &[Annotation]) -> Vec<String> {
    review_annotations(annotations)
        .iter()
        .map(|warning| warning.message())
        .collect()
}

fn panel_breakdown(record: &PanelRecord) -> PanelBreakdown {
    let images = record
        .images
        .iter()
        .map(|image| ImageBreakdown {
            file_name: image.file_name.clone(),
            image_url: image.image_url.clone(),
            dimensions: image.dimensions,
            total_dents: image.annotations.len(),
            annotations: image
                .annotations
                .iter()
                .map(|a| AnnotationEntry::from_annotation(a).located(record.panel, &image.file_name))
                .collect(),
        })
        .collect();

    PanelBreakdown {
        panel: record.panel,
        label: record.panel.label().to_string(),
        image_count: record.stats.image_count,
        total_dents: record.stats.total_dents,
        average_dent_size: record.stats.average_dent_size,
        top_category: record.stats.top_category,
        per_category: CategoryCount::list(&record.stats.dents_by_category),
        images,
    }
}

/// Current UTC time as an ISO 8601 string.
pub fn now_timestamp() -> String {
    let secs = web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format_timestamp(secs)
}

/// Format seconds since the Unix epoch as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_timestamp(unix_secs: u64) -> String {
    let days = (unix_secs / 86_400) as i64;
    let secs_of_day = unix_secs % 86_400;
    let (year, month, day) = civil_from_days(days);

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        secs_of_day / 3600,
        (secs_of_day % 3600) / 60,
        secs_of_day % 60
    )
}

/// Proleptic Gregorian date for a day count relative to 1970-01-01.
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    // Shift the epoch to 0000-03-01 so leap days fall at the end of a year
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let day_of_era = z.rem_euclid(146_097);
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::ImageResult;
    use crate::model::Size;
    use crate::service::fixture_detections;
    use crate::state::ViewSettings;

    const STAMP: &str = "2024-05-01T12:00:00Z";

    fn edited_session() -> ImageSession {
        let mut session = ImageSession::new(
            "door.jpg",
            ImageDimensions::new(800, 600),
            (800.0, 600.0),
            ViewSettings::default(),
        );
        session.apply_detections(fixture_detections());
        session.store_mut().delete(&"dent_1".into());
        session.store_mut().add_manual(
            Point::new(50.0, 50.0),
            Size::new(15.0, 15.0),
            DentCategory::Nickel,
        );
        session
    }

    #[test]
    fn test_image_report() {
        let report = ExportAssembler::assemble_image(&edited_session(), STAMP);

        assert_eq!(report.timestamp, STAMP);
        assert_eq!(report.image_name.as_deref(), Some("door.jpg"));
        assert_eq!(report.image_dimensions, Some(ImageDimensions::new(800, 600)));
        assert_eq!(report.total_dents, 2);
        assert!(report.per_panel.is_none());

        let ids: Vec<_> = report.annotations.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["dent_2", "manual-1"]);
        assert_eq!(report.annotations[0].origin, Some(AnnotationOrigin::Detected));
        assert_eq!(report.annotations[1].origin, Some(AnnotationOrigin::Manual));
        assert_eq!(report.annotations[1].area, 225.0);
    }

    #[test]
    fn test_per_category_lists_zeros() {
        let report = ExportAssembler::assemble_image(&edited_session(), STAMP);
        let counts: Vec<_> = report
            .per_category
            .iter()
            .map(|c| (c.category, c.count))
            .collect();
        assert_eq!(
            counts,
            vec![
                (DentCategory::Dime, 0),
                (DentCategory::Nickel, 1),
                (DentCategory::Quarter, 1),
                (DentCategory::HalfDollar, 0),
                (DentCategory::Oversized, 0),
            ]
        );
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let session = edited_session();
        let first = ExportAssembler::assemble_image(&session, STAMP);
        let second = ExportAssembler::assemble_image(&session, STAMP);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_category_filter_does_not_affect_export() {
        let mut session = edited_session();
        session.toggle_category_filter(DentCategory::Quarter);
        let report = ExportAssembler::assemble_image(&session, STAMP);
        assert_eq!(report.total_dents, 2);
    }

    #[test]
    fn test_empty_image_report_warns() {
        let session = ImageSession::new(
            "roof.jpg",
            ImageDimensions::new(100, 100),
            (100.0, 100.0),
            ViewSettings::default(),
        );
        let report = ExportAssembler::assemble_image(&session, STAMP);
        assert_eq!(report.total_dents, 0);
        assert_eq!(report.average_dent_size, 0.0);
        assert_eq!(report.warnings, vec!["No dents have been labeled yet"]);
    }

    #[test]
    fn test_batch_report() {
        let mut batch = PanelBatch::new();
        batch.record_panel_result(
            VehiclePanel::Trunk,
            vec![ImageResult::new("t.jpg", ImageUrl::local("t.jpg"), fixture_detections())],
        );
        batch.record_panel_result(
            VehiclePanel::Hood,
            vec![
                ImageResult::new("a.jpg", ImageUrl::local("a.jpg"), fixture_detections()),
                ImageResult::new("b.jpg", ImageUrl::local("b.jpg"), Vec::new()),
            ],
        );

        let report = ExportAssembler::assemble_batch(&batch, STAMP);
        assert_eq!(report.total_dents, 4);
        assert!(report.image_dimensions.is_none());
        assert!((report.average_dent_size - 25.0).abs() < 1e-9);

        let panels = report.per_panel.as_ref().unwrap();
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0].panel, VehiclePanel::Hood);
        assert_eq!(panels[0].image_count, 2);
        assert_eq!(panels[0].images[1].total_dents, 0);
        assert_eq!(panels[1].label, "Trunk");

        assert_eq!(report.annotations.len(), 4);
        assert_eq!(report.annotations[0].panel, Some(VehiclePanel::Hood));
        assert_eq!(report.annotations[0].image.as_deref(), Some("a.jpg"));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_timestamp(951_782_400), "2000-02-29T00:00:00Z");
        assert_eq!(format_timestamp(1_714_564_800), "2024-05-01T12:00:00Z");
        assert_eq!(now_timestamp().len(), 20);
    }
}
