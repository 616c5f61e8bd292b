//! Per-panel and overall statistics for batches of annotated images.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Annotation, CategoryHistogram, DentCategory, ImageDimensions, VehiclePanel};
use crate::service::ImageUrl;
use crate::state::AnnotationStore;

/// Errors from editing batch results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// No results were recorded for this panel
    #[error("No results recorded for panel '{0}'")]
    UnknownPanel(VehiclePanel),

    /// The panel has fewer images than the index implies
    #[error("Image index {index} out of range for panel '{panel}' ({count} images)")]
    ImageIndexOutOfRange {
        panel: VehiclePanel,
        index: usize,
        count: usize,
    },
}

/// One processed image in a batch, with its frozen annotation set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageResult {
    pub file_name: String,
    pub image_url: ImageUrl,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<ImageDimensions>,
    pub annotations: Vec<Annotation>,
}

impl ImageResult {
    pub fn new(file_name: impl Into<String>, image_url: ImageUrl, annotations: Vec<Annotation>) -> Self {
        Self {
            file_name: file_name.into(),
            image_url,
            dimensions: None,
            annotations,
        }
    }

    pub fn with_dimensions(mut self, dimensions: ImageDimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Reopen the frozen set for editing in the detail view.
    pub fn open_store(&self) -> AnnotationStore {
        AnnotationStore::from_frozen(self.annotations.iter().cloned())
    }
}

/// Rollup statistics over a set of annotations.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PanelStats {
    pub image_count: usize,
    pub total_dents: usize,
    /// Mean of `sqrt(width * height)` over all annotations, 0 when empty.
    pub average_dent_size: f64,
    pub dents_by_category: CategoryHistogram,
    pub top_category: Option<DentCategory>,
}

impl PanelStats {
    /// Compute statistics from scratch over a list of images.
    pub fn compute(images: &[ImageResult]) -> Self {
        let annotations = images.iter().flat_map(|image| image.annotations.iter());
        let mut stats = Self::from_annotations(annotations);
        stats.image_count = images.len();
        stats
    }

    /// Compute statistics over loose annotations; `image_count` is left at 0.
    pub fn from_annotations<'a>(annotations: impl Iterator<Item = &'a Annotation>) -> Self {
        let mut total_dents = 0;
        let mut size_sum = 0.0;
        let mut histogram = CategoryHistogram::new();

        for annotation in annotations {
            total_dents += 1;
            size_sum += annotation.equivalent_side();
            histogram.add(annotation.category);
        }

        Self {
            image_count: 0,
            total_dents,
            average_dent_size: if total_dents == 0 {
                0.0
            } else {
                size_sum / total_dents as f64
            },
            top_category: histogram.top(),
            dents_by_category: histogram,
        }
    }
}

/// The images recorded for one panel and their rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelRecord {
    pub panel: VehiclePanel,
    pub images: Vec<ImageResult>,
    pub stats: PanelStats,
}

/// Batch results grouped by vehicle panel.
#[derive(Debug, Clone, Default)]
pub struct PanelBatch {
    panels: BTreeMap<VehiclePanel, PanelRecord>,
}

impl PanelBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the results for a panel, replacing any earlier results.
    pub fn record_panel_result(&mut self, panel: VehiclePanel, images: Vec<ImageResult>) {
        let stats = PanelStats::compute(&images);
        log::info!(
            "Recorded {} images with {} dents for panel '{}'",
            images.len(),
            stats.total_dents,
            panel
        );
        self.panels.insert(
            panel,
            PanelRecord {
                panel,
                images,
                stats,
            },
        );
    }

    /// Replace one image's annotation set and recompute the panel rollup.
    pub fn update_image_in_panel(
        &mut self,
        panel: VehiclePanel,
        image_index: usize,
        annotations: Vec<Annotation>,
    ) -> Result<(), BatchError> {
        let record = self
            .panels
            .get_mut(&panel)
            .ok_or(BatchError::UnknownPanel(panel))?;

        let count = record.images.len();
        let image = record
            .images
            .get_mut(image_index)
            .ok_or(BatchError::ImageIndexOutOfRange {
                panel,
                index: image_index,
                count,
            })?;

        image.annotations = annotations;
        record.stats = PanelStats::compute(&record.images);
        log::debug!(
            "Updated image {} of panel '{}': panel now has {} dents",
            image_index,
            panel,
            record.stats.total_dents
        );
        Ok(())
    }

    /// Remove all results for a panel.
    pub fn clear_panel(&mut self, panel: VehiclePanel) -> Option<PanelRecord> {
        self.panels.remove(&panel)
    }

    pub fn panel(&self, panel: VehiclePanel) -> Option<&PanelRecord> {
        self.panels.get(&panel)
    }

    /// Recorded panels in vocabulary order.
    pub fn panels(&self) -> impl Iterator<Item = &PanelRecord> {
        self.panels.values()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Statistics across every recorded panel.
    pub fn overall(&self) -> PanelStats {
        let annotations = self
            .panels
            .values()
            .flat_map(|record| record.images.iter())
            .flat_map(|image| image.annotations.iter());
        let mut stats = PanelStats::from_annotations(annotations);
        stats.image_count = self.panels.values().map(|r| r.images.len()).sum();
        stats
    }
}
