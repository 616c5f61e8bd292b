//! Sequential ingestion of a panel's images through detection and hosting.

use crate::constants::MAX_BATCH_IMAGES;
use crate::model::{ImageFile, VehiclePanel};
use crate::service::{DentDetector, ImageHost, host_or_local};
use crate::validation::{is_image_file, read_dimensions};

use super::aggregator::ImageResult;

/// Progress through a batch, reported after each image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub panel: VehiclePanel,
    pub completed: usize,
    pub total: usize,
    pub current: String,
}

impl BatchProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// An image whose detection failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub index: usize,
    pub file_name: String,
    pub reason: String,
}

/// Everything produced by one ingestion run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub panel: VehiclePanel,
    /// One result per processed image, failed ones included.
    pub results: Vec<ImageResult>,
    pub failures: Vec<BatchFailure>,
    /// Image files past the batch cap.
    pub ignored: Vec<String>,
    /// Files that are not images.
    pub rejected: Vec<String>,
}

/// Run a panel's files through detection one at a time.
///
/// Non-image files are rejected, and only the first [`MAX_BATCH_IMAGES`]
/// images are processed. A failed detection gives that image an empty
/// annotation set and a failure entry; the rest of the batch continues.
pub async fn ingest_panel<D, H, F>(
    panel: VehiclePanel,
    files: Vec<ImageFile>,
    detector: &D,
    host: &H,
    mut on_progress: F,
) -> BatchOutcome
where
    D: DentDetector,
    H: ImageHost,
    F: FnMut(&BatchProgress),
{
    let (images, others): (Vec<_>, Vec<_>) = files.into_iter().partition(is_image_file);
    let rejected: Vec<String> = others.into_iter().map(|file| file.name).collect();

    let mut images = images;
    let ignored: Vec<String> = if images.len() > MAX_BATCH_IMAGES {
        images
            .split_off(MAX_BATCH_IMAGES)
            .into_iter()
            .map(|file| file.name)
            .collect()
    } else {
        Vec::new()
    };

    if !ignored.is_empty() {
        log::warn!(
            "Panel '{}': only the first {} images are processed, ignoring {}",
            panel,
            MAX_BATCH_IMAGES,
            ignored.len()
        );
    }
    if !rejected.is_empty() {
        log::info!("Panel '{}': skipped {} non-image files", panel, rejected.len());
    }

    let total = images.len();
    let mut results = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for (index, image) in images.iter().enumerate() {
        log::debug!("Panel '{}': processing {}/{} '{}'", panel, index + 1, total, image.name);

        let annotations = match detector.detect(image).await {
            Ok(annotations) => annotations,
            Err(e) => {
                log::warn!("Panel '{}': detection failed for '{}': {}", panel, image.name, e);
                failures.push(BatchFailure {
                    index,
                    file_name: image.name.clone(),
                    reason: e.to_string(),
                });
                Vec::new()
            }
        };

        let url = host_or_local(host, image).await;
        let mut result = ImageResult::new(image.name.clone(), url, annotations);
        match read_dimensions(&image.bytes) {
            Ok(dimensions) => result = result.with_dimensions(dimensions),
            Err(e) => log::debug!("Could not read dimensions of '{}': {}", image.name, e),
        }
        results.push(result);

        on_progress(&BatchProgress {
            panel,
            completed: index + 1,
            total,
            current: image.name.clone(),
        });
    }

    log::info!(
        "Panel '{}': processed {} images, {} failed",
        panel,
        results.len(),
        failures.len()
    );

    BatchOutcome {
        panel,
        results,
        failures,
        ignored,
        rejected,
    }
}
