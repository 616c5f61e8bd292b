//! Dent detection service boundary.
//!
//! The detection service takes image bytes and answers with a JSON object
//! mapping detection ids to `{ center: {x, y}, x_size, y_size, category }`,
//! either bare or wrapped in a `dent_locations` envelope.

use std::fmt;
use std::future::Future;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{Annotation, DentCategory, ImageFile, Point, Size};

/// Errors from a detection request.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    /// The service could not be reached
    #[error("Detection service unreachable: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("Detection service returned status {0}")]
    Status(u16),

    /// The response body is not a detection map
    #[error("Malformed detection response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Reading a stored response failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A source of dent detections for an image.
pub trait DentDetector {
    fn detect(
        &self,
        image: &ImageFile,
    ) -> impl Future<Output = Result<Vec<Annotation>, DetectionError>>;
}

/// What to do when a single-image detection request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Continue with no detections and a warning
    #[default]
    Empty,
    /// Continue with the built-in fixture detections and a warning
    Fixture,
    /// Report the failure to the caller
    Fail,
}

/// Detections for an image, plus a warning when a fallback was used.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutcome {
    pub annotations: Vec<Annotation>,
    pub warning: Option<String>,
}

/// Run detection and apply the fallback policy on failure.
pub async fn detect_with_fallback<D: DentDetector>(
    detector: &D,
    image: &ImageFile,
    policy: FallbackPolicy,
) -> Result<DetectionOutcome, DetectionError> {
    let err = match detector.detect(image).await {
        Ok(annotations) => {
            log::info!("Detected {} dents in '{}'", annotations.len(), image.name);
            return Ok(DetectionOutcome {
                annotations,
                warning: None,
            });
        }
        Err(err) => err,
    };

    let annotations = match policy {
        FallbackPolicy::Fail => return Err(err),
        FallbackPolicy::Empty => Vec::new(),
        FallbackPolicy::Fixture => fixture_detections(),
    };
    log::warn!(
        "Detection failed for '{}' ({}), continuing with {} fallback detections",
        image.name,
        err,
        annotations.len()
    );

    Ok(DetectionOutcome {
        annotations,
        warning: Some(format!("Failed to analyze '{}': {}", image.name, err)),
    })
}

/// The fixture detection set used by [`FixtureDetector`] and the fixture
/// fallback.
pub fn fixture_detections() -> Vec<Annotation> {
    vec![
        Annotation::new(
            "dent_1",
            Point::new(100.0, 100.0),
            Size::new(20.0, 20.0),
            DentCategory::Nickel,
        ),
        Annotation::new(
            "dent_2",
            Point::new(300.0, 200.0),
            Size::new(30.0, 30.0),
            DentCategory::Quarter,
        ),
    ]
}

/// Detector that always answers with [`fixture_detections`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureDetector;

impl DentDetector for FixtureDetector {
    async fn detect(&self, _image: &ImageFile) -> Result<Vec<Annotation>, DetectionError> {
        Ok(fixture_detections())
    }
}

/// Detector that reads a stored response body next to each image.
///
/// For `door.jpg` the response is read from `<root>/door.json`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct SidecarDetector {
    root: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl SidecarDetector {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl DentDetector for SidecarDetector {
    async fn detect(&self, image: &ImageFile) -> Result<Vec<Annotation>, DetectionError> {
        let path = self.root.join(format!("{}.json", image.stem()));
        log::debug!("Reading detections for '{}' from {:?}", image.name, path);
        let body = std::fs::read(&path)?;
        Ok(parse_detections(&body)?.annotations)
    }
}

/// Parsed detection response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDetections {
    /// Valid detections in response order.
    pub annotations: Vec<Annotation>,
    /// Ids of entries that were dropped as invalid.
    pub skipped: Vec<String>,
}

#[derive(Deserialize)]
struct WireDetection {
    center: Point,
    x_size: f64,
    y_size: f64,
    category: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireBody {
    Envelope { dent_locations: OrderedEntries },
    Bare(OrderedEntries),
}

/// JSON object entries in document order.
struct OrderedEntries(Vec<(String, serde_json::Value)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of detection ids to detections")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Parse a detection response body.
///
/// Entries that are structurally invalid, use an unknown category, or have
/// negative or non-finite geometry are skipped with a warning.
pub fn parse_detections(body: &[u8]) -> Result<ParsedDetections, DetectionError> {
    let entries = match serde_json::from_slice::<WireBody>(body)? {
        WireBody::Envelope { dent_locations } => dent_locations.0,
        WireBody::Bare(entries) => entries.0,
    };

    let mut parsed = ParsedDetections {
        annotations: Vec::with_capacity(entries.len()),
        skipped: Vec::new(),
    };

    for (id, value) in entries {
        match to_annotation(&id, value) {
            Ok(annotation) => parsed.annotations.push(annotation),
            Err(reason) => {
                log::warn!("Skipping detection '{}': {}", id, reason);
                parsed.skipped.push(id);
            }
        }
    }

    Ok(parsed)
}

fn to_annotation(id: &str, value: serde_json::Value) -> Result<Annotation, String> {
    let wire: WireDetection = serde_json::from_value(value).map_err(|e| e.to_string())?;
    let category: DentCategory = wire.category.parse().map_err(|e| format!("{e}"))?;
    let size = Size::new(wire.x_size, wire.y_size);

    if !wire.center.is_finite() || !size.width.is_finite() || !size.height.is_finite() {
        return Err("non-finite geometry".to_string());
    }
    if size.width < 0.0 || size.height < 0.0 {
        return Err("negative size".to_string());
    }

    Ok(Annotation::new(id, wire.center, size, category))
}
