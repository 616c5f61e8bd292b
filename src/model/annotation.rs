//! Dent annotation types and geometry.
//!
//! All coordinates are in native image pixels; screen and viewport
//! positions are converted through [`crate::zoom_math::Transform`] first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{MANUAL_ID_PREFIX, OVERLAY_EXPANSION};
use crate::model::DentCategory;

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Check that both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Width and height of a dent region.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Side of the square with the same area.
    ///
    /// Used to average sizes across boxes of different aspect ratios.
    pub fn equivalent_side(&self) -> f64 {
        self.area().sqrt()
    }
}

/// Natural pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check whether the image is at least `min` in both directions.
    pub fn covers(&self, min: ImageDimensions) -> bool {
        self.width >= min.width && self.height >= min.height
    }
}

impl fmt::Display for ImageDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An axis-aligned rectangle given by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Create a normalized rectangle from two arbitrary corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Check whether two rectangles touch or overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y)
    }
}

/// Identifier of an annotation, unique within one image.
///
/// Ids carrying the `manual-` prefix belong to user-drawn annotations;
/// every other id originates from the detection service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the id for the `sequence`-th manual annotation.
    pub fn manual(sequence: u64) -> Self {
        Self(format!("{MANUAL_ID_PREFIX}{sequence}"))
    }

    pub fn is_manual(&self) -> bool {
        self.0.starts_with(MANUAL_ID_PREFIX)
    }

    /// Counter value encoded in a manual id, if it has one.
    ///
    /// Only the exact form produced by [`Self::manual`] qualifies, so
    /// `manual-01` or `manual-+1` never alias `manual-1`.
    pub fn manual_sequence(&self) -> Option<u64> {
        let sequence = self.0.strip_prefix(MANUAL_ID_PREFIX)?.parse().ok()?;
        (Self::manual(sequence) == *self).then_some(sequence)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnnotationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AnnotationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Where an active annotation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationOrigin {
    /// Returned by the detection service and left untouched
    Detected,
    /// Returned by the detection service, then edited by the user
    Edited,
    /// Drawn by the user
    Manual,
}

/// One labeled dent region on an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    /// Centre of the dent in image pixels.
    pub center: Point,
    pub size: Size,
    pub category: DentCategory,
}

impl Annotation {
    pub fn new(
        id: impl Into<AnnotationId>,
        center: Point,
        size: Size,
        category: DentCategory,
    ) -> Self {
        Self {
            id: id.into(),
            center,
            size,
            category,
        }
    }

    pub fn area(&self) -> f64 {
        self.size.area()
    }

    pub fn equivalent_side(&self) -> f64 {
        self.size.equivalent_side()
    }

    /// The annotation's box in image space.
    pub fn bounds(&self) -> Rect {
        let half_w = self.size.width / 2.0;
        let half_h = self.size.height / 2.0;
        Rect {
            min: Point::new(self.center.x - half_w, self.center.y - half_h),
            max: Point::new(self.center.x + half_w, self.center.y + half_h),
        }
    }

    /// Display rectangle for the overlay: the box grown by
    /// [`OVERLAY_EXPANSION`] and shifted so it stays inside the image.
    pub fn overlay_bounds(&self, image: ImageDimensions) -> Rect {
        let width = self.size.width * OVERLAY_EXPANSION;
        let height = self.size.height * OVERLAY_EXPANSION;
        let left = clamp_start(self.center.x - width / 2.0, width, image.width as f64);
        let top = clamp_start(self.center.y - height / 2.0, height, image.height as f64);
        Rect {
            min: Point::new(left, top),
            max: Point::new(left + width, top + height),
        }
    }
}

fn clamp_start(start: f64, extent: f64, limit: f64) -> f64 {
    start.min(limit - extent).max(0.0)
}
