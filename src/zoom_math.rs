//! Zoom-to-cursor mathematics.
//!
//! The viewer places the image at `pan` (viewport pixels) and scales it by
//! `scale`, so a native image point `p` is drawn at `p * scale + pan`.
//! Every operation here returns a new [`Transform`]; nothing is mutated.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_SCALE, MIN_SCALE, SCALE_STEP, WHEEL_ZOOM_FACTOR};
use crate::model::{ImageDimensions, Point};

/// Allowed scale range and the step used by the zoom buttons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ScaleBounds {
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.max(self.min).min(self.max)
    }

    /// Check that the bounds describe a usable, non-empty range.
    pub fn is_valid(&self) -> bool {
        self.min > 0.0 && self.min <= self.max && self.step > 0.0 && self.max.is_finite()
    }
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self {
            min: MIN_SCALE,
            max: MAX_SCALE,
            step: SCALE_STEP,
        }
    }
}

/// Represents pan/zoom transform state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    /// Viewport position of the image's top-left corner.
    pub pan: Point,
}

impl Transform {
    /// Create a new transform with the given scale and pan.
    pub fn new(scale: f64, pan: Point) -> Self {
        Self { scale, pan }
    }

    /// Create an identity transform (scale=1, no pan).
    pub fn identity() -> Self {
        Self::new(1.0, Point::default())
    }

    /// Map a viewport point to native image pixels.
    pub fn to_image_space(&self, viewport: Point) -> Point {
        Point::new(
            (viewport.x - self.pan.x) / self.scale,
            (viewport.y - self.pan.y) / self.scale,
        )
    }

    /// Map a native image point to viewport pixels.
    pub fn to_viewport_space(&self, image: Point) -> Point {
        Point::new(
            image.x * self.scale + self.pan.x,
            image.y * self.scale + self.pan.y,
        )
    }

    /// Change the scale by `delta` while keeping the image point under
    /// `anchor` fixed on screen.
    ///
    /// The new scale is clamped to `bounds`; when clamping leaves the scale
    /// unchanged the pan is unchanged too.
    pub fn zoom_at(&self, anchor: Point, delta: f64, bounds: &ScaleBounds) -> Transform {
        let new_scale = bounds.clamp(self.scale + delta);
        let ratio = (new_scale - self.scale) / self.scale;

        Transform {
            scale: new_scale,
            pan: Point::new(
                self.pan.x - (anchor.x - self.pan.x) * ratio,
                self.pan.y - (anchor.y - self.pan.y) * ratio,
            ),
        }
    }

    /// Zoom from a mouse wheel event at `cursor`.
    pub fn wheel_zoom(&self, cursor: Point, wheel_delta_y: f64, bounds: &ScaleBounds) -> Transform {
        self.zoom_at(cursor, -wheel_delta_y * WHEEL_ZOOM_FACTOR, bounds)
    }

    /// Apply a pan delta to the transform.
    pub fn pan_by(&self, dx: f64, dy: f64) -> Transform {
        Transform {
            scale: self.scale,
            pan: Point::new(self.pan.x + dx, self.pan.y + dy),
        }
    }

    /// Fit an image inside the viewport and center it.
    ///
    /// The image is never enlarged past its native size; the fitted scale is
    /// multiplied by `margin` and then kept within `bounds`.
    pub fn fit(
        viewport: (f64, f64),
        image: ImageDimensions,
        margin: f64,
        bounds: &ScaleBounds,
    ) -> Transform {
        let (view_w, view_h) = viewport;
        let (img_w, img_h) = (image.width as f64, image.height as f64);

        if img_w <= 0.0 || img_h <= 0.0 || view_w <= 0.0 || view_h <= 0.0 {
            log::debug!("Degenerate fit request {view_w}x{view_h} for {image}, using identity");
            return Transform::identity();
        }

        let fitted = (view_w / img_w).min(view_h / img_h).min(1.0) * margin;
        let scale = bounds.clamp(fitted);

        Transform {
            scale,
            pan: Point::new(
                (view_w - img_w * scale) / 2.0,
                (view_h - img_h * scale) / 2.0,
            ),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn points_eq(a: Point, b: Point) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.pan, Point::new(0.0, 0.0));
        let p = Point::new(12.5, 40.0);
        assert_eq!(t.to_image_space(p), p);
    }

    #[test]
    fn test_space_conversions_are_inverse() {
        let t = Transform::new(2.5, Point::new(-30.0, 17.0));
        let image_point = Point::new(123.0, 456.0);
        let viewport = t.to_viewport_space(image_point);
        assert!(points_eq(t.to_image_space(viewport), image_point));
    }

    #[test]
    fn test_zoom_at_preserves_cursor_point() {
        let bounds = ScaleBounds::default();
        let starts = [
            Transform::new(1.0, Point::new(50.0, 30.0)),
            Transform::new(0.7, Point::new(-120.0, 8.0)),
            Transform::new(3.3, Point::new(400.0, -250.0)),
        ];
        let cursors = [Point::new(150.0, 120.0), Point::new(0.0, 0.0), Point::new(799.0, 3.0)];
        let deltas = [0.2, -0.2, 1.7, -3.0, 0.01];

        for t in starts {
            for cursor in cursors {
                for delta in deltas {
                    let before = t.to_image_space(cursor);
                    let zoomed = t.zoom_at(cursor, delta, &bounds);
                    let after = zoomed.to_image_space(cursor);
                    assert!(
                        points_eq(before, after),
                        "cursor point moved: {before:?} -> {after:?} (delta {delta})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_zoom_at_clamps_scale() {
        let bounds = ScaleBounds::default();
        let t = Transform::new(3.9, Point::new(10.0, 10.0));
        let zoomed = t.zoom_at(Point::new(100.0, 100.0), 1.0, &bounds);
        assert!(approx_eq(zoomed.scale, MAX_SCALE));

        let t = Transform::new(0.6, Point::new(10.0, 10.0));
        let zoomed = t.zoom_at(Point::new(100.0, 100.0), -1.0, &bounds);
        assert!(approx_eq(zoomed.scale, MIN_SCALE));
    }

    #[test]
    fn test_zoom_at_bound_keeps_pan() {
        let bounds = ScaleBounds::default();
        let t = Transform::new(MAX_SCALE, Point::new(10.0, 20.0));
        let zoomed = t.zoom_at(Point::new(300.0, 300.0), 0.5, &bounds);
        assert_eq!(zoomed, t);
    }

    #[test]
    fn test_wheel_zoom_direction() {
        let bounds = ScaleBounds::default();
        let t = Transform::identity();
        // Scrolling up (negative deltaY) zooms in
        assert!(t.wheel_zoom(Point::new(0.0, 0.0), -100.0, &bounds).scale > 1.0);
        assert!(t.wheel_zoom(Point::new(0.0, 0.0), 20.0, &bounds).scale < 1.0);
    }

    #[test]
    fn test_pan_preserves_scale() {
        let t = Transform::new(2.5, Point::new(10.0, 20.0));
        let panned = t.pan_by(5.0, -10.0);
        assert_eq!(panned.scale, 2.5);
        assert_eq!(panned.pan, Point::new(15.0, 10.0));
    }

    #[test]
    fn test_fit_small_image_is_not_enlarged() {
        let bounds = ScaleBounds::default();
        let t = Transform::fit((1000.0, 800.0), ImageDimensions::new(400, 200), 1.0, &bounds);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.pan, Point::new(300.0, 300.0));
    }

    #[test]
    fn test_fit_large_image_with_margin() {
        let bounds = ScaleBounds::default();
        let t = Transform::fit((800.0, 600.0), ImageDimensions::new(1600, 600), 0.9, &bounds);
        // Width limits: 800 / 1600 = 0.5, with margin 0.45, clamped back up to 0.5
        assert!(approx_eq(t.scale, 0.5));

        let t = Transform::fit((800.0, 600.0), ImageDimensions::new(1000, 600), 0.9, &bounds);
        assert!(approx_eq(t.scale, 0.72));
        // Image is centered in the viewport
        assert!(approx_eq(t.pan.x, (800.0 - 720.0) / 2.0));
        assert!(approx_eq(t.pan.y, (600.0 - 432.0) / 2.0));
    }

    #[test]
    fn test_fit_degenerate_image() {
        let bounds = ScaleBounds::default();
        let t = Transform::fit((800.0, 600.0), ImageDimensions::new(0, 600), 1.0, &bounds);
        assert_eq!(t, Transform::identity());
    }
}
