//! Interaction state for one loaded image.
//!
//! An [`ImageSession`] bundles the annotation store, the pan/zoom transform
//! and the drawing session, and routes pointer events to whichever of them
//! the current [`ViewMode`] calls for. A UI layer forwards raw events here
//! and re-renders from the resulting state.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_FIT_MARGIN;
use crate::model::{
    Annotation, AnnotationId, CategoryHistogram, DentCategory, ImageDimensions, Point,
};
use crate::state::{AnnotationStore, DrawOutcome, DrawingSession};
use crate::zoom_math::{ScaleBounds, Transform};

/// Viewer zoom settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    #[serde(default)]
    pub bounds: ScaleBounds,
    /// Factor applied to the fit-to-viewport scale on load
    #[serde(default = "default_fit_margin")]
    pub fit_margin: f64,
}

fn default_fit_margin() -> f64 {
    DEFAULT_FIT_MARGIN
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            bounds: ScaleBounds::default(),
            fit_margin: default_fit_margin(),
        }
    }
}

/// What a primary-button drag does in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Dragging pans the image; clicking selects annotations
    #[default]
    Pan,
    /// Dragging draws a new annotation of the chosen category
    Annotate,
}

/// Details shown for the selected annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDetails {
    pub id: AnnotationId,
    pub category: DentCategory,
    pub center: Point,
    pub width: f64,
    pub height: f64,
    pub area: f64,
}

impl From<&Annotation> for AnnotationDetails {
    fn from(annotation: &Annotation) -> Self {
        Self {
            id: annotation.id.clone(),
            category: annotation.category,
            center: annotation.center,
            width: annotation.size.width,
            height: annotation.size.height,
            area: annotation.area(),
        }
    }
}

/// One image being reviewed, with its annotations and viewer state.
#[derive(Debug, Clone)]
pub struct ImageSession {
    file_name: String,
    dimensions: ImageDimensions,
    viewport: (f64, f64),
    settings: ViewSettings,
    store: AnnotationStore,
    transform: Transform,
    drawing: DrawingSession,
    mode: ViewMode,
    draw_category: Option<DentCategory>,
    category_filter: Option<DentCategory>,
    /// Last pointer position of an active pan drag.
    pan_anchor: Option<Point>,
}

impl ImageSession {
    /// Open a session for an image and fit it to the viewport.
    pub fn new(
        file_name: impl Into<String>,
        dimensions: ImageDimensions,
        viewport: (f64, f64),
        settings: ViewSettings,
    ) -> Self {
        let transform = Transform::fit(viewport, dimensions, settings.fit_margin, &settings.bounds);
        let file_name = file_name.into();
        log::debug!(
            "Opened {} ({}) at scale {:.3}",
            file_name,
            dimensions,
            transform.scale
        );

        Self {
            file_name,
            dimensions,
            viewport,
            settings,
            store: AnnotationStore::new(),
            transform,
            drawing: DrawingSession::new(),
            mode: ViewMode::default(),
            draw_category: None,
            category_filter: None,
            pan_anchor: None,
        }
    }

    /// Replace the image, clearing all annotations and interaction state.
    pub fn load_image(&mut self, file_name: impl Into<String>, dimensions: ImageDimensions) {
        *self = Self::new(file_name, dimensions, self.viewport, self.settings);
    }

    /// Populate the base collection from detection results.
    pub fn apply_detections(&mut self, detections: Vec<Annotation>) -> usize {
        self.drawing.cancel();
        self.category_filter = None;
        self.store.load_detections(detections)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn dimensions(&self) -> ImageDimensions {
        self.dimensions
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn drawing(&self) -> &DrawingSession {
        &self.drawing
    }

    /// Annotations for this image.
    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// Mutable access to the annotations. Abandons any drag in progress.
    pub fn store_mut(&mut self) -> &mut AnnotationStore {
        self.drawing.cancel();
        &mut self.store
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Switch between panning and annotating. Abandons any drag in progress.
    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.mode != mode {
            self.drawing.cancel();
            self.pan_anchor = None;
            self.mode = mode;
        }
    }

    /// Choose the category assigned to newly drawn annotations.
    pub fn set_draw_category(&mut self, category: Option<DentCategory>) {
        self.draw_category = category;
    }

    pub fn draw_category(&self) -> Option<DentCategory> {
        self.draw_category
    }

    // ========================================================================
    // Pointer events (viewport coordinates)
    // ========================================================================

    /// Handle a primary-button press.
    pub fn pointer_down(&mut self, position: Point) {
        match self.mode {
            ViewMode::Annotate => match self.draw_category {
                Some(category) => self.drawing.begin(position, &self.transform, category),
                None => log::debug!("Ignoring draw start: no category selected"),
            },
            ViewMode::Pan => self.pan_anchor = Some(position),
        }
    }

    /// Handle pointer movement.
    pub fn pointer_move(&mut self, position: Point) {
        if self.drawing.is_dragging() {
            self.drawing.extend(position, &self.transform);
        } else if let Some(last) = self.pan_anchor {
            self.transform = self
                .transform
                .pan_by(position.x - last.x, position.y - last.y);
            self.pan_anchor = Some(position);
        }
    }

    /// Handle a primary-button release.
    pub fn pointer_up(&mut self, position: Point) -> DrawOutcome {
        self.pan_anchor = None;
        self.drawing.end(position, &self.transform, &mut self.store)
    }

    /// Handle the pointer leaving the viewer: any drag is abandoned.
    pub fn pointer_leave(&mut self) -> DrawOutcome {
        self.pan_anchor = None;
        self.drawing.cancel()
    }

    /// Select the topmost visible annotation under a viewport point, or clear
    /// the selection when clicking empty space.
    pub fn click(&mut self, position: Point) -> Option<AnnotationId> {
        let point = self.transform.to_image_space(position);
        let hit = self
            .visible_annotations()
            .into_iter()
            .rev()
            .find(|a| {
                let b = a.overlay_bounds(self.dimensions);
                point.x >= b.min.x && point.x <= b.max.x && point.y >= b.min.y && point.y <= b.max.y
            })
            .map(|a| a.id);
        self.store.select(hit.clone());
        hit
    }

    // ========================================================================
    // Zoom
    // ========================================================================

    /// Zoom from a wheel event at the cursor.
    pub fn wheel(&mut self, cursor: Point, delta_y: f64) {
        self.transform = self
            .transform
            .wheel_zoom(cursor, delta_y, &self.settings.bounds);
    }

    /// Zoom in one step around the viewport centre.
    pub fn zoom_in(&mut self) {
        self.zoom_step(self.settings.bounds.step);
    }

    /// Zoom out one step around the viewport centre.
    pub fn zoom_out(&mut self) {
        self.zoom_step(-self.settings.bounds.step);
    }

    fn zoom_step(&mut self, delta: f64) {
        let center = Point::new(self.viewport.0 / 2.0, self.viewport.1 / 2.0);
        self.transform = self
            .transform
            .zoom_at(center, delta, &self.settings.bounds);
    }

    pub fn can_zoom_in(&self) -> bool {
        self.transform.scale < self.settings.bounds.max
    }

    pub fn can_zoom_out(&self) -> bool {
        self.transform.scale > self.settings.bounds.min
    }

    /// Update the viewport size; the current transform is kept.
    pub fn resize_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
    }

    /// Reset the transform so the whole image fits the viewport.
    pub fn fit_to_viewport(&mut self) {
        self.transform = Transform::fit(
            self.viewport,
            self.dimensions,
            self.settings.fit_margin,
            &self.settings.bounds,
        );
    }

    // ========================================================================
    // Views of the annotation state
    // ========================================================================

    /// Show only one category, or toggle the filter off when it is already
    /// showing that category.
    pub fn toggle_category_filter(&mut self, category: DentCategory) {
        self.category_filter = if self.category_filter == Some(category) {
            None
        } else {
            Some(category)
        };
    }

    pub fn category_filter(&self) -> Option<DentCategory> {
        self.category_filter
    }

    /// Active annotations passing the category filter.
    pub fn visible_annotations(&self) -> Vec<Annotation> {
        let mut active = self.store.active();
        if let Some(category) = self.category_filter {
            active.retain(|a| a.category == category);
        }
        active
    }

    /// Counts per category over all active annotations (ignores the filter).
    pub fn category_counts(&self) -> CategoryHistogram {
        CategoryHistogram::from_annotations(&self.store.active())
    }

    pub fn total_dents(&self) -> usize {
        self.store.len()
    }

    pub fn selected_details(&self) -> Option<AnnotationDetails> {
        self.store.selected_annotation().map(AnnotationDetails::from)
    }
}
