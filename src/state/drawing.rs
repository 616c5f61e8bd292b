//! Drag-to-draw state machine for manual annotations.

use crate::constants::MIN_DRAW_SIZE;
use crate::model::{AnnotationId, DentCategory, Point, Rect};
use crate::state::AnnotationStore;
use crate::zoom_math::Transform;

/// State for an annotation currently being drawn.
///
/// Points are stored in image space, so pan or zoom changes during a drag do
/// not distort the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawingState {
    /// Not currently drawing anything.
    #[default]
    Idle,
    /// A drag is in progress.
    Dragging {
        start: Point,
        current: Point,
        category: DentCategory,
    },
}

/// How a drag ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    /// The rectangle was large enough and became a manual annotation.
    Committed(AnnotationId),
    /// The drag was too small or was cancelled; nothing was created.
    Abandoned,
    /// No drag was in progress.
    NotDrawing,
}

/// Turns pointer drags into manual annotations.
///
/// Each drag is independent: after a commit or an abandon the session is
/// back to [`DrawingState::Idle`] and the next drag can start immediately.
#[derive(Debug, Clone, Default)]
pub struct DrawingSession {
    state: DrawingState,
}

impl DrawingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DrawingState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DrawingState::Dragging { .. })
    }

    /// Start a drag at a viewport point.
    ///
    /// The caller is responsible for having a category selected. Starting
    /// while already dragging restarts the drag.
    pub fn begin(&mut self, viewport: Point, transform: &Transform, category: DentCategory) {
        let start = transform.to_image_space(viewport);
        log::trace!("Drawing started at ({:.1}, {:.1})", start.x, start.y);
        self.state = DrawingState::Dragging {
            start,
            current: start,
            category,
        };
    }

    /// Move the free corner of the rectangle. Ignored when idle.
    pub fn extend(&mut self, viewport: Point, transform: &Transform) {
        if let DrawingState::Dragging { current, .. } = &mut self.state {
            *current = transform.to_image_space(viewport);
        }
    }

    /// The rectangle being drawn, in image space.
    pub fn preview(&self) -> Option<Rect> {
        match self.state {
            DrawingState::Idle => None,
            DrawingState::Dragging { start, current, .. } => {
                Some(Rect::from_corners(start, current))
            }
        }
    }

    /// Finish the drag at a viewport point.
    ///
    /// The rectangle is committed to `store` only if both its width and
    /// height exceed [`MIN_DRAW_SIZE`] image pixels.
    pub fn end(
        &mut self,
        viewport: Point,
        transform: &Transform,
        store: &mut AnnotationStore,
    ) -> DrawOutcome {
        self.extend(viewport, transform);

        let DrawingState::Dragging {
            start,
            current,
            category,
        } = std::mem::take(&mut self.state)
        else {
            return DrawOutcome::NotDrawing;
        };

        let rect = Rect::from_corners(start, current);
        if rect.width() > MIN_DRAW_SIZE && rect.height() > MIN_DRAW_SIZE {
            let id = store.add_manual(rect.center(), rect.size(), category);
            log::info!(
                "Drew {} annotation {} ({:.0}x{:.0})",
                category,
                id,
                rect.width(),
                rect.height()
            );
            DrawOutcome::Committed(id)
        } else {
            log::debug!(
                "Discarded {:.1}x{:.1} drag below the minimum size",
                rect.width(),
                rect.height()
            );
            DrawOutcome::Abandoned
        }
    }

    /// Abandon the current drag, e.g. when the pointer leaves the viewer.
    pub fn cancel(&mut self) -> DrawOutcome {
        match std::mem::take(&mut self.state) {
            DrawingState::Idle => DrawOutcome::NotDrawing,
            DrawingState::Dragging { .. } => DrawOutcome::Abandoned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(from: (f64, f64), to: (f64, f64), transform: &Transform) -> (DrawOutcome, AnnotationStore) {
        let mut store = AnnotationStore::new();
        let mut session = DrawingSession::new();
        session.begin(Point::new(from.0, from.1), transform, DentCategory::Nickel);
        session.extend(Point::new((from.0 + to.0) / 2.0, to.1), transform);
        let outcome = session.end(Point::new(to.0, to.1), transform, &mut store);
        assert_eq!(session.state(), DrawingState::Idle);
        (outcome, store)
    }

    #[test]
    fn test_six_by_six_commits() {
        let (outcome, store) = drag((10.0, 10.0), (16.0, 16.0), &Transform::identity());
        assert!(matches!(outcome, DrawOutcome::Committed(_)));
        let active = store.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].center, Point::new(13.0, 13.0));
        assert_eq!(active[0].size.width, 6.0);
        assert_eq!(active[0].category, DentCategory::Nickel);
    }

    #[test]
    fn test_five_pixels_is_too_small() {
        let (outcome, store) = drag((10.0, 10.0), (15.0, 40.0), &Transform::identity());
        assert_eq!(outcome, DrawOutcome::Abandoned);
        assert!(store.is_empty());

        let (outcome, store) = drag((10.0, 10.0), (40.0, 15.0), &Transform::identity());
        assert_eq!(outcome, DrawOutcome::Abandoned);
        assert!(store.is_empty());
    }

    #[test]
    fn test_threshold_is_in_image_pixels() {
        // At 2x zoom a 10 viewport-pixel drag is only 5 image pixels
        let zoomed = Transform::new(2.0, Point::new(0.0, 0.0));
        let (outcome, _) = drag((0.0, 0.0), (10.0, 10.0), &zoomed);
        assert_eq!(outcome, DrawOutcome::Abandoned);

        let (outcome, store) = drag((0.0, 0.0), (14.0, 14.0), &zoomed);
        assert!(matches!(outcome, DrawOutcome::Committed(_)));
        assert_eq!(store.active()[0].size.width, 7.0);
    }

    #[test]
    fn test_reverse_drag_is_normalized() {
        let transform = Transform::new(1.0, Point::new(100.0, 50.0));
        let (_, store) = drag((160.0, 110.0), (140.0, 70.0), &transform);
        let ann = &store.active()[0];
        assert_eq!(ann.center, Point::new(50.0, 40.0));
        assert_eq!(ann.size.width, 20.0);
        assert_eq!(ann.size.height, 40.0);
    }

    #[test]
    fn test_cancel_discards_drag() {
        let mut store = AnnotationStore::new();
        let mut session = DrawingSession::new();
        let t = Transform::identity();
        session.begin(Point::new(0.0, 0.0), &t, DentCategory::Dime);
        session.extend(Point::new(50.0, 50.0), &t);
        assert_eq!(session.cancel(), DrawOutcome::Abandoned);
        assert_eq!(
            session.end(Point::new(50.0, 50.0), &t, &mut store),
            DrawOutcome::NotDrawing
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_consecutive_drags() {
        let mut store = AnnotationStore::new();
        let mut session = DrawingSession::new();
        let t = Transform::identity();
        for i in 0..3 {
            let offset = i as f64 * 20.0;
            session.begin(Point::new(offset, 0.0), &t, DentCategory::Quarter);
            session.end(Point::new(offset + 10.0, 10.0), &t, &mut store);
        }
        let ids: Vec<_> = store.active().into_iter().map(|a| a.id).collect();
        assert_eq!(
            ids,
            vec![
                AnnotationId::manual(1),
                AnnotationId::manual(2),
                AnnotationId::manual(3)
            ]
        );
    }

    #[test]
    fn test_preview_tracks_pointer() {
        let mut session = DrawingSession::new();
        let t = Transform::identity();
        assert_eq!(session.preview(), None);
        session.begin(Point::new(5.0, 5.0), &t, DentCategory::Dime);
        session.extend(Point::new(1.0, 9.0), &t);
        let rect = session.preview().unwrap();
        assert_eq!(rect.min, Point::new(1.0, 5.0));
        assert_eq!(rect.max, Point::new(5.0, 9.0));
    }
}
