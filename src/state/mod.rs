//! Annotation and interaction state for a single image.

mod drawing;
mod session;
mod store;

pub use drawing::{DrawOutcome, DrawingSession, DrawingState};
pub use session::{AnnotationDetails, ImageSession, ViewMode, ViewSettings};
pub use store::{AnnotationStore, FieldError, FieldUpdate};
