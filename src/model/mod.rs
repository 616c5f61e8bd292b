//! Data models for the dent annotation engine.

mod annotation;
mod category;
mod histogram;
mod image_file;
mod panel;

pub use annotation::{
    Annotation, AnnotationId, AnnotationOrigin, ImageDimensions, Point, Rect, Size,
};
pub use category::{DentCategory, UnknownCategory};
pub use histogram::CategoryHistogram;
pub use image_file::ImageFile;
pub use panel::{UnknownPanel, VehiclePanel};
