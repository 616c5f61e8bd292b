//! Global constants for the dentlens annotation engine

/// Smallest allowed viewer scale
pub const MIN_SCALE: f64 = 0.5;

/// Largest allowed viewer scale
pub const MAX_SCALE: f64 = 4.0;

/// Scale change applied by the zoom in/out buttons
pub const SCALE_STEP: f64 = 0.2;

/// Multiplier turning a wheel `deltaY` into a scale delta (sign is inverted)
pub const WHEEL_ZOOM_FACTOR: f64 = 0.01;

/// Shrink factor applied to the fit-to-viewport scale so the image gets a border
pub const DEFAULT_FIT_MARGIN: f64 = 0.95;

/// A drawn rectangle must exceed this in both dimensions (image pixels) to be kept
pub const MIN_DRAW_SIZE: f64 = 5.0;

/// Maximum number of image files accepted by one batch
pub const MAX_BATCH_IMAGES: usize = 100;

/// Overlay boxes are drawn this much larger than the detected dent
pub const OVERLAY_EXPANSION: f64 = 1.2;

/// Prefix reserved for ids of user-drawn annotations
pub const MANUAL_ID_PREFIX: &str = "manual-";

/// Annotation count above which a single-category set is flagged for review
pub const SAME_CATEGORY_REVIEW_THRESHOLD: usize = 3;
