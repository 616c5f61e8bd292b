//! Boundaries to the external detection and image hosting services.
//!
//! Both are modelled as traits with async methods so a browser build can
//! back them with `fetch` and the native build with local files. Failures
//! are recovered here, never inside the annotation state.

mod detection;
mod hosting;

#[cfg(not(target_arch = "wasm32"))]
pub use detection::SidecarDetector;
pub use detection::{
    DentDetector, DetectionError, DetectionOutcome, FallbackPolicy, FixtureDetector,
    ParsedDetections, detect_with_fallback, fixture_detections, parse_detections,
};
#[cfg(not(target_arch = "wasm32"))]
pub use hosting::DirectoryHost;
pub use hosting::{HostingError, ImageHost, ImageUrl, LocalOnlyHost, host_or_local};
