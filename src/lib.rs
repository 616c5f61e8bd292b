//! DentLens - vehicle dent annotation engine
//!
//! State core for reviewing automated dent detections on vehicle photos:
//! zoom and pan math, a layered annotation store, rubber-band drawing,
//! per-panel batch statistics and export reports. Rendering is left to the
//! host UI, which feeds pointer events in and draws the merged view out.

pub mod batch;
pub mod config;
pub mod constants;
pub mod format;
pub mod model;
pub mod service;
pub mod state;
pub mod validation;
pub mod zoom_math;
