//! Annotation store for a single image.
//!
//! Holds three collections of annotations plus a deletion set:
//! - `base`: detections as returned by the detection service (never mutated)
//! - `overrides`: edited copies of base detections, keyed by the original id
//! - `manual`: annotations drawn by the user, keyed by their creation counter
//!
//! [`AnnotationStore::active`] merges them: deletion hides an id from every
//! collection, and an override hides the base detection with the same id.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::{Annotation, AnnotationId, AnnotationOrigin, DentCategory, Point, Size};

/// Error produced when a field update cannot be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// The field path does not name an annotation field
    #[error("Unknown annotation field: {0}")]
    UnknownField(String),

    /// The value of a numeric field is not a number
    #[error("Invalid number for {field}: {value:?}")]
    InvalidNumber {
        /// Field that was being updated
        field: String,
        /// The rejected text
        value: String,
    },

    /// Sizes must be zero or positive
    #[error("Negative size for {field}: {value}")]
    NegativeSize {
        /// Field that was being updated
        field: String,
        /// The rejected value
        value: f64,
    },

    /// The category is not in the known set
    #[error(transparent)]
    UnknownCategory(#[from] crate::model::UnknownCategory),
}

/// A single-field change to an annotation.
///
/// Only the fields listed here can be edited; ids are never editable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldUpdate {
    CenterX(f64),
    CenterY(f64),
    Width(f64),
    Height(f64),
    Category(DentCategory),
}

impl FieldUpdate {
    /// Parse a field path and its textual value, as entered in an edit form.
    ///
    /// Accepted paths are `center.x`, `center.y`, `size.width` (or `x_size`),
    /// `size.height` (or `y_size`) and `category`.
    pub fn parse(path: &str, value: &str) -> Result<Self, FieldError> {
        match path {
            "center.x" => Ok(FieldUpdate::CenterX(parse_number(path, value)?)),
            "center.y" => Ok(FieldUpdate::CenterY(parse_number(path, value)?)),
            "size.width" | "x_size" => Ok(FieldUpdate::Width(parse_size(path, value)?)),
            "size.height" | "y_size" => Ok(FieldUpdate::Height(parse_size(path, value)?)),
            "category" => Ok(FieldUpdate::Category(value.trim().parse()?)),
            other => Err(FieldError::UnknownField(other.to_string())),
        }
    }

    fn apply(&self, annotation: &mut Annotation) {
        match *self {
            FieldUpdate::CenterX(x) => annotation.center.x = x,
            FieldUpdate::CenterY(y) => annotation.center.y = y,
            FieldUpdate::Width(w) => annotation.size.width = w,
            FieldUpdate::Height(h) => annotation.size.height = h,
            FieldUpdate::Category(c) => annotation.category = c,
        }
    }
}

fn parse_number(field: &str, value: &str) -> Result<f64, FieldError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FieldError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn parse_size(field: &str, value: &str) -> Result<f64, FieldError> {
    let size = parse_number(field, value)?;
    if size < 0.0 {
        return Err(FieldError::NegativeSize {
            field: field.to_string(),
            value: size,
        });
    }
    Ok(size)
}

/// Storage for the annotations of one image session.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    /// Detections in the order the service returned them.
    base: Vec<Annotation>,
    overrides: HashMap<AnnotationId, Annotation>,
    manual: BTreeMap<u64, Annotation>,
    deleted: HashSet<AnnotationId>,
    /// Highest manual sequence number issued so far.
    last_manual: u64,
    selected: Option<AnnotationId>,
    editing: bool,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all state with a fresh set of detections.
    ///
    /// Detections whose id uses the reserved manual prefix, or repeats an id
    /// already loaded, are skipped. Returns the number of detections kept.
    pub fn load_detections(&mut self, detections: impl IntoIterator<Item = Annotation>) -> usize {
        self.reset();
        let mut seen = HashSet::new();

        for detection in detections {
            if detection.id.is_manual() {
                log::warn!(
                    "Skipping detection '{}': id uses the reserved manual prefix",
                    detection.id
                );
                continue;
            }
            if !seen.insert(detection.id.clone()) {
                log::warn!("Skipping duplicate detection id '{}'", detection.id);
                continue;
            }
            self.base.push(detection);
        }

        log::debug!("Loaded {} base detections", self.base.len());
        self.base.len()
    }

    /// Rebuild a store from a previously exported (frozen) annotation set.
    ///
    /// Manual ids go back to the manual collection so they stay editable as
    /// drawn annotations; the manual counter continues after the highest one.
    pub fn from_frozen(annotations: impl IntoIterator<Item = Annotation>) -> Self {
        let (manual, detected): (Vec<_>, Vec<_>) =
            annotations.into_iter().partition(|a| a.id.is_manual());

        let mut store = Self::new();
        store.load_detections(detected);

        for annotation in manual {
            let Some(sequence) = annotation.id.manual_sequence() else {
                log::warn!("Skipping manual annotation with malformed id '{}'", annotation.id);
                continue;
            };
            if store.manual.contains_key(&sequence) {
                log::warn!("Skipping duplicate manual annotation '{}'", annotation.id);
                continue;
            }
            store.last_manual = store.last_manual.max(sequence);
            store.manual.insert(sequence, annotation);
        }

        store
    }

    /// Add a user-drawn annotation, select it, and return its new id.
    pub fn add_manual(&mut self, center: Point, size: Size, category: DentCategory) -> AnnotationId {
        self.last_manual += 1;
        let sequence = self.last_manual;

        let id = AnnotationId::manual(sequence);
        self.manual
            .insert(sequence, Annotation::new(id.clone(), center, size, category));
        self.selected = Some(id.clone());

        log::debug!("Added manual annotation {id} ({category})");
        id
    }

    /// Apply field updates to an annotation.
    ///
    /// Manual annotations are edited in place. Detections are copied into the
    /// override collection (or the existing override is edited) so the base
    /// detection is preserved. Unknown or deleted ids and an empty update
    /// list are ignored; returns whether anything was updated.
    pub fn update(&mut self, id: &AnnotationId, updates: &[FieldUpdate]) -> bool {
        if updates.is_empty() {
            return false;
        }
        if self.deleted.contains(id) {
            log::debug!("Ignoring update of deleted annotation {id}");
            return false;
        }

        let target = if id.is_manual() {
            id.manual_sequence().and_then(|seq| self.manual.get_mut(&seq))
        } else {
            if !self.overrides.contains_key(id) {
                let Some(original) = self.base.iter().find(|a| &a.id == id) else {
                    log::debug!("Ignoring update of unknown annotation {id}");
                    return false;
                };
                self.overrides.insert(id.clone(), original.clone());
            }
            self.overrides.get_mut(id)
        };

        let Some(annotation) = target else {
            log::debug!("Ignoring update of unknown annotation {id}");
            return false;
        };
        for update in updates {
            update.apply(annotation);
        }
        true
    }

    /// Delete an annotation by id.
    ///
    /// Manual annotations are removed outright; detections are hidden through
    /// the deletion set. Deleting the selection clears it and leaves edit mode.
    /// Returns whether the id referred to a live annotation.
    pub fn delete(&mut self, id: &AnnotationId) -> bool {
        let removed = if id.is_manual() {
            id.manual_sequence()
                .and_then(|seq| self.manual.remove(&seq))
                .is_some()
        } else if self.contains_detection(id) && !self.deleted.contains(id) {
            self.deleted.insert(id.clone())
        } else {
            false
        };

        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            self.editing = false;
        }

        if removed {
            log::debug!("Deleted annotation {id}");
        }
        removed
    }

    fn contains_detection(&self, id: &AnnotationId) -> bool {
        self.overrides.contains_key(id) || self.base.iter().any(|a| &a.id == id)
    }

    /// The merged view of all visible annotations.
    ///
    /// Base detections come first in their original order (an override takes
    /// the place of its base detection), then manual annotations in creation
    /// order.
    pub fn active(&self) -> Vec<Annotation> {
        self.active_with_origin()
            .into_iter()
            .map(|(annotation, _)| annotation.clone())
            .collect()
    }

    /// Like [`Self::active`], tagging each annotation with its origin.
    pub fn active_with_origin(&self) -> Vec<(&Annotation, AnnotationOrigin)> {
        let mut merged = Vec::with_capacity(self.base.len() + self.manual.len());

        for annotation in &self.base {
            if self.deleted.contains(&annotation.id) {
                continue;
            }
            match self.overrides.get(&annotation.id) {
                Some(edited) => merged.push((edited, AnnotationOrigin::Edited)),
                None => merged.push((annotation, AnnotationOrigin::Detected)),
            }
        }

        merged.extend(self.manual.values().map(|a| (a, AnnotationOrigin::Manual)));
        merged
    }

    /// Look up a visible annotation by id.
    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        if self.deleted.contains(id) {
            return None;
        }
        if id.is_manual() {
            return id.manual_sequence().and_then(|seq| self.manual.get(&seq));
        }
        self.overrides
            .get(id)
            .or_else(|| self.base.iter().find(|a| &a.id == id))
    }

    /// Number of visible annotations.
    pub fn len(&self) -> usize {
        self.active_with_origin().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all collections, the selection, and the manual id counter.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Select an annotation, or clear the selection with `None`.
    ///
    /// Selecting an id that is not visible clears the selection.
    pub fn select(&mut self, id: Option<AnnotationId>) {
        let id = id.filter(|id| self.get(id).is_some());
        if self.selected != id {
            self.editing = false;
        }
        self.selected = id;
    }

    /// Get the selected annotation ID.
    pub fn selected(&self) -> Option<&AnnotationId> {
        self.selected.as_ref()
    }

    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    /// Enter or leave edit mode for the selected annotation.
    ///
    /// Edit mode requires a selection; without one this is a no-op.
    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing && self.selected.is_some();
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }
}
