//! Per-category dent counts.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::model::{Annotation, DentCategory};

/// Dent counts per category, kept in the order categories were first seen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryHistogram {
    counts: Vec<(DentCategory, usize)>,
}

impl CategoryHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_annotations<'a>(annotations: impl IntoIterator<Item = &'a Annotation>) -> Self {
        let mut histogram = Self::new();
        for annotation in annotations {
            histogram.add(annotation.category);
        }
        histogram
    }

    pub fn add(&mut self, category: DentCategory) {
        match self.counts.iter_mut().find(|(c, _)| *c == category) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((category, 1)),
        }
    }

    pub fn get(&self, category: DentCategory) -> usize {
        self.counts
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The most frequent category; ties go to the one seen first.
    pub fn top(&self) -> Option<DentCategory> {
        let mut best: Option<(DentCategory, usize)> = None;
        for &(category, count) in &self.counts {
            if best.is_none_or(|(_, n)| count > n) {
                best = Some((category, count));
            }
        }
        best.map(|(category, _)| category)
    }

    /// Counts in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (DentCategory, usize)> + '_ {
        self.counts.iter().copied()
    }

    /// Counts for every known category in declaration order, zeros included.
    pub fn complete(&self) -> Vec<(DentCategory, usize)> {
        DentCategory::all()
            .iter()
            .map(|&c| (c, self.get(c)))
            .collect()
    }
}

impl Serialize for CategoryHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (category, count) in self.iter() {
            map.serialize_entry(&category, &count)?;
        }
        map.end()
    }
}
