//! Dent severity categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity class of a dent, named after the coin it compares to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DentCategory {
    Dime,
    Nickel,
    Quarter,
    HalfDollar,
    Oversized,
}

impl DentCategory {
    /// Wire name used by the detection service and in exports.
    pub fn name(&self) -> &'static str {
        match self {
            DentCategory::Dime => "dime",
            DentCategory::Nickel => "nickel",
            DentCategory::Quarter => "quarter",
            DentCategory::HalfDollar => "half_dollar",
            DentCategory::Oversized => "oversized",
        }
    }

    /// Get the display name for this category.
    pub fn label(&self) -> &'static str {
        match self {
            DentCategory::Dime => "Dime",
            DentCategory::Nickel => "Nickel",
            DentCategory::Quarter => "Quarter",
            DentCategory::HalfDollar => "Half Dollar",
            DentCategory::Oversized => "Oversize",
        }
    }

    /// RGB color used for overlays and legends.
    pub fn color(&self) -> [u8; 3] {
        match self {
            DentCategory::Dime => [0xef, 0x44, 0x44],
            DentCategory::Nickel => [0xa8, 0x55, 0xf7],
            DentCategory::Quarter => [0x3b, 0x82, 0xf6],
            DentCategory::HalfDollar => [0x22, 0xc5, 0x5e],
            DentCategory::Oversized => [0xf5, 0x9e, 0x0b],
        }
    }

    /// Get all categories in display order.
    pub fn all() -> &'static [DentCategory] {
        &[
            DentCategory::Dime,
            DentCategory::Nickel,
            DentCategory::Quarter,
            DentCategory::HalfDollar,
            DentCategory::Oversized,
        ]
    }
}

impl fmt::Display for DentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A category name that is not part of [`DentCategory`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown dent category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for DentCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DentCategory::all()
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
