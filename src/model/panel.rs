//! Vehicle body panels used to group batch images.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named vehicle body region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehiclePanel {
    Hood,
    Roof,
    Trunk,
    FrontBumper,
    RearBumper,
    LeftFrontFender,
    RightFrontFender,
    LeftFrontDoor,
    RightFrontDoor,
    LeftRearDoor,
    RightRearDoor,
    LeftQuarterPanel,
    RightQuarterPanel,
}

impl VehiclePanel {
    pub fn name(&self) -> &'static str {
        match self {
            VehiclePanel::Hood => "hood",
            VehiclePanel::Roof => "roof",
            VehiclePanel::Trunk => "trunk",
            VehiclePanel::FrontBumper => "front_bumper",
            VehiclePanel::RearBumper => "rear_bumper",
            VehiclePanel::LeftFrontFender => "left_front_fender",
            VehiclePanel::RightFrontFender => "right_front_fender",
            VehiclePanel::LeftFrontDoor => "left_front_door",
            VehiclePanel::RightFrontDoor => "right_front_door",
            VehiclePanel::LeftRearDoor => "left_rear_door",
            VehiclePanel::RightRearDoor => "right_rear_door",
            VehiclePanel::LeftQuarterPanel => "left_quarter_panel",
            VehiclePanel::RightQuarterPanel => "right_quarter_panel",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VehiclePanel::Hood => "Hood",
            VehiclePanel::Roof => "Roof",
            VehiclePanel::Trunk => "Trunk",
            VehiclePanel::FrontBumper => "Front Bumper",
            VehiclePanel::RearBumper => "Rear Bumper",
            VehiclePanel::LeftFrontFender => "Left Front Fender",
            VehiclePanel::RightFrontFender => "Right Front Fender",
            VehiclePanel::LeftFrontDoor => "Left Front Door",
            VehiclePanel::RightFrontDoor => "Right Front Door",
            VehiclePanel::LeftRearDoor => "Left Rear Door",
            VehiclePanel::RightRearDoor => "Right Rear Door",
            VehiclePanel::LeftQuarterPanel => "Left Quarter Panel",
            VehiclePanel::RightQuarterPanel => "Right Quarter Panel",
        }
    }

    pub fn all() -> &'static [VehiclePanel] {
        &[
            VehiclePanel::Hood,
            VehiclePanel::Roof,
            VehiclePanel::Trunk,
            VehiclePanel::FrontBumper,
            VehiclePanel::RearBumper,
            VehiclePanel::LeftFrontFender,
            VehiclePanel::RightFrontFender,
            VehiclePanel::LeftFrontDoor,
            VehiclePanel::RightFrontDoor,
            VehiclePanel::LeftRearDoor,
            VehiclePanel::RightRearDoor,
            VehiclePanel::LeftQuarterPanel,
            VehiclePanel::RightQuarterPanel,
        ]
    }
}

impl fmt::Display for VehiclePanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A panel name outside the fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown vehicle panel: {0}")]
pub struct UnknownPanel(pub String);

impl FromStr for VehiclePanel {
    type Err = UnknownPanel;

    /// Accepts the snake_case name or the display label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
        VehiclePanel::all()
            .iter()
            .copied()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| UnknownPanel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_and_label() {
        assert_eq!("hood".parse::<VehiclePanel>(), Ok(VehiclePanel::Hood));
        assert_eq!(
            "Left Front Door".parse::<VehiclePanel>(),
            Ok(VehiclePanel::LeftFrontDoor)
        );
        assert_eq!(
            "rear-bumper".parse::<VehiclePanel>(),
            Ok(VehiclePanel::RearBumper)
        );
    }

    #[test]
    fn test_parse_unknown_panel() {
        assert!("windshield".parse::<VehiclePanel>().is_err());
    }
}
