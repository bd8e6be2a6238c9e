//! Vision source identity and measurement types.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geometry::Pose2d;

/// The cameras mounted on the robot.
///
/// Compared by value; the network-table name of each camera is derived from
/// the variant rather than used as its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum VisionSource {
    /// Camera facing the coral station.
    #[default]
    Coral,
    /// Camera facing the reef.
    Reef,
}

impl VisionSource {
    /// Network-table name the camera publishes under.
    pub fn table_name(&self) -> &'static str {
        match self {
            VisionSource::Coral => "limelight-coral",
            VisionSource::Reef => "limelight-reef",
        }
    }
}

impl fmt::Display for VisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// One field-relative pose solve from a camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisionMeasurement {
    pub pose: Pose2d,
    /// Capture time on the robot clock, in seconds.
    pub timestamp_s: f64,
    /// Fraction of the frame occupied by the target (0–100).
    pub target_area: f64,
    pub source: VisionSource,
}
