//! Robot physical description for the path follower.
//!
//! The path-planning GUI exports the robot's mass, moment of inertia and
//! module layout to a JSON settings file that is deployed with the robot
//! code.  [`RobotConfig::from_settings_file`] reads the subset the follower
//! needs.  Any failure here is an autonomy configuration failure: the caller
//! disables autonomy and keeps driving.

use std::path::Path;

use serde::Deserialize;
use swerve_types::{DriveError, Translation2d};

/// Robot description loaded from the GUI settings file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotConfig {
    /// Robot mass in kilograms.
    #[serde(rename = "robotMass")]
    pub mass_kg: f64,
    /// Moment of inertia about the vertical axis, kg·m².
    #[serde(rename = "robotMOI")]
    pub moi_kg_m2: f64,
    #[serde(default = "default_true")]
    pub holonomic_mode: bool,
    #[serde(rename = "driveWheelRadius")]
    pub wheel_radius_m: f64,
    #[serde(rename = "maxDriveSpeed")]
    pub max_drive_speed_mps: f64,
    #[serde(rename = "wheelCOF")]
    pub wheel_cof: f64,
    #[serde(rename = "driveCurrentLimit", default)]
    pub drive_current_limit_a: f64,
    #[serde(rename = "flModuleX")]
    fl_x: f64,
    #[serde(rename = "flModuleY")]
    fl_y: f64,
    #[serde(rename = "frModuleX")]
    fr_x: f64,
    #[serde(rename = "frModuleY")]
    fr_y: f64,
    #[serde(rename = "blModuleX")]
    bl_x: f64,
    #[serde(rename = "blModuleY")]
    bl_y: f64,
    #[serde(rename = "brModuleX")]
    br_x: f64,
    #[serde(rename = "brModuleY")]
    br_y: f64,
}

fn default_true() -> bool {
    true
}

impl RobotConfig {
    /// Read and validate the settings file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::AutonomyUnavailable`] if the file cannot be
    /// read, is not valid JSON, or describes a robot the holonomic follower
    /// cannot drive.
    pub fn from_settings_file(path: impl AsRef<Path>) -> Result<Self, DriveError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DriveError::AutonomyUnavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate settings JSON.
    pub fn from_json(raw: &str) -> Result<Self, DriveError> {
        let config: Self = serde_json::from_str(raw).map_err(|e| {
            DriveError::AutonomyUnavailable(format!("malformed robot settings: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), DriveError> {
        if !self.holonomic_mode {
            return Err(DriveError::AutonomyUnavailable(
                "robot settings describe a non-holonomic drivetrain".to_string(),
            ));
        }
        for (name, value) in [
            ("robotMass", self.mass_kg),
            ("robotMOI", self.moi_kg_m2),
            ("driveWheelRadius", self.wheel_radius_m),
            ("maxDriveSpeed", self.max_drive_speed_mps),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(DriveError::AutonomyUnavailable(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Module offsets from the robot centre, front-left first.
    pub fn module_offsets(&self) -> [Translation2d; 4] {
        [
            Translation2d::new(self.fl_x, self.fl_y),
            Translation2d::new(self.fr_x, self.fr_y),
            Translation2d::new(self.bl_x, self.bl_y),
            Translation2d::new(self.br_x, self.br_y),
        ]
    }
}
