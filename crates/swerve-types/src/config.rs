//! Configuration value types consumed by the drive core.
//!
//! These are plain data: every field has a serde default so a partial
//! `config.toml` is always valid.  Loading, saving and environment overrides
//! live in the `swervebot` CLI.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geometry::{Pose2d, Rotation2d};
use crate::vision::VisionSource;

/// Measurement noise model `(σx, σy, σθ)` in metres and radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StdDevs {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl StdDevs {
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }
}

/// A target-area threshold for each vision source.
///
/// The cameras sit at different distances from their targets, so the same
/// area means different things per source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SourceThresholds {
    pub coral: f64,
    pub reef: f64,
}

impl SourceThresholds {
    pub fn for_source(&self, source: VisionSource) -> f64 {
        match source {
            VisionSource::Coral => self.coral,
            VisionSource::Reef => self.reef,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Vision
// ────────────────────────────────────────────────────────────────────────────

/// Vision gating and fusion parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VisionConfig {
    /// Camera whose measurements feed the pose estimator.
    #[serde(default)]
    pub source: VisionSource,

    /// Pipeline index applied once at startup.
    #[serde(default = "default_pipeline")]
    pub pipeline: i32,

    /// Noise model applied to every accepted vision measurement.
    #[serde(default = "default_vision_std_devs")]
    pub std_devs: StdDevs,

    /// Minimum target area (exclusive) for a measurement to be fused.
    #[serde(default = "default_fusion_area")]
    pub fusion_area: SourceThresholds,

    /// Minimum target area (exclusive) for the camera to report detecting.
    #[serde(default = "default_detection_area")]
    pub detection_area: SourceThresholds,
}

fn default_pipeline() -> i32 {
    1
}
fn default_vision_std_devs() -> StdDevs {
    StdDevs::new(0.7, 0.7, 1.0)
}
fn default_fusion_area() -> SourceThresholds {
    SourceThresholds {
        coral: 0.6,
        reef: 0.5,
    }
}
fn default_detection_area() -> SourceThresholds {
    SourceThresholds {
        coral: 0.6,
        reef: 1.5,
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            source: VisionSource::default(),
            pipeline: default_pipeline(),
            std_devs: default_vision_std_devs(),
            fusion_area: default_fusion_area(),
            detection_area: default_detection_area(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Estimator
// ────────────────────────────────────────────────────────────────────────────

/// Trust placed in wheel odometry by the built-in complementary estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EstimatorConfig {
    #[serde(default = "default_state_std_devs")]
    pub state_std_devs: StdDevs,
}

fn default_state_std_devs() -> StdDevs {
    StdDevs::new(0.1, 0.1, 0.1)
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            state_std_devs: default_state_std_devs(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Loop timing
// ────────────────────────────────────────────────────────────────────────────

/// Robot loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LoopConfig {
    /// Control cycle period in milliseconds.
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Gyro warm-up delay before the heading is zeroed, in milliseconds.
    #[serde(default = "default_heading_zero_delay_ms")]
    pub heading_zero_delay_ms: u64,
}

fn default_period_ms() -> u64 {
    20
}
fn default_heading_zero_delay_ms() -> u64 {
    1000
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            heading_zero_delay_ms: default_heading_zero_delay_ms(),
        }
    }
}

impl LoopConfig {
    /// Cycle period in seconds.  A zero period is treated as 1 ms.
    pub fn period_s(&self) -> f64 {
        self.period_ms.max(1) as f64 / 1000.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Autonomy
// ────────────────────────────────────────────────────────────────────────────

/// Motion limits handed to the external path planner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PathConstraints {
    pub max_velocity_mps: f64,
    pub max_acceleration_mpss: f64,
    pub max_angular_velocity_rps: f64,
    pub max_angular_acceleration_rpss: f64,
}

impl Default for PathConstraints {
    fn default() -> Self {
        Self {
            max_velocity_mps: 3.0,
            max_acceleration_mpss: 3.0,
            max_angular_velocity_rps: 540f64.to_radians(),
            max_angular_acceleration_rpss: 720f64.to_radians(),
        }
    }
}

/// A pose written in configuration-friendly units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PoseConfig {
    pub x: f64,
    pub y: f64,
    pub heading_deg: f64,
}

impl From<PoseConfig> for Pose2d {
    fn from(p: PoseConfig) -> Self {
        Pose2d::new(p.x, p.y, Rotation2d::from_degrees(p.heading_deg))
    }
}

/// Path-following bridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AutonomyConfig {
    /// JSON robot description exported by the path-planning GUI.
    #[serde(default = "default_settings_path")]
    pub settings_path: String,

    #[serde(default = "default_kp")]
    pub translation_kp: f64,

    #[serde(default = "default_kp")]
    pub rotation_kp: f64,

    #[serde(default)]
    pub constraints: PathConstraints,

    /// Target pose of the "go to coral station" routine.
    #[serde(default = "default_coral_station")]
    pub coral_station: PoseConfig,
}

fn default_settings_path() -> String {
    "deploy/pathplanner/settings.json".to_string()
}
fn default_kp() -> f64 {
    5.0
}
fn default_coral_station() -> PoseConfig {
    PoseConfig {
        x: 1.2,
        y: 7.0,
        heading_deg: 126.0,
    }
}

impl Default for AutonomyConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
            translation_kp: default_kp(),
            rotation_kp: default_kp(),
            constraints: PathConstraints::default(),
            coral_station: default_coral_station(),
        }
    }
}
