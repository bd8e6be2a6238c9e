//! `swerve-types` – shared vocabulary for the swervebot workspace.
//!
//! # Modules
//!
//! - [`geometry`] – [`Pose2d`][geometry::Pose2d], [`Rotation2d`][geometry::Rotation2d],
//!   [`Translation2d`][geometry::Translation2d] and [`Twist2d`][geometry::Twist2d].
//! - [`kinematics`] – chassis and swerve-module value types.
//! - [`vision`] – [`VisionSource`] and [`VisionMeasurement`].
//! - [`config`] – serde-backed configuration values consumed by the core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod config;
pub mod geometry;
pub mod kinematics;
pub mod vision;

pub use geometry::{Pose2d, Rotation2d, Translation2d, Twist2d};
pub use kinematics::{ChassisSpeeds, ModuleArray, SwerveModulePosition, SwerveModuleState};
pub use vision::{VisionMeasurement, VisionSource};

/// Unified event wrapper for the telemetry bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g., "swerve-drive::periodic"
    pub source: String,
    pub payload: EventPayload,
}

impl Event {
    /// Stamp `payload` with a fresh id and the current wall-clock time.
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data routed over the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Telemetry(DriveTelemetry),
    HardwareFault {
        component: String,
        code: u32,
        message: String,
    },
    /// Operator-facing error that disables a feature but not the robot.
    OperatorAlert { component: String, message: String },
    /// Robot-relative chassis command issued by an autonomy routine.
    DriveCommand(ChassisSpeeds),
}

/// Per-cycle drive snapshot published to dashboards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveTelemetry {
    pub module_states: ModuleArray<SwerveModuleState>,
    pub pose: Pose2d,
    /// `[x, y, heading_deg]` for dashboards that plot a field widget.
    pub pose_array: [f64; 3],
    pub heading_rad: f64,
}

/// Workspace-wide error type.
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum DriveError {
    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),

    #[error("Autonomy Unavailable: {0}")]
    AutonomyUnavailable(String),
}
