//! `LimelightBackend` trait and supporting types for fiducial-localising
//! cameras.
//!
//! A backend is the network-table view of exactly one camera.  All reads are
//! best-effort snapshots: when the camera is unplugged the backend returns
//! the table defaults (zero) rather than an error, and pose solves come back
//! as `None`.

use swerve_types::Pose2d;

/// Robot attitude handed to the camera before a heading-assisted pose solve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RobotOrientation {
    pub yaw_deg: f64,
    pub yaw_rate_dps: f64,
    pub pitch_deg: f64,
    pub pitch_rate_dps: f64,
    pub roll_deg: f64,
    pub roll_rate_dps: f64,
}

impl RobotOrientation {
    /// Yaw only; pitch, roll and every rate are zero.
    pub fn heading_only(yaw_deg: f64) -> Self {
        Self {
            yaw_deg,
            ..Self::default()
        }
    }
}

/// A field-relative (blue-origin) pose solve published by the camera.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LimelightPoseEstimate {
    pub pose: Pose2d,
    /// Capture time on the robot clock, in seconds.
    pub timestamp_s: f64,
    pub latency_ms: f64,
    pub tag_count: u32,
    pub avg_tag_dist_m: f64,
    pub avg_tag_area: f64,
}

/// Network-table access to one camera.
pub trait LimelightBackend: Send {
    /// Primary in-view fiducial id; `<= 0` means nothing is detected.
    fn fiducial_id(&self) -> f64;

    /// Target area as a percentage of the image.
    fn target_area(&self) -> f64;

    /// Horizontal offset from crosshair to target, in degrees.
    fn target_x(&self) -> f64;

    /// Vertical offset from crosshair to target, in degrees.
    fn target_y(&self) -> f64;

    /// Index of the pipeline the camera is currently running.
    fn pipeline_index(&self) -> f64;

    /// Request a pipeline switch.  Out-of-range indices are ignored by the
    /// camera.
    fn set_pipeline_index(&mut self, index: i32);

    /// Publish the robot attitude used by the heading-assisted solver.
    fn set_robot_orientation(&mut self, orientation: RobotOrientation);

    /// Heading-assisted ("MegaTag2") pose solve.
    fn pose_estimate_megatag2(&self) -> Option<LimelightPoseEstimate>;

    /// Multi-tag pose solve without heading assistance.
    fn pose_estimate(&self) -> Option<LimelightPoseEstimate>;
}
