//! Vision adapter and measurement gate.
//!
//! [`VisionAdapter`] wraps one [`LimelightBackend`] together with the
//! [`VisionSource`] it represents.  [`VisionGate`] decides, once per cycle,
//! whether the camera's current view is trustworthy enough to be fused.
//!
//! Both use per-source area thresholds; the detection and fusion thresholds
//! are independent configuration values.
//!
//! # Example
//!
//! ```rust
//! use swerve_hal::sim::SimLimelight;
//! use swerve_perception::vision::{VisionAdapter, VisionGate};
//! use swerve_types::config::VisionConfig;
//! use swerve_types::VisionSource;
//!
//! let cam = SimLimelight::new(VisionSource::Reef);
//! let config = VisionConfig { source: VisionSource::Reef, ..VisionConfig::default() };
//! let mut vision = VisionAdapter::from_config(Box::new(cam.clone()), &config);
//! let gate = VisionGate::new(config.fusion_area);
//!
//! cam.set_target(3.0, 0.55);
//! assert!(gate.accepts(&vision));          // 0.55 > 0.5 fusion threshold
//! assert!(!vision.refresh_detection());    // but 0.55 <= 1.5 detection threshold
//! ```

use swerve_hal::{LimelightBackend, RobotOrientation};
use swerve_types::config::{SourceThresholds, VisionConfig};
use swerve_types::{Pose2d, Rotation2d, VisionMeasurement, VisionSource};
use tracing::debug;

// ────────────────────────────────────────────────────────────────────────────
// VisionAdapter
// ────────────────────────────────────────────────────────────────────────────

/// One camera-based localiser.
pub struct VisionAdapter {
    backend: Box<dyn LimelightBackend>,
    source: VisionSource,
    detection_area: SourceThresholds,
    detecting: bool,
}

impl VisionAdapter {
    pub fn new(
        backend: Box<dyn LimelightBackend>,
        source: VisionSource,
        detection_area: SourceThresholds,
    ) -> Self {
        Self {
            backend,
            source,
            detection_area,
            detecting: false,
        }
    }

    pub fn from_config(backend: Box<dyn LimelightBackend>, config: &VisionConfig) -> Self {
        Self::new(backend, config.source, config.detection_area)
    }

    pub fn source(&self) -> VisionSource {
        self.source
    }

    /// Primary in-view fiducial id; `<= 0` means no detection.
    pub fn fiducial_id(&self) -> f64 {
        self.backend.fiducial_id()
    }

    pub fn target_area(&self) -> f64 {
        self.backend.target_area()
    }

    pub fn target_x(&self) -> f64 {
        self.backend.target_x()
    }

    pub fn target_y(&self) -> f64 {
        self.backend.target_y()
    }

    pub fn pipeline(&self) -> f64 {
        self.backend.pipeline_index()
    }

    /// Select a pipeline.  The index is not validated.
    pub fn set_pipeline(&mut self, index: i32) {
        self.backend.set_pipeline_index(index);
    }

    /// Recompute the detection flag from the current camera snapshot.
    ///
    /// The previous value is discarded: there is no hysteresis.
    pub fn refresh_detection(&mut self) -> bool {
        self.detecting = self.fiducial_id() > 0.0
            && self.target_area() > self.detection_area.for_source(self.source);
        self.detecting
    }

    /// Detection flag as of the last [`VisionAdapter::refresh_detection`].
    pub fn is_detecting(&self) -> bool {
        self.detecting
    }

    /// Publish `heading_hint_deg` to the camera and request a
    /// heading-assisted pose solve.
    ///
    /// Returns `None` when the camera has nothing to report.
    pub fn measurement(&mut self, heading_hint_deg: f64) -> Option<VisionMeasurement> {
        self.backend
            .set_robot_orientation(RobotOrientation::heading_only(heading_hint_deg));
        let estimate = self.backend.pose_estimate_megatag2()?;
        Some(VisionMeasurement {
            pose: estimate.pose,
            timestamp_s: estimate.timestamp_s,
            target_area: self.target_area(),
            source: self.source,
        })
    }

    /// Pose solve without heading assistance.
    pub fn robot_pose(&self) -> Option<Pose2d> {
        self.backend.pose_estimate().map(|e| e.pose)
    }

    pub fn pose_x(&self) -> Option<f64> {
        self.robot_pose().map(|p| p.x())
    }

    pub fn pose_y(&self) -> Option<f64> {
        self.robot_pose().map(|p| p.y())
    }

    pub fn pose_rotation(&self) -> Option<Rotation2d> {
        self.robot_pose().map(|p| p.rotation())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// VisionGate
// ────────────────────────────────────────────────────────────────────────────

/// Per-cycle acceptance policy for vision measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionGate {
    fusion_area: SourceThresholds,
}

impl VisionGate {
    pub fn new(fusion_area: SourceThresholds) -> Self {
        Self { fusion_area }
    }

    /// `true` iff a fiducial is in view and its area exceeds the active
    /// source's fusion threshold.
    pub fn admits(&self, source: VisionSource, fiducial_id: f64, target_area: f64) -> bool {
        fiducial_id > 0.0 && target_area > self.fusion_area.for_source(source)
    }

    /// Evaluate the gate against the adapter's current snapshot.
    pub fn accepts(&self, vision: &VisionAdapter) -> bool {
        let source = vision.source();
        let id = vision.fiducial_id();
        let area = vision.target_area();
        let accepted = self.admits(source, id, area);
        debug!(%source, fiducial_id = id, target_area = area, accepted, "vision gate");
        accepted
    }
}

impl Default for VisionGate {
    fn default() -> Self {
        Self::new(VisionConfig::default().fusion_area)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
