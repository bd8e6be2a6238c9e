//! In-process simulated drivers for headless runs and tests.
//!
//! Every simulated device is a cheap, cloneable handle around shared state:
//! hand one clone to the drive stack and keep another in the test to script
//! readings and assert on the commands that arrived.
//!
//! # Example
//!
//! ```rust
//! use swerve_hal::sim::SimDrivetrain;
//! use swerve_hal::gyro::OrientationSensor;
//! use swerve_types::VisionSource;
//!
//! let sim = SimDrivetrain::builder()
//!     .with_initial_yaw(90.0)
//!     .with_limelight(VisionSource::Coral)
//!     .build();
//!
//! assert_eq!(sim.gyro.yaw_degrees(), 90.0);
//! sim.limelight.set_target(4.0, 0.8);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use swerve_types::{
    DriveError, ModuleArray, SwerveModulePosition, SwerveModuleState, VisionSource,
};

use crate::gyro::OrientationSensor;
use crate::limelight::{LimelightBackend, LimelightPoseEstimate, RobotOrientation};
use crate::module::{MODULE_NAMES, ModuleSet, WheelModule};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated gyro
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct GyroState {
    yaw_deg: f64,
    resets: usize,
}

/// A simulated heading sensor.  Reads back whatever was last written.
#[derive(Debug, Clone, Default)]
pub struct SimGyro {
    state: Arc<Mutex<GyroState>>,
}

impl SimGyro {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spin the simulated robot by `delta_deg`.
    pub fn rotate(&self, delta_deg: f64) {
        lock(&self.state).yaw_deg += delta_deg;
    }

    /// Number of times [`OrientationSensor::reset`] has been called.
    pub fn reset_count(&self) -> usize {
        lock(&self.state).resets
    }
}

impl OrientationSensor for SimGyro {
    fn id(&self) -> &str {
        "sim_gyro"
    }

    fn yaw_degrees(&self) -> f64 {
        lock(&self.state).yaw_deg
    }

    fn reset(&self) -> Result<(), DriveError> {
        let mut s = lock(&self.state);
        s.yaw_deg = 0.0;
        s.resets += 1;
        Ok(())
    }

    fn set_yaw(&self, degrees: f64) -> Result<(), DriveError> {
        lock(&self.state).yaw_deg = degrees;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated wheel module
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct ModuleState {
    commanded: SwerveModuleState,
    distance_m: f64,
}

/// A simulated swerve module that instantly reaches the commanded state.
#[derive(Debug, Clone)]
pub struct SimWheelModule {
    id: &'static str,
    state: Arc<Mutex<ModuleState>>,
}

impl SimWheelModule {
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            state: Arc::default(),
        }
    }

    /// Integrate the commanded speed over `dt_s` seconds.
    pub fn advance(&self, dt_s: f64) {
        let mut s = lock(&self.state);
        s.distance_m += s.commanded.speed_mps * dt_s;
    }

    /// Overwrite the cumulative position (test helper).
    pub fn set_position(&self, position: SwerveModulePosition) {
        let mut s = lock(&self.state);
        s.distance_m = position.distance_m;
        s.commanded.angle = position.angle;
    }
}

impl WheelModule for SimWheelModule {
    fn id(&self) -> &str {
        self.id
    }

    fn state(&self) -> SwerveModuleState {
        lock(&self.state).commanded
    }

    fn position(&self) -> SwerveModulePosition {
        let s = lock(&self.state);
        SwerveModulePosition::new(s.distance_m, s.commanded.angle)
    }

    fn set_desired_state(&mut self, state: SwerveModuleState) -> Result<(), DriveError> {
        lock(&self.state).commanded = state;
        Ok(())
    }

    fn stop(&mut self) {
        lock(&self.state).commanded.speed_mps = 0.0;
    }

    fn reset_encoders(&mut self) {
        lock(&self.state).distance_m = 0.0;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated Limelight
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct LimelightState {
    fiducial_id: f64,
    target_area: f64,
    target_x: f64,
    target_y: f64,
    pipeline: i32,
    orientation: Option<RobotOrientation>,
    megatag2: Option<LimelightPoseEstimate>,
    single_tag: Option<LimelightPoseEstimate>,
    megatag2_reads: usize,
}

/// A simulated fiducial camera whose network-table values are scripted.
#[derive(Debug, Clone)]
pub struct SimLimelight {
    source: VisionSource,
    state: Arc<Mutex<LimelightState>>,
}

impl SimLimelight {
    pub fn new(source: VisionSource) -> Self {
        Self {
            source,
            state: Arc::default(),
        }
    }

    pub fn source(&self) -> VisionSource {
        self.source
    }

    /// Script the primary fiducial id and its target area.
    pub fn set_target(&self, fiducial_id: f64, target_area: f64) {
        let mut s = lock(&self.state);
        s.fiducial_id = fiducial_id;
        s.target_area = target_area;
    }

    pub fn set_offsets(&self, target_x: f64, target_y: f64) {
        let mut s = lock(&self.state);
        s.target_x = target_x;
        s.target_y = target_y;
    }

    /// Script the heading-assisted pose solve.  `None` simulates a camera
    /// that publishes nothing.
    pub fn set_megatag2(&self, estimate: Option<LimelightPoseEstimate>) {
        lock(&self.state).megatag2 = estimate;
    }

    pub fn set_single_tag(&self, estimate: Option<LimelightPoseEstimate>) {
        lock(&self.state).single_tag = estimate;
    }

    /// The last attitude published by the robot, if any.
    pub fn last_orientation(&self) -> Option<RobotOrientation> {
        lock(&self.state).orientation
    }

    /// Number of heading-assisted solves requested so far.
    pub fn megatag2_reads(&self) -> usize {
        lock(&self.state).megatag2_reads
    }
}

impl LimelightBackend for SimLimelight {
    fn fiducial_id(&self) -> f64 {
        lock(&self.state).fiducial_id
    }

    fn target_area(&self) -> f64 {
        lock(&self.state).target_area
    }

    fn target_x(&self) -> f64 {
        lock(&self.state).target_x
    }

    fn target_y(&self) -> f64 {
        lock(&self.state).target_y
    }

    fn pipeline_index(&self) -> f64 {
        f64::from(lock(&self.state).pipeline)
    }

    fn set_pipeline_index(&mut self, index: i32) {
        lock(&self.state).pipeline = index;
    }

    fn set_robot_orientation(&mut self, orientation: RobotOrientation) {
        lock(&self.state).orientation = Some(orientation);
    }

    fn pose_estimate_megatag2(&self) -> Option<LimelightPoseEstimate> {
        let mut s = lock(&self.state);
        s.megatag2_reads += 1;
        s.megatag2
    }

    fn pose_estimate(&self) -> Option<LimelightPoseEstimate> {
        lock(&self.state).single_tag
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimDrivetrain builder
// ────────────────────────────────────────────────────────────────────────────

/// A complete simulated chassis: one gyro, four modules, one camera.
#[derive(Debug, Clone)]
pub struct SimDrivetrain {
    pub gyro: SimGyro,
    pub modules: ModuleArray<SimWheelModule>,
    pub limelight: SimLimelight,
}

impl SimDrivetrain {
    pub fn builder() -> SimDrivetrainBuilder {
        SimDrivetrainBuilder::default()
    }

    /// A [`ModuleSet`] whose slots share state with [`SimDrivetrain::modules`].
    pub fn module_set(&self) -> ModuleSet {
        ModuleSet::new(std::array::from_fn(|i| {
            Box::new(self.modules[i].clone()) as Box<dyn WheelModule>
        }))
    }

    /// Integrate every module's commanded speed over `dt_s` seconds.
    pub fn advance(&self, dt_s: f64) {
        for module in &self.modules {
            module.advance(dt_s);
        }
    }
}

/// Builder for [`SimDrivetrain`].
#[derive(Debug, Default)]
pub struct SimDrivetrainBuilder {
    initial_yaw_deg: f64,
    source: VisionSource,
}

impl SimDrivetrainBuilder {
    pub fn with_initial_yaw(mut self, yaw_deg: f64) -> Self {
        self.initial_yaw_deg = yaw_deg;
        self
    }

    pub fn with_limelight(mut self, source: VisionSource) -> Self {
        self.source = source;
        self
    }

    pub fn build(self) -> SimDrivetrain {
        let gyro = SimGyro::new();
        gyro.rotate(self.initial_yaw_deg);
        SimDrivetrain {
            gyro,
            modules: std::array::from_fn(|i| SimWheelModule::new(MODULE_NAMES[i])),
            limelight: SimLimelight::new(self.source),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
