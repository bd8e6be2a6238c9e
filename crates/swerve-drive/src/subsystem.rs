//! [`SwerveSubsystem`] – the drive base and its vision-gated pose fusion loop.
//!
//! The subsystem owns the four wheel modules, the heading sensor, one
//! fiducial camera and the pose estimator.  [`SwerveSubsystem::periodic`]
//! runs once per control cycle:
//!
//! 1. **Gate** – refresh the detection flag and ask the [`VisionGate`]
//!    whether the camera's current view may be fused.
//! 2. **Fuse** – when the gate passes, pull one measurement using the raw,
//!    unwrapped yaw as the heading hint and fold it into the estimator.
//! 3. **Odometry** – always advance the estimator with the wrapped heading
//!    and the four module positions.
//! 4. **Publish** – module states, fused pose and heading go out on
//!    [`Topic::Telemetry`].
//!
//! Nothing in the cycle returns an error: an unreachable camera fails the
//! gate closed and the cycle degrades to odometry only.
//!
//! # Example
//!
//! ```rust
//! use swerve_drive::SwerveSubsystem;
//! use swerve_hal::sim::SimDrivetrain;
//! use swerve_middleware::EventBus;
//! use swerve_types::config::{EstimatorConfig, VisionConfig};
//!
//! let sim = SimDrivetrain::builder().build();
//! let mut drive = SwerveSubsystem::simulated(
//!     &sim,
//!     &VisionConfig::default(),
//!     EstimatorConfig::default(),
//!     EventBus::default(),
//! );
//! let outcome = drive.periodic();
//! assert!(!outcome.vision_fused);
//! ```

use std::sync::Arc;
use std::time::Duration;

use swerve_hal::sim::SimDrivetrain;
use swerve_hal::{LimelightBackend, ModuleSet, OrientationSensor};
use swerve_middleware::{EventBus, Topic};
use swerve_perception::estimator::{ComplementaryEstimator, PoseEstimator};
use swerve_perception::kinematics::{DriveKinematics, PointKinematics};
use swerve_perception::orientation::{Orientation, ZeroingHandle};
use swerve_perception::vision::{VisionAdapter, VisionGate};
use swerve_types::config::{EstimatorConfig, VisionConfig};
use swerve_types::{
    ChassisSpeeds, DriveError, DriveTelemetry, Event, EventPayload, ModuleArray, Pose2d,
    SwerveModulePosition, SwerveModuleState,
};
use tracing::{debug, info};

/// Nominal control period used to discretize robot-relative commands.
pub const LOOP_PERIOD_S: f64 = 0.02;

const EVENT_SOURCE: &str = "swerve-drive::periodic";

/// `[x, y, heading_deg]` of `pose`, the layout dashboards plot.
pub fn pose_array(pose: &Pose2d) -> [f64; 3] {
    [pose.x(), pose.y(), pose.rotation().degrees()]
}

// ────────────────────────────────────────────────────────────────────────────
// Hardware bundle
// ────────────────────────────────────────────────────────────────────────────

/// The physical devices a [`SwerveSubsystem`] drives.
pub struct DriveHardware {
    pub modules: ModuleSet,
    pub gyro: Arc<dyn OrientationSensor>,
    pub limelight: Box<dyn LimelightBackend>,
}

impl DriveHardware {
    /// Hardware handles that share state with a simulated drivetrain.
    pub fn from_sim(sim: &SimDrivetrain) -> Self {
        Self {
            modules: sim.module_set(),
            gyro: Arc::new(sim.gyro.clone()),
            limelight: Box::new(sim.limelight.clone()),
        }
    }
}

/// What happened during one [`SwerveSubsystem::periodic`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleOutcome {
    /// Detection flag recomputed this cycle.
    pub detecting: bool,
    /// The gate passed.
    pub gate_passed: bool,
    /// A vision measurement was folded into the estimate.
    pub vision_fused: bool,
    /// Estimate after the odometry update.
    pub pose: Pose2d,
}

// ────────────────────────────────────────────────────────────────────────────
// SwerveSubsystem
// ────────────────────────────────────────────────────────────────────────────

/// The swerve drive base.
pub struct SwerveSubsystem {
    modules: ModuleSet,
    orientation: Orientation,
    vision: VisionAdapter,
    gate: VisionGate,
    estimator: Box<dyn PoseEstimator>,
    kinematics: Arc<dyn DriveKinematics>,
    bus: EventBus,
    zeroing: Option<ZeroingHandle>,
}

impl SwerveSubsystem {
    /// Assemble the subsystem.
    ///
    /// Applies the vision noise model to `estimator` and selects the
    /// configured camera pipeline.  Both happen exactly once, here.
    pub fn new(
        hardware: DriveHardware,
        kinematics: Arc<dyn DriveKinematics>,
        mut estimator: Box<dyn PoseEstimator>,
        vision_config: &VisionConfig,
        bus: EventBus,
    ) -> Self {
        estimator.set_vision_measurement_std_devs(vision_config.std_devs);

        let mut vision = VisionAdapter::from_config(hardware.limelight, vision_config);
        vision.set_pipeline(vision_config.pipeline);

        info!(
            source = %vision_config.source,
            pipeline = vision_config.pipeline,
            "swerve subsystem initialised"
        );

        Self {
            modules: hardware.modules,
            orientation: Orientation::new(hardware.gyro),
            vision,
            gate: VisionGate::new(vision_config.fusion_area),
            estimator,
            kinematics,
            bus,
            zeroing: None,
        }
    }

    /// A subsystem over a simulated drivetrain, with point-mass kinematics
    /// and the complementary estimator starting at the origin.
    pub fn simulated(
        sim: &SimDrivetrain,
        vision_config: &VisionConfig,
        estimator_config: EstimatorConfig,
        bus: EventBus,
    ) -> Self {
        let hardware = DriveHardware::from_sim(sim);
        let kinematics: Arc<dyn DriveKinematics> = Arc::new(PointKinematics);
        let orientation = Orientation::new(Arc::clone(&hardware.gyro));
        let estimator = ComplementaryEstimator::new(
            Arc::clone(&kinematics),
            orientation.rotation(),
            &hardware.modules.positions(),
            Pose2d::origin(),
            estimator_config,
        );
        Self::new(hardware, kinematics, Box::new(estimator), vision_config, bus)
    }

    // ── Fusion loop ──────────────────────────────────────────────────────────

    /// Run one gate → fuse → odometry → publish cycle.
    pub fn periodic(&mut self) -> CycleOutcome {
        let detecting = self.vision.refresh_detection();
        let gate_passed = self.gate.accepts(&self.vision);

        let mut vision_fused = false;
        if gate_passed {
            let hint = self.orientation.yaw();
            match self.vision.measurement(hint) {
                Some(m) => {
                    self.estimator.add_vision_measurement(m.pose, m.timestamp_s);
                    vision_fused = true;
                    debug!(
                        source = %m.source,
                        heading_hint_deg = hint,
                        timestamp_s = m.timestamp_s,
                        "vision measurement fused"
                    );
                }
                None => debug!(source = %self.vision.source(), "gate passed but camera had no solve"),
            }
        }

        let pose = self
            .estimator
            .update(self.orientation.rotation(), &self.modules.positions());

        self.publish_telemetry(pose);

        CycleOutcome {
            detecting,
            gate_passed,
            vision_fused,
            pose,
        }
    }

    fn publish_telemetry(&self, pose: Pose2d) {
        let telemetry = DriveTelemetry {
            module_states: self.modules.states(),
            pose,
            pose_array: pose_array(&pose),
            heading_rad: self.orientation.heading().to_radians(),
        };
        let event = Event::new(EVENT_SOURCE, EventPayload::Telemetry(telemetry));
        self.bus.publish_to(Topic::Telemetry, event);
    }

    // ── Heading ──────────────────────────────────────────────────────────────

    /// Zero the heading once `delay` has elapsed, on a Tokio task.
    pub fn schedule_heading_zero(&mut self, delay: Duration) {
        self.zeroing = Some(self.orientation.spawn_delayed_zero(delay));
    }

    /// `true` once a scheduled start-up zero has completed.
    pub fn heading_zeroed(&self) -> bool {
        self.zeroing.as_ref().is_some_and(ZeroingHandle::is_complete)
    }

    /// Handle to the scheduled start-up zero, if any.
    pub fn zeroing_handle(&self) -> Option<ZeroingHandle> {
        self.zeroing.clone()
    }

    pub fn zero_heading(&self) {
        self.orientation.reset();
    }

    pub fn set_heading(&self, degrees: f64) {
        self.orientation.set_yaw(degrees);
    }

    pub fn orientation(&self) -> &Orientation {
        &self.orientation
    }

    pub fn vision(&self) -> &VisionAdapter {
        &self.vision
    }

    pub fn vision_mut(&mut self) -> &mut VisionAdapter {
        &mut self.vision
    }

    // ── Drive commands ───────────────────────────────────────────────────────

    /// Drive with field-relative speeds.
    pub fn set_field_relative_speed(
        &mut self,
        vx_mps: f64,
        vy_mps: f64,
        omega_rps: f64,
    ) -> Result<(), DriveError> {
        let speeds =
            ChassisSpeeds::from_field_relative(vx_mps, vy_mps, omega_rps, self.orientation.rotation());
        self.set_chassis_speeds(speeds)
    }

    /// Drive with robot-relative speeds, applied as given.
    pub fn set_robot_oriented_speed(
        &mut self,
        vx_mps: f64,
        vy_mps: f64,
        omega_rps: f64,
    ) -> Result<(), DriveError> {
        self.set_chassis_speeds(ChassisSpeeds::new(vx_mps, vy_mps, omega_rps))
    }

    /// Drive with robot-relative speeds, discretized over one loop period.
    pub fn drive_robot_relative(&mut self, speeds: ChassisSpeeds) -> Result<(), DriveError> {
        self.set_chassis_speeds(speeds.discretize(LOOP_PERIOD_S))
    }

    fn set_chassis_speeds(&mut self, speeds: ChassisSpeeds) -> Result<(), DriveError> {
        let states = self.kinematics.to_module_states(speeds);
        self.set_module_states(&states)
    }

    pub fn set_module_states(
        &mut self,
        states: &ModuleArray<SwerveModuleState>,
    ) -> Result<(), DriveError> {
        self.modules.set_desired_states(states)
    }

    pub fn stop_modules(&mut self) {
        self.modules.stop_all();
    }

    pub fn reset_all_encoders(&mut self) {
        self.modules.reset_all_encoders();
    }

    /// Zero the heading, zero the encoders, and put the pose back at the
    /// origin.
    pub fn reset_swerve(&mut self) {
        self.zero_heading();
        self.reset_all_encoders();
        self.reset_pose(Pose2d::origin());
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn module_states(&self) -> ModuleArray<SwerveModuleState> {
        self.modules.states()
    }

    pub fn module_positions(&self) -> ModuleArray<SwerveModulePosition> {
        self.modules.positions()
    }

    /// Measured chassis velocity in the robot frame.
    pub fn robot_relative_speeds(&self) -> ChassisSpeeds {
        self.kinematics.to_chassis_speeds(&self.modules.states())
    }

    /// Measured chassis velocity in the field frame.
    pub fn field_relative_speeds(&self) -> ChassisSpeeds {
        let s = self.robot_relative_speeds();
        ChassisSpeeds::from_robot_relative(s.vx_mps, s.vy_mps, s.omega_rps, self.orientation.rotation())
    }

    /// Current fused pose.
    pub fn pose(&self) -> Pose2d {
        self.estimator.estimated_position()
    }

    /// Declare the robot to be at `pose`.
    pub fn reset_pose(&mut self, pose: Pose2d) {
        self.estimator.reset_position(
            self.orientation.rotation(),
            &self.modules.positions(),
            pose,
        );
        info!(x = pose.x(), y = pose.y(), heading_deg = pose.rotation().degrees(), "pose reset");
    }

    /// Human-readable module states, front-left first.
    pub fn module_state_strings(&self) -> [String; 4] {
        self.modules.states().map(|s| s.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use swerve_hal::LimelightPoseEstimate;
    use swerve_types::config::StdDevs;
    use swerve_types::{Rotation2d, VisionSource};

    // ── Recording estimator ─────────────────────────────────────────────────

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        StdDevs(StdDevs),
        Vision { pose: Pose2d, timestamp_s: f64 },
        Update { gyro_deg: f64 },
        Reset { pose: Pose2d },
    }

    #[derive(Clone, Default)]
    struct RecordingEstimator {
        calls: Arc<Mutex<Vec<Call>>>,
        pose: Arc<Mutex<Pose2d>>,
    }

    impl RecordingEstimator {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn cycle_calls(&self) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|c| !matches!(c, Call::StdDevs(_)))
                .collect()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl PoseEstimator for RecordingEstimator {
        fn set_vision_measurement_std_devs(&mut self, std_devs: StdDevs) {
            self.record(Call::StdDevs(std_devs));
        }

        fn add_vision_measurement(&mut self, pose: Pose2d, timestamp_s: f64) {
            self.record(Call::Vision { pose, timestamp_s });
        }

        fn update(
            &mut self,
            gyro_angle: Rotation2d,
            _positions: &ModuleArray<SwerveModulePosition>,
        ) -> Pose2d {
            self.record(Call::Update {
                gyro_deg: gyro_angle.degrees(),
            });
            *self.pose.lock().unwrap()
        }

        fn reset_position(
            &mut self,
            _gyro_angle: Rotation2d,
            _positions: &ModuleArray<SwerveModulePosition>,
            pose: Pose2d,
        ) {
            *self.pose.lock().unwrap() = pose;
            self.record(Call::Reset { pose });
        }

        fn estimated_position(&self) -> Pose2d {
            *self.pose.lock().unwrap()
        }
    }

    // ── Fixtures ────────────────────────────────────────────────────────────

    struct Rig {
        sim: SimDrivetrain,
        estimator: RecordingEstimator,
        drive: SwerveSubsystem,
        bus: EventBus,
    }

    fn rig(source: VisionSource, yaw_deg: f64) -> Rig {
        let sim = SimDrivetrain::builder()
            .with_initial_yaw(yaw_deg)
            .with_limelight(source)
            .build();
        let estimator = RecordingEstimator::default();
        let bus = EventBus::default();
        let config = VisionConfig {
            source,
            ..VisionConfig::default()
        };
        let drive = SwerveSubsystem::new(
            DriveHardware::from_sim(&sim),
            Arc::new(PointKinematics),
            Box::new(estimator.clone()),
            &config,
            bus.clone(),
        );
        Rig {
            sim,
            estimator,
            drive,
            bus,
        }
    }

    fn solve_at(x: f64, y: f64, timestamp_s: f64) -> Option<LimelightPoseEstimate> {
        Some(LimelightPoseEstimate {
            pose: Pose2d::new(x, y, Rotation2d::default()),
            timestamp_s,
            ..LimelightPoseEstimate::default()
        })
    }

    fn update_count(calls: &[Call]) -> usize {
        calls
            .iter()
            .filter(|c| matches!(c, Call::Update { .. }))
            .count()
    }

    // ── Construction ────────────────────────────────────────────────────────

    #[test]
    fn construction_applies_noise_model_and_pipeline_once() {
        let r = rig(VisionSource::Coral, 0.0);
        assert_eq!(r.estimator.calls(), vec![Call::StdDevs(StdDevs::new(0.7, 0.7, 1.0))]);
        assert_eq!(r.sim.limelight.pipeline_index(), 1.0);
    }

    #[test]
    fn pose_is_origin_before_any_reset() {
        let r = rig(VisionSource::Coral, 0.0);
        assert_eq!(r.drive.pose(), Pose2d::origin());
    }

    // ── Gate and fusion ─────────────────────────────────────────────────────

    #[test]
    fn no_fiducial_means_odometry_only() {
        let mut r = rig(VisionSource::Coral, 0.0);
        r.sim.limelight.set_target(0.0, 50.0);
        r.sim.limelight.set_megatag2(solve_at(1.0, 1.0, 1.0));

        let outcome = r.drive.periodic();

        assert!(!outcome.detecting);
        assert!(!outcome.vision_fused);
        assert_eq!(r.estimator.cycle_calls(), vec![Call::Update { gyro_deg: 0.0 }]);
        assert_eq!(r.sim.limelight.megatag2_reads(), 0);
    }

    #[test]
    fn coral_area_at_threshold_is_rejected() {
        let mut r = rig(VisionSource::Coral, 0.0);
        r.sim.limelight.set_target(3.0, 0.6);
        r.sim.limelight.set_megatag2(solve_at(1.0, 1.0, 1.0));

        assert!(!r.drive.periodic().vision_fused);
        assert_eq!(update_count(&r.estimator.calls()), 1);
        assert_eq!(r.estimator.cycle_calls().len(), 1);
    }

    #[test]
    fn reef_area_at_threshold_is_rejected() {
        let mut r = rig(VisionSource::Reef, 0.0);
        r.sim.limelight.set_target(3.0, 0.5);
        r.sim.limelight.set_megatag2(solve_at(1.0, 1.0, 1.0));

        assert!(!r.drive.periodic().gate_passed);
        assert_eq!(r.estimator.cycle_calls(), vec![Call::Update { gyro_deg: 0.0 }]);
    }

    #[test]
    fn coral_over_threshold_fuses_once_with_raw_yaw_hint() {
        // Cumulative yaw of 450° wraps to a 90° heading.
        let mut r = rig(VisionSource::Coral, 450.0);
        r.sim.limelight.set_target(1.0, 0.7);
        r.sim.limelight.set_megatag2(solve_at(2.0, 3.0, 12.5));

        let outcome = r.drive.periodic();

        assert!(outcome.detecting);
        assert!(outcome.vision_fused);
        let hint = r.sim.limelight.last_orientation().expect("heading published");
        assert_eq!(hint.yaw_deg, 450.0);
        assert_eq!(hint.pitch_deg, 0.0);
        assert_eq!(hint.yaw_rate_dps, 0.0);
        assert_eq!(r.sim.limelight.megatag2_reads(), 1);

        let calls = r.estimator.cycle_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            Call::Vision {
                pose: Pose2d::new(2.0, 3.0, Rotation2d::default()),
                timestamp_s: 12.5
            }
        );
        match calls[1] {
            Call::Update { gyro_deg } => assert!((gyro_deg - 90.0).abs() < 1e-9),
            ref other => panic!("expected odometry update, got {other:?}"),
        }
    }

    #[test]
    fn reef_gate_passes_below_its_detection_threshold() {
        let mut r = rig(VisionSource::Reef, 10.0);
        r.sim.limelight.set_target(1.0, 0.55);
        r.sim.limelight.set_megatag2(solve_at(4.0, 4.0, 2.0));

        let outcome = r.drive.periodic();

        assert!(outcome.gate_passed);
        assert!(outcome.vision_fused);
        // Fusion and detection use different thresholds.
        assert!(!outcome.detecting);
        assert_eq!(
            r.sim.limelight.last_orientation().map(|o| o.yaw_deg),
            Some(10.0)
        );
    }

    #[test]
    fn silent_camera_fails_closed() {
        let mut r = rig(VisionSource::Coral, 0.0);
        r.sim.limelight.set_target(5.0, 2.0);
        r.sim.limelight.set_megatag2(None);

        let outcome = r.drive.periodic();

        assert!(outcome.gate_passed);
        assert!(!outcome.vision_fused);
        assert_eq!(r.estimator.cycle_calls(), vec![Call::Update { gyro_deg: 0.0 }]);
    }

    #[test]
    fn odometry_runs_exactly_once_per_cycle() {
        let mut r = rig(VisionSource::Coral, 0.0);
        let scripts = [(0.0, 0.0), (1.0, 0.9), (2.0, 0.1), (7.0, 9.0), (0.0, 9.0)];
        r.sim.limelight.set_megatag2(solve_at(1.0, 1.0, 1.0));

        for (i, (id, area)) in scripts.iter().enumerate() {
            r.sim.limelight.set_target(*id, *area);
            r.drive.periodic();
            assert_eq!(update_count(&r.estimator.calls()), i + 1);
        }
    }

    #[test]
    fn detection_is_recomputed_every_cycle() {
        let mut r = rig(VisionSource::Coral, 0.0);
        r.sim.limelight.set_target(1.0, 2.0);
        assert!(r.drive.periodic().detecting);
        r.sim.limelight.set_target(0.0, 2.0);
        assert!(!r.drive.periodic().detecting);
        assert!(!r.drive.vision().is_detecting());
    }

    // ── Telemetry ───────────────────────────────────────────────────────────

    #[test]
    fn telemetry_carries_states_pose_and_heading() {
        let mut r = rig(VisionSource::Coral, -190.0);
        let mut rx = r.bus.subscribe_to(Topic::Telemetry);
        r.drive.reset_pose(Pose2d::new(1.0, 2.0, Rotation2d::from_degrees(30.0)));

        r.drive.periodic();

        let event = rx.try_next().expect("telemetry published");
        assert_eq!(event.source, EVENT_SOURCE);
        match event.payload {
            EventPayload::Telemetry(t) => {
                assert!((t.heading_rad - 170f64.to_radians()).abs() < 1e-12);
                assert_eq!(t.pose_array[0], 1.0);
                assert_eq!(t.pose_array[1], 2.0);
                assert!((t.pose_array[2] - 30.0).abs() < 1e-9);
                assert_eq!(t.module_states.len(), 4);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn publishing_without_listeners_does_not_disturb_the_cycle() {
        let mut r = rig(VisionSource::Coral, 0.0);
        assert_eq!(r.bus.subscriber_count(Topic::Telemetry), 0);
        r.drive.periodic();
        r.drive.periodic();
        assert_eq!(update_count(&r.estimator.calls()), 2);
    }

    // ── Pose API ────────────────────────────────────────────────────────────

    #[test]
    fn reset_pose_is_idempotent() {
        let mut r = rig(VisionSource::Coral, 0.0);
        let target = Pose2d::new(3.0, -1.0, Rotation2d::from_degrees(45.0));
        r.drive.reset_pose(target);
        let once = r.drive.pose();
        r.drive.reset_pose(target);
        assert_eq!(r.drive.pose(), once);
        assert_eq!(once, target);
    }

    #[test]
    fn reset_swerve_zeroes_everything() {
        let mut r = rig(VisionSource::Coral, 75.0);
        r.sim.modules[0].set_position(SwerveModulePosition::new(3.0, Rotation2d::default()));
        r.drive.reset_pose(Pose2d::new(5.0, 5.0, Rotation2d::default()));

        r.drive.reset_swerve();

        assert_eq!(r.sim.gyro.reset_count(), 1);
        assert_eq!(r.drive.module_positions()[0].distance_m, 0.0);
        assert_eq!(r.drive.pose(), Pose2d::origin());
    }

    #[test]
    fn pose_array_is_x_y_degrees() {
        let pose = Pose2d::new(1.5, -2.0, Rotation2d::from_degrees(-45.0));
        let [x, y, deg] = pose_array(&pose);
        assert_eq!((x, y), (1.5, -2.0));
        assert!((deg + 45.0).abs() < 1e-9);
    }

    // ── Drive commands ──────────────────────────────────────────────────────

    #[test]
    fn field_relative_command_accounts_for_heading() {
        let mut r = rig(VisionSource::Coral, 90.0);
        // Field +X while facing +Y is robot -Y.
        r.drive.set_field_relative_speed(1.0, 0.0, 0.0).unwrap();
        let robot = r.drive.robot_relative_speeds();
        assert!(robot.vx_mps.abs() < 1e-9);
        assert!((robot.vy_mps + 1.0).abs() < 1e-9);

        let field = r.drive.field_relative_speeds();
        assert!((field.vx_mps - 1.0).abs() < 1e-9);
        assert!(field.vy_mps.abs() < 1e-9);
    }

    #[test]
    fn robot_oriented_command_is_applied_verbatim() {
        let mut r = rig(VisionSource::Coral, 90.0);
        r.drive.set_robot_oriented_speed(2.0, 0.0, 0.0).unwrap();
        let robot = r.drive.robot_relative_speeds();
        assert!((robot.vx_mps - 2.0).abs() < 1e-9);
        assert!(robot.vy_mps.abs() < 1e-9);
    }

    #[test]
    fn robot_relative_drive_is_discretized() {
        let mut r = rig(VisionSource::Coral, 0.0);
        let command = ChassisSpeeds::new(2.0, 0.0, 3.0);
        r.drive.drive_robot_relative(command).unwrap();

        let expected = command.discretize(LOOP_PERIOD_S);
        let robot = r.drive.robot_relative_speeds();
        assert!((robot.vx_mps - expected.vx_mps).abs() < 1e-9);
        assert!((robot.vy_mps - expected.vy_mps).abs() < 1e-9);
        assert!(robot.vy_mps.abs() > 1e-6, "discretization must skew translation");
    }

    #[test]
    fn stop_keeps_module_angles() {
        let mut r = rig(VisionSource::Coral, 0.0);
        r.drive
            .set_module_states(&[SwerveModuleState::new(1.0, Rotation2d::from_degrees(20.0)); 4])
            .unwrap();
        r.drive.stop_modules();
        for state in r.drive.module_states() {
            assert_eq!(state.speed_mps, 0.0);
            assert!((state.angle.degrees() - 20.0).abs() < 1e-9);
        }
        assert!(r.drive.module_state_strings()[0].starts_with("SwerveModuleState(Speed: 0.00 m/s"));
    }

    #[test]
    fn set_heading_overrides_yaw() {
        let r = rig(VisionSource::Coral, 0.0);
        r.drive.set_heading(-200.0);
        assert_eq!(r.drive.orientation().yaw(), -200.0);
        assert_eq!(r.drive.orientation().heading(), 160.0);
    }

    // ── Start-up zero ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn scheduled_zero_completes_and_is_observable() {
        let mut r = rig(VisionSource::Coral, 33.0);
        assert!(!r.drive.heading_zeroed());

        r.drive.schedule_heading_zero(Duration::from_millis(10));
        // The loop keeps cycling while the zero is pending.
        r.drive.periodic();

        let mut handle = r.drive.zeroing_handle().expect("zero scheduled");
        handle.wait().await;
        assert!(r.drive.heading_zeroed());
        assert_eq!(r.drive.orientation().yaw(), 0.0);
    }

    // ── End to end with the complementary estimator ─────────────────────────

    #[test]
    fn simulated_drive_integrates_and_fuses() {
        let sim = SimDrivetrain::builder().build();
        let mut drive = SwerveSubsystem::simulated(
            &sim,
            &VisionConfig::default(),
            EstimatorConfig::default(),
            EventBus::default(),
        );

        drive.set_robot_oriented_speed(1.0, 0.0, 0.0).unwrap();
        for _ in 0..50 {
            sim.advance(LOOP_PERIOD_S);
            drive.periodic();
        }
        assert!((drive.pose().x() - 1.0).abs() < 1e-9);

        // A confident camera pulls the estimate towards its solve.
        sim.limelight.set_target(4.0, 1.0);
        sim.limelight.set_megatag2(solve_at(3.0, 0.0, 1.0));
        drive.stop_modules();
        let outcome = drive.periodic();
        assert!(outcome.vision_fused);
        assert!(drive.pose().x() > 1.0 && drive.pose().x() < 3.0);
    }
}
