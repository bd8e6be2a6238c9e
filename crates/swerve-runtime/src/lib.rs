//! `swerve-runtime` – process plumbing for the robot.
//!
//! # Modules
//!
//! - [`robot_loop`] – [`RobotLoop`][robot_loop::RobotLoop]: the fixed-period
//!   control loop that owns the drive subsystem, schedules the start-up
//!   heading zero, and steps the active autonomy routine.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]:
//!   initialises the global `tracing` subscriber with an optional OTLP span
//!   exporter.  Set `OTEL_EXPORTER_OTLP_ENDPOINT` to enable live trace export
//!   to Jaeger, Grafana Tempo, or any OTLP-compatible collector.

pub mod robot_loop;
pub mod telemetry;

pub use robot_loop::{LoopStats, RobotLoop};
pub use telemetry::{LogFormat, TracerProviderGuard, init_tracing};
