//! Generic PID (Proportional–Integral–Derivative) controller.
//!
//! The controller computes a corrective output that drives a measured value
//! toward a desired set-point.  It is hardware-agnostic: the caller supplies
//! the measurement and elapsed time, and receives the computed output.
//!
//! For angular quantities call [`PidController::enable_continuous_input`] so
//! the error takes the short way around the circle.
//!
//! # Example
//!
//! ```rust
//! use swerve_hal::pid::PidController;
//!
//! let mut pid = PidController::new(5.0, 0.0, 0.0);
//! pid.set_set_point(2.0); // metres
//!
//! let output = pid.update(1.5, 0.02); // measurement = 1.5 m, dt = 20 ms
//! assert!((output - 2.5).abs() < 1e-9);
//! ```

/// A tunable PID controller for closed-loop feedback control.
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    set_point: f64,
    integral: f64,
    last_error: Option<f64>,
    output_min: f64,
    output_max: f64,
    continuous: Option<(f64, f64)>,
}

impl PidController {
    /// Create a new controller with the given gains.
    ///
    /// Output is unclamped by default.
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            set_point: 0.0,
            integral: 0.0,
            last_error: None,
            output_min: f64::NEG_INFINITY,
            output_max: f64::INFINITY,
            continuous: None,
        }
    }

    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    pub fn set_set_point(&mut self, set_point: f64) {
        self.set_point = set_point;
    }

    pub fn set_point(&self) -> f64 {
        self.set_point
    }

    /// Clamp the controller output to `[min, max]`.
    ///
    /// Integral wind-up is also clamped to this range.
    pub fn set_output_limits(&mut self, min: f64, max: f64) {
        self.output_min = min;
        self.output_max = max;
    }

    /// Treat `min` and `max` as the same point (e.g. -π and π), so the error
    /// is always the shortest signed distance on that circle.
    pub fn enable_continuous_input(&mut self, min: f64, max: f64) {
        self.continuous = Some((min, max));
    }

    /// Compute the next controller output.
    ///
    /// Returns `0.0` without updating internal state if `dt` is not positive.
    pub fn update(&mut self, measurement: f64, dt: f64) -> f64 {
        if dt <= 0.0 {
            return 0.0;
        }

        let error = self.error(measurement);

        let p = self.kp * error;

        // Integral term with anti-windup clamping.
        self.integral += error * dt;
        let i = (self.ki * self.integral).clamp(self.output_min, self.output_max);
        if self.ki.abs() > f64::EPSILON {
            self.integral = i / self.ki;
        }

        let d = match self.last_error {
            Some(prev) => self.kd * (error - prev) / dt,
            None => 0.0,
        };
        self.last_error = Some(error);

        (p + i + d).clamp(self.output_min, self.output_max)
    }

    /// Reset internal state (integral accumulator and derivative memory).
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = None;
    }

    fn error(&self, measurement: f64) -> f64 {
        let raw = self.set_point - measurement;
        match self.continuous {
            Some((min, max)) => {
                let span = max - min;
                let half = span / 2.0;
                (raw + half).rem_euclid(span) - half
            }
            None => raw,
        }
    }
}
