//! Planar field geometry: rotations, translations, poses and twists.
//!
//! All lengths are metres and all angles are radians unless a method name
//! says otherwise.  The field frame has its origin at the blue-alliance
//! corner, +X pointing down-field and +Y to the left, headings measured
//! counter-clockwise from +X.
//!
//! # Example
//!
//! ```rust
//! use swerve_types::geometry::{Pose2d, Rotation2d, Twist2d};
//!
//! // Drive one metre forward while turning a quarter circle.
//! let start = Pose2d::origin();
//! let end = start.exp(Twist2d::new(1.0, 0.0, std::f64::consts::FRAC_PI_2));
//! assert!((end.rotation().degrees() - 90.0).abs() < 1e-9);
//!
//! // `log` is the inverse of `exp`.
//! let back = start.log(&end);
//! assert!((back.dx - 1.0).abs() < 1e-9);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Rotation2d
// ────────────────────────────────────────────────────────────────────────────

/// A rotation in the plane.  The angle is stored unwrapped; use
/// [`Rotation2d::wrapped`] to obtain the equivalent angle in (-π, π].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation2d {
    radians: f64,
}

impl Rotation2d {
    pub const fn from_radians(radians: f64) -> Self {
        Self { radians }
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    /// Build the rotation pointing along the vector `(x, y)`.
    pub fn from_vector(x: f64, y: f64) -> Self {
        Self::from_radians(y.atan2(x))
    }

    pub fn radians(&self) -> f64 {
        self.radians
    }

    pub fn degrees(&self) -> f64 {
        self.radians.to_degrees()
    }

    pub fn cos(&self) -> f64 {
        self.radians.cos()
    }

    pub fn sin(&self) -> f64 {
        self.radians.sin()
    }

    /// Sum of two rotations.
    pub fn plus(&self, other: Rotation2d) -> Self {
        Self::from_radians(self.radians + other.radians)
    }

    /// Difference of two rotations, wrapped into (-π, π].
    pub fn minus(&self, other: Rotation2d) -> Self {
        Self::from_radians(self.radians - other.radians).wrapped()
    }

    pub fn inverse(&self) -> Self {
        Self::from_radians(-self.radians)
    }

    /// The same rotation expressed in (-π, π].
    pub fn wrapped(&self) -> Self {
        let tau = std::f64::consts::TAU;
        let r = self.radians.rem_euclid(tau);
        if r > std::f64::consts::PI {
            Self::from_radians(r - tau)
        } else {
            Self::from_radians(r)
        }
    }
}

impl fmt::Display for Rotation2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rotation2d(Rads: {:.2}, Deg: {:.2})", self.radians, self.degrees())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Translation2d
// ────────────────────────────────────────────────────────────────────────────

/// A 2-D vector in the field frame (metres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation2d {
    pub x: f64,
    pub y: f64,
}

impl Translation2d {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn plus(&self, other: Translation2d) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    pub fn minus(&self, other: Translation2d) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(&self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k)
    }

    /// Rotate this vector counter-clockwise by `rotation`.
    pub fn rotate_by(&self, rotation: Rotation2d) -> Self {
        let (s, c) = rotation.radians().sin_cos();
        Self::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn angle(&self) -> Rotation2d {
        Rotation2d::from_vector(self.x, self.y)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Twist2d
// ────────────────────────────────────────────────────────────────────────────

/// A change in pose along a constant-curvature arc, expressed in the frame of
/// the starting pose.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Twist2d {
    pub dx: f64,
    pub dy: f64,
    pub dtheta: f64,
}

impl Twist2d {
    pub const fn new(dx: f64, dy: f64, dtheta: f64) -> Self {
        Self { dx, dy, dtheta }
    }

    /// Scale each component independently.
    pub fn scale_each(&self, kx: f64, ky: f64, ktheta: f64) -> Self {
        Self::new(self.dx * kx, self.dy * ky, self.dtheta * ktheta)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pose2d
// ────────────────────────────────────────────────────────────────────────────

/// Robot position and heading in the field frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose2d {
    translation: Translation2d,
    rotation: Rotation2d,
}

impl Pose2d {
    pub fn new(x: f64, y: f64, rotation: Rotation2d) -> Self {
        Self::from_parts(Translation2d::new(x, y), rotation)
    }

    pub const fn from_parts(translation: Translation2d, rotation: Rotation2d) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// The field origin facing +X.
    pub fn origin() -> Self {
        Self::default()
    }

    pub fn x(&self) -> f64 {
        self.translation.x
    }

    pub fn y(&self) -> f64 {
        self.translation.y
    }

    pub fn translation(&self) -> Translation2d {
        self.translation
    }

    pub fn rotation(&self) -> Rotation2d {
        self.rotation
    }

    /// Express `self` in the frame of `other`.
    pub fn relative_to(&self, other: &Pose2d) -> Pose2d {
        let translation = self
            .translation
            .minus(other.translation)
            .rotate_by(other.rotation.inverse());
        Pose2d::from_parts(translation, self.rotation.minus(other.rotation))
    }

    /// Follow `twist` from this pose along a constant-curvature arc.
    pub fn exp(&self, twist: Twist2d) -> Pose2d {
        let Twist2d { dx, dy, dtheta } = twist;
        let (sin_theta, cos_theta) = dtheta.sin_cos();

        let (s, c) = if dtheta.abs() < 1e-9 {
            (1.0 - dtheta * dtheta / 6.0, 0.5 * dtheta)
        } else {
            (sin_theta / dtheta, (1.0 - cos_theta) / dtheta)
        };

        let local = Translation2d::new(dx * s - dy * c, dx * c + dy * s);
        Pose2d::from_parts(
            self.translation.plus(local.rotate_by(self.rotation)),
            self.rotation.plus(Rotation2d::from_radians(dtheta)),
        )
    }

    /// The twist that takes this pose to `end`.  Inverse of [`Pose2d::exp`].
    pub fn log(&self, end: &Pose2d) -> Twist2d {
        let transform = end.relative_to(self);
        let dtheta = transform.rotation.radians();
        let half_dtheta = dtheta / 2.0;
        let cos_minus_one = transform.rotation.cos() - 1.0;

        let half_theta_by_tan = if cos_minus_one.abs() < 1e-9 {
            1.0 - dtheta * dtheta / 12.0
        } else {
            -(half_dtheta * transform.rotation.sin()) / cos_minus_one
        };

        // Complex multiply by (half_theta_by_tan - i * half_dtheta).
        let t = transform.translation;
        Twist2d::new(
            t.x * half_theta_by_tan + t.y * half_dtheta,
            t.y * half_theta_by_tan - t.x * half_dtheta,
            dtheta,
        )
    }
}

impl fmt::Display for Pose2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pose2d(X: {:.2}, Y: {:.2}, {})",
            self.x(),
            self.y(),
            self.rotation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn wrapped_rotation_stays_in_half_open_interval() {
        assert!(close(Rotation2d::from_radians(PI).wrapped().radians(), PI));
        assert!(close(Rotation2d::from_radians(-PI).wrapped().radians(), PI));
        assert!(close(
            Rotation2d::from_radians(3.0 * FRAC_PI_2).wrapped().radians(),
            -FRAC_PI_2
        ));
    }

    #[test]
    fn rotate_translation_quarter_turn() {
        let t = Translation2d::new(1.0, 0.0).rotate_by(Rotation2d::from_degrees(90.0));
        assert!(close(t.x, 0.0));
        assert!(close(t.y, 1.0));
    }

    #[test]
    fn straight_twist_moves_along_heading() {
        let start = Pose2d::new(1.0, 1.0, Rotation2d::from_degrees(90.0));
        let end = start.exp(Twist2d::new(2.0, 0.0, 0.0));
        assert!(close(end.x(), 1.0));
        assert!(close(end.y(), 3.0));
    }

    #[test]
    fn quarter_arc_ends_on_circle() {
        // Radius-1 arc: travel π/2 along the arc while turning π/2.
        let end = Pose2d::origin().exp(Twist2d::new(FRAC_PI_2, 0.0, FRAC_PI_2));
        assert!(close(end.x(), 1.0));
        assert!(close(end.y(), 1.0));
        assert!(close(end.rotation().degrees(), 90.0));
    }

    #[test]
    fn log_inverts_exp() {
        let start = Pose2d::new(2.0, -1.0, Rotation2d::from_degrees(30.0));
        let twist = Twist2d::new(0.4, -0.2, 0.7);
        let back = start.log(&start.exp(twist));
        assert!(close(back.dx, twist.dx));
        assert!(close(back.dy, twist.dy));
        assert!(close(back.dtheta, twist.dtheta));
    }

    #[test]
    fn relative_to_self_is_identity() {
        let p = Pose2d::new(3.0, 4.0, Rotation2d::from_degrees(45.0));
        let r = p.relative_to(&p);
        assert!(close(r.x(), 0.0));
        assert!(close(r.y(), 0.0));
        assert!(close(r.rotation().radians(), 0.0));
    }
}
