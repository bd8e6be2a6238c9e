//! On-the-fly path requests handed to the external path planner.
//!
//! The planner owns spline generation and pathfinding; this module only
//! builds the requests: waypoint lists, constraints and the goal state.

use std::f64::consts::FRAC_PI_2;

use swerve_types::config::PathConstraints;
use swerve_types::{Pose2d, Rotation2d};

/// Desired state at the end of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalEndState {
    pub velocity_mps: f64,
    pub rotation: Rotation2d,
}

/// A waypoint path for the planner to smooth into a trajectory.
///
/// Each waypoint's rotation is the direction of travel through it, not the
/// robot's facing.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRequest {
    pub waypoints: Vec<Pose2d>,
    pub constraints: PathConstraints,
    pub goal_end_state: GoalEndState,
    /// Keep the path on the blue-origin coordinates even for the red
    /// alliance.
    pub prevent_flipping: bool,
}

/// A request to pathfind around field obstacles to `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathfindRequest {
    pub target: Pose2d,
    pub constraints: PathConstraints,
}

/// Approach heading used by [`create_align_path`], in radians.
///
/// `-atan((cx - ax) / (cy - ay)) + π/2`, negated unless the robot is
/// strictly down-field (`cx > ax`) of the align point.  When the two points
/// coincide there is no direction of travel and `None` is returned.
pub fn approach_heading(current: &Pose2d, align: &Pose2d) -> Option<f64> {
    let ratio = (current.x() - align.x()) / (current.y() - align.y());
    if ratio.is_nan() {
        return None;
    }
    let heading = -ratio.atan() + FRAC_PI_2;
    Some(if current.x() > align.x() {
        heading
    } else {
        -heading
    })
}

/// Build a three-waypoint path `current → align → end`.
///
/// The first two waypoints travel along the approach heading; the robot
/// finishes at rest facing `end`'s rotation.  Flipping is disabled: the
/// poses are already expressed for the alliance in play.
pub fn create_align_path(
    current: &Pose2d,
    align: &Pose2d,
    end: &Pose2d,
    constraints: PathConstraints,
) -> PathRequest {
    let heading = approach_heading(current, align)
        .map(Rotation2d::from_radians)
        .unwrap_or_else(|| end.rotation());

    PathRequest {
        waypoints: vec![
            Pose2d::from_parts(current.translation(), heading),
            Pose2d::from_parts(align.translation(), heading),
            *end,
        ],
        constraints,
        goal_end_state: GoalEndState {
            velocity_mps: 0.0,
            rotation: end.rotation(),
        },
        prevent_flipping: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_4, PI};

    fn at(x: f64, y: f64) -> Pose2d {
        Pose2d::new(x, y, Rotation2d::default())
    }

    #[test]
    fn heading_when_downfield_of_align_point() {
        // c = (2 - 1) / (1 - 2) = -1  →  π/4 + π/2
        let h = approach_heading(&at(2.0, 1.0), &at(1.0, 2.0)).unwrap();
        assert!((h - 3.0 * FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn heading_is_negated_when_not_downfield() {
        // c = (1 - 2) / (1 - 2) = 1  →  -(−π/4 + π/2)
        let h = approach_heading(&at(1.0, 1.0), &at(2.0, 2.0)).unwrap();
        assert!((h + FRAC_PI_4).abs() < 1e-12);

        // Equal X counts as "not downfield".
        let h = approach_heading(&at(1.0, 0.0), &at(1.0, 3.0)).unwrap();
        assert!((h + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn equal_y_gives_axis_aligned_heading() {
        // c = +∞  →  0 ; c = -∞  →  π, negated
        let h = approach_heading(&at(3.0, 1.0), &at(1.0, 1.0)).unwrap();
        assert!(h.abs() < 1e-12);
        let h = approach_heading(&at(0.0, 1.0), &at(1.0, 1.0)).unwrap();
        assert!((h + PI).abs() < 1e-12);
    }

    #[test]
    fn coincident_points_have_no_heading() {
        assert!(approach_heading(&at(1.0, 1.0), &at(1.0, 1.0)).is_none());
    }

    #[test]
    fn align_path_shape() {
        let end = Pose2d::new(0.5, 2.5, Rotation2d::from_degrees(-60.0));
        let path = create_align_path(&at(2.0, 1.0), &at(1.0, 2.0), &end, PathConstraints::default());

        assert_eq!(path.waypoints.len(), 3);
        assert_eq!(path.waypoints[0].translation(), at(2.0, 1.0).translation());
        assert!((path.waypoints[0].rotation().radians() - 3.0 * FRAC_PI_4).abs() < 1e-12);
        assert_eq!(path.waypoints[1].rotation(), path.waypoints[0].rotation());
        assert_eq!(path.waypoints[2], end);
        assert_eq!(path.goal_end_state.velocity_mps, 0.0);
        assert_eq!(path.goal_end_state.rotation, end.rotation());
        assert!(path.prevent_flipping);
    }

    #[test]
    fn coincident_start_travels_along_end_rotation() {
        let end = Pose2d::new(0.0, 0.0, Rotation2d::from_degrees(30.0));
        let path = create_align_path(&at(1.0, 1.0), &at(1.0, 1.0), &end, PathConstraints::default());
        assert_eq!(path.waypoints[0].rotation(), end.rotation());
    }
}
