//! Trajectory-level algorithms.
//!
//! Overview
//! -----------------
//! This module tree holds everything computed *from* a trajectory rather than stored
//! in it: arc-length and end-to-end measures, sampling by time and by length fraction,
//! Douglas–Peucker simplification ([`simplify`]), convex hulls and their metrics
//! ([`hull`]), and the distance-geometry shape signature ([`distance_geometry`]).
//!
//! All sampling operations interpolate in the trajectory's own domain: straight
//! segments for Cartesian trajectories, great-circle geodesics for terrestrial ones.

pub mod distance_geometry;
pub mod hull;
pub mod simplify;

use crate::geometry::{distance, interpolate};
use crate::point::TrajectoryPoint;
use crate::time::Timestamp;
use crate::trajectory::Trajectory;
use crate::trajkit_errors::TrajkitError;

/// Total arc length of the trajectory: the last point's cumulative arc length.
pub fn length(trajectory: &Trajectory) -> f64 {
    trajectory
        .last()
        .map_or(0.0, |p| p.cumulative_arc_length())
}

/// Distance between the first and last points, in the domain's units.
///
/// Zero for trajectories with fewer than two points.
pub fn end_to_end_distance(trajectory: &Trajectory) -> Result<f64, TrajkitError> {
    match (trajectory.first(), trajectory.last()) {
        (Some(first), Some(last)) if trajectory.len() >= 2 => {
            distance(first.base_point(), last.base_point())
        }
        _ => Ok(0.0),
    }
}

/// Position of the object at the given moment.
///
/// Moments at or before the first timestamp return the first point; at or after the
/// last, the last point. In between, the straddling segment is found by binary search
/// and interpolated; an exact match on a duplicated timestamp yields the earlier
/// point.
///
/// Errors
/// ------
/// * [`TrajkitError::EmptyTrajectory`] on an empty trajectory
/// * [`TrajkitError::InvalidTimestamp`] when `moment` is `NotATime`
pub fn point_at_time(
    trajectory: &Trajectory,
    moment: Timestamp,
) -> Result<TrajectoryPoint, TrajkitError> {
    let first = trajectory.first().ok_or(TrajkitError::EmptyTrajectory)?;
    let last = trajectory.last().ok_or(TrajkitError::EmptyTrajectory)?;
    if !moment.is_valid() {
        return Err(TrajkitError::InvalidTimestamp);
    }
    if moment <= first.timestamp() {
        return Ok(first.clone());
    }
    if moment >= last.timestamp() {
        return Ok(last.clone());
    }
    // First index whose timestamp is ≥ moment; ties resolve to the earliest point.
    let upper = trajectory
        .points()
        .partition_point(|p| p.timestamp() < moment);
    let after = trajectory.get(upper)?;
    if after.timestamp() == moment {
        return Ok(after.clone());
    }
    let before = trajectory.get(upper - 1)?;
    let span = after
        .timestamp()
        .duration_since(&before.timestamp())
        .ok_or(TrajkitError::InvalidTimestamp)?
        .to_seconds();
    let elapsed = moment
        .duration_since(&before.timestamp())
        .ok_or(TrajkitError::InvalidTimestamp)?
        .to_seconds();
    let t = if span <= 0.0 { 0.0 } else { elapsed / span };
    interpolate(before, after, t)
}

/// Timestamp at fraction `f` (clamped to [0, 1]) of the trajectory's duration.
pub fn time_at_fraction(
    trajectory: &Trajectory,
    fraction: f64,
) -> Result<Timestamp, TrajkitError> {
    let start = trajectory.start_time().ok_or(TrajkitError::EmptyTrajectory)?;
    let end = trajectory.end_time().ok_or(TrajkitError::EmptyTrajectory)?;
    Ok(Timestamp::lerp(&start, &end, fraction.clamp(0.0, 1.0)))
}

/// Position at fraction `f` (clamped to [0, 1]) of the trajectory's arc length.
///
/// The segment whose cumulative-length range contains `f × total_length` is located
/// by binary search on the prefix sums; zero-length trajectories return the first
/// point.
pub fn point_at_length_fraction(
    trajectory: &Trajectory,
    fraction: f64,
) -> Result<TrajectoryPoint, TrajkitError> {
    let first = trajectory.first().ok_or(TrajkitError::EmptyTrajectory)?;
    let total = length(trajectory);
    if total <= 0.0 {
        return Ok(first.clone());
    }
    let target = fraction.clamp(0.0, 1.0) * total;
    let upper = trajectory
        .points()
        .partition_point(|p| p.cumulative_arc_length() < target);
    if upper == 0 {
        return Ok(first.clone());
    }
    let after = trajectory.get(upper.min(trajectory.len() - 1))?;
    if after.cumulative_arc_length() <= target {
        return Ok(after.clone());
    }
    let before = trajectory.get(upper - 1)?;
    let segment = after.cumulative_arc_length() - before.cumulative_arc_length();
    let t = if segment <= 0.0 {
        0.0
    } else {
        (target - before.cumulative_arc_length()) / segment
    };
    interpolate(before, after, t)
}
