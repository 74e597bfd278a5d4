//! Distance-geometry shape signatures.
//!
//! Overview
//! -----------------
//! The signature summarizes a trajectory's shape as a fixed-size vector of normalized
//! inter-control-point distances. For each level `k` in `1..=depth`, the trajectory
//! is divided into `k` equal sub-intervals — of arc length or of duration — and the
//! straight-line (or great-circle) distance between each sub-interval's endpoints is
//! divided by the sub-interval's share of the total length, `total_length / k`. A
//! straight trajectory traversed at constant speed therefore scores 1 everywhere;
//! the more a trajectory folds back on itself, the closer its entries sink to 0.
//!
//! The output is ordered level by level: one value for level 1, two for level 2, and
//! so on, `depth × (depth + 1) / 2` values in total.

use crate::algorithms::{length, point_at_length_fraction, point_at_time, time_at_fraction};
use crate::geometry::distance;
use crate::trajectory::Trajectory;
use crate::trajkit_errors::TrajkitError;

/// How control points are placed along the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    /// Control points at equal fractions of arc length.
    ByDistance,
    /// Control points at equal fractions of duration.
    ByTime,
}

/// Distance-geometry signature with control points placed by arc length.
pub fn distance_geometry_by_distance(
    trajectory: &Trajectory,
    depth: usize,
) -> Result<Vec<f64>, TrajkitError> {
    distance_geometry(trajectory, depth, SamplingMode::ByDistance)
}

/// Distance-geometry signature with control points placed by time.
pub fn distance_geometry_by_time(
    trajectory: &Trajectory,
    depth: usize,
) -> Result<Vec<f64>, TrajkitError> {
    distance_geometry(trajectory, depth, SamplingMode::ByTime)
}

/// Compute the depth-`depth` signature of a trajectory.
///
/// Arguments
/// ---------
/// * `trajectory`: a non-empty trajectory
/// * `depth`: number of subdivision levels; the output has `depth (depth+1) / 2`
///   entries
/// * `mode`: control-point placement, by arc length or by duration
///
/// Return
/// ------
/// * the signature, each entry in [0, 1]. Zero-length (and, for
///   [`SamplingMode::ByTime`], zero-duration) trajectories score 1 everywhere.
pub fn distance_geometry(
    trajectory: &Trajectory,
    depth: usize,
    mode: SamplingMode,
) -> Result<Vec<f64>, TrajkitError> {
    if trajectory.is_empty() {
        return Err(TrajkitError::EmptyTrajectory);
    }
    let signature_len = depth * (depth + 1) / 2;
    let total_length = length(trajectory);
    let duration = match (trajectory.start_time(), trajectory.end_time()) {
        (Some(start), Some(end)) => end.duration_since(&start).map_or(0.0, |d| d.to_seconds()),
        _ => 0.0,
    };
    let degenerate = match mode {
        SamplingMode::ByDistance => total_length <= 0.0,
        SamplingMode::ByTime => total_length <= 0.0 || duration <= 0.0,
    };
    if degenerate {
        return Ok(vec![1.0; signature_len]);
    }

    let mut signature = Vec::with_capacity(signature_len);
    for level in 1..=depth {
        let normalizer = total_length / level as f64;
        for interval in 0..level {
            let start_fraction = interval as f64 / level as f64;
            let end_fraction = (interval + 1) as f64 / level as f64;
            let (start_point, end_point) = match mode {
                SamplingMode::ByDistance => (
                    point_at_length_fraction(trajectory, start_fraction)?,
                    point_at_length_fraction(trajectory, end_fraction)?,
                ),
                SamplingMode::ByTime => (
                    point_at_time(trajectory, time_at_fraction(trajectory, start_fraction)?)?,
                    point_at_time(trajectory, time_at_fraction(trajectory, end_fraction)?)?,
                ),
            };
            let separation = distance(start_point.base_point(), end_point.base_point())?;
            signature.push(separation / normalizer);
        }
    }
    Ok(signature)
}
