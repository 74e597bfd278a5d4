//! Douglas–Peucker polyline simplification.
//!
//! The cross-track distance of each candidate point from the current baseline segment
//! is measured with the trajectory's own domain distance: perpendicular Euclidean
//! distance for Cartesian trajectories, great-circle arc distance (kilometers) for
//! terrestrial ones. Endpoints are always retained, retained points keep their
//! properties, and trajectory-level properties are copied to the result.

use crate::geometry::point_to_segment_distance;
use crate::trajectory::Trajectory;
use crate::trajkit_errors::TrajkitError;

/// Simplify a trajectory, keeping only vertices that deviate from the baseline by
/// more than `tolerance` (in the domain's distance units).
///
/// Arguments
/// ---------
/// * `trajectory`: the trajectory to simplify; left unchanged
/// * `tolerance`: maximum allowed cross-track deviation, ≥ 0
///
/// Return
/// ------
/// * a new trajectory containing a subset of the input's points, or
///   [`TrajkitError::NegativeTolerance`] when `tolerance < 0`.
pub fn simplify(trajectory: &Trajectory, tolerance: f64) -> Result<Trajectory, TrajkitError> {
    if tolerance < 0.0 {
        return Err(TrajkitError::NegativeTolerance(tolerance));
    }
    let points = trajectory.points();
    let mut keep = vec![false; points.len()];
    if let Some(last) = keep.last_mut() {
        *last = true;
    }
    if let Some(first) = keep.first_mut() {
        *first = true;
    }

    // Iterative Douglas–Peucker over index ranges (start, end), endpoints kept.
    let mut ranges = Vec::new();
    if points.len() > 2 {
        ranges.push((0usize, points.len() - 1));
    }
    while let Some((start, end)) = ranges.pop() {
        if end <= start + 1 {
            continue;
        }
        let mut worst_index = start;
        let mut worst_distance = -1.0;
        for i in start + 1..end {
            let d = point_to_segment_distance(
                points[i].base_point(),
                points[start].base_point(),
                points[end].base_point(),
            )?;
            if d > worst_distance {
                worst_distance = d;
                worst_index = i;
            }
        }
        if worst_distance > tolerance {
            keep[worst_index] = true;
            ranges.push((start, worst_index));
            ranges.push((worst_index, end));
        }
    }

    let mut result = Trajectory::new(trajectory.domain());
    *result.properties_mut() = trajectory.properties().clone();
    for (point, retained) in points.iter().zip(&keep) {
        if *retained {
            result.append(point.clone())?;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use crate::point::{BasePoint, TrajectoryPoint};
    use crate::time::Timestamp;

    fn point(x: f64, y: f64, second: u8) -> TrajectoryPoint {
        TrajectoryPoint::new(
            BasePoint::cartesian2d(x, y).unwrap(),
            "OBJ1",
            Timestamp::from_gregorian_utc(2020, 1, 1, 0, 0, second),
        )
        .unwrap()
    }

    fn zigzag() -> Trajectory {
        let mut traj = Trajectory::new(Domain::Cartesian2d);
        traj.append(point(0.0, 0.0, 0)).unwrap();
        traj.append(point(1.0, 2.6, 1)).unwrap();
        traj.append(point(2.0, 5.0, 2)).unwrap();
        traj.append(point(3.0, 2.4, 3)).unwrap();
        traj.append(point(4.0, 0.0, 4)).unwrap();
        traj
    }

    #[test]
    fn negative_tolerance_rejected() {
        let traj = zigzag();
        assert!(matches!(
            simplify(&traj, -0.1),
            Err(TrajkitError::NegativeTolerance(_))
        ));
    }

    #[test]
    fn endpoints_survive_and_output_is_a_subset() {
        let traj = zigzag();
        let simplified = simplify(&traj, 0.5).unwrap();
        assert_eq!(
            simplified.first().unwrap().base_point(),
            traj.first().unwrap().base_point()
        );
        assert_eq!(
            simplified.last().unwrap().base_point(),
            traj.last().unwrap().base_point()
        );
        for kept in simplified.iter() {
            assert!(traj.iter().any(|p| p.base_point() == kept.base_point()));
        }
        // The 5-unit spike survives a 0.5 tolerance; the near-baseline jitter does not.
        assert_eq!(simplified.len(), 3);
    }

    #[test]
    fn zero_tolerance_keeps_every_deviating_point() {
        let traj = zigzag();
        let simplified = simplify(&traj, 0.0).unwrap();
        assert_eq!(simplified.len(), traj.len());
    }

    #[test]
    fn collinear_points_collapse() {
        let mut traj = Trajectory::new(Domain::Cartesian2d);
        for i in 0..5u8 {
            traj.append(point(i as f64, 0.0, i)).unwrap();
        }
        let simplified = simplify(&traj, 0.01).unwrap();
        assert_eq!(simplified.len(), 2);
    }

    #[test]
    fn trajectory_properties_are_copied() {
        let mut traj = zigzag();
        traj.set_property(
            "source",
            crate::properties::PropertyValue::String("radar".to_string()),
        );
        let simplified = simplify(&traj, 0.5).unwrap();
        assert_eq!(simplified.properties().string("source").unwrap(), "radar");
    }

    #[test]
    fn tiny_trajectories_pass_through() {
        let mut traj = Trajectory::new(Domain::Cartesian2d);
        traj.append(point(0.0, 0.0, 0)).unwrap();
        let simplified = simplify(&traj, 1.0).unwrap();
        assert_eq!(simplified.len(), 1);
    }
}
