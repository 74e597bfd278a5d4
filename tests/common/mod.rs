#![allow(dead_code)]

use trajkit::domain::Domain;
use trajkit::point::{BasePoint, TrajectoryPoint};
use trajkit::time::Timestamp;
use trajkit::trajectory::Trajectory;

/// Cartesian 2D trajectory with one point per hour starting 2020-01-01 00:00:00.
pub fn cartesian2d_trajectory(id: &str, coords: &[(f64, f64)]) -> Trajectory {
    let mut trajectory = Trajectory::new(Domain::Cartesian2d);
    for (i, &(x, y)) in coords.iter().enumerate() {
        let point = TrajectoryPoint::new(
            BasePoint::cartesian2d(x, y).unwrap(),
            id,
            Timestamp::from_gregorian_utc(2020, 1, 1, i as u8, 0, 0),
        )
        .unwrap();
        trajectory.append(point).unwrap();
    }
    trajectory
}

/// Terrestrial trajectory (lon, lat in degrees) with one point per hour.
pub fn terrestrial_trajectory(id: &str, coords: &[(f64, f64)]) -> Trajectory {
    let mut trajectory = Trajectory::new(Domain::Terrestrial);
    for (i, &(lon, lat)) in coords.iter().enumerate() {
        let point = TrajectoryPoint::new(
            BasePoint::terrestrial(lon, lat).unwrap(),
            id,
            Timestamp::from_gregorian_utc(2020, 1, 1, i as u8, 0, 0),
        )
        .unwrap();
        trajectory.append(point).unwrap();
    }
    trajectory
}
