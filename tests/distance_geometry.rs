mod common;

use approx::assert_relative_eq;
use common::{cartesian2d_trajectory, terrestrial_trajectory};
use trajkit::algorithms::distance_geometry::{
    distance_geometry_by_distance, distance_geometry_by_time,
};

fn assert_signature(actual: &[f64], expected: &[f64], epsilon: f64) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_relative_eq!(*a, *e, epsilon = epsilon, max_relative = epsilon);
    }
}

#[test]
fn cartesian_square_loop_depth_4() {
    let trajectory = cartesian2d_trajectory(
        "LOOP",
        &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0), (0.0, 0.0)],
    );
    let signature = distance_geometry_by_distance(&trajectory, 4).unwrap();
    assert_signature(
        &signature,
        &[
            0.0, 0.707107, 0.707107, 0.790569, 0.707107, 0.790569, 1.0, 1.0, 1.0, 1.0,
        ],
        1e-4,
    );
}

#[test]
fn terrestrial_polar_loop_depth_4() {
    // Circumnavigation of the 80°N parallel in four great-circle legs.
    let trajectory = terrestrial_trajectory(
        "POLAR",
        &[(0.0, 80.0), (90.0, 80.0), (180.0, 80.0), (-90.0, 80.0), (0.0, 80.0)],
    );
    let signature = distance_geometry_by_distance(&trajectory, 4).unwrap();
    assert_signature(
        &signature,
        &[
            0.0, 0.708916, 0.708916, 0.793393, 0.710916, 0.793393, 0.999999, 0.999999,
            0.999999, 0.999999,
        ],
        1e-4,
    );
}

#[test]
fn by_time_matches_by_distance_at_constant_speed() {
    // Uniform spacing in both space and time, so the two samplings agree.
    let trajectory = cartesian2d_trajectory(
        "LINE",
        &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)],
    );
    let by_distance = distance_geometry_by_distance(&trajectory, 3).unwrap();
    let by_time = distance_geometry_by_time(&trajectory, 3).unwrap();
    assert_signature(&by_distance, &by_time, 1e-9);
}
