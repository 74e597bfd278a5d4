mod common;

use approx::assert_relative_eq;
use common::{cartesian2d_trajectory, terrestrial_trajectory};
use trajkit::algorithms::hull::{
    convex_hull, convex_hull_area, convex_hull_aspect_ratio, convex_hull_centroid,
    convex_hull_perimeter, radius_of_gyration,
};

#[test]
fn unit_square_hull_metrics() {
    let trajectory =
        cartesian2d_trajectory("SQUARE", &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);

    assert_eq!(convex_hull(&trajectory).unwrap().len(), 4);
    assert_relative_eq!(convex_hull_area(&trajectory).unwrap(), 1.0, epsilon = 1e-5);
    assert_relative_eq!(
        convex_hull_perimeter(&trajectory).unwrap(),
        4.0,
        epsilon = 1e-9
    );
    // min centroid-to-boundary distance 0.5, max sqrt(2)/2.
    assert_relative_eq!(
        convex_hull_aspect_ratio(&trajectory).unwrap(),
        0.707107,
        epsilon = 1e-5
    );
    let centroid = convex_hull_centroid(&trajectory).unwrap();
    assert_relative_eq!(centroid.coordinates()[0], 0.5, epsilon = 1e-9);
    assert_relative_eq!(centroid.coordinates()[1], 0.5, epsilon = 1e-9);
}

#[test]
fn degenerate_terrestrial_hull() {
    let trajectory = terrestrial_trajectory(
        "SEGMENT",
        &[(44.0, 33.0), (44.0769, 32.5862), (44.0, 33.0)],
    );

    assert_eq!(convex_hull_area(&trajectory).unwrap(), 0.0);
    assert_relative_eq!(
        convex_hull_perimeter(&trajectory).unwrap(),
        93.1411,
        epsilon = 5e-2
    );
    assert_eq!(convex_hull_aspect_ratio(&trajectory).unwrap(), 0.0);
}

#[test]
fn radius_of_gyration_of_the_unit_square() {
    let trajectory =
        cartesian2d_trajectory("SQUARE", &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
    // Every corner is sqrt(0.5) from the centroid.
    assert_relative_eq!(
        radius_of_gyration(&trajectory).unwrap(),
        0.5_f64.sqrt(),
        epsilon = 1e-9
    );
}

#[test]
fn terrestrial_hull_respects_the_antimeridian() {
    let trajectory = terrestrial_trajectory(
        "DATELINE",
        &[(179.0, 10.0), (-179.0, 10.0), (-179.0, 12.0), (179.0, 12.0)],
    );
    let centroid = convex_hull_centroid(&trajectory).unwrap();
    // Mid-box, not the spurious 0-meridian mean. longitude() is in [0, 360).
    let lon = centroid.longitude().unwrap();
    assert!((lon - 180.0).abs() < 1.0, "centroid longitude {lon}");
    assert_relative_eq!(centroid.latitude().unwrap(), 11.0, epsilon = 0.05);
    assert!(convex_hull_area(&trajectory).unwrap() > 0.0);
}
