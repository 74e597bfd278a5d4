use std::collections::HashMap;
use std::f64::consts::TAU;

use trajkit::index::dbscan::{dbscan, ClusterLabel};
use trajkit::index::FeatureVector;

/// 100 points evenly spaced on a circle.
fn circle(center: (f64, f64), radius: f64) -> Vec<FeatureVector> {
    (0..100)
        .map(|i| {
            let angle = TAU * i as f64 / 100.0;
            FeatureVector::new(&[
                center.0 + radius * angle.cos(),
                center.1 + radius * angle.sin(),
            ])
            .unwrap()
        })
        .collect()
}

fn two_circles() -> Vec<FeatureVector> {
    let mut points = circle((0.0, 0.0), 5.0);
    points.extend(circle((100.0, 100.0), 5.0));
    points
}

fn cluster_sizes(labels: &[ClusterLabel]) -> HashMap<usize, usize> {
    let mut sizes = HashMap::new();
    for label in labels {
        *sizes.entry(label.cluster_id).or_insert(0) += 1;
    }
    sizes
}

#[test]
fn well_separated_circles_form_two_full_clusters() {
    let points = two_circles();
    let half_span = FeatureVector::new(&[1.0, 1.0]).unwrap();
    let labels = dbscan(&points, &half_span, 5).unwrap();

    let sizes = cluster_sizes(&labels);
    assert_eq!(sizes.get(&0), None, "no noise expected");
    assert_eq!(sizes.len(), 2);
    assert_eq!(sizes[&1], 100);
    assert_eq!(sizes[&2], 100);
    // The two circles never share a cluster.
    for label in &labels {
        let expected = if label.point_index < 100 { 1 } else { 2 };
        assert_eq!(label.cluster_id, expected);
    }
}

#[test]
fn labels_are_deterministic() {
    let points = two_circles();
    let half_span = FeatureVector::new(&[1.0, 1.0]).unwrap();
    let first = dbscan(&points, &half_span, 5).unwrap();
    let second = dbscan(&points, &half_span, 5).unwrap();
    assert_eq!(first, second);
}

#[test]
fn every_point_gets_exactly_one_label() {
    let points = two_circles();
    let half_span = FeatureVector::new(&[1.0, 1.0]).unwrap();
    let labels = dbscan(&points, &half_span, 5).unwrap();
    assert_eq!(labels.len(), points.len());
    for (i, label) in labels.iter().enumerate() {
        assert_eq!(label.point_index, i);
    }
}

#[test]
fn core_points_meet_the_neighborhood_minimum() {
    let points = two_circles();
    let half_span = FeatureVector::new(&[1.0, 1.0]).unwrap();
    let labels = dbscan(&points, &half_span, 5).unwrap();

    // Brute-force neighbor counts; on this fixture every clustered point is core.
    for label in labels.iter().filter(|l| l.cluster_id != 0) {
        let center = &points[label.point_index];
        let neighbors = points
            .iter()
            .filter(|p| {
                p.coordinates()
                    .iter()
                    .zip(center.coordinates())
                    .zip(half_span.coordinates())
                    .all(|((a, b), h)| (a - b).abs() <= *h)
            })
            .count();
        assert!(neighbors >= 5, "point {} has {neighbors}", label.point_index);
    }
}

#[test]
fn tight_span_leaves_sparse_points_as_noise() {
    let mut points = circle((0.0, 0.0), 5.0);
    points.push(FeatureVector::new(&[40.0, 40.0]).unwrap());
    let half_span = FeatureVector::new(&[1.0, 1.0]).unwrap();
    let labels = dbscan(&points, &half_span, 5).unwrap();
    assert_eq!(labels.last().unwrap().cluster_id, 0);
    assert!(labels[..100].iter().all(|l| l.cluster_id == 1));
}
