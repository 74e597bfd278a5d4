//! Box-neighborhood density clustering.
//!
//! Overview
//! -----------------
//! A DBSCAN variant where a point's neighborhood is the closed axis-aligned box
//! centered on it with the caller-supplied half-span per axis, instead of a
//! Euclidean ball. Points whose neighborhood holds at least `min_cluster_size`
//! members (the point itself counts) are core points; clusters grow from core
//! points by breadth-first expansion. Non-core points reachable from a core point
//! join its cluster as border points; everything else is noise.
//!
//! Labels are deterministic: seeds are tried in ascending point index and
//! expansion queues pop in insertion order, so the same input always yields the
//! same cluster ids.

use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::index::rtree::RTree;
use crate::index::FeatureVector;
use crate::trajkit_errors::TrajkitError;

/// Cluster assignment for one input point.
///
/// `cluster_id` 0 means noise; real clusters are numbered from 1 in order of
/// discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterLabel {
    pub point_index: usize,
    pub cluster_id: usize,
}

/// Cluster feature vectors with box neighborhoods.
///
/// Arguments
/// ---------
/// * `points`: feature vectors, all of one dimension
/// * `half_span`: per-axis half-width of the neighborhood box; the neighborhood of
///   `p` is `[p - half_span, p + half_span]`, closed on every side
/// * `min_cluster_size`: neighbor count (including the point itself) required for
///   a core point
///
/// Return
/// ------
/// * one [`ClusterLabel`] per input point, in input order, or
///   [`TrajkitError::DimensionMismatch`] when a point's dimension differs from the
///   half-span's.
pub fn dbscan(
    points: &[FeatureVector],
    half_span: &FeatureVector,
    min_cluster_size: usize,
) -> Result<Vec<ClusterLabel>, TrajkitError> {
    if points.is_empty() {
        return Ok(Vec::new());
    }
    let dimension = half_span.dimension();
    for point in points {
        point.check_dimension(dimension)?;
    }

    let mut tree: RTree<usize> = RTree::new(dimension)?;
    tree.insert_points(points.iter().cloned().zip(0..points.len()))?;

    let box_corners = |center: &FeatureVector| -> Result<(FeatureVector, FeatureVector), TrajkitError> {
        let mut min = Vec::with_capacity(dimension);
        let mut max = Vec::with_capacity(dimension);
        for (c, h) in center.coordinates().iter().zip(half_span.coordinates()) {
            min.push(c - h);
            max.push(c + h);
        }
        Ok((FeatureVector::new(&min)?, FeatureVector::new(&max)?))
    };

    const UNLABELED: usize = usize::MAX;
    let mut labels = vec![UNLABELED; points.len()];
    let mut next_cluster = 1usize;

    for seed in 0..points.len() {
        if labels[seed] != UNLABELED {
            continue;
        }
        let (min, max) = box_corners(&points[seed])?;
        let neighbors = tree.find_points_in_box(&min, &max)?;
        if neighbors.len() < min_cluster_size {
            // Tentative noise; a later core point may still claim it as border.
            labels[seed] = 0;
            continue;
        }

        let cluster = next_cluster;
        next_cluster += 1;
        labels[seed] = cluster;
        let mut queue: VecDeque<usize> = neighbors.into();
        while let Some(candidate) = queue.pop_front() {
            if labels[candidate] == 0 {
                // Border point: reachable but not core.
                labels[candidate] = cluster;
            }
            if labels[candidate] != UNLABELED {
                continue;
            }
            labels[candidate] = cluster;
            let (min, max) = box_corners(&points[candidate])?;
            let reachable = tree.find_points_in_box(&min, &max)?;
            if reachable.len() >= min_cluster_size {
                queue.extend(reachable);
            }
        }
    }

    debug!(
        "dbscan: {} points, {} clusters, {} noise",
        points.len(),
        next_cluster - 1,
        labels.iter().filter(|&&l| l == 0).count()
    );
    Ok(labels
        .into_iter()
        .enumerate()
        .map(|(point_index, cluster_id)| ClusterLabel {
            point_index,
            cluster_id,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(coords: &[f64]) -> FeatureVector {
        FeatureVector::new(coords).unwrap()
    }

    fn cluster_ids(labels: &[ClusterLabel]) -> Vec<usize> {
        labels.iter().map(|l| l.cluster_id).collect()
    }

    #[test]
    fn two_blobs_and_an_outlier() {
        let mut points = Vec::new();
        for i in 0..4 {
            points.push(feature(&[i as f64 * 0.1, 0.0]));
        }
        for i in 0..4 {
            points.push(feature(&[10.0 + i as f64 * 0.1, 0.0]));
        }
        points.push(feature(&[50.0, 50.0]));
        let labels = dbscan(&points, &feature(&[0.5, 0.5]), 3).unwrap();
        assert_eq!(cluster_ids(&labels), vec![1, 1, 1, 1, 2, 2, 2, 2, 0]);
    }

    #[test]
    fn labels_are_deterministic_and_in_input_order() {
        let points: Vec<FeatureVector> =
            (0..20).map(|i| feature(&[(i % 5) as f64, (i / 5) as f64])).collect();
        let first = dbscan(&points, &feature(&[1.0, 1.0]), 4).unwrap();
        let second = dbscan(&points, &feature(&[1.0, 1.0]), 4).unwrap();
        assert_eq!(first, second);
        for (i, label) in first.iter().enumerate() {
            assert_eq!(label.point_index, i);
        }
    }

    #[test]
    fn min_cluster_size_counts_the_point_itself() {
        let points = vec![feature(&[0.0]), feature(&[0.5])];
        // Each point sees both; threshold 2 is met.
        let labels = dbscan(&points, &feature(&[1.0]), 2).unwrap();
        assert_eq!(cluster_ids(&labels), vec![1, 1]);
        // Threshold 3 cannot be met by two points.
        let labels = dbscan(&points, &feature(&[1.0]), 3).unwrap();
        assert_eq!(cluster_ids(&labels), vec![0, 0]);
    }

    #[test]
    fn border_point_joins_an_earlier_cluster() {
        // Point 3 sees only points 2 and 3 (not core at threshold 3) but is inside
        // core point 2's box, so it joins cluster 1 as a border point.
        let points = vec![
            feature(&[0.0]),
            feature(&[1.0]),
            feature(&[2.0]),
            feature(&[3.5]),
        ];
        let labels = dbscan(&points, &feature(&[1.6]), 3).unwrap();
        assert_eq!(cluster_ids(&labels), vec![1, 1, 1, 1]);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let points = vec![feature(&[0.0, 0.0]), feature(&[1.0])];
        assert!(matches!(
            dbscan(&points, &feature(&[1.0, 1.0]), 2),
            Err(TrajkitError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(dbscan(&[], &feature(&[1.0]), 2).unwrap().is_empty());
    }
}
