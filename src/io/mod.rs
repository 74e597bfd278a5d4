//! Input/output boundary: binary persistence, delimited-text adapters, and
//! trajectory assembly.
//!
//! The core never opens files on its own; readers and writers operate on caller
//! -owned [`std::io::Read`] / [`std::io::Write`] handles and never close them.

pub mod binary;
pub mod point_reader;
pub mod point_writer;

use std::collections::HashMap;

use log::debug;

use crate::point::TrajectoryPoint;
use crate::trajectory::Trajectory;
use crate::trajkit_errors::TrajkitError;

/// Group a point stream into trajectories.
///
/// Points are grouped by object id, ordered by timestamp within each group, and
/// appended into one [`Trajectory`] per id. Output trajectories appear in the
/// order their ids first occur in the stream.
///
/// Arguments
/// ---------
/// * `points`: a fallible point stream, typically a
///   [`PointReader`](point_reader::PointReader)
///
/// Return
/// ------
/// * the assembled trajectories; the first stream error, invalid timestamp
///   ([`TrajkitError::InvalidTimestamp`]), or domain disagreement within one id
///   aborts the whole assembly.
pub fn assemble_trajectories<I>(points: I) -> Result<Vec<Trajectory>, TrajkitError>
where
    I: IntoIterator<Item = Result<TrajectoryPoint, TrajkitError>>,
{
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<TrajectoryPoint>> = HashMap::new();
    let mut total = 0usize;
    for point in points {
        let point = point?;
        total += 1;
        if !groups.contains_key(point.object_id()) {
            order.push(point.object_id().to_string());
        }
        groups
            .entry(point.object_id().to_string())
            .or_default()
            .push(point);
    }

    let mut trajectories = Vec::with_capacity(order.len());
    for id in &order {
        let Some(mut points) = groups.remove(id) else {
            continue;
        };
        points.sort_by_key(|p| p.timestamp().to_unix_microseconds());
        let mut trajectory = Trajectory::new(points[0].domain());
        for point in points {
            trajectory.append(point)?;
        }
        trajectories.push(trajectory);
    }
    debug!(
        "assembled {} trajectories from {} points",
        trajectories.len(),
        total
    );
    Ok(trajectories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::BasePoint;
    use crate::time::Timestamp;

    fn point(id: &str, x: f64, minute: u8) -> TrajectoryPoint {
        TrajectoryPoint::new(
            BasePoint::cartesian2d(x, 0.0).unwrap(),
            id,
            Timestamp::from_gregorian_utc(2020, 1, 1, 0, minute, 0),
        )
        .unwrap()
    }

    #[test]
    fn interleaved_ids_are_grouped_in_first_seen_order() {
        let stream = vec![
            Ok(point("A", 0.0, 0)),
            Ok(point("B", 10.0, 0)),
            Ok(point("A", 1.0, 1)),
            Ok(point("B", 11.0, 1)),
            Ok(point("A", 2.0, 2)),
        ];
        let trajectories = assemble_trajectories(stream).unwrap();
        assert_eq!(trajectories.len(), 2);
        assert_eq!(trajectories[0].object_id(), Some("A"));
        assert_eq!(trajectories[0].len(), 3);
        assert_eq!(trajectories[1].object_id(), Some("B"));
        assert_eq!(trajectories[1].len(), 2);
    }

    #[test]
    fn out_of_order_timestamps_are_sorted_before_assembly() {
        let stream = vec![
            Ok(point("A", 2.0, 2)),
            Ok(point("A", 0.0, 0)),
            Ok(point("A", 1.0, 1)),
        ];
        let trajectories = assemble_trajectories(stream).unwrap();
        let xs: Vec<f64> = trajectories[0]
            .iter()
            .map(|p| p.base_point().coordinates()[0])
            .collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn stream_errors_abort_assembly() {
        let stream = vec![
            Ok(point("A", 0.0, 0)),
            Err(TrajkitError::EmptyField("object_id".to_string())),
        ];
        assert!(assemble_trajectories(stream).is_err());
    }

    #[test]
    fn invalid_timestamps_are_rejected() {
        let bad = TrajectoryPoint::new(
            BasePoint::cartesian2d(0.0, 0.0).unwrap(),
            "A",
            Timestamp::NotATime,
        )
        .unwrap();
        assert!(matches!(
            assemble_trajectories(vec![Ok(bad)]),
            Err(TrajkitError::InvalidTimestamp)
        ));
    }

    #[test]
    fn empty_stream_yields_no_trajectories() {
        assert!(assemble_trajectories(Vec::new()).unwrap().is_empty());
    }
}
