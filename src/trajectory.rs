//! The trajectory container.
//!
//! Overview
//! -----------------
//! A [`Trajectory`] owns an ordered sequence of [`TrajectoryPoint`]s of a single
//! domain, all sharing one object id, plus a trajectory-level property bag and an
//! RFC 4122 UUID. Mutation goes through the container so that its invariants hold
//! after every operation:
//!
//! * timestamps are non-decreasing (ties are legal);
//! * `points[0]` has cumulative arc length 0 and each later point carries the prefix
//!   sum of inter-point distances;
//! * every point's time fraction is its share of the total duration, in [0, 1]
//!   (0 everywhere when the duration is zero).
//!
//! Failed operations mutate nothing: every check and every fallible distance
//! computation runs before the sequence is touched.

use uuid::Uuid;

use crate::domain::Domain;
use crate::geometry::distance;
use crate::point::TrajectoryPoint;
use crate::properties::{PropertyBag, PropertyValue};
use crate::time::Timestamp;
use crate::trajkit_errors::TrajkitError;
use crate::uuid_factory::new_uuid;

/// Ordered sequence of timestamped points for one moving object.
#[derive(Debug, Clone)]
pub struct Trajectory {
    domain: Domain,
    object_id: Option<String>,
    points: Vec<TrajectoryPoint>,
    properties: PropertyBag,
    uuid: Uuid,
}

impl Trajectory {
    /// Empty trajectory in the given domain; the object id is adopted from the first
    /// appended point, and the UUID is drawn from the process-wide generator.
    pub fn new(domain: Domain) -> Self {
        Trajectory {
            domain,
            object_id: None,
            points: Vec::new(),
            properties: PropertyBag::new(),
            uuid: new_uuid(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Shared object id; `None` until the first point is appended.
    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectoryPoint> {
        self.points.iter()
    }

    pub fn get(&self, index: usize) -> Result<&TrajectoryPoint, TrajkitError> {
        self.points.get(index).ok_or(TrajkitError::IndexOutOfRange {
            index,
            len: self.points.len(),
        })
    }

    pub fn first(&self) -> Option<&TrajectoryPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrajectoryPoint> {
        self.points.last()
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        self.points.first().map(|p| p.timestamp())
    }

    pub fn end_time(&self) -> Option<Timestamp> {
        self.points.last().map(|p| p.timestamp())
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyBag {
        &mut self.properties
    }

    pub fn set_property(&mut self, key: &str, value: PropertyValue) {
        self.properties.set(key, value);
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.has(key)
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Replace the UUID with a caller-supplied value.
    pub fn set_uuid(&mut self, uuid: Uuid) {
        self.uuid = uuid;
    }

    /// Draw a fresh UUID from the process-wide generator.
    pub fn regenerate_uuid(&mut self) {
        self.uuid = new_uuid();
    }

    /// Derived identifier `{object_id}_{start}_{end}` with timestamps in the compact
    /// canonical form. Fails with [`TrajkitError::EmptyTrajectory`] on an empty
    /// trajectory.
    pub fn trajectory_id(&self) -> Result<String, TrajkitError> {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(TrajkitError::EmptyTrajectory),
        };
        let object_id = self.object_id.as_deref().unwrap_or("");
        Ok(format!(
            "{}_{}_{}",
            object_id,
            first.timestamp().compact(),
            last.timestamp().compact()
        ))
    }

    fn check_incoming(&self, point: &TrajectoryPoint) -> Result<(), TrajkitError> {
        if point.domain() != self.domain {
            return Err(TrajkitError::DomainMismatch {
                expected: self.domain,
                found: point.domain(),
            });
        }
        if !point.timestamp().is_valid() {
            return Err(TrajkitError::InvalidTimestamp);
        }
        if let Some(expected) = self.object_id.as_deref() {
            if !self.points.is_empty() && expected != point.object_id() {
                return Err(TrajkitError::ObjectIdMismatch {
                    expected: expected.to_string(),
                    found: point.object_id().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Append a point at the end of the trajectory.
    ///
    /// The first appended point fixes the object id; later points must match it. The
    /// timestamp may equal the last point's but must not precede it. The new point's
    /// cumulative arc length is computed in O(1); time fractions are refreshed for the
    /// whole sequence since the end timestamp moved.
    pub fn append(&mut self, point: TrajectoryPoint) -> Result<(), TrajkitError> {
        self.check_incoming(&point)?;
        let cumulative = match self.points.last() {
            None => 0.0,
            Some(last) => {
                if point.timestamp() < last.timestamp() {
                    return Err(TrajkitError::TimestampOutOfOrder(format!(
                        "append: {} precedes {}",
                        point.timestamp(),
                        last.timestamp()
                    )));
                }
                last.cumulative_arc_length() + distance(last.base_point(), point.base_point())?
            }
        };
        if self.points.is_empty() {
            self.object_id = Some(point.object_id().to_string());
        }
        self.points.push(point.with_derived(cumulative, 0.0));
        self.refresh_time_fractions();
        Ok(())
    }

    /// Insert a point at `index`, shifting later points.
    ///
    /// The point's timestamp must lie between its new neighbors' timestamps
    /// (inclusive). Cumulative arc lengths from `index` onward and all time fractions
    /// are recomputed, O(n).
    pub fn insert(&mut self, index: usize, point: TrajectoryPoint) -> Result<(), TrajkitError> {
        if index > self.points.len() {
            return Err(TrajkitError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        self.check_incoming(&point)?;
        let prev = index.checked_sub(1).map(|i| &self.points[i]);
        let next = self.points.get(index);
        if let Some(prev) = prev {
            if point.timestamp() < prev.timestamp() {
                return Err(TrajkitError::TimestampOutOfOrder(format!(
                    "insert at {index}: {} precedes predecessor {}",
                    point.timestamp(),
                    prev.timestamp()
                )));
            }
        }
        if let Some(next) = next {
            if point.timestamp() > next.timestamp() {
                return Err(TrajkitError::TimestampOutOfOrder(format!(
                    "insert at {index}: {} follows successor {}",
                    point.timestamp(),
                    next.timestamp()
                )));
            }
        }
        // All fallible work happens before the splice.
        let distance_to_prev = prev
            .map(|p| distance(p.base_point(), point.base_point()))
            .transpose()?
            .unwrap_or(0.0);
        let distance_to_next = next
            .map(|n| distance(point.base_point(), n.base_point()))
            .transpose()?
            .unwrap_or(0.0);
        let replaced_leg = match (prev, next) {
            (Some(p), Some(n)) => distance(p.base_point(), n.base_point())?,
            _ => 0.0,
        };
        let cumulative = prev.map_or(0.0, |p| p.cumulative_arc_length()) + distance_to_prev;
        let shift = distance_to_prev + distance_to_next - replaced_leg;

        if self.points.is_empty() {
            self.object_id = Some(point.object_id().to_string());
        }
        self.points.insert(index, point.with_derived(cumulative, 0.0));
        for later in &mut self.points[index + 1..] {
            let updated = later.cumulative_arc_length() + shift;
            later.set_cumulative_arc_length(updated);
        }
        self.refresh_time_fractions();
        Ok(())
    }

    /// New trajectory over `points[start..end]` (half-open range).
    ///
    /// The copy shares the object id and trajectory properties, keeps absolute
    /// timestamps, re-zeros cumulative arc length at its first point, and gets a
    /// fresh UUID.
    pub fn sub_trajectory(&self, start: usize, end: usize) -> Result<Trajectory, TrajkitError> {
        if start > end || end > self.points.len() {
            return Err(TrajkitError::IndexOutOfRange {
                index: start.max(end),
                len: self.points.len(),
            });
        }
        let mut result = Trajectory::new(self.domain);
        result.object_id = self.object_id.clone();
        result.properties = self.properties.clone();
        let base_arc_length = self
            .points
            .get(start)
            .map_or(0.0, |p| p.cumulative_arc_length());
        result.points = self.points[start..end]
            .iter()
            .map(|p| {
                p.clone()
                    .with_derived(p.cumulative_arc_length() - base_arc_length, 0.0)
            })
            .collect();
        result.refresh_time_fractions();
        Ok(result)
    }

    /// Recompute every point's time fraction from the current first/last timestamps.
    fn refresh_time_fractions(&mut self) {
        let (start, end) = match (self.points.first(), self.points.last()) {
            (Some(f), Some(l)) => (f.timestamp(), l.timestamp()),
            _ => return,
        };
        let total = end
            .duration_since(&start)
            .map_or(0.0, |d| d.to_seconds());
        if total <= 0.0 {
            for point in &mut self.points {
                point.set_time_fraction(0.0);
            }
            return;
        }
        for point in &mut self.points {
            let elapsed = point
                .timestamp()
                .duration_since(&start)
                .map_or(0.0, |d| d.to_seconds());
            point.set_time_fraction((elapsed / total).clamp(0.0, 1.0));
        }
    }

    /// Used by the deserializer, which reads back derived fields verbatim.
    pub(crate) fn from_parts(
        domain: Domain,
        object_id: Option<String>,
        points: Vec<TrajectoryPoint>,
        properties: PropertyBag,
        uuid: Uuid,
    ) -> Self {
        Trajectory {
            domain,
            object_id,
            points,
            properties,
            uuid,
        }
    }
}

impl PartialEq for Trajectory {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain
            && self.object_id == other.object_id
            && self.points == other.points
            && self.properties == other.properties
            && self.uuid == other.uuid
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectoryPoint;
    type IntoIter = std::slice::Iter<'a, TrajectoryPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
