//! Point types: bare coordinates and trajectory samples.
//!
//! A [`BasePoint`] is an ordered tuple of finite coordinates tagged with its
//! [`Domain`]; a [`TrajectoryPoint`] adds the object id, the timestamp, a property
//! bag, and the two derived fields (cumulative arc length and time fraction) that the
//! [`crate::trajectory::Trajectory`] container maintains.
//!
//! Terrestrial points store (longitude, latitude) in degrees. Longitudes are kept as
//! written — a reader that saw `-122.3` writes `-122.3` back out — and normalized into
//! [0, 360) by the accessors the geometric primitives use.

use smallvec::SmallVec;

use crate::constants::Degree;
use crate::domain::Domain;
use crate::properties::{PropertyBag, PropertyValue};
use crate::spherical::normalize_longitude;
use crate::time::Timestamp;
use crate::trajkit_errors::TrajkitError;

/// An ordered tuple of coordinates in a single domain.
#[derive(Debug, Clone, PartialEq)]
pub struct BasePoint {
    domain: Domain,
    coords: SmallVec<[f64; 3]>,
}

impl BasePoint {
    /// Build a point from a coordinate slice.
    ///
    /// Arguments
    /// ---------
    /// * `domain`: the coordinate space; fixes the expected dimension
    /// * `coords`: exactly `domain.dimension()` finite values
    ///
    /// Return
    /// ------
    /// * the point, or [`TrajkitError::InvalidCoordinate`] /
    ///   [`TrajkitError::IndexOutOfRange`] when a coordinate is not finite or the slice
    ///   has the wrong length.
    pub fn new(domain: Domain, coords: &[f64]) -> Result<Self, TrajkitError> {
        if coords.len() != domain.dimension() {
            return Err(TrajkitError::IndexOutOfRange {
                index: coords.len(),
                len: domain.dimension(),
            });
        }
        for &c in coords {
            if !c.is_finite() {
                return Err(TrajkitError::InvalidCoordinate(c));
            }
        }
        Ok(BasePoint {
            domain,
            coords: SmallVec::from_slice(coords),
        })
    }

    /// Shorthand for a 2D Cartesian point.
    pub fn cartesian2d(x: f64, y: f64) -> Result<Self, TrajkitError> {
        BasePoint::new(Domain::Cartesian2d, &[x, y])
    }

    /// Shorthand for a 3D Cartesian point.
    pub fn cartesian3d(x: f64, y: f64, z: f64) -> Result<Self, TrajkitError> {
        BasePoint::new(Domain::Cartesian3d, &[x, y, z])
    }

    /// Shorthand for a terrestrial point, (longitude, latitude) in degrees.
    pub fn terrestrial(longitude: Degree, latitude: Degree) -> Result<Self, TrajkitError> {
        BasePoint::new(Domain::Terrestrial, &[longitude, latitude])
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn dimension(&self) -> usize {
        self.coords.len()
    }

    /// Coordinate by 0-based index, as written.
    pub fn coordinate(&self, index: usize) -> Result<f64, TrajkitError> {
        self.coords
            .get(index)
            .copied()
            .ok_or(TrajkitError::IndexOutOfRange {
                index,
                len: self.coords.len(),
            })
    }

    /// Replace one coordinate; the value must be finite.
    pub fn set_coordinate(&mut self, index: usize, value: f64) -> Result<(), TrajkitError> {
        if !value.is_finite() {
            return Err(TrajkitError::InvalidCoordinate(value));
        }
        let len = self.coords.len();
        let slot = self
            .coords
            .get_mut(index)
            .ok_or(TrajkitError::IndexOutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    /// All coordinates, as written.
    pub fn coordinates(&self) -> &[f64] {
        &self.coords
    }

    fn require_terrestrial(&self, operation: &'static str) -> Result<(), TrajkitError> {
        if self.domain == Domain::Terrestrial {
            Ok(())
        } else {
            Err(TrajkitError::DomainNotSupported {
                operation,
                domain: self.domain,
            })
        }
    }

    /// Longitude in degrees, normalized into [0, 360) for internal computations.
    pub fn longitude(&self) -> Result<Degree, TrajkitError> {
        self.require_terrestrial("longitude")?;
        Ok(normalize_longitude(self.coords[0]))
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> Result<Degree, TrajkitError> {
        self.require_terrestrial("latitude")?;
        Ok(self.coords[1])
    }

    pub fn set_longitude(&mut self, longitude: Degree) -> Result<(), TrajkitError> {
        self.require_terrestrial("set_longitude")?;
        self.set_coordinate(0, longitude)
    }

    pub fn set_latitude(&mut self, latitude: Degree) -> Result<(), TrajkitError> {
        self.require_terrestrial("set_latitude")?;
        self.set_coordinate(1, latitude)
    }
}

/// A timestamped, identified sample of a moving object's position.
///
/// # Fields
///
/// * `point` - the coordinates and their domain
/// * `object_id` - identifier shared by every point of one trajectory
/// * `timestamp` - when the object was there; may be `NotATime` while the point is
///   under construction, but must be valid before insertion into a trajectory
/// * `properties` - per-point property bag
/// * `cumulative_arc_length` / `time_fraction` - derived fields owned by the
///   containing trajectory; 0 until the point is appended
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPoint {
    point: BasePoint,
    object_id: String,
    timestamp: Timestamp,
    properties: PropertyBag,
    cumulative_arc_length: f64,
    time_fraction: f64,
}

impl TrajectoryPoint {
    /// Build a trajectory point.
    ///
    /// The object id must be non-empty; an empty id fails with
    /// [`TrajkitError::EmptyField`].
    pub fn new(
        point: BasePoint,
        object_id: &str,
        timestamp: Timestamp,
    ) -> Result<Self, TrajkitError> {
        if object_id.is_empty() {
            return Err(TrajkitError::EmptyField("object_id".to_string()));
        }
        Ok(TrajectoryPoint {
            point,
            object_id: object_id.to_string(),
            timestamp,
            properties: PropertyBag::new(),
            cumulative_arc_length: 0.,
            time_fraction: 0.,
        })
    }

    pub fn base_point(&self) -> &BasePoint {
        &self.point
    }

    pub fn base_point_mut(&mut self) -> &mut BasePoint {
        &mut self.point
    }

    pub fn domain(&self) -> Domain {
        self.point.domain()
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
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

    /// Arc length traveled from the trajectory's first point to this one.
    pub fn cumulative_arc_length(&self) -> f64 {
        self.cumulative_arc_length
    }

    /// Fraction of the trajectory's duration elapsed at this point, in [0, 1].
    pub fn time_fraction(&self) -> f64 {
        self.time_fraction
    }

    pub(crate) fn set_cumulative_arc_length(&mut self, value: f64) {
        self.cumulative_arc_length = value;
    }

    pub(crate) fn set_time_fraction(&mut self, value: f64) {
        self.time_fraction = value;
    }

    pub(crate) fn set_object_id(&mut self, object_id: &str) {
        self.object_id = object_id.to_string();
    }

    pub(crate) fn with_derived(
        mut self,
        cumulative_arc_length: f64,
        time_fraction: f64,
    ) -> Self {
        self.cumulative_arc_length = cumulative_arc_length;
        self.time_fraction = time_fraction;
        self
    }
}
