//! Domain-dispatched geometric primitives.
//!
//! Overview
//! -----------------
//! The primitives here take points of any [`Domain`] and select the right algorithm at
//! runtime: Euclidean math for the Cartesian domains, great-circle math (through
//! [`crate::spherical`]) for the terrestrial one. Operations a domain does not define
//! fail with [`TrajkitError::DomainNotSupported`]; mixing domains fails with
//! [`TrajkitError::DomainMismatch`].
//!
//! Units
//! -----------------
//! Cartesian distances are in the coordinates' own linear unit; terrestrial distances
//! are kilometers on the mean-Earth-radius sphere. Bearings and turn angles are
//! degrees, counter-clockwise positive for signed turn angles.

use crate::constants::{Degree, EPS, RADEG};
use crate::domain::Domain;
use crate::point::{BasePoint, TrajectoryPoint};
use crate::spherical;
use crate::time::Timestamp;
use crate::trajkit_errors::TrajkitError;

pub(crate) fn require_same_domain(a: &BasePoint, b: &BasePoint) -> Result<Domain, TrajkitError> {
    if a.domain() == b.domain() {
        Ok(a.domain())
    } else {
        Err(TrajkitError::DomainMismatch {
            expected: a.domain(),
            found: b.domain(),
        })
    }
}

fn euclidean_distance(a: &BasePoint, b: &BasePoint) -> f64 {
    a.coordinates()
        .iter()
        .zip(b.coordinates())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Distance between two points of the same domain.
///
/// Euclidean for Cartesian points, great-circle kilometers for terrestrial ones.
pub fn distance(a: &BasePoint, b: &BasePoint) -> Result<f64, TrajkitError> {
    match require_same_domain(a, b)? {
        Domain::Cartesian2d | Domain::Cartesian3d => Ok(euclidean_distance(a, b)),
        Domain::Terrestrial => Ok(spherical::great_circle_distance_km(
            a.longitude()?,
            a.latitude()?,
            b.longitude()?,
            b.latitude()?,
        )),
    }
}

/// Initial forward azimuth from `a` to `b`, degrees in [0, 360). Terrestrial only.
pub fn bearing(a: &BasePoint, b: &BasePoint) -> Result<Degree, TrajkitError> {
    match require_same_domain(a, b)? {
        Domain::Terrestrial => Ok(spherical::bearing_deg(
            a.longitude()?,
            a.latitude()?,
            b.longitude()?,
            b.latitude()?,
        )),
        domain => Err(TrajkitError::DomainNotSupported {
            operation: "bearing",
            domain,
        }),
    }
}

/// Signed angle in degrees between the headings `a → b` and `b → c`, positive
/// counter-clockwise. Defined for the two-dimensional domains only.
pub fn signed_turn_angle(
    a: &BasePoint,
    b: &BasePoint,
    c: &BasePoint,
) -> Result<Degree, TrajkitError> {
    require_same_domain(a, b)?;
    match require_same_domain(b, c)? {
        Domain::Cartesian2d => {
            let (v1x, v1y) = (b.coordinate(0)? - a.coordinate(0)?, b.coordinate(1)? - a.coordinate(1)?);
            let (v2x, v2y) = (c.coordinate(0)? - b.coordinate(0)?, c.coordinate(1)? - b.coordinate(1)?);
            let cross = v1x * v2y - v1y * v2x;
            let dot = v1x * v2x + v1y * v2y;
            Ok(cross.atan2(dot) / RADEG)
        }
        Domain::Terrestrial => {
            // Bearings grow clockwise, so a counter-clockwise turn shrinks them.
            let inbound = bearing(a, b)?;
            let outbound = bearing(b, c)?;
            Ok(spherical::normalize_longitude_signed(inbound - outbound))
        }
        domain @ Domain::Cartesian3d => Err(TrajkitError::DomainNotSupported {
            operation: "signed_turn_angle",
            domain,
        }),
    }
}

/// Unsigned turn angle at `b`, degrees in [0, 180].
///
/// In two dimensions this is the absolute signed turn angle; in Cartesian 3-space it
/// is the arccosine of the normalized dot product of the two leg vectors.
pub fn unsigned_turn_angle(
    a: &BasePoint,
    b: &BasePoint,
    c: &BasePoint,
) -> Result<Degree, TrajkitError> {
    require_same_domain(a, b)?;
    match require_same_domain(b, c)? {
        Domain::Cartesian2d | Domain::Terrestrial => Ok(signed_turn_angle(a, b, c)?.abs()),
        Domain::Cartesian3d => {
            let v1: Vec<f64> = (0..3)
                .map(|i| Ok::<_, TrajkitError>(b.coordinate(i)? - a.coordinate(i)?))
                .collect::<Result<_, _>>()?;
            let v2: Vec<f64> = (0..3)
                .map(|i| Ok::<_, TrajkitError>(c.coordinate(i)? - b.coordinate(i)?))
                .collect::<Result<_, _>>()?;
            let n1 = v1.iter().map(|x| x * x).sum::<f64>().sqrt();
            let n2 = v2.iter().map(|x| x * x).sum::<f64>().sqrt();
            if n1 < EPS || n2 < EPS {
                return Ok(0.0);
            }
            let dot: f64 = v1.iter().zip(&v2).map(|(x, y)| x * y).sum();
            Ok((dot / (n1 * n2)).clamp(-1.0, 1.0).acos() / RADEG)
        }
    }
}

/// Point at fraction `t` along the segment `a`–`b` (straight for Cartesian, great
/// circle for terrestrial). `t` is clamped to [0, 1].
pub fn interpolate_base(
    a: &BasePoint,
    b: &BasePoint,
    t: f64,
) -> Result<BasePoint, TrajkitError> {
    let t = t.clamp(0.0, 1.0);
    match require_same_domain(a, b)? {
        Domain::Cartesian2d | Domain::Cartesian3d => {
            let coords: Vec<f64> = a
                .coordinates()
                .iter()
                .zip(b.coordinates())
                .map(|(x, y)| x + (y - x) * t)
                .collect();
            BasePoint::new(a.domain(), &coords)
        }
        Domain::Terrestrial => {
            let (lon, lat) = spherical::interpolate_geodesic(
                a.longitude()?,
                a.latitude()?,
                b.longitude()?,
                b.latitude()?,
                t,
            );
            BasePoint::terrestrial(lon, lat)
        }
    }
}

/// Interpolate between two trajectory points at fraction `t` (clamped to [0, 1]).
///
/// Coordinates follow [`interpolate_base`]; the timestamp is linearly interpolated at
/// microsecond resolution; the property bag and object id come from the nearer
/// endpoint (`t < 0.5` takes `a`'s, otherwise `b`'s); the derived arc-length and
/// time-fraction fields are interpolated linearly.
pub fn interpolate(
    a: &TrajectoryPoint,
    b: &TrajectoryPoint,
    t: f64,
) -> Result<TrajectoryPoint, TrajkitError> {
    let t = t.clamp(0.0, 1.0);
    let base = interpolate_base(a.base_point(), b.base_point(), t)?;
    let nearest = if t < 0.5 { a } else { b };
    let mut result = TrajectoryPoint::new(
        base,
        nearest.object_id(),
        Timestamp::lerp(&a.timestamp(), &b.timestamp(), t),
    )?;
    *result.properties_mut() = nearest.properties().clone();
    Ok(result.with_derived(
        a.cumulative_arc_length() + (b.cumulative_arc_length() - a.cumulative_arc_length()) * t,
        a.time_fraction() + (b.time_fraction() - a.time_fraction()) * t,
    ))
}

/// Distance from `p` to the segment `a`–`b`, in the domain's units.
///
/// This is the cross-track measure used by simplification: Euclidean
/// point-to-segment distance for Cartesian points, point-to-great-circle-arc
/// distance for terrestrial ones.
pub fn point_to_segment_distance(
    p: &BasePoint,
    a: &BasePoint,
    b: &BasePoint,
) -> Result<f64, TrajkitError> {
    require_same_domain(p, a)?;
    match require_same_domain(a, b)? {
        Domain::Cartesian2d | Domain::Cartesian3d => {
            let ab: Vec<f64> = a
                .coordinates()
                .iter()
                .zip(b.coordinates())
                .map(|(x, y)| y - x)
                .collect();
            let ap: Vec<f64> = a
                .coordinates()
                .iter()
                .zip(p.coordinates())
                .map(|(x, y)| y - x)
                .collect();
            let ab_len2: f64 = ab.iter().map(|x| x * x).sum();
            if ab_len2 < EPS * EPS {
                return distance(p, a);
            }
            let t = (ap.iter().zip(&ab).map(|(x, y)| x * y).sum::<f64>() / ab_len2)
                .clamp(0.0, 1.0);
            let foot: Vec<f64> = a
                .coordinates()
                .iter()
                .zip(&ab)
                .map(|(x, d)| x + d * t)
                .collect();
            let foot = BasePoint::new(a.domain(), &foot)?;
            distance(p, &foot)
        }
        Domain::Terrestrial => {
            let pv = spherical::to_unit_vector(p.longitude()?, p.latitude()?);
            let av = spherical::to_unit_vector(a.longitude()?, a.latitude()?);
            let bv = spherical::to_unit_vector(b.longitude()?, b.latitude()?);
            Ok(spherical::point_to_arc_distance_km(&pv, &av, &bv))
        }
    }
}

/// `true` if segments `a1`–`a2` and `b1`–`b2` intersect (closed endpoints).
///
/// Planar segment intersection in Cartesian 2D, great-circle arc intersection for
/// terrestrial points; not defined in Cartesian 3-space.
pub fn segments_intersect(
    a1: &BasePoint,
    a2: &BasePoint,
    b1: &BasePoint,
    b2: &BasePoint,
) -> Result<bool, TrajkitError> {
    require_same_domain(a1, a2)?;
    require_same_domain(b1, b2)?;
    match require_same_domain(a1, b1)? {
        Domain::Cartesian2d => {
            let orient = |p: &BasePoint, q: &BasePoint, r: &BasePoint| -> Result<f64, TrajkitError> {
                Ok((q.coordinate(0)? - p.coordinate(0)?) * (r.coordinate(1)? - p.coordinate(1)?)
                    - (q.coordinate(1)? - p.coordinate(1)?) * (r.coordinate(0)? - p.coordinate(0)?))
            };
            let on_segment = |p: &BasePoint, q: &BasePoint, r: &BasePoint| -> Result<bool, TrajkitError> {
                Ok(r.coordinate(0)? <= p.coordinate(0)?.max(q.coordinate(0)?) + EPS
                    && r.coordinate(0)? >= p.coordinate(0)?.min(q.coordinate(0)?) - EPS
                    && r.coordinate(1)? <= p.coordinate(1)?.max(q.coordinate(1)?) + EPS
                    && r.coordinate(1)? >= p.coordinate(1)?.min(q.coordinate(1)?) - EPS)
            };
            let d1 = orient(a1, a2, b1)?;
            let d2 = orient(a1, a2, b2)?;
            let d3 = orient(b1, b2, a1)?;
            let d4 = orient(b1, b2, a2)?;
            if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
                && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
            {
                return Ok(true);
            }
            Ok((d1.abs() < EPS && on_segment(a1, a2, b1)?)
                || (d2.abs() < EPS && on_segment(a1, a2, b2)?)
                || (d3.abs() < EPS && on_segment(b1, b2, a1)?)
                || (d4.abs() < EPS && on_segment(b1, b2, a2)?))
        }
        Domain::Terrestrial => {
            let to_vec = |p: &BasePoint| -> Result<_, TrajkitError> {
                Ok(spherical::to_unit_vector(p.longitude()?, p.latitude()?))
            };
            Ok(spherical::arcs_intersect(
                &to_vec(a1)?,
                &to_vec(a2)?,
                &to_vec(b1)?,
                &to_vec(b2)?,
            ))
        }
        domain @ Domain::Cartesian3d => Err(TrajkitError::DomainNotSupported {
            operation: "segments_intersect",
            domain,
        }),
    }
}

/// Axis-aligned bounding box, `min[i] ≤ max[i]` for every coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    min: BasePoint,
    max: BasePoint,
}

impl BoundingBox {
    /// Box spanning two corner points; corners are swapped per-axis as needed.
    pub fn new(a: &BasePoint, b: &BasePoint) -> Result<Self, TrajkitError> {
        let domain = require_same_domain(a, b)?;
        let mut min_coords = Vec::with_capacity(domain.dimension());
        let mut max_coords = Vec::with_capacity(domain.dimension());
        for (x, y) in a.coordinates().iter().zip(b.coordinates()) {
            min_coords.push(x.min(*y));
            max_coords.push(x.max(*y));
        }
        Ok(BoundingBox {
            min: BasePoint::new(domain, &min_coords)?,
            max: BasePoint::new(domain, &max_coords)?,
        })
    }

    /// Smallest box containing all given points; `None` for an empty input.
    pub fn from_points<'a, I>(points: I) -> Result<Option<Self>, TrajkitError>
    where
        I: IntoIterator<Item = &'a BasePoint>,
    {
        let mut result: Option<BoundingBox> = None;
        for point in points {
            result = Some(match result {
                None => BoundingBox::new(point, point)?,
                Some(bbox) => {
                    require_same_domain(&bbox.min, point)?;
                    let mut min_coords = bbox.min.coordinates().to_vec();
                    let mut max_coords = bbox.max.coordinates().to_vec();
                    for (i, c) in point.coordinates().iter().enumerate() {
                        min_coords[i] = min_coords[i].min(*c);
                        max_coords[i] = max_coords[i].max(*c);
                    }
                    BoundingBox {
                        min: BasePoint::new(point.domain(), &min_coords)?,
                        max: BasePoint::new(point.domain(), &max_coords)?,
                    }
                }
            });
        }
        Ok(result)
    }

    pub fn min_corner(&self) -> &BasePoint {
        &self.min
    }

    pub fn max_corner(&self) -> &BasePoint {
        &self.max
    }

    /// `true` if the point lies inside the closed box.
    pub fn contains(&self, point: &BasePoint) -> Result<bool, TrajkitError> {
        require_same_domain(&self.min, point)?;
        Ok(point
            .coordinates()
            .iter()
            .enumerate()
            .all(|(i, c)| {
                self.min.coordinates()[i] <= *c && *c <= self.max.coordinates()[i]
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c2(x: f64, y: f64) -> BasePoint {
        BasePoint::cartesian2d(x, y).unwrap()
    }

    #[test]
    fn distance_is_symmetric_and_positive() {
        let p = c2(0.0, 0.0);
        let q = c2(3.0, 4.0);
        assert_relative_eq!(distance(&p, &q).unwrap(), 5.0);
        assert_relative_eq!(distance(&q, &p).unwrap(), 5.0, epsilon = 1e-5);
        assert_eq!(distance(&p, &p).unwrap(), 0.0);
    }

    #[test]
    fn mixed_domains_rejected() {
        let p = c2(0.0, 0.0);
        let q = BasePoint::terrestrial(0.0, 0.0).unwrap();
        assert!(matches!(
            distance(&p, &q),
            Err(TrajkitError::DomainMismatch { .. })
        ));
    }

    #[test]
    fn bearing_needs_terrestrial() {
        let p = c2(0.0, 0.0);
        let q = c2(1.0, 1.0);
        assert!(matches!(
            bearing(&p, &q),
            Err(TrajkitError::DomainNotSupported { .. })
        ));
    }

    #[test]
    fn cartesian_left_turn_is_positive() {
        let angle = signed_turn_angle(&c2(0.0, 0.0), &c2(1.0, 0.0), &c2(1.0, 1.0)).unwrap();
        assert_relative_eq!(angle, 90.0, epsilon = 1e-9);
        let angle = signed_turn_angle(&c2(0.0, 0.0), &c2(1.0, 0.0), &c2(1.0, -1.0)).unwrap();
        assert_relative_eq!(angle, -90.0, epsilon = 1e-9);
    }

    #[test]
    fn terrestrial_left_turn_is_positive() {
        let a = BasePoint::terrestrial(0.0, 0.0).unwrap();
        let b = BasePoint::terrestrial(1.0, 0.0).unwrap();
        let c = BasePoint::terrestrial(1.0, 1.0).unwrap();
        let angle = signed_turn_angle(&a, &b, &c).unwrap();
        assert_relative_eq!(angle, 90.0, epsilon = 0.1);
    }

    #[test]
    fn signed_turn_angle_undefined_in_3d() {
        let a = BasePoint::cartesian3d(0.0, 0.0, 0.0).unwrap();
        let b = BasePoint::cartesian3d(1.0, 0.0, 0.0).unwrap();
        let c = BasePoint::cartesian3d(1.0, 1.0, 0.0).unwrap();
        assert!(matches!(
            signed_turn_angle(&a, &b, &c),
            Err(TrajkitError::DomainNotSupported { .. })
        ));
        assert_relative_eq!(unsigned_turn_angle(&a, &b, &c).unwrap(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn interpolation_endpoints() {
        let p = c2(0.0, 0.0);
        let q = c2(10.0, 10.0);
        assert_eq!(interpolate_base(&p, &q, 0.0).unwrap(), p);
        assert_eq!(interpolate_base(&p, &q, 1.0).unwrap(), q);
        // t is clamped
        assert_eq!(interpolate_base(&p, &q, -3.0).unwrap(), p);
        assert_eq!(interpolate_base(&p, &q, 7.0).unwrap(), q);
    }

    #[test]
    fn point_to_segment_distance_cartesian() {
        let d = point_to_segment_distance(&c2(5.0, 3.0), &c2(0.0, 0.0), &c2(10.0, 0.0)).unwrap();
        assert_relative_eq!(d, 3.0, epsilon = 1e-12);
        // Beyond the end: nearest endpoint
        let d = point_to_segment_distance(&c2(13.0, 4.0), &c2(0.0, 0.0), &c2(10.0, 0.0)).unwrap();
        assert_relative_eq!(d, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn segment_intersection_cases() {
        assert!(segments_intersect(&c2(0.0, 0.0), &c2(2.0, 2.0), &c2(0.0, 2.0), &c2(2.0, 0.0)).unwrap());
        assert!(!segments_intersect(&c2(0.0, 0.0), &c2(1.0, 0.0), &c2(0.0, 1.0), &c2(1.0, 1.0)).unwrap());
        // Shared endpoint counts as intersection
        assert!(segments_intersect(&c2(0.0, 0.0), &c2(1.0, 0.0), &c2(1.0, 0.0), &c2(2.0, 1.0)).unwrap());
    }

    #[test]
    fn bounding_box_contains() {
        let points = [c2(1.0, 5.0), c2(-2.0, 3.0), c2(4.0, -1.0)];
        let bbox = BoundingBox::from_points(points.iter()).unwrap().unwrap();
        assert_eq!(bbox.min_corner().coordinates(), &[-2.0, -1.0]);
        assert_eq!(bbox.max_corner().coordinates(), &[4.0, 5.0]);
        assert!(bbox.contains(&c2(0.0, 0.0)).unwrap());
        assert!(!bbox.contains(&c2(5.0, 0.0)).unwrap());
    }
}
