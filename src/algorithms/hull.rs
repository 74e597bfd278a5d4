//! Convex hulls and hull-derived metrics.
//!
//! Overview
//! -----------------
//! Cartesian 2D hulls use Andrew's monotone chain. Terrestrial hulls cannot be
//! computed directly in (longitude, latitude) — the planar algorithm breaks near the
//! antimeridian and the poles — so they are computed by rotation: the spherical
//! center of mass of the points is rotated to the north pole, the rotated points are
//! projected onto an azimuthal plane around the pole, the planar hull is taken there,
//! and the hull vertices are mapped back to the original points.
//!
//! Metrics
//! -----------------
//! * perimeter: closed-polygon edge sum in domain units (a degenerate two-vertex hull
//!   counts its single segment twice);
//! * area: shoelace formula for Cartesian hulls, spherical excess × R² for
//!   terrestrial ones;
//! * aspect ratio: ratio of the minimum to the maximum distance from the hull
//!   centroid to the hull boundary (0 for degenerate hulls);
//! * centroid: area-weighted polygon centroid; for terrestrial hulls the planar
//!   centroid of the rotated polygon, rotated back;
//! * radius of gyration: RMS distance of the trajectory's points from the hull
//!   centroid.

use itertools::Itertools;
use nalgebra::Rotation3;

use crate::constants::{EPS, RADEG};
use crate::domain::Domain;
use crate::geometry::{distance, point_to_segment_distance};
use crate::point::BasePoint;
use crate::spherical::{
    rotation_to_north_pole, spherical_center_of_mass, spherical_polygon_area_km2, to_lon_lat,
    to_unit_vector,
};
use crate::trajectory::Trajectory;
use crate::trajkit_errors::TrajkitError;

fn cross(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Andrew's monotone chain over planar coordinates.
///
/// Returns indices into `points` in counter-clockwise order without a closing
/// duplicate; collinear interior points are dropped.
fn monotone_chain(points: &[(f64, f64)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&i, &j| {
        points[i]
            .partial_cmp(&points[j])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order.dedup_by(|&mut i, &mut j| points[i] == points[j]);

    if order.len() < 3 {
        return order;
    }

    let mut hull: Vec<usize> = Vec::with_capacity(order.len() * 2);
    // Lower hull
    for &i in &order {
        while hull.len() >= 2
            && cross(
                points[hull[hull.len() - 2]],
                points[hull[hull.len() - 1]],
                points[i],
            ) <= 0.0
        {
            hull.pop();
        }
        hull.push(i);
    }
    // Upper hull
    let lower_len = hull.len() + 1;
    for &i in order.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(
                points[hull[hull.len() - 2]],
                points[hull[hull.len() - 1]],
                points[i],
            ) <= 0.0
        {
            hull.pop();
        }
        hull.push(i);
    }
    hull.pop(); // last point equals the first
    hull
}

/// Azimuthal projection of a rotated point around the north pole: the colatitude is
/// the radius, the longitude the angle. Locally planar and free of antimeridian
/// seams near the pole.
fn project_about_pole(lon_deg: f64, lat_deg: f64) -> (f64, f64) {
    let colatitude = 90.0 - lat_deg;
    let lon = lon_deg * RADEG;
    (colatitude * lon.cos(), colatitude * lon.sin())
}

fn unproject_about_pole(x: f64, y: f64) -> (f64, f64) {
    let colatitude = (x * x + y * y).sqrt();
    let lon = y.atan2(x) / RADEG;
    (lon, 90.0 - colatitude)
}

/// The hull as planar working coordinates plus the matching domain points.
struct HullGeometry {
    domain: Domain,
    /// Hull vertices, counter-clockwise, no closing duplicate.
    vertices: Vec<BasePoint>,
    /// Planar coordinates of the vertices (raw coordinates for Cartesian hulls,
    /// pole-projected ones for terrestrial hulls).
    planar: Vec<(f64, f64)>,
    /// Rotation taking the original points to the pole frame (terrestrial only).
    rotation: Option<Rotation3<f64>>,
}

fn hull_geometry(trajectory: &Trajectory) -> Result<HullGeometry, TrajkitError> {
    if trajectory.is_empty() {
        return Err(TrajkitError::EmptyTrajectory);
    }
    match trajectory.domain() {
        Domain::Cartesian2d => {
            let planar_all: Vec<(f64, f64)> = trajectory
                .iter()
                .map(|p| {
                    Ok::<_, TrajkitError>((
                        p.base_point().coordinate(0)?,
                        p.base_point().coordinate(1)?,
                    ))
                })
                .collect::<Result<_, _>>()?;
            let hull = monotone_chain(&planar_all);
            Ok(HullGeometry {
                domain: Domain::Cartesian2d,
                vertices: hull
                    .iter()
                    .map(|&i| trajectory.points()[i].base_point().clone())
                    .collect(),
                planar: hull.iter().map(|&i| planar_all[i]).collect(),
                rotation: None,
            })
        }
        Domain::Terrestrial => {
            let lon_lat: Vec<(f64, f64)> = trajectory
                .iter()
                .map(|p| {
                    Ok::<_, TrajkitError>((
                        p.base_point().longitude()?,
                        p.base_point().latitude()?,
                    ))
                })
                .collect::<Result<_, _>>()?;
            let (com_lon, com_lat) = spherical_center_of_mass(lon_lat.iter().copied());
            let rotation = rotation_to_north_pole(com_lon, com_lat);
            let planar_all: Vec<(f64, f64)> = lon_lat
                .iter()
                .map(|&(lon, lat)| {
                    let rotated = rotation * to_unit_vector(lon, lat);
                    let (rlon, rlat) = to_lon_lat(&rotated);
                    project_about_pole(rlon, rlat)
                })
                .collect();
            let hull = monotone_chain(&planar_all);
            Ok(HullGeometry {
                domain: Domain::Terrestrial,
                vertices: hull
                    .iter()
                    .map(|&i| trajectory.points()[i].base_point().clone())
                    .collect(),
                planar: hull.iter().map(|&i| planar_all[i]).collect(),
                rotation: Some(rotation),
            })
        }
        domain @ Domain::Cartesian3d => Err(TrajkitError::DomainNotSupported {
            operation: "convex_hull",
            domain,
        }),
    }
}

/// Convex hull of a trajectory's points, counter-clockwise, without a closing
/// duplicate. Terrestrial hulls are computed by rotation to the north pole.
pub fn convex_hull(trajectory: &Trajectory) -> Result<Vec<BasePoint>, TrajkitError> {
    Ok(hull_geometry(trajectory)?.vertices)
}

/// Perimeter of the hull in the domain's units.
///
/// A degenerate hull of two vertices yields twice the single segment's length; a
/// single point yields 0.
pub fn convex_hull_perimeter(trajectory: &Trajectory) -> Result<f64, TrajkitError> {
    let hull = hull_geometry(trajectory)?;
    if hull.vertices.len() < 2 {
        return Ok(0.0);
    }
    hull.vertices
        .iter()
        .circular_tuple_windows()
        .map(|(a, b)| distance(a, b))
        .sum()
}

/// Area of the hull: square coordinate units for Cartesian hulls, km² (spherical
/// excess) for terrestrial ones. Degenerate hulls have area 0.
pub fn convex_hull_area(trajectory: &Trajectory) -> Result<f64, TrajkitError> {
    let hull = hull_geometry(trajectory)?;
    if hull.vertices.len() < 3 {
        return Ok(0.0);
    }
    match hull.domain {
        Domain::Terrestrial => {
            let unit_vectors: Vec<_> = hull
                .vertices
                .iter()
                .map(|v| Ok::<_, TrajkitError>(to_unit_vector(v.longitude()?, v.latitude()?)))
                .collect::<Result<_, _>>()?;
            Ok(spherical_polygon_area_km2(&unit_vectors))
        }
        _ => Ok(shoelace_area(&hull.planar).abs()),
    }
}

fn shoelace_area(polygon: &[(f64, f64)]) -> f64 {
    let n = polygon.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        let (x1, y1) = polygon[i];
        let (x2, y2) = polygon[(i + 1) % n];
        twice_area += x1 * y2 - x2 * y1;
    }
    twice_area / 2.0
}

/// Planar area-weighted centroid; falls back to the vertex mean for degenerate
/// polygons.
fn planar_centroid(polygon: &[(f64, f64)]) -> (f64, f64) {
    let n = polygon.len();
    let area = if n >= 3 { shoelace_area(polygon) } else { 0.0 };
    if area.abs() < EPS {
        let (sx, sy) = polygon
            .iter()
            .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
        return (sx / n as f64, sy / n as f64);
    }
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let (x1, y1) = polygon[i];
        let (x2, y2) = polygon[(i + 1) % n];
        let w = x1 * y2 - x2 * y1;
        cx += (x1 + x2) * w;
        cy += (y1 + y2) * w;
    }
    (cx / (6.0 * area), cy / (6.0 * area))
}

/// Area-weighted centroid of the hull, as a point of the trajectory's domain.
///
/// For terrestrial hulls the centroid of the rotated polygon is computed in the
/// pole-projected plane and rotated back; after rotation the hull is small enough
/// that the planar centroid is accurate.
pub fn convex_hull_centroid(trajectory: &Trajectory) -> Result<BasePoint, TrajkitError> {
    let hull = hull_geometry(trajectory)?;
    let (cx, cy) = planar_centroid(&hull.planar);
    match hull.domain {
        Domain::Terrestrial => {
            let (lon, lat) = unproject_about_pole(cx, cy);
            let rotation = hull
                .rotation
                .expect("terrestrial hull always carries its rotation");
            let unrotated = rotation.inverse() * to_unit_vector(lon, lat);
            let (lon, lat) = to_lon_lat(&unrotated);
            BasePoint::terrestrial(lon, lat)
        }
        _ => BasePoint::cartesian2d(cx, cy),
    }
}

/// Ratio of the minimum to the maximum distance from the hull centroid to the hull
/// boundary (geodesic distances for terrestrial hulls).
///
/// Degenerate hulls — where the centroid touches the boundary — and non-finite
/// ratios yield 0.
pub fn convex_hull_aspect_ratio(trajectory: &Trajectory) -> Result<f64, TrajkitError> {
    let hull = hull_geometry(trajectory)?;
    let n = hull.vertices.len();
    if n < 2 {
        return Ok(0.0);
    }
    let centroid = convex_hull_centroid(trajectory)?;
    let mut max_distance: f64 = 0.0;
    for vertex in &hull.vertices {
        max_distance = max_distance.max(distance(&centroid, vertex)?);
    }
    let mut min_distance = f64::INFINITY;
    for i in 0..n {
        let edge_distance =
            point_to_segment_distance(&centroid, &hull.vertices[i], &hull.vertices[(i + 1) % n])?;
        min_distance = min_distance.min(edge_distance);
    }
    let ratio = min_distance / max_distance;
    if !ratio.is_finite() || min_distance < EPS.sqrt() {
        return Ok(0.0);
    }
    Ok(ratio)
}

/// Root-mean-square distance of the trajectory's points from the hull centroid.
///
/// Zero for trajectories with fewer than two points.
pub fn radius_of_gyration(trajectory: &Trajectory) -> Result<f64, TrajkitError> {
    if trajectory.len() < 2 {
        return Ok(0.0);
    }
    let centroid = convex_hull_centroid(trajectory)?;
    let mut sum_squares = 0.0;
    for point in trajectory.iter() {
        let d = distance(point.base_point(), &centroid)?;
        sum_squares += d * d;
    }
    Ok((sum_squares / trajectory.len() as f64).sqrt())
}
