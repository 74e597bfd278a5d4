//! Unit-sphere math for the terrestrial domain.
//!
//! Overview
//! -----------------
//! Every terrestrial computation in the crate goes through this module: points are
//! converted to 3-vectors on the unit sphere, the work is done in 3-space with
//! `nalgebra`, and the result is projected back to (longitude, latitude) degrees.
//! Funneling the conversions through one place keeps antimeridian and pole handling
//! out of the rest of the codebase.
//!
//! Conventions
//! -----------------
//! * Longitude and latitude are degrees; longitude is normalized into [0, 360) on the
//!   way in and returned in (−180, 180] by [`to_lon_lat`].
//! * The unit-sphere frame is x = cos(lat)·cos(lon), y = cos(lat)·sin(lon),
//!   z = sin(lat).
//! * Distances are great-circle arcs on a sphere of radius
//!   [`EARTH_RADIUS_KM`](crate::constants::EARTH_RADIUS_KM).

use nalgebra::{Rotation3, Vector3};

use crate::constants::{Degree, Kilometer, EARTH_RADIUS_KM, EPS, RADEG};

/// Normalize a longitude into [0, 360).
pub fn normalize_longitude(longitude: Degree) -> Degree {
    let wrapped = longitude.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Normalize a longitude or angle difference into (−180, 180].
pub fn normalize_longitude_signed(longitude: Degree) -> Degree {
    let wrapped = normalize_longitude(longitude);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// (longitude, latitude) in degrees → unit vector in 3-space.
pub fn to_unit_vector(longitude: Degree, latitude: Degree) -> Vector3<f64> {
    let lon = longitude * RADEG;
    let lat = latitude * RADEG;
    Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

/// Unit vector in 3-space → (longitude, latitude) in degrees.
///
/// The latitude is clamped to [−90, 90] to undo floating-point drift off the unit
/// sphere; longitude comes back in (−180, 180].
pub fn to_lon_lat(v: &Vector3<f64>) -> (Degree, Degree) {
    let lon = v.y.atan2(v.x) / RADEG;
    let lat = (v.z.atan2((v.x * v.x + v.y * v.y).sqrt()) / RADEG).clamp(-90.0, 90.0);
    (lon, lat)
}

/// Central angle in radians between two unit vectors.
///
/// `atan2(‖a×b‖, a·b)` is numerically stable for both nearly-parallel and
/// nearly-antipodal pairs, unlike the plain arccosine.
pub fn central_angle(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.cross(b).norm().atan2(a.dot(b))
}

/// Great-circle distance in kilometers between two (longitude, latitude) pairs.
pub fn great_circle_distance_km(
    lon1: Degree,
    lat1: Degree,
    lon2: Degree,
    lat2: Degree,
) -> Kilometer {
    let a = to_unit_vector(lon1, lat1);
    let b = to_unit_vector(lon2, lat2);
    central_angle(&a, &b) * EARTH_RADIUS_KM
}

/// Initial forward azimuth from point 1 to point 2, degrees in [0, 360).
pub fn bearing_deg(lon1: Degree, lat1: Degree, lon2: Degree, lat2: Degree) -> Degree {
    let phi1 = lat1 * RADEG;
    let phi2 = lat2 * RADEG;
    let dlon = (lon2 - lon1) * RADEG;
    let y = dlon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlon.cos();
    normalize_longitude(y.atan2(x) / RADEG)
}

/// Spherical linear interpolation between two unit vectors at fraction `t`.
pub fn slerp(a: &Vector3<f64>, b: &Vector3<f64>, t: f64) -> Vector3<f64> {
    let omega = central_angle(a, b);
    if omega.abs() < EPS {
        return *a;
    }
    let sin_omega = omega.sin();
    (a * ((1.0 - t) * omega).sin() + b * (t * omega).sin()) / sin_omega
}

/// Point at fraction `t` along the great-circle geodesic from 1 to 2.
pub fn interpolate_geodesic(
    lon1: Degree,
    lat1: Degree,
    lon2: Degree,
    lat2: Degree,
    t: f64,
) -> (Degree, Degree) {
    let a = to_unit_vector(lon1, lat1);
    let b = to_unit_vector(lon2, lat2);
    to_lon_lat(&slerp(&a, &b, t).normalize())
}

/// Spherical center of mass of a set of (longitude, latitude) pairs.
///
/// The mean of the unit-vector representations is taken componentwise, each component
/// clamped to [−1, 1], and the result projected back to the sphere. An empty input
/// yields (0, 0).
pub fn spherical_center_of_mass<I>(points: I) -> (Degree, Degree)
where
    I: IntoIterator<Item = (Degree, Degree)>,
{
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for (lon, lat) in points {
        sum += to_unit_vector(lon, lat);
        count += 1;
    }
    if count == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / count as f64;
    let clamped = Vector3::new(
        mean.x.clamp(-1.0, 1.0),
        mean.y.clamp(-1.0, 1.0),
        mean.z.clamp(-1.0, 1.0),
    );
    to_lon_lat(&clamped)
}

/// Rotation taking the given (longitude, latitude) to the north pole.
///
/// The antipodal case (the south pole itself) has no unique shortest rotation; a half
/// turn about the x axis is used there.
pub fn rotation_to_north_pole(longitude: Degree, latitude: Degree) -> Rotation3<f64> {
    let v = to_unit_vector(longitude, latitude);
    let pole = Vector3::z();
    match Rotation3::rotation_between(&v, &pole) {
        Some(rotation) => rotation,
        None => Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI),
    }
}

/// Area of a spherical polygon in km², by fan triangulation from the first vertex.
///
/// Each triangle's spherical excess is computed with Eriksson's formula
/// `tan(E/2) = v₁·(v₂×v₃) / (1 + v₁·v₂ + v₂·v₃ + v₃·v₁)`, which is exact for
/// triangles smaller than a hemisphere — always the case for convex hulls of
/// trajectories after rotation to the pole.
pub fn spherical_polygon_area_km2(vertices: &[Vector3<f64>]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut total_excess = 0.0;
    let v1 = &vertices[0];
    for window in vertices[1..].windows(2) {
        let v2 = &window[0];
        let v3 = &window[1];
        let numerator = v1.dot(&v2.cross(v3));
        let denominator = 1.0 + v1.dot(v2) + v2.dot(v3) + v3.dot(v1);
        total_excess += 2.0 * numerator.atan2(denominator);
    }
    total_excess.abs() * EARTH_RADIUS_KM * EARTH_RADIUS_KM
}

/// `true` if unit vector `p` lies on the minor arc from `a` to `b` (within tolerance).
fn within_arc(p: &Vector3<f64>, a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    let arc = central_angle(a, b);
    central_angle(a, p) + central_angle(p, b) <= arc + 1e-9
}

/// Distance in kilometers from a point to the minor great-circle arc `a`–`b`.
///
/// When the perpendicular foot falls outside the arc, the nearer endpoint distance is
/// returned instead; a degenerate arc collapses to plain point-to-point distance.
pub fn point_to_arc_distance_km(
    p: &Vector3<f64>,
    a: &Vector3<f64>,
    b: &Vector3<f64>,
) -> Kilometer {
    let normal = a.cross(b);
    if normal.norm() < EPS {
        return central_angle(p, a) * EARTH_RADIUS_KM;
    }
    let unit_normal = normal.normalize();
    // Projection of p onto the great circle through a and b.
    let off_plane = p.dot(&unit_normal);
    let foot = p - unit_normal * off_plane;
    if foot.norm() < EPS {
        // p is a pole of the great circle; every circle point is equidistant.
        return std::f64::consts::FRAC_PI_2 * EARTH_RADIUS_KM;
    }
    let foot = foot.normalize();
    if within_arc(&foot, a, b) {
        off_plane.clamp(-1.0, 1.0).asin().abs() * EARTH_RADIUS_KM
    } else {
        central_angle(p, a).min(central_angle(p, b)) * EARTH_RADIUS_KM
    }
}

/// `true` if the minor arcs `a1`–`a2` and `b1`–`b2` intersect.
pub fn arcs_intersect(
    a1: &Vector3<f64>,
    a2: &Vector3<f64>,
    b1: &Vector3<f64>,
    b2: &Vector3<f64>,
) -> bool {
    let n1 = a1.cross(a2);
    let n2 = b1.cross(b2);
    let line = n1.cross(&n2);
    if line.norm() < EPS {
        // Same great circle: the arcs intersect iff one contains an endpoint of the other.
        return within_arc(b1, a1, a2)
            || within_arc(b2, a1, a2)
            || within_arc(a1, b1, b2)
            || within_arc(a2, b1, b2);
    }
    let candidate = line.normalize();
    let antipode = -candidate;
    (within_arc(&candidate, a1, a2) && within_arc(&candidate, b1, b2))
        || (within_arc(&antipode, a1, a2) && within_arc(&antipode, b1, b2))
}
