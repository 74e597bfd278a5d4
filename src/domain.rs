//! Coordinate-space tags.
//!
//! Every point, trajectory, and geometric primitive in the crate is bound to one of
//! three coordinate spaces. The tag travels with the data at runtime and the primitives
//! in [`crate::geometry`] dispatch on it; asking for an operation a space does not define
//! yields [`crate::trajkit_errors::TrajkitError::DomainNotSupported`] instead of a wrong
//! answer.

use serde::{Deserialize, Serialize};

/// Coordinate space of a point or trajectory.
///
/// * `Cartesian2d` / `Cartesian3d`: Euclidean coordinates, distances in the same linear
///   unit as the coordinates.
/// * `Terrestrial`: (longitude, latitude) in degrees on a sphere of mean Earth radius;
///   distances are great-circle arcs in kilometers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Cartesian2d,
    Cartesian3d,
    Terrestrial,
}

impl Domain {
    /// Number of stored coordinates per point in this domain.
    pub fn dimension(&self) -> usize {
        match self {
            Domain::Cartesian2d => 2,
            Domain::Cartesian3d => 3,
            Domain::Terrestrial => 2,
        }
    }

    /// Stable one-byte tag used by the binary serializer.
    pub(crate) fn wire_tag(&self) -> u8 {
        match self {
            Domain::Cartesian2d => 1,
            Domain::Cartesian3d => 2,
            Domain::Terrestrial => 3,
        }
    }

    pub(crate) fn from_wire_tag(tag: u8) -> Option<Domain> {
        match tag {
            1 => Some(Domain::Cartesian2d),
            2 => Some(Domain::Cartesian3d),
            3 => Some(Domain::Terrestrial),
            _ => None,
        }
    }
}
