//! Derived-feature indexing and clustering.
//!
//! Trajectories are summarized into fixed-dimensional [`FeatureVector`]s — distance
//! geometry signatures, hull metrics, whatever the caller derives — which are then
//! indexed with the [`rtree`] module's R-tree and clustered with [`dbscan`]. The
//! indexing layer knows nothing about trajectories: it sees only feature vectors and
//! the opaque handles the caller attaches to them.

pub mod dbscan;
pub mod rtree;

use smallvec::SmallVec;

use crate::constants::MAX_FEATURE_DIMENSION;
use crate::trajkit_errors::TrajkitError;

/// A Cartesian vector of fixed dimension, used only as an index key.
///
/// The dimension is fixed at creation, between 1 and
/// [`MAX_FEATURE_DIMENSION`](crate::constants::MAX_FEATURE_DIMENSION); coordinates
/// must be finite. Feature vectors carry no timestamp, id, or properties.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    coords: SmallVec<[f64; 8]>,
}

impl FeatureVector {
    /// Build a feature vector from a coordinate slice.
    ///
    /// Return
    /// ------
    /// * the vector, or [`TrajkitError::FeatureDimensionOutOfRange`] /
    ///   [`TrajkitError::InvalidCoordinate`] for an unsupported dimension or a
    ///   non-finite coordinate.
    pub fn new(coords: &[f64]) -> Result<Self, TrajkitError> {
        if coords.is_empty() || coords.len() > MAX_FEATURE_DIMENSION {
            return Err(TrajkitError::FeatureDimensionOutOfRange(
                coords.len(),
                MAX_FEATURE_DIMENSION,
            ));
        }
        for &c in coords {
            if !c.is_finite() {
                return Err(TrajkitError::InvalidCoordinate(c));
            }
        }
        Ok(FeatureVector {
            coords: SmallVec::from_slice(coords),
        })
    }

    pub fn dimension(&self) -> usize {
        self.coords.len()
    }

    pub fn coordinate(&self, index: usize) -> Result<f64, TrajkitError> {
        self.coords
            .get(index)
            .copied()
            .ok_or(TrajkitError::IndexOutOfRange {
                index,
                len: self.coords.len(),
            })
    }

    pub fn coordinates(&self) -> &[f64] {
        &self.coords
    }

    pub(crate) fn check_dimension(&self, expected: usize) -> Result<(), TrajkitError> {
        if self.coords.len() == expected {
            Ok(())
        } else {
            Err(TrajkitError::DimensionMismatch {
                expected,
                found: self.coords.len(),
            })
        }
    }

    /// Squared Euclidean distance to another vector of the same dimension.
    pub fn distance_squared(&self, other: &FeatureVector) -> Result<f64, TrajkitError> {
        other.check_dimension(self.coords.len())?;
        Ok(self
            .coords
            .iter()
            .zip(&other.coords)
            .map(|(a, b)| (a - b) * (a - b))
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_limits() {
        assert!(FeatureVector::new(&[]).is_err());
        assert!(FeatureVector::new(&vec![0.0; MAX_FEATURE_DIMENSION]).is_ok());
        assert!(matches!(
            FeatureVector::new(&vec![0.0; MAX_FEATURE_DIMENSION + 1]),
            Err(TrajkitError::FeatureDimensionOutOfRange(_, _))
        ));
        assert!(matches!(
            FeatureVector::new(&[1.0, f64::NAN]),
            Err(TrajkitError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn squared_distance() {
        let a = FeatureVector::new(&[0.0, 0.0]).unwrap();
        let b = FeatureVector::new(&[3.0, 4.0]).unwrap();
        assert_eq!(a.distance_squared(&b).unwrap(), 25.0);
        let c = FeatureVector::new(&[1.0]).unwrap();
        assert!(matches!(
            a.distance_squared(&c),
            Err(TrajkitError::DimensionMismatch { .. })
        ));
    }
}
