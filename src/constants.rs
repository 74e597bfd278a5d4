//! # Constants and type definitions for trajkit
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `trajkit` library.
//!
//! ## Overview
//!
//! - Terrestrial constants (mean Earth radius used by every great-circle computation)
//! - Unit conversions (degrees ↔ radians)
//! - Core type aliases used across the crate
//! - Limits for the derived-feature indexing layer
//!
//! These definitions are used by all main modules, including the geometric primitives,
//! the trajectory algorithms, and the indexing layer.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Mean Earth radius in kilometers; every great-circle distance is an arc on this sphere
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Numerical epsilon used for floating-point comparisons
pub const EPS: f64 = 1e-10;

// -------------------------------------------------------------------------------------------------
// Indexing layer limits
// -------------------------------------------------------------------------------------------------

/// Largest feature-vector dimension accepted by the indexing layer
pub const MAX_FEATURE_DIMENSION: usize = 30;

/// Maximum number of entries per R-tree node before a split
pub const RTREE_MAX_NODE_ENTRIES: usize = 16;

/// Minimum fill of an R-tree node after a split
pub const RTREE_MIN_NODE_ENTRIES: usize = 6;

// -------------------------------------------------------------------------------------------------
// Timestamp wire formats
// -------------------------------------------------------------------------------------------------

/// Default input/output format for delimited-text timestamps
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Compact format used to derive trajectory identifiers
pub const COMPACT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;

/// Distance in kilometers
pub type Kilometer = f64;

/// Identifier of a moving object, shared by every point of a trajectory
pub type ObjectId = String;
