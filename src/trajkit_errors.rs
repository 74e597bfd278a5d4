use crate::domain::Domain;
use thiserror::Error;

/// Crate-wide error type.
///
/// Every fallible public operation reports one of these variants; the kind is
/// machine-readable and the message is meant for humans. The library itself never
/// logs an error — the enclosing application decides what to do with it.
#[derive(Error, Debug)]
pub enum TrajkitError {
    // ---------------------------------------------------------------------------------------------
    // Input errors
    // ---------------------------------------------------------------------------------------------
    #[error("Invalid coordinate (must be finite): {0}")]
    InvalidCoordinate(f64),

    #[error("Empty field: {0}")]
    EmptyField(String),

    #[error("Cannot convert field value: {0}")]
    LexicalCastError(String),

    #[error("Unrecognized timestamp format: {0}")]
    UnrecognizedTimestampFormat(String),

    // ---------------------------------------------------------------------------------------------
    // Structure errors
    // ---------------------------------------------------------------------------------------------
    #[error("Object id mismatch: trajectory carries '{expected}', point carries '{found}'")]
    ObjectIdMismatch { expected: String, found: String },

    #[error("Timestamp out of order: {0}")]
    TimestampOutOfOrder(String),

    #[error("A valid timestamp is required here (found NotATime)")]
    InvalidTimestamp,

    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Operation requires a non-empty trajectory")]
    EmptyTrajectory,

    // ---------------------------------------------------------------------------------------------
    // Contract errors
    // ---------------------------------------------------------------------------------------------
    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    #[error("Property '{key}' holds a {found}, not a {expected}")]
    PropertyTypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Simplification tolerance must be non-negative, got {0}")]
    NegativeTolerance(f64),

    #[error("Domain mismatch: expected {expected:?}, found {found:?}")]
    DomainMismatch { expected: Domain, found: Domain },

    #[error("Operation '{operation}' is not defined for domain {domain:?}")]
    DomainNotSupported {
        operation: &'static str,
        domain: Domain,
    },

    #[error("Feature dimension {0} outside 1..={1}")]
    FeatureDimensionOutOfRange(usize, usize),

    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    // ---------------------------------------------------------------------------------------------
    // Serialization errors
    // ---------------------------------------------------------------------------------------------
    #[error("Stream version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u16, found: u16 },

    #[error("Corrupt stream: {0}")]
    CorruptStream(String),

    // ---------------------------------------------------------------------------------------------
    // Resource / boundary errors
    // ---------------------------------------------------------------------------------------------
    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Delimited-text error: {0}")]
    CsvError(#[from] csv::Error),
}
