//! Property bags attached to points and trajectories.
//!
//! A [`PropertyBag`] maps string keys to [`PropertyValue`] variants drawn from a closed
//! set: null, 64-bit integer, double, string, timestamp. The set is deliberately closed
//! because readers, writers, and the binary serializer must enumerate it.
//!
//! Equality follows SQL-style null semantics: `Null` is never equal to any value,
//! including another `Null`. Code that needs to detect a null after a round trip must
//! test the tag with [`PropertyValue::is_null`], not `==`.

use std::collections::HashMap;

use crate::time::Timestamp;
use crate::trajkit_errors::TrajkitError;

/// A tagged property value.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    Null,
    Integer(i64),
    Real(f64),
    String(String),
    Moment(Timestamp),
}

impl PropertyValue {
    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Null => "null",
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Real(_) => "real",
            PropertyValue::String(_) => "string",
            PropertyValue::Moment(_) => "timestamp",
        }
    }

    /// Tag test; the only way to detect a null, since `Null == Null` is false.
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // Null equals nothing, itself included.
            (PropertyValue::Null, _) | (_, PropertyValue::Null) => false,
            (PropertyValue::Integer(a), PropertyValue::Integer(b)) => a == b,
            (PropertyValue::Real(a), PropertyValue::Real(b)) => a == b,
            (PropertyValue::String(a), PropertyValue::String(b)) => a == b,
            (PropertyValue::Moment(a), PropertyValue::Moment(b)) => a == b,
            _ => false,
        }
    }
}

/// Mapping from unique string keys to tagged values. Insertion order is not observable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    values: HashMap<String, PropertyValue>,
}

impl PropertyBag {
    pub fn new() -> Self {
        PropertyBag::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Insert or replace a property.
    pub fn set(&mut self, key: &str, value: PropertyValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.values.remove(key)
    }

    /// Raw access to a property; absent keys fail with `PropertyNotFound`.
    pub fn get(&self, key: &str) -> Result<&PropertyValue, TrajkitError> {
        self.values
            .get(key)
            .ok_or_else(|| TrajkitError::PropertyNotFound(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.values.iter()
    }

    /// Typed accessor for a real-valued property.
    ///
    /// Fails with `PropertyNotFound` if the key is absent and `PropertyTypeMismatch`
    /// if it holds another variant. Use [`PropertyBag::try_real`] when absence is not
    /// an error.
    pub fn real(&self, key: &str) -> Result<f64, TrajkitError> {
        match self.get(key)? {
            PropertyValue::Real(v) => Ok(*v),
            other => Err(type_mismatch(key, "real", other)),
        }
    }

    /// Presence-flag form of [`PropertyBag::real`]: `Ok(None)` when the key is absent.
    pub fn try_real(&self, key: &str) -> Result<Option<f64>, TrajkitError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(PropertyValue::Real(v)) => Ok(Some(*v)),
            Some(other) => Err(type_mismatch(key, "real", other)),
        }
    }

    pub fn integer(&self, key: &str) -> Result<i64, TrajkitError> {
        match self.get(key)? {
            PropertyValue::Integer(v) => Ok(*v),
            other => Err(type_mismatch(key, "integer", other)),
        }
    }

    pub fn try_integer(&self, key: &str) -> Result<Option<i64>, TrajkitError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(PropertyValue::Integer(v)) => Ok(Some(*v)),
            Some(other) => Err(type_mismatch(key, "integer", other)),
        }
    }

    pub fn string(&self, key: &str) -> Result<&str, TrajkitError> {
        match self.get(key)? {
            PropertyValue::String(v) => Ok(v.as_str()),
            other => Err(type_mismatch(key, "string", other)),
        }
    }

    pub fn try_string(&self, key: &str) -> Result<Option<&str>, TrajkitError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(PropertyValue::String(v)) => Ok(Some(v.as_str())),
            Some(other) => Err(type_mismatch(key, "string", other)),
        }
    }

    pub fn time(&self, key: &str) -> Result<Timestamp, TrajkitError> {
        match self.get(key)? {
            PropertyValue::Moment(v) => Ok(*v),
            other => Err(type_mismatch(key, "timestamp", other)),
        }
    }

    pub fn try_time(&self, key: &str) -> Result<Option<Timestamp>, TrajkitError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(PropertyValue::Moment(v)) => Ok(Some(*v)),
            Some(other) => Err(type_mismatch(key, "timestamp", other)),
        }
    }
}

fn type_mismatch(key: &str, expected: &'static str, found: &PropertyValue) -> TrajkitError {
    TrajkitError::PropertyTypeMismatch {
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_never_equal() {
        assert_ne!(PropertyValue::Null, PropertyValue::Null);
        assert_ne!(PropertyValue::Null, PropertyValue::Integer(0));
        assert!(PropertyValue::Null.is_null());
    }

    #[test]
    fn typed_accessors() {
        let mut bag = PropertyBag::new();
        bag.set("speed", PropertyValue::Real(412.5));
        bag.set("callsign", PropertyValue::String("N117".to_string()));
        bag.set("heading", PropertyValue::Integer(270));

        assert_eq!(bag.real("speed").unwrap(), 412.5);
        assert_eq!(bag.string("callsign").unwrap(), "N117");
        assert_eq!(bag.integer("heading").unwrap(), 270);
        assert_eq!(bag.try_real("absent").unwrap(), None);

        assert!(matches!(
            bag.real("callsign"),
            Err(TrajkitError::PropertyTypeMismatch { .. })
        ));
        assert!(matches!(
            bag.real("absent"),
            Err(TrajkitError::PropertyNotFound(_))
        ));
    }

    #[test]
    fn set_replaces() {
        let mut bag = PropertyBag::new();
        bag.set("altitude", PropertyValue::Real(10000.0));
        bag.set("altitude", PropertyValue::Real(11000.0));
        assert_eq!(bag.len(), 1);
        assert_eq!(bag.real("altitude").unwrap(), 11000.0);
    }
}
