//! Versioned binary serialization.
//!
//! Overview
//! -----------------
//! Each top-level record is a self-describing little-endian stream: a 4-byte magic
//! (`TRJB`), a u16 format version, a u8 record kind, and a u8 domain tag, followed
//! by the record body. Nested values (points inside a trajectory, values inside a
//! property bag) are written as bare bodies; the header appears once per stream.
//!
//! Wire conventions
//! -----------------
//! * integers and floats little-endian; strings as u32 byte length + UTF-8;
//! * timestamps as a validity flag byte + i64 microseconds since the Unix epoch;
//! * property bags as a u32 entry count + (key, tagged value) pairs in ascending
//!   key order, so equal bags serialize to equal bytes;
//! * UUIDs as their 16 raw bytes.
//!
//! Deserializers verify the header before touching the body: a wrong version fails
//! with [`TrajkitError::VersionMismatch`], a point whose domain disagrees with the
//! stream's with [`TrajkitError::DomainMismatch`], and a truncated or malformed
//! body with [`TrajkitError::CorruptStream`].
//!
//! Round trips are byte-exact, with one caveat: `Null` properties are never equal
//! under `==` and must be detected by type tag after a round trip.

use std::io::{ErrorKind, Read, Write};

use uuid::Uuid;

use crate::domain::Domain;
use crate::point::{BasePoint, TrajectoryPoint};
use crate::properties::{PropertyBag, PropertyValue};
use crate::time::Timestamp;
use crate::trajectory::Trajectory;
use crate::trajkit_errors::TrajkitError;

const MAGIC: [u8; 4] = *b"TRJB";
const STREAM_VERSION: u16 = 1;

const KIND_BASE_POINT: u8 = 1;
const KIND_TRAJECTORY_POINT: u8 = 2;
const KIND_TRAJECTORY: u8 = 3;
const KIND_PROPERTY_BAG: u8 = 4;

/// Domain byte for records that carry no domain.
const NO_DOMAIN: u8 = 0;

const TAG_NULL: u8 = 0;
const TAG_INTEGER: u8 = 1;
const TAG_REAL: u8 = 2;
const TAG_STRING: u8 = 3;
const TAG_MOMENT: u8 = 4;

// -------------------------------------------------------------------------------------------------
// Primitives
// -------------------------------------------------------------------------------------------------

fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), TrajkitError> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            TrajkitError::CorruptStream("unexpected end of stream".to_string())
        } else {
            TrajkitError::IoError(e)
        }
    })
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, TrajkitError> {
    let mut buf = [0u8; 1];
    fill(reader, &mut buf)?;
    Ok(buf[0])
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16, TrajkitError> {
    let mut buf = [0u8; 2];
    fill(reader, &mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, TrajkitError> {
    let mut buf = [0u8; 4];
    fill(reader, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_i64<R: Read>(reader: &mut R) -> Result<i64, TrajkitError> {
    let mut buf = [0u8; 8];
    fill(reader, &mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

fn read_f64<R: Read>(reader: &mut R) -> Result<f64, TrajkitError> {
    let mut buf = [0u8; 8];
    fill(reader, &mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

fn write_string<W: Write>(writer: &mut W, text: &str) -> Result<(), TrajkitError> {
    writer.write_all(&(text.len() as u32).to_le_bytes())?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

fn read_string<R: Read>(reader: &mut R) -> Result<String, TrajkitError> {
    let len = read_u32(reader)? as usize;
    let mut buf = vec![0u8; len];
    fill(reader, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|_| TrajkitError::CorruptStream("string is not valid UTF-8".to_string()))
}

fn write_timestamp<W: Write>(writer: &mut W, timestamp: &Timestamp) -> Result<(), TrajkitError> {
    match timestamp.to_unix_microseconds() {
        Some(micros) => {
            writer.write_all(&[1u8])?;
            writer.write_all(&micros.to_le_bytes())?;
        }
        None => {
            writer.write_all(&[0u8])?;
            writer.write_all(&0i64.to_le_bytes())?;
        }
    }
    Ok(())
}

fn read_timestamp<R: Read>(reader: &mut R) -> Result<Timestamp, TrajkitError> {
    let flag = read_u8(reader)?;
    let micros = read_i64(reader)?;
    match flag {
        0 => Ok(Timestamp::NotATime),
        1 => Ok(Timestamp::from_unix_microseconds(micros)),
        other => Err(TrajkitError::CorruptStream(format!(
            "invalid timestamp flag {other}"
        ))),
    }
}

// -------------------------------------------------------------------------------------------------
// Header
// -------------------------------------------------------------------------------------------------

fn write_header<W: Write>(writer: &mut W, kind: u8, domain_tag: u8) -> Result<(), TrajkitError> {
    writer.write_all(&MAGIC)?;
    writer.write_all(&STREAM_VERSION.to_le_bytes())?;
    writer.write_all(&[kind, domain_tag])?;
    Ok(())
}

/// Validate magic, version, and record kind; return the raw domain tag.
fn read_header<R: Read>(reader: &mut R, expected_kind: u8) -> Result<u8, TrajkitError> {
    let mut magic = [0u8; 4];
    fill(reader, &mut magic)?;
    if magic != MAGIC {
        return Err(TrajkitError::CorruptStream(
            "stream does not start with the TRJB magic".to_string(),
        ));
    }
    let version = read_u16(reader)?;
    if version != STREAM_VERSION {
        return Err(TrajkitError::VersionMismatch {
            expected: STREAM_VERSION,
            found: version,
        });
    }
    let kind = read_u8(reader)?;
    if kind != expected_kind {
        return Err(TrajkitError::CorruptStream(format!(
            "expected record kind {expected_kind}, found {kind}"
        )));
    }
    read_u8(reader)
}

fn domain_from_tag(tag: u8) -> Result<Domain, TrajkitError> {
    Domain::from_wire_tag(tag)
        .ok_or_else(|| TrajkitError::CorruptStream(format!("unknown domain tag {tag}")))
}

// -------------------------------------------------------------------------------------------------
// Bodies
// -------------------------------------------------------------------------------------------------

fn write_base_point_body<W: Write>(
    writer: &mut W,
    point: &BasePoint,
) -> Result<(), TrajkitError> {
    for &c in point.coordinates() {
        writer.write_all(&c.to_le_bytes())?;
    }
    Ok(())
}

/// The coordinate count is implied by the domain, which the caller read from the
/// header.
fn read_base_point_body<R: Read>(
    reader: &mut R,
    domain: Domain,
) -> Result<BasePoint, TrajkitError> {
    let mut coords = Vec::with_capacity(domain.dimension());
    for _ in 0..domain.dimension() {
        coords.push(read_f64(reader)?);
    }
    BasePoint::new(domain, &coords)
}

fn write_property_value<W: Write>(
    writer: &mut W,
    value: &PropertyValue,
) -> Result<(), TrajkitError> {
    match value {
        PropertyValue::Null => writer.write_all(&[TAG_NULL])?,
        PropertyValue::Integer(i) => {
            writer.write_all(&[TAG_INTEGER])?;
            writer.write_all(&i.to_le_bytes())?;
        }
        PropertyValue::Real(r) => {
            writer.write_all(&[TAG_REAL])?;
            writer.write_all(&r.to_le_bytes())?;
        }
        PropertyValue::String(s) => {
            writer.write_all(&[TAG_STRING])?;
            write_string(writer, s)?;
        }
        PropertyValue::Moment(t) => {
            writer.write_all(&[TAG_MOMENT])?;
            write_timestamp(writer, t)?;
        }
    }
    Ok(())
}

fn read_property_value<R: Read>(reader: &mut R) -> Result<PropertyValue, TrajkitError> {
    match read_u8(reader)? {
        TAG_NULL => Ok(PropertyValue::Null),
        TAG_INTEGER => Ok(PropertyValue::Integer(read_i64(reader)?)),
        TAG_REAL => Ok(PropertyValue::Real(read_f64(reader)?)),
        TAG_STRING => Ok(PropertyValue::String(read_string(reader)?)),
        TAG_MOMENT => Ok(PropertyValue::Moment(read_timestamp(reader)?)),
        other => Err(TrajkitError::CorruptStream(format!(
            "unknown property tag {other}"
        ))),
    }
}

fn write_property_bag_body<W: Write>(
    writer: &mut W,
    bag: &PropertyBag,
) -> Result<(), TrajkitError> {
    let mut entries: Vec<(&String, &PropertyValue)> = bag.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    writer.write_all(&(entries.len() as u32).to_le_bytes())?;
    for (key, value) in entries {
        write_string(writer, key)?;
        write_property_value(writer, value)?;
    }
    Ok(())
}

fn read_property_bag_body<R: Read>(reader: &mut R) -> Result<PropertyBag, TrajkitError> {
    let count = read_u32(reader)?;
    let mut bag = PropertyBag::new();
    for _ in 0..count {
        let key = read_string(reader)?;
        let value = read_property_value(reader)?;
        bag.set(&key, value);
    }
    Ok(bag)
}

fn write_trajectory_point_body<W: Write>(
    writer: &mut W,
    point: &TrajectoryPoint,
) -> Result<(), TrajkitError> {
    write_base_point_body(writer, point.base_point())?;
    write_string(writer, point.object_id())?;
    write_timestamp(writer, &point.timestamp())?;
    writer.write_all(&point.cumulative_arc_length().to_le_bytes())?;
    writer.write_all(&point.time_fraction().to_le_bytes())?;
    write_property_bag_body(writer, point.properties())
}

fn read_trajectory_point_body<R: Read>(
    reader: &mut R,
    domain: Domain,
) -> Result<TrajectoryPoint, TrajkitError> {
    let base = read_base_point_body(reader, domain)?;
    let object_id = read_string(reader)?;
    let timestamp = read_timestamp(reader)?;
    let cumulative_arc_length = read_f64(reader)?;
    let time_fraction = read_f64(reader)?;
    let properties = read_property_bag_body(reader)?;
    let mut point = TrajectoryPoint::new(base, &object_id, timestamp)?
        .with_derived(cumulative_arc_length, time_fraction);
    *point.properties_mut() = properties;
    Ok(point)
}

// -------------------------------------------------------------------------------------------------
// Public record API
// -------------------------------------------------------------------------------------------------

pub fn write_base_point<W: Write>(writer: &mut W, point: &BasePoint) -> Result<(), TrajkitError> {
    write_header(writer, KIND_BASE_POINT, point.domain().wire_tag())?;
    write_base_point_body(writer, point)
}

pub fn read_base_point<R: Read>(reader: &mut R) -> Result<BasePoint, TrajkitError> {
    let domain = domain_from_tag(read_header(reader, KIND_BASE_POINT)?)?;
    read_base_point_body(reader, domain)
}

pub fn write_trajectory_point<W: Write>(
    writer: &mut W,
    point: &TrajectoryPoint,
) -> Result<(), TrajkitError> {
    write_header(writer, KIND_TRAJECTORY_POINT, point.domain().wire_tag())?;
    write_trajectory_point_body(writer, point)
}

pub fn read_trajectory_point<R: Read>(reader: &mut R) -> Result<TrajectoryPoint, TrajkitError> {
    let domain = domain_from_tag(read_header(reader, KIND_TRAJECTORY_POINT)?)?;
    read_trajectory_point_body(reader, domain)
}

pub fn write_property_bag<W: Write>(
    writer: &mut W,
    bag: &PropertyBag,
) -> Result<(), TrajkitError> {
    write_header(writer, KIND_PROPERTY_BAG, NO_DOMAIN)?;
    write_property_bag_body(writer, bag)
}

pub fn read_property_bag<R: Read>(reader: &mut R) -> Result<PropertyBag, TrajkitError> {
    read_header(reader, KIND_PROPERTY_BAG)?;
    read_property_bag_body(reader)
}

/// Serialize a whole trajectory, derived fields included.
pub fn write_trajectory<W: Write>(
    writer: &mut W,
    trajectory: &Trajectory,
) -> Result<(), TrajkitError> {
    write_header(writer, KIND_TRAJECTORY, trajectory.domain().wire_tag())?;
    match trajectory.object_id() {
        Some(id) => {
            writer.write_all(&[1u8])?;
            write_string(writer, id)?;
        }
        None => writer.write_all(&[0u8])?,
    }
    writer.write_all(trajectory.uuid().as_bytes())?;
    write_property_bag_body(writer, trajectory.properties())?;
    writer.write_all(&(trajectory.len() as u32).to_le_bytes())?;
    for point in trajectory {
        write_trajectory_point_body(writer, point)?;
    }
    Ok(())
}

/// Reconstruct a trajectory. Derived fields are read back verbatim rather than
/// recomputed, so the result compares equal to the original.
pub fn read_trajectory<R: Read>(reader: &mut R) -> Result<Trajectory, TrajkitError> {
    let domain = domain_from_tag(read_header(reader, KIND_TRAJECTORY)?)?;
    let object_id = match read_u8(reader)? {
        0 => None,
        1 => Some(read_string(reader)?),
        other => {
            return Err(TrajkitError::CorruptStream(format!(
                "invalid object id flag {other}"
            )))
        }
    };
    let mut uuid_bytes = [0u8; 16];
    fill(reader, &mut uuid_bytes)?;
    let properties = read_property_bag_body(reader)?;
    let count = read_u32(reader)?;
    let mut points = Vec::with_capacity(count.min(u16::MAX as u32) as usize);
    for _ in 0..count {
        let point = read_trajectory_point_body(reader, domain)?;
        if point.domain() != domain {
            return Err(TrajkitError::DomainMismatch {
                expected: domain,
                found: point.domain(),
            });
        }
        points.push(point);
    }
    Ok(Trajectory::from_parts(
        domain,
        object_id,
        points,
        properties,
        Uuid::from_bytes(uuid_bytes),
    ))
}
