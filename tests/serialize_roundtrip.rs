mod common;

use common::{cartesian2d_trajectory, terrestrial_trajectory};
use trajkit::io::binary::{
    read_trajectory, read_trajectory_point, write_trajectory, write_trajectory_point,
};
use trajkit::properties::PropertyValue;
use trajkit::time::Timestamp;

#[test]
fn trajectory_round_trip_is_equal() {
    let mut trajectory = terrestrial_trajectory(
        "FLIGHT1",
        &[(10.0, 45.0), (10.5, 45.2), (11.0, 45.5), (11.5, 45.6)],
    );
    trajectory.set_property("airline", PropertyValue::String("EX".to_string()));
    trajectory.set_property("leg", PropertyValue::Integer(2));

    let mut buffer = Vec::new();
    write_trajectory(&mut buffer, &trajectory).unwrap();
    let back = read_trajectory(&mut buffer.as_slice()).unwrap();

    // Equality covers domain, id, UUID, properties, points, and derived fields.
    assert_eq!(back, trajectory);
    assert_eq!(back.uuid(), trajectory.uuid());
    assert_eq!(
        back.last().unwrap().cumulative_arc_length(),
        trajectory.last().unwrap().cumulative_arc_length()
    );
}

#[test]
fn point_round_trip_preserves_every_property_kind() {
    let trajectory = cartesian2d_trajectory("OBJ1", &[(1.5, -2.25)]);
    let mut point = trajectory.first().unwrap().clone();
    point.set_property("speed", PropertyValue::Real(123.25));
    point.set_property("count", PropertyValue::Integer(-9));
    point.set_property("label", PropertyValue::String("a\tb\"c".to_string()));
    point.set_property(
        "seen",
        PropertyValue::Moment(Timestamp::from_gregorian_utc(2021, 3, 4, 5, 6, 7)),
    );

    let mut buffer = Vec::new();
    write_trajectory_point(&mut buffer, &point).unwrap();
    let back = read_trajectory_point(&mut buffer.as_slice()).unwrap();
    assert_eq!(back, point);
}

#[test]
fn null_properties_come_back_as_null_tags() {
    // Null is never equal to Null, so the round trip is checked by tag.
    let trajectory = cartesian2d_trajectory("OBJ1", &[(0.0, 0.0)]);
    let mut point = trajectory.first().unwrap().clone();
    point.set_property("gap", PropertyValue::Null);

    let mut buffer = Vec::new();
    write_trajectory_point(&mut buffer, &point).unwrap();
    let back = read_trajectory_point(&mut buffer.as_slice()).unwrap();

    assert!(back.properties().get("gap").unwrap().is_null());
    assert_ne!(back, point);
}

#[test]
fn serialized_streams_are_stable_bytes() {
    let trajectory = cartesian2d_trajectory("OBJ1", &[(0.0, 0.0), (3.0, 4.0)]);
    let mut first = Vec::new();
    let mut second = Vec::new();
    write_trajectory(&mut first, &trajectory).unwrap();
    write_trajectory(&mut second, &trajectory).unwrap();
    assert_eq!(first, second);
}
