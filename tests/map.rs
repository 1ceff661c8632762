//! Registry behavior: registration is observable immediately, per-instance
//! state never leaks between `Map`s, and the configured timestamp limits
//! apply on the scan/encode paths that go through a `Map`.

use chrono::NaiveDate;
use pg_typemap::format::{FormatCode, InfinityModifier};
use pg_typemap::map::{MapConfig, TimestampLimits};
use pg_typemap::oid::oid;
use pg_typemap::value::datetime::PgTimestamp;
use pg_typemap::Map;

#[test]
fn builtin_types_are_preregistered() {
    let map = Map::new();
    let ty = map.type_for_oid(oid::INT4).expect("int4 is a builtin");
    assert_eq!(ty.name, "int4");
    assert_eq!(map.type_for_name("int4").unwrap().oid, oid::INT4);
}

#[test]
fn registering_a_type_makes_it_visible_immediately() {
    let map = Map::new();
    assert!(map.type_for_oid(50_000).is_none());
    map.register_type(pg_typemap::PgType::scalar(50_000, "widget"));
    let ty = map.type_for_oid(50_000).expect("just registered");
    assert_eq!(ty.name, "widget");
}

#[test]
fn default_type_registration_is_observed_by_resolution() {
    let map = Map::new();
    assert!(map.default_oid::<i32>().is_none());
    map.register_default_type::<i32>(oid::INT4);
    assert_eq!(map.default_oid::<i32>(), Some(oid::INT4));
}

#[test]
fn independent_maps_do_not_share_registrations() {
    let a = Map::new();
    let b = Map::new();
    a.register_type(pg_typemap::PgType::scalar(50_001, "only_on_a"));
    assert!(a.type_for_oid(50_001).is_some());
    assert!(b.type_for_oid(50_001).is_none());
}

#[test]
fn preferred_format_is_binary_only_for_known_nonnumeric_types() {
    let map = Map::new();
    assert_eq!(map.preferred_format(oid::NUMERIC), FormatCode::Text);
    assert_eq!(map.preferred_format(oid::INT4), FormatCode::Binary);
    assert_eq!(map.preferred_format(999_999), FormatCode::Text);
}

#[test]
fn preferred_format_tracks_registration() {
    let map = Map::new();
    assert_eq!(map.preferred_format(60_000), FormatCode::Text);
    map.register_type(pg_typemap::PgType::scalar(60_000, "gadget"));
    assert_eq!(map.preferred_format(60_000), FormatCode::Binary);
}

#[test]
fn scan_and_encode_round_trip_through_a_map() {
    let map = Map::new();
    let mut buf = Vec::new();
    map.encode(&42i32, oid::INT4, FormatCode::Binary, &mut buf).unwrap();
    let value: i32 = map.scan(oid::INT4, FormatCode::Binary, Some(&buf)).unwrap();
    assert_eq!(value, 42);
}

#[test]
fn encode_oid_for_falls_back_to_registered_default_when_value_has_none() {
    let map = Map::new();
    // Option<i32>::natural_oid() falls back to 0 when the value is None.
    let value: Option<i32> = None;
    assert!(map.encode_oid_for(&value).is_err());
    map.register_default_type::<Option<i32>>(oid::INT4);
    assert_eq!(map.encode_oid_for(&value).unwrap(), oid::INT4);
}

#[test]
fn jsonb_array_elements_keep_the_version_byte() {
    use pg_typemap::codec::json::Json;
    let map = Map::new();
    let doc = Json(r#"{"a":1}"#.to_owned());
    let mut buf = Vec::new();
    map.encode(&vec![doc.clone()], oid::JSONB_ARRAY, FormatCode::Binary, &mut buf).unwrap();
    // Header element OID is jsonb, and the element payload (after the
    // 20-byte array header and 4-byte length) starts with the version byte.
    assert_eq!(buf[8..12], oid::JSONB.to_be_bytes());
    assert_eq!(buf[24], 1);
    let decoded: Vec<Json> = map.scan(oid::JSONB_ARRAY, FormatCode::Binary, Some(&buf)).unwrap();
    assert_eq!(decoded, vec![doc]);
}

#[test]
fn cidr_array_elements_carry_the_cidr_flag() {
    use pg_typemap::value::network::Inet;
    use pg_typemap::codec::FromSqlValue;
    let net = Inet::from_sql_text(oid::CIDR, None, b"10.0.0.0/8").unwrap();
    let map = Map::new();
    let mut buf = Vec::new();
    map.encode(&vec![net], oid::CIDR_ARRAY, FormatCode::Binary, &mut buf).unwrap();
    // Element layout is {family, bits, is_cidr, len, addr}; is_cidr sits two
    // bytes into the element payload.
    assert_eq!(buf[26], 1);
    let mut inet_buf = Vec::new();
    map.encode(&vec![net], oid::INET_ARRAY, FormatCode::Binary, &mut inet_buf).unwrap();
    assert_eq!(inet_buf[26], 0);
}

#[test]
fn extension_array_elements_resolve_through_the_registry() {
    use pg_typemap::codec::json::Json;
    let map = Map::new();
    map.register_type(pg_typemap::PgType::array_of(90_001, "_widget", oid::JSONB));
    let doc = Json(r#"[2]"#.to_owned());
    let mut buf = Vec::new();
    map.encode(&vec![doc.clone()], 90_001, FormatCode::Binary, &mut buf).unwrap();
    assert_eq!(buf[8..12], oid::JSONB.to_be_bytes());
    assert_eq!(buf[24], 1);
    let decoded: Vec<Json> = map.scan(90_001, FormatCode::Binary, Some(&buf)).unwrap();
    assert_eq!(decoded, vec![doc]);
}

fn bounded_map() -> Map {
    let min = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let max = NaiveDate::from_ymd_opt(2100, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    Map::with_config(MapConfig { timestamp: TimestampLimits { infinity_enabled: true, min, max } })
}

#[test]
fn timestamp_outside_configured_bounds_encodes_as_infinity() {
    let map = bounded_map();
    let beyond = NaiveDate::from_ymd_opt(2200, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let mut buf = Vec::new();
    map.encode_timestamp(
        PgTimestamp { value: beyond, infinity: InfinityModifier::Finite },
        oid::TIMESTAMP,
        FormatCode::Binary,
        &mut buf,
    )
    .unwrap();
    assert_eq!(buf, i64::MAX.to_be_bytes());
}

#[test]
fn infinity_scans_back_as_the_configured_bound() {
    let map = bounded_map();
    let decoded = map
        .scan_timestamp(oid::TIMESTAMP, FormatCode::Binary, Some(&i64::MIN.to_be_bytes()))
        .unwrap();
    assert_eq!(decoded.infinity, InfinityModifier::Finite);
    assert_eq!(decoded.value, map.config().timestamp.min);
}

#[test]
fn default_config_leaves_infinity_untouched() {
    let map = Map::new();
    let decoded = map
        .scan_timestamp(oid::TIMESTAMP, FormatCode::Binary, Some(&i64::MAX.to_be_bytes()))
        .unwrap();
    assert_eq!(decoded.infinity, InfinityModifier::Infinity);
}
