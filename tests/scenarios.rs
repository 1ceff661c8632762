//! End-to-end scan/encode behavior across type families: exact wire bytes,
//! overflow and NULL handling, canonicalization, and the boundary values of
//! each representation.

use pg_typemap::codec::{FromSqlValue, ToSqlValue};
use pg_typemap::format::{FormatCode, InfinityModifier};
use pg_typemap::oid::oid;
use pg_typemap::{Error, Map, Planner};

#[test]
fn int4_binary_scan_reads_big_endian() {
    let value: i32 = i32::from_sql_binary(oid::INT4, None, &[0x00, 0x00, 0x00, 0x2A]).unwrap();
    assert_eq!(value, 42);
}

#[test]
fn int4_bytes_into_i16_overflow_names_the_destination_shape() {
    let err = i16::from_sql_binary(oid::INT4, None, &[0x7F, 0xFF, 0xFF, 0xFF]).unwrap_err();
    match err {
        Error::Overflow { to, .. } => assert_eq!(to, "i16"),
        other => panic!("expected Overflow, got {other:?}"),
    }
}

#[test]
fn numeric_text_scan_splits_coefficient_and_exponent() {
    use pg_typemap::value::numeric::Numeric;
    let value = Numeric::from_sql_text(oid::NUMERIC, None, b"3.14").unwrap();
    assert_eq!(value.finite(), Some((false, "314", -2)));
}

#[test]
fn tsvector_binary_encode_sorts_and_deduplicates() {
    use pg_typemap::value::tsvector::{Lexeme, TsVector, Weight};
    let vector = TsVector {
        lexemes: vec![
            Lexeme { word: "zebra".to_owned(), positions: vec![] },
            Lexeme {
                word: "apple".to_owned(),
                positions: vec![(5, Weight::D), (3, Weight::B), (5, Weight::D), (1, Weight::A)],
            },
        ],
    };
    let mut buf = Vec::new();
    vector.encode_binary(oid::TSVECTOR, None, &mut buf).unwrap();
    let decoded = TsVector::from_sql_binary(oid::TSVECTOR, None, &buf).unwrap();
    assert_eq!(decoded.lexemes.len(), 2);
    assert_eq!(decoded.lexemes[0].word, "apple");
    assert_eq!(decoded.lexemes[0].positions, vec![(1, Weight::A), (3, Weight::B), (5, Weight::D)]);
    assert_eq!(decoded.lexemes[1].word, "zebra");
    assert!(decoded.lexemes[1].positions.is_empty());
}

#[test]
fn inet_binary_scan_reads_the_network_header() {
    use pg_typemap::value::network::Inet;
    use std::net::{IpAddr, Ipv4Addr};
    let decoded = Inet::from_sql_binary(oid::INET, None, &[0x02, 0x18, 0x00, 0x04, 0xC0, 0xA8, 0x01, 0x10]).unwrap();
    assert_eq!(decoded.addr, IpAddr::V4(Ipv4Addr::new(192, 168, 1, 16)));
    assert_eq!(decoded.prefix_len, 24);
}

#[test]
fn repeated_plan_scan_is_idempotent() {
    let map = Map::new();
    map.plan_scan::<i32>(oid::INT4, FormatCode::Binary).unwrap();
    map.plan_scan::<i32>(oid::INT4, FormatCode::Binary).unwrap();
    let value: i32 = map.scan(oid::INT4, FormatCode::Binary, Some(&7i32.to_be_bytes())).unwrap();
    assert_eq!(value, 7);
}

#[test]
fn null_symmetry_option_round_trips_none() {
    let value: Option<i32> = None;
    let mut buf = Vec::new();
    let is_null = pg_typemap::codec::encode(&value, oid::INT4, None, FormatCode::Binary, &mut buf).unwrap();
    assert_eq!(is_null, pg_typemap::IsNull::Yes);
    let decoded: Option<i32> = pg_typemap::codec::scan(oid::INT4, None, FormatCode::Binary, None).unwrap();
    assert_eq!(decoded, None);
}

#[test]
fn null_symmetry_non_nullable_destination_rejects_null() {
    let result: Result<i32, Error> = pg_typemap::codec::scan(oid::INT4, None, FormatCode::Binary, None);
    assert!(matches!(result, Err(Error::NullAssignment { .. })));
}

#[test]
fn format_agreement_text_and_binary_decode_the_same_value() {
    let from_text: i32 = i32::from_sql_text(oid::INT4, None, b"42").unwrap();
    let from_binary: i32 = i32::from_sql_binary(oid::INT4, None, &42i32.to_be_bytes()).unwrap();
    assert_eq!(from_text, from_binary);
}

#[test]
fn wrapper_idempotence_nested_option_vec_round_trips() {
    let value: Vec<Option<i32>> = vec![Some(1), None, Some(3)];
    let mut buf = Vec::new();
    value.encode_binary(oid::INT4_ARRAY, None, &mut buf).unwrap();
    let decoded: Vec<Option<i32>> = Vec::from_sql_binary(oid::INT4_ARRAY, None, &buf).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn planner_termination_plan_not_found_does_not_loop_forever() {
    let map = Map::new();
    let planner = Planner::new(&map);
    let result = planner.scan_oid::<i32>(None);
    assert!(matches!(result, Err(Error::PlanNotFound { .. })));
}

#[test]
fn timestamp_infinity_round_trips_through_the_carrier() {
    use pg_typemap::value::datetime::PgTimestamp;
    let original = PgTimestamp { value: Default::default(), infinity: InfinityModifier::Infinity };
    let mut buf = Vec::new();
    original.encode_binary(oid::TIMESTAMP, None, &mut buf).unwrap();
    let decoded = PgTimestamp::from_sql_binary(oid::TIMESTAMP, None, &buf).unwrap();
    assert_eq!(decoded.infinity, InfinityModifier::Infinity);
}

#[test]
fn plain_naive_datetime_rejects_infinity_sentinel() {
    use chrono::NaiveDateTime;
    let err = NaiveDateTime::from_sql_binary(oid::TIMESTAMP, None, &i64::MAX.to_be_bytes()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedInfinity { .. }));
}

#[test]
fn ragged_two_dimensional_array_is_rejected_on_encode() {
    use pg_typemap::value::array::Array2;
    let ragged = Array2::new(vec![vec![1i32, 2], vec![3]]);
    let mut buf = Vec::new();
    let err = ragged.encode_binary(oid::INT4_ARRAY, None, &mut buf).unwrap_err();
    assert!(matches!(err, Error::RangeViolation(_)));
}

#[test]
fn tid_at_the_top_of_its_value_space_round_trips() {
    use pg_typemap::value::special::Tid;
    let tid = Tid { block: u32::MAX, offset: u16::MAX };
    let mut binary = Vec::new();
    tid.encode_binary(oid::TID, None, &mut binary).unwrap();
    assert_eq!(Tid::from_sql_binary(oid::TID, None, &binary).unwrap(), tid);
    let mut text = Vec::new();
    tid.encode_text(oid::TID, None, &mut text).unwrap();
    assert_eq!(Tid::from_sql_text(oid::TID, None, &text).unwrap(), tid);
}

#[test]
fn tsvector_position_16383_is_accepted_and_16384_rejected() {
    use pg_typemap::value::tsvector::{Lexeme, TsVector, Weight};
    let at_limit = TsVector { lexemes: vec![Lexeme { word: "edge".to_owned(), positions: vec![(16383, Weight::D)] }] };
    let mut buf = Vec::new();
    at_limit.encode_binary(oid::TSVECTOR, None, &mut buf).unwrap();
    let decoded = TsVector::from_sql_binary(oid::TSVECTOR, None, &buf).unwrap();
    assert_eq!(decoded.lexemes[0].positions, vec![(16383, Weight::D)]);

    let past_limit = TsVector { lexemes: vec![Lexeme { word: "edge".to_owned(), positions: vec![(16384, Weight::D)] }] };
    let mut buf = Vec::new();
    assert!(matches!(past_limit.encode_binary(oid::TSVECTOR, None, &mut buf), Err(Error::RangeViolation(_))));
}

#[test]
fn hstore_empty_string_value_is_distinct_from_absent_value() {
    type Entries = Vec<(String, Option<String>)>;
    let entries: Entries = vec![("present".to_owned(), Some(String::new())), ("absent".to_owned(), None)];
    let mut buf = Vec::new();
    entries.encode_binary(oid::HSTORE, None, &mut buf).unwrap();
    let decoded = Entries::from_sql_binary(oid::HSTORE, None, &buf).unwrap();
    assert_eq!(decoded[0].1.as_deref(), Some(""));
    assert_eq!(decoded[1].1, None);
}

#[test]
fn empty_array_and_empty_range_round_trip() {
    use pg_typemap::value::range::Range;
    let empty_vec: Vec<i32> = Vec::new();
    let mut buf = Vec::new();
    empty_vec.encode_binary(oid::INT4_ARRAY, None, &mut buf).unwrap();
    let decoded: Vec<i32> = Vec::from_sql_binary(oid::INT4_ARRAY, None, &buf).unwrap();
    assert!(decoded.is_empty());

    let empty_range: Range<i32> = Range::empty();
    let mut buf = Vec::new();
    empty_range.encode_text(oid::INT4RANGE, None, &mut buf).unwrap();
    assert_eq!(buf, b"empty");
    let decoded = Range::<i32>::from_sql_text(oid::INT4RANGE, None, &buf).unwrap();
    assert!(decoded.empty);
}
