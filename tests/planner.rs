//! Planner resolution: explicit OIDs win, registered defaults fill in,
//! NULL scans probe a bounded candidate set, and the scalar driver bridge
//! transcodes text for non-text targets without looping.

use pg_typemap::bridge::{SqlScanner, SqlValue, SqlValuer, ViaSql};
use pg_typemap::codec::ToSqlValue;
use pg_typemap::error::Result;
use pg_typemap::format::FormatCode;
use pg_typemap::oid::oid;
use pg_typemap::{Error, Map, Planner};

#[rstest::fixture]
fn map() -> Map {
    let map = Map::new();
    map.register_default_type::<i32>(oid::INT4);
    map.register_default_type::<String>(oid::TEXT);
    map
}

#[rstest::rstest]
fn scan_uses_the_registered_default_oid(map: Map) {
    let planner = Planner::new(&map);
    let value: i32 = planner.scan(None, FormatCode::Binary, Some(&9i32.to_be_bytes())).unwrap();
    assert_eq!(value, 9);
}

#[rstest::rstest]
fn explicit_oid_beats_the_registered_default(map: Map) {
    let planner = Planner::new(&map);
    assert_eq!(planner.scan_oid::<i32>(Some(oid::INT2)).unwrap(), oid::INT2);
}

#[rstest::rstest]
fn encode_resolves_a_container_to_its_own_array_oid(map: Map) {
    let planner = Planner::new(&map);
    assert_eq!(planner.encode_oid(&vec![1i32, 2, 3], None).unwrap(), oid::INT4_ARRAY);
}

#[rstest::rstest]
fn encode_prefers_the_value_natural_oid(map: Map) {
    let planner = Planner::new(&map);
    let mut buf = Vec::new();
    planner.encode(&7i64, None, FormatCode::Binary, &mut buf).unwrap();
    assert_eq!(buf, 7i64.to_be_bytes());
    assert_eq!(planner.encode_oid(&7i64, None).unwrap(), oid::INT8);
}

#[rstest::rstest]
fn null_scan_probes_candidates_in_order(map: Map) {
    let planner = Planner::new(&map);
    // The first candidate is not registered, so the probe falls through to int4.
    let value: Option<i32> = planner.scan_null_among(&[999_999, oid::INT4], FormatCode::Binary).unwrap();
    assert_eq!(value, None);
}

#[rstest::rstest]
fn null_scan_with_no_registered_candidate_is_plan_not_found(map: Map) {
    let planner = Planner::new(&map);
    let result: std::result::Result<Option<i32>, Error> = planner.scan_null_among(&[999_998, 999_999], FormatCode::Binary);
    assert!(matches!(result, Err(Error::PlanNotFound { .. })));
}

#[rstest::rstest]
fn plans_survive_unrelated_registrations(map: Map) {
    let first: i32 = map.scan(oid::INT4, FormatCode::Binary, Some(&5i32.to_be_bytes())).unwrap();
    map.register_type(pg_typemap::PgType::scalar(70_000, "sprocket"));
    let second: i32 = map.scan(oid::INT4, FormatCode::Binary, Some(&5i32.to_be_bytes())).unwrap();
    assert_eq!(first, second);
}

#[derive(Default)]
struct DriverCell(Option<SqlValue>);

impl SqlScanner for DriverCell {
    fn scan_sql(&mut self, value: SqlValue) -> Result<()> {
        self.0 = Some(value);
        Ok(())
    }
}

impl SqlValuer for DriverCell {
    fn sql_value(&self) -> Result<SqlValue> {
        Ok(self.0.clone().unwrap_or(SqlValue::Null))
    }
}

#[rstest::rstest]
fn sql_bridge_scans_typed_bytes_into_the_scalar(map: Map) {
    let decoded: ViaSql<DriverCell> = map.scan(oid::INT4, FormatCode::Binary, Some(&31i32.to_be_bytes())).unwrap();
    assert_eq!(decoded.0.0, Some(SqlValue::Int(31)));
}

#[rstest::rstest]
fn sql_bridge_hands_null_through_as_the_sentinel(map: Map) {
    let decoded: ViaSql<DriverCell> = map.scan(oid::INT4, FormatCode::Binary, None).unwrap();
    assert_eq!(decoded.0.0, Some(SqlValue::Null));
}

#[rstest::rstest]
fn sql_bridge_transcodes_text_for_a_numeric_target(map: Map) {
    let source = ViaSql(DriverCell(Some(SqlValue::Text("12.5".to_owned()))));
    let mut buf = Vec::new();
    map.encode(&source, oid::NUMERIC, FormatCode::Text, &mut buf).unwrap();
    assert_eq!(buf, b"12.5");
}

#[rstest::rstest]
fn sql_bridge_text_for_a_text_target_passes_straight_through(map: Map) {
    let source = ViaSql(DriverCell(Some(SqlValue::Text("plain".to_owned()))));
    let mut buf = Vec::new();
    map.encode(&source, oid::TEXT, FormatCode::Binary, &mut buf).unwrap();
    assert_eq!(buf, b"plain");
}

#[test]
fn sql_bridge_natural_oid_follows_the_scalar_shape() {
    assert_eq!(ViaSql(DriverCell(Some(SqlValue::Bool(true)))).natural_oid(), oid::BOOL);
    assert_eq!(ViaSql(DriverCell(Some(SqlValue::Bytes(vec![1])))).natural_oid(), oid::BYTEA);
    assert_eq!(ViaSql(DriverCell(None)).natural_oid(), 0);
}
