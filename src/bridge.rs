//! Bridge to the generic scalar driver interface.
//!
//! Database abstraction layers traffic in a lowest-common-denominator scalar
//! value rather than strongly typed destinations. [`SqlValue`] is that
//! scalar; a type implementing [`SqlScanner`]/[`SqlValuer`] becomes plannable
//! through [`ViaSql`] without naming a concrete PostgreSQL type at all.
//!
//! The encode direction needs a compatibility escape hatch: a text-only
//! driver hands over `SqlValue::Text("42")` for an `int4` column, and the
//! string cannot simply be appended when the column wants binary format.
//! [`transcode_text`] re-parses the text under the target OID's own codec and
//! re-encodes the parsed value. That re-entry is the one place in the crate
//! where an encode can recurse into another encode of caller-controlled
//! shape, so it runs under [`BridgeGuard`], which fails with [`Error::Cycle`]
//! instead of looping when a shape reappears on the stack.

use std::cell::RefCell;

use crate::codec::{self, FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::{Oid, oid};
use crate::value::bits::VarBit;
use crate::value::datetime::{PgDate, PgInterval, PgTimestamp, PgTimestamptz};
use crate::value::network::{Inet, MacAddr};
use crate::value::numeric::Numeric;
use crate::value::special::{PgLsn, Tid};
use crate::value::tsvector::TsVector;

/// The scalar interchange value of the generic driver boundary. `Null` is
/// the absent-value sentinel; everything else is one of the five shapes a
/// driver-level scalar can take.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

/// Receives a [`SqlValue`] decoded from the wire. The driver-side analog of
/// the typed scanner capabilities in `crate::capability`.
pub trait SqlScanner {
    fn scan_sql(&mut self, value: SqlValue) -> Result<()>;
}

/// Produces a [`SqlValue`] to encode.
pub trait SqlValuer {
    fn sql_value(&self) -> Result<SqlValue>;
}

fn rerender_text<'a, T>(oid: Oid, name: Option<&str>, format: FormatCode, bytes: &'a [u8]) -> Result<SqlValue>
where
    T: FromSqlValue<'a> + ToSqlValue,
{
    let value: T = codec::scan(oid, name, format, Some(bytes))?;
    let mut out = Vec::new();
    value.encode_text(oid, name, &mut out)?;
    String::from_utf8(out)
        .map(SqlValue::Text)
        .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), format, "rendered text is not valid UTF-8"))
}

/// Decodes wire bytes into the scalar bridge value for `oid`. Integer and
/// float families map onto `Int`/`Float`; `bytea` maps onto `Bytes`;
/// everything else is rendered as its canonical text. An OID this crate has
/// no codec for falls back to the raw representation: the source string in
/// text format, the raw bytes in binary.
pub fn decode_sql_value(oid: Oid, name: Option<&str>, format: FormatCode, src: Option<&[u8]>) -> Result<SqlValue> {
    let Some(bytes) = src else {
        return Ok(SqlValue::Null);
    };
    match oid {
        oid::BOOL => codec::scan::<bool>(oid, name, format, Some(bytes)).map(SqlValue::Bool),
        oid::INT2 | oid::INT4 | oid::INT8 => codec::scan::<i64>(oid, name, format, Some(bytes)).map(SqlValue::Int),
        oid::OID | oid::XID | oid::CID => {
            codec::scan::<u32>(oid, name, format, Some(bytes)).map(|v| SqlValue::Int(i64::from(v)))
        }
        oid::FLOAT4 => codec::scan::<f32>(oid, name, format, Some(bytes)).map(|v| SqlValue::Float(f64::from(v))),
        oid::FLOAT8 => codec::scan::<f64>(oid, name, format, Some(bytes)).map(SqlValue::Float),
        oid::BYTEA => codec::scan::<Vec<u8>>(oid, name, format, Some(bytes)).map(SqlValue::Bytes),
        oid::TEXT | oid::VARCHAR | oid::BPCHAR | oid::NAME | oid::CHAR | oid::UNKNOWN | oid::JSON => {
            codec::scan::<String>(oid, name, format, Some(bytes)).map(SqlValue::Text)
        }
        oid::NUMERIC => rerender_text::<Numeric>(oid, name, format, bytes),
        oid::UUID => rerender_text::<uuid::Uuid>(oid, name, format, bytes),
        oid::DATE => rerender_text::<PgDate>(oid, name, format, bytes),
        oid::TIME => rerender_text::<chrono::NaiveTime>(oid, name, format, bytes),
        oid::TIMESTAMP => rerender_text::<PgTimestamp>(oid, name, format, bytes),
        oid::TIMESTAMPTZ => rerender_text::<PgTimestamptz>(oid, name, format, bytes),
        oid::INTERVAL => rerender_text::<PgInterval>(oid, name, format, bytes),
        oid::INET | oid::CIDR => rerender_text::<Inet>(oid, name, format, bytes),
        oid::MACADDR | oid::MACADDR8 => rerender_text::<MacAddr>(oid, name, format, bytes),
        oid::BIT | oid::VARBIT => rerender_text::<VarBit>(oid, name, format, bytes),
        oid::TID => rerender_text::<Tid>(oid, name, format, bytes),
        oid::PG_LSN => rerender_text::<PgLsn>(oid, name, format, bytes),
        oid::TSVECTOR => rerender_text::<TsVector>(oid, name, format, bytes),
        oid::JSONB => codec::scan::<codec::json::Json>(oid, name, format, Some(bytes)).map(|v| SqlValue::Text(v.0)),
        _ => match format {
            FormatCode::Text => codec::scan::<String>(oid, name, format, Some(bytes)).map(SqlValue::Text),
            FormatCode::Binary => Ok(SqlValue::Bytes(bytes.to_vec())),
        },
    }
}

fn reencode<'a, T>(oid: Oid, name: Option<&str>, text: &'a str, format: FormatCode, buf: &mut Vec<u8>) -> Result<IsNull>
where
    T: FromSqlValue<'a> + ToSqlValue,
{
    let value = T::from_sql_text(oid, name, text.as_bytes())?;
    codec::encode(&value, oid, name, format, buf)
}

/// Re-parses `text` under the target OID's own codec and encodes the parsed
/// value in `format`. This is the compatibility path for drivers that only
/// carry strings: `"42"` destined for an `int4` column becomes a real
/// four-byte integer, not four ASCII bytes.
pub fn transcode_text(oid: Oid, name: Option<&str>, text: &str, format: FormatCode, buf: &mut Vec<u8>) -> Result<IsNull> {
    match oid {
        oid::BOOL => reencode::<bool>(oid, name, text, format, buf),
        oid::INT2 => reencode::<i16>(oid, name, text, format, buf),
        oid::INT4 => reencode::<i32>(oid, name, text, format, buf),
        oid::INT8 => reencode::<i64>(oid, name, text, format, buf),
        oid::OID | oid::XID | oid::CID => reencode::<u32>(oid, name, text, format, buf),
        oid::XID8 => reencode::<u64>(oid, name, text, format, buf),
        oid::FLOAT4 => reencode::<f32>(oid, name, text, format, buf),
        oid::FLOAT8 => reencode::<f64>(oid, name, text, format, buf),
        oid::NUMERIC => reencode::<Numeric>(oid, name, text, format, buf),
        oid::UUID => reencode::<uuid::Uuid>(oid, name, text, format, buf),
        oid::DATE => reencode::<PgDate>(oid, name, text, format, buf),
        oid::TIME => reencode::<chrono::NaiveTime>(oid, name, text, format, buf),
        oid::TIMESTAMP => reencode::<PgTimestamp>(oid, name, text, format, buf),
        oid::TIMESTAMPTZ => reencode::<PgTimestamptz>(oid, name, text, format, buf),
        oid::INTERVAL => reencode::<PgInterval>(oid, name, text, format, buf),
        oid::BYTEA => reencode::<Vec<u8>>(oid, name, text, format, buf),
        oid::INET | oid::CIDR => reencode::<Inet>(oid, name, text, format, buf),
        oid::MACADDR | oid::MACADDR8 => reencode::<MacAddr>(oid, name, text, format, buf),
        oid::BIT | oid::VARBIT => reencode::<VarBit>(oid, name, text, format, buf),
        oid::TID => reencode::<Tid>(oid, name, text, format, buf),
        oid::PG_LSN => reencode::<PgLsn>(oid, name, text, format, buf),
        oid::JSON | oid::JSONB => reencode::<codec::json::Json>(oid, name, text, format, buf),
        oid::TSVECTOR => reencode::<TsVector>(oid, name, text, format, buf),
        oid::HSTORE => reencode::<Vec<(String, Option<String>)>>(oid, name, text, format, buf),
        _ => codec::encode(&text, oid, name, format, buf),
    }
}

const fn is_textlike(oid: Oid) -> bool {
    matches!(oid, oid::TEXT | oid::VARCHAR | oid::BPCHAR | oid::NAME | oid::CHAR | oid::UNKNOWN)
}

/// Adapts a type that implements [`SqlScanner`]/[`SqlValuer`] into the full
/// codec contract.
pub struct ViaSql<T>(pub T);

impl<'a, T> FromSqlValue<'a> for ViaSql<T>
where
    T: SqlScanner + Default,
{
    fn from_sql_null(_oid: Oid, _name: Option<&str>, _format: FormatCode) -> Result<Self> {
        let mut dst = T::default();
        dst.scan_sql(SqlValue::Null)?;
        Ok(ViaSql(dst))
    }

    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let value = decode_sql_value(oid, name, FormatCode::Text, Some(bytes))?;
        let mut dst = T::default();
        dst.scan_sql(value)?;
        Ok(ViaSql(dst))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let value = decode_sql_value(oid, name, FormatCode::Binary, Some(bytes))?;
        let mut dst = T::default();
        dst.scan_sql(value)?;
        Ok(ViaSql(dst))
    }
}

impl<T: SqlValuer> ViaSql<T> {
    fn encode_scalar(&self, oid: Oid, name: Option<&str>, format: FormatCode, buf: &mut Vec<u8>) -> Result<IsNull> {
        match self.0.sql_value()? {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(v) => codec::encode(&v, oid, name, format, buf),
            SqlValue::Int(v) => codec::encode(&v, oid, name, format, buf),
            SqlValue::Float(v) => codec::encode(&v, oid, name, format, buf),
            SqlValue::Bytes(v) => codec::encode(&v, oid, name, format, buf),
            SqlValue::Text(v) => {
                if is_textlike(oid) {
                    codec::encode(&v, oid, name, format, buf)
                } else {
                    with_guard(core::any::type_name::<T>(), || transcode_text(oid, name, &v, format, buf))
                }
            }
        }
    }
}

impl<T: SqlValuer> ToSqlValue for ViaSql<T> {
    fn natural_oid(&self) -> Oid {
        self.0.sql_value().map_or(0, |value| match value {
            SqlValue::Null => 0,
            SqlValue::Bool(_) => oid::BOOL,
            SqlValue::Int(_) => oid::INT8,
            SqlValue::Float(_) => oid::FLOAT8,
            SqlValue::Text(_) => oid::TEXT,
            SqlValue::Bytes(_) => oid::BYTEA,
        })
    }

    fn is_null(&self) -> bool {
        matches!(self.0.sql_value(), Ok(SqlValue::Null))
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.encode_scalar(oid, name, FormatCode::Text, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.encode_scalar(oid, name, FormatCode::Binary, buf)
    }
}

/// Bounded recursion counter plus a seen-shapes stack guarding every encode
/// path that can re-enter the planner with a caller-controlled shape. Fails
/// with [`Error::Cycle`] once the same shape reappears or the depth bound is
/// exhausted, rather than recursing indefinitely.
pub struct BridgeGuard {
    depth: u32,
    seen: Vec<&'static str>,
}

const MAX_BRIDGE_DEPTH: u32 = 8;

impl Default for BridgeGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeGuard {
    pub fn new() -> Self {
        BridgeGuard { depth: 0, seen: Vec::new() }
    }

    /// Call before re-encoding through `shape`; records the attempt on
    /// success.
    pub fn enter(&mut self, shape: &'static str) -> Result<()> {
        if self.depth >= MAX_BRIDGE_DEPTH || self.seen.contains(&shape) {
            return Err(Error::Cycle(shape));
        }
        self.depth += 1;
        self.seen.push(shape);
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.seen.pop();
    }
}

/// Re-encodes `value` at `target_oid` under an explicit caller-owned guard.
/// Plain top-level `encode` calls never need this; only bridged or composite
/// encoding paths that might recurse do.
pub fn guarded_encode<T: ToSqlValue>(
    value: &T,
    target_oid: Oid,
    name: Option<&str>,
    format: FormatCode,
    buf: &mut Vec<u8>,
    guard: &mut BridgeGuard,
) -> Result<IsNull> {
    guard.enter(core::any::type_name::<T>())?;
    let result = codec::encode(value, target_oid, name, format, buf);
    guard.leave();
    result
}

thread_local! {
    static CALL_STACK: RefCell<BridgeGuard> = RefCell::new(BridgeGuard::new());
}

/// Runs `f` with `shape` pushed onto a call-wide guard shared by every
/// re-encode recursion on this thread, not just the one `f` itself starts.
/// This is what lets a composite field's own `encode_field` — which has no
/// guard of its own to pass down — still be caught if it loops back into
/// encoding another value of the same shape: the stack spans the whole
/// encode, not just one `guarded_encode` call.
pub fn with_guard<R>(shape: &'static str, f: impl FnOnce() -> Result<R>) -> Result<R> {
    CALL_STACK.with(|guard| guard.borrow_mut().enter(shape))?;
    let result = f();
    CALL_STACK.with(|guard| guard.borrow_mut().leave());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_shape_is_a_cycle() {
        let mut guard = BridgeGuard::new();
        guard.enter("widget").unwrap();
        assert!(matches!(guard.enter("widget"), Err(Error::Cycle("widget"))));
    }

    #[test]
    fn depth_is_bounded() {
        let mut guard = BridgeGuard::new();
        for i in 0..MAX_BRIDGE_DEPTH {
            let shape: &'static str = Box::leak(i.to_string().into_boxed_str());
            guard.enter(shape).unwrap();
        }
        let shape: &'static str = Box::leak(MAX_BRIDGE_DEPTH.to_string().into_boxed_str());
        assert!(guard.enter(shape).is_err());
    }

    #[test]
    fn leave_allows_reuse() {
        let mut guard = BridgeGuard::new();
        guard.enter("widget").unwrap();
        guard.leave();
        assert!(guard.enter("widget").is_ok());
    }

    #[test]
    fn with_guard_catches_reentrant_shape() {
        let outer = with_guard("pair", || with_guard("pair", || Ok(())));
        assert!(matches!(outer, Err(Error::Cycle("pair"))));
    }

    #[test]
    fn with_guard_releases_shape_after_returning() {
        with_guard("pair", || Ok::<(), Error>(())).unwrap();
        assert!(with_guard("pair", || Ok::<(), Error>(())).is_ok());
    }

    #[test]
    fn decode_sql_value_maps_integers_onto_int() {
        let value = decode_sql_value(oid::INT4, None, FormatCode::Binary, Some(&42i32.to_be_bytes())).unwrap();
        assert_eq!(value, SqlValue::Int(42));
    }

    #[test]
    fn decode_sql_value_renders_numeric_as_text() {
        let value = decode_sql_value(oid::NUMERIC, None, FormatCode::Text, Some(b"3.14")).unwrap();
        assert_eq!(value, SqlValue::Text("3.14".to_owned()));
    }

    #[test]
    fn decode_sql_value_null_is_the_null_sentinel() {
        let value = decode_sql_value(oid::INT4, None, FormatCode::Binary, None).unwrap();
        assert_eq!(value, SqlValue::Null);
    }

    #[test]
    fn decode_sql_value_unknown_oid_binary_is_raw_bytes() {
        let value = decode_sql_value(987_654, None, FormatCode::Binary, Some(&[1, 2, 3])).unwrap();
        assert_eq!(value, SqlValue::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn transcode_text_parses_under_the_target_codec() {
        let mut buf = Vec::new();
        transcode_text(oid::INT4, None, "42", FormatCode::Binary, &mut buf).unwrap();
        assert_eq!(buf, 42i32.to_be_bytes());
    }

    #[derive(Default)]
    struct Anything(Option<SqlValue>);

    impl SqlScanner for Anything {
        fn scan_sql(&mut self, value: SqlValue) -> Result<()> {
            self.0 = Some(value);
            Ok(())
        }
    }

    impl SqlValuer for Anything {
        fn sql_value(&self) -> Result<SqlValue> {
            Ok(self.0.clone().unwrap_or(SqlValue::Null))
        }
    }

    #[test]
    fn via_sql_scans_a_typed_wire_value_into_the_scalar() {
        let decoded = ViaSql::<Anything>::from_sql_binary(oid::FLOAT8, None, &1.5f64.to_be_bytes()).unwrap();
        assert_eq!(decoded.0.0, Some(SqlValue::Float(1.5)));
    }

    #[test]
    fn via_sql_text_scalar_transcodes_for_a_nontext_target() {
        let source = ViaSql(Anything(Some(SqlValue::Text("7".to_owned()))));
        let mut buf = Vec::new();
        source.encode_binary(oid::INT8, None, &mut buf).unwrap();
        assert_eq!(buf, 7i64.to_be_bytes());
    }

    #[test]
    fn via_sql_null_scalar_encodes_as_null() {
        let source = ViaSql(Anything(Some(SqlValue::Null)));
        let mut buf = Vec::new();
        let is_null = source.encode_binary(oid::INT8, None, &mut buf).unwrap();
        assert_eq!(is_null, IsNull::Yes);
        assert!(buf.is_empty());
    }
}
