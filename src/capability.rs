//! Capability interfaces: the narrow scan/value traits a caller can
//! implement on an arbitrary in-memory type to make it plannable without
//! writing a full codec. Each pair corresponds to one PostgreSQL type family
//! and is consumed by exactly one bridge in `crate::wrapper`.
//!
//! A type that implements one of these, but not [`crate::codec::FromSqlValue`]
//! / [`crate::codec::ToSqlValue`] directly, becomes plannable through the
//! matching wrapper newtype in `crate::wrapper` (e.g. [`crate::wrapper::ViaInt64`]).

use crate::error::Result;
use crate::format::InfinityModifier;
use crate::value::numeric::Numeric;

pub trait Int64Scanner {
    fn scan_int64(&mut self, value: i64) -> Result<()>;
}
pub trait Int64Valuer {
    fn int64_value(&self) -> Result<i64>;
}

pub trait Uint64Scanner {
    fn scan_uint64(&mut self, value: u64) -> Result<()>;
}
pub trait Uint64Valuer {
    fn uint64_value(&self) -> Result<u64>;
}

pub trait Float64Scanner {
    fn scan_float64(&mut self, value: f64) -> Result<()>;
}
pub trait Float64Valuer {
    fn float64_value(&self) -> Result<f64>;
}

pub trait TextScanner {
    fn scan_text(&mut self, value: &str) -> Result<()>;
}
pub trait TextValuer {
    fn text_value(&self) -> Result<String>;
}

pub trait BoolScanner {
    fn scan_bool(&mut self, value: bool) -> Result<()>;
}
pub trait BoolValuer {
    fn bool_value(&self) -> Result<bool>;
}

pub trait ByteaScanner {
    fn scan_bytea(&mut self, value: &[u8]) -> Result<()>;
}
pub trait ByteaValuer {
    fn bytea_value(&self) -> Result<Vec<u8>>;
}

pub trait NumericScanner {
    fn scan_numeric(&mut self, value: Numeric) -> Result<()>;
}
pub trait NumericValuer {
    fn numeric_value(&self) -> Result<Numeric>;
}

pub trait UuidScanner {
    fn scan_uuid(&mut self, value: uuid::Uuid) -> Result<()>;
}
pub trait UuidValuer {
    fn uuid_value(&self) -> Result<uuid::Uuid>;
}

pub trait DateScanner {
    fn scan_date(&mut self, value: chrono::NaiveDate, infinity: InfinityModifier) -> Result<()>;
}
pub trait DateValuer {
    fn date_value(&self) -> Result<(chrono::NaiveDate, InfinityModifier)>;
}

pub trait TimeScanner {
    fn scan_time(&mut self, value: chrono::NaiveTime) -> Result<()>;
}
pub trait TimeValuer {
    fn time_value(&self) -> Result<chrono::NaiveTime>;
}

pub trait TimestampScanner {
    fn scan_timestamp(
        &mut self,
        value: chrono::NaiveDateTime,
        infinity: InfinityModifier,
    ) -> Result<()>;
}
pub trait TimestampValuer {
    fn timestamp_value(&self) -> Result<(chrono::NaiveDateTime, InfinityModifier)>;
}

pub trait TimestamptzScanner {
    fn scan_timestamptz(
        &mut self,
        value: chrono::DateTime<chrono::Utc>,
        infinity: InfinityModifier,
    ) -> Result<()>;
}
pub trait TimestamptzValuer {
    fn timestamptz_value(&self) -> Result<(chrono::DateTime<chrono::Utc>, InfinityModifier)>;
}

/// Microseconds, days, months: the three binary interval fields.
pub trait IntervalScanner {
    fn scan_interval(&mut self, micros: i64, days: i32, months: i32) -> Result<()>;
}
pub trait IntervalValuer {
    fn interval_value(&self) -> Result<(i64, i32, i32)>;
}

pub trait InetScanner {
    fn scan_inet(&mut self, addr: std::net::IpAddr, prefix_len: u8) -> Result<()>;
}
pub trait InetValuer {
    fn inet_value(&self) -> Result<(std::net::IpAddr, u8)>;
}

pub trait BitsScanner {
    fn scan_bits(&mut self, bit_len: u32, bytes: &[u8]) -> Result<()>;
}
pub trait BitsValuer {
    fn bits_value(&self) -> Result<(u32, Vec<u8>)>;
}

pub trait HstoreScanner {
    fn scan_hstore(&mut self, entries: Vec<(String, Option<String>)>) -> Result<()>;
}
pub trait HstoreValuer {
    fn hstore_value(&self) -> Result<Vec<(String, Option<String>)>>;
}

pub trait TSVectorScanner {
    fn scan_tsvector(
        &mut self,
        lexemes: Vec<(String, Vec<(u16, crate::value::tsvector::Weight)>)>,
    ) -> Result<()>;
}
pub trait TSVectorValuer {
    fn tsvector_value(&self) -> Result<Vec<(String, Vec<(u16, crate::value::tsvector::Weight)>)>>;
}

/// Positional field access into a composite (record) value, by zero-based index.
pub trait CompositeIndexScanner {
    fn scan_field(&mut self, index: usize, oid: crate::oid::Oid, raw: Option<&[u8]>) -> Result<()>;
}
pub trait CompositeIndexGetter {
    fn field_count(&self) -> usize;
    fn field_oid(&self, index: usize) -> crate::oid::Oid;
    fn encode_field(&self, index: usize, buf: &mut Vec<u8>) -> Result<crate::format::IsNull>;
}

/// A range over `T`: bounds plus emptiness, generic over the element type
/// so one pair of traits covers `int4range`, `numrange`, `tsrange`, and so
/// on.
pub trait RangeScanner<T> {
    fn scan_range(&mut self, value: crate::value::range::Range<T>) -> Result<()>;
}
pub trait RangeValuer<T> {
    fn range_value(&self) -> Result<crate::value::range::Range<T>>;
}

/// A multirange over `T`: an ordered set of disjoint, non-adjacent ranges.
pub trait MultirangeScanner<T> {
    fn scan_multirange(&mut self, value: crate::value::multirange::Multirange<T>) -> Result<()>;
}
pub trait MultirangeValuer<T> {
    fn multirange_value(&self) -> Result<crate::value::multirange::Multirange<T>>;
}

/// Declares that a newtype must resolve through its own codec or capability
/// impls rather than behaving as the primitive it wraps. Such a type should
/// never be given delegating impls via
/// [`newtype_codec!`](crate::newtype_codec); the marker documents that
/// decision at the type definition, where the next reader will look first.
pub trait SkipUnderlyingTypePlanner {}
