//! Adapters that make capability-implementing types plannable.
//!
//! A caller who wants a custom type scanned or encoded has two options:
//! implement [`FromSqlValue`]/[`ToSqlValue`] in full, or implement one of the
//! narrow traits in `crate::capability` and route through the matching `Via*`
//! newtype here. Each bridge decodes the wire bytes into the capability's
//! natural carrier first and then hands the carrier to the destination, so a
//! capability implementor never touches wire bytes directly.
//!
//! [`Option<T>`] is the nullability adapter: `None` on NULL,
//! `Some(T::from_sql_*(...))` otherwise. Nesting composes — `Option<Vec<
//! Option<i32>>>` resolves through ordinary generic dispatch, with no
//! runtime chain construction.
//!
//! For a newtype that should simply behave as the type it wraps, use
//! [`newtype_codec!`](crate::newtype_codec); for one that must *not* be
//! flattened that way, see [`crate::capability::SkipUnderlyingTypePlanner`].

use core::marker::PhantomData;

use crate::capability::{
    BitsScanner, BitsValuer, BoolScanner, BoolValuer, ByteaScanner, ByteaValuer, DateScanner, DateValuer,
    Float64Scanner, Float64Valuer, HstoreScanner, HstoreValuer, InetScanner, InetValuer, Int64Scanner, Int64Valuer,
    IntervalScanner, IntervalValuer, MultirangeScanner, MultirangeValuer, NumericScanner, NumericValuer, RangeScanner,
    RangeValuer, TSVectorScanner, TSVectorValuer, TextScanner, TextValuer, TimeScanner, TimeValuer, TimestampScanner,
    TimestampValuer, TimestamptzScanner, TimestamptzValuer, Uint64Scanner, Uint64Valuer, UuidScanner, UuidValuer,
};
use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::Result;
use crate::format::{FormatCode, IsNull};
use crate::oid::{Oid, oid};
use crate::value::bits::VarBit;
use crate::value::datetime::{PgDate, PgInterval, PgTimestamp, PgTimestamptz};
use crate::value::multirange::Multirange;
use crate::value::network::Inet;
use crate::value::numeric::Numeric;
use crate::value::range::Range;
use crate::value::tsvector::{Lexeme, TsVector};

impl<'a, T> FromSqlValue<'a> for Option<T>
where
    T: FromSqlValue<'a>,
{
    fn from_sql_null(_oid: Oid, _name: Option<&str>, _format: FormatCode) -> Result<Self> {
        Ok(None)
    }

    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        T::from_sql_text(oid, name, bytes).map(Some)
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        T::from_sql_binary(oid, name, bytes).map(Some)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn natural_oid(&self) -> Oid {
        self.as_ref().map_or(0, ToSqlValue::natural_oid)
    }

    fn is_null(&self) -> bool {
        match self {
            Some(v) => v.is_null(),
            None => true,
        }
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        match self {
            Some(v) => v.encode_text(oid, name, buf),
            None => Ok(IsNull::Yes),
        }
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        match self {
            Some(v) => v.encode_binary(oid, name, buf),
            None => Ok(IsNull::Yes),
        }
    }
}

/// Generates [`FromSqlValue`]/[`ToSqlValue`] for a tuple newtype by
/// delegating to the wrapped type's impls, so `struct UserId(i64)` scans and
/// encodes exactly as `i64` does. A newtype with its own capability impls
/// should mark itself [`crate::capability::SkipUnderlyingTypePlanner`] and
/// not use this macro.
#[macro_export]
macro_rules! newtype_codec {
    ($outer:ty, $inner:ty) => {
        impl<'a> $crate::codec::FromSqlValue<'a> for $outer {
            fn from_sql_text(
                oid: $crate::oid::Oid,
                name: Option<&str>,
                bytes: &'a [u8],
            ) -> $crate::error::Result<Self> {
                <$inner as $crate::codec::FromSqlValue<'a>>::from_sql_text(oid, name, bytes).map(Self)
            }

            fn from_sql_binary(
                oid: $crate::oid::Oid,
                name: Option<&str>,
                bytes: &'a [u8],
            ) -> $crate::error::Result<Self> {
                <$inner as $crate::codec::FromSqlValue<'a>>::from_sql_binary(oid, name, bytes).map(Self)
            }
        }

        impl $crate::codec::ToSqlValue for $outer {
            fn natural_oid(&self) -> $crate::oid::Oid {
                $crate::codec::ToSqlValue::natural_oid(&self.0)
            }

            fn is_null(&self) -> bool {
                $crate::codec::ToSqlValue::is_null(&self.0)
            }

            fn encode_text(
                &self,
                oid: $crate::oid::Oid,
                name: Option<&str>,
                buf: &mut Vec<u8>,
            ) -> $crate::error::Result<$crate::format::IsNull> {
                $crate::codec::ToSqlValue::encode_text(&self.0, oid, name, buf)
            }

            fn encode_binary(
                &self,
                oid: $crate::oid::Oid,
                name: Option<&str>,
                buf: &mut Vec<u8>,
            ) -> $crate::error::Result<$crate::format::IsNull> {
                $crate::codec::ToSqlValue::encode_binary(&self.0, oid, name, buf)
            }
        }
    };
}

/// Bridges a scanner/valuer capability pair into the codec contract through
/// the capability's natural carrier type. The carrier does the wire work;
/// the destination only ever sees the decoded value.
macro_rules! via_bridge {
    ($name:ident, $scan_trait:ident :: $scan_method:ident, $value_trait:ident :: $value_method:ident, $natural:ty, $natural_oid_const:expr) => {
        /// Adapts a type that implements
        #[doc = concat!("[`", stringify!($scan_trait), "`]/[`", stringify!($value_trait), "`]")]
        /// into the full codec contract.
        pub struct $name<T>(pub T);

        impl<'a, T> FromSqlValue<'a> for $name<T>
        where
            T: $scan_trait + Default,
        {
            fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
                let natural = <$natural>::from_sql_text(oid, name, bytes)?;
                let mut dst = T::default();
                dst.$scan_method(natural)?;
                Ok($name(dst))
            }

            fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
                let natural = <$natural>::from_sql_binary(oid, name, bytes)?;
                let mut dst = T::default();
                dst.$scan_method(natural)?;
                Ok($name(dst))
            }
        }

        impl<T: $value_trait> ToSqlValue for $name<T> {
            fn natural_oid(&self) -> Oid {
                $natural_oid_const
            }

            fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
                self.0.$value_method()?.encode_text(oid, name, buf)
            }

            fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
                self.0.$value_method()?.encode_binary(oid, name, buf)
            }
        }
    };
}

via_bridge!(ViaInt64, Int64Scanner::scan_int64, Int64Valuer::int64_value, i64, oid::INT8);
via_bridge!(ViaUint64, Uint64Scanner::scan_uint64, Uint64Valuer::uint64_value, u64, oid::XID8);
via_bridge!(ViaFloat64, Float64Scanner::scan_float64, Float64Valuer::float64_value, f64, oid::FLOAT8);
via_bridge!(ViaBool, BoolScanner::scan_bool, BoolValuer::bool_value, bool, oid::BOOL);
via_bridge!(ViaNumeric, NumericScanner::scan_numeric, NumericValuer::numeric_value, Numeric, oid::NUMERIC);
via_bridge!(ViaUuid, UuidScanner::scan_uuid, UuidValuer::uuid_value, uuid::Uuid, oid::UUID);
via_bridge!(ViaTime, TimeScanner::scan_time, TimeValuer::time_value, chrono::NaiveTime, oid::TIME);

/// `TextScanner` borrows its argument rather than taking an owned carrier,
/// so this bridge is written by hand instead of through the macro.
pub struct ViaText<T>(pub T);

impl<'a, T> FromSqlValue<'a> for ViaText<T>
where
    T: TextScanner + Default,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let natural = <&str>::from_sql_text(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_text(natural)?;
        Ok(ViaText(dst))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let natural = <&str>::from_sql_binary(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_text(natural)?;
        Ok(ViaText(dst))
    }
}

impl<T: TextValuer> ToSqlValue for ViaText<T> {
    fn natural_oid(&self) -> Oid {
        oid::TEXT
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.0.text_value()?.encode_text(oid, name, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.0.text_value()?.encode_binary(oid, name, buf)
    }
}

/// `ByteaScanner` also borrows, same deal as [`ViaText`].
pub struct ViaBytea<T>(pub T);

impl<'a, T> FromSqlValue<'a> for ViaBytea<T>
where
    T: ByteaScanner + Default,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let natural = Vec::<u8>::from_sql_text(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_bytea(&natural)?;
        Ok(ViaBytea(dst))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let mut dst = T::default();
        dst.scan_bytea(bytes)?;
        Ok(ViaBytea(dst))
    }
}

impl<T: ByteaValuer> ToSqlValue for ViaBytea<T> {
    fn natural_oid(&self) -> Oid {
        oid::BYTEA
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.0.bytea_value()?.encode_text(oid, name, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.0.bytea_value()?.encode_binary(oid, name, buf)
    }
}

/// The date/timestamp scanner signatures split the carrier into a value plus
/// its infinity marker, so these three bridges unpack/repack the `Pg*`
/// carriers by hand.
pub struct ViaDate<T>(pub T);

impl<'a, T> FromSqlValue<'a> for ViaDate<T>
where
    T: DateScanner + Default,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let carrier = PgDate::from_sql_text(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_date(carrier.value, carrier.infinity)?;
        Ok(ViaDate(dst))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let carrier = PgDate::from_sql_binary(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_date(carrier.value, carrier.infinity)?;
        Ok(ViaDate(dst))
    }
}

impl<T: DateValuer> ToSqlValue for ViaDate<T> {
    fn natural_oid(&self) -> Oid {
        oid::DATE
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let (value, infinity) = self.0.date_value()?;
        PgDate { value, infinity }.encode_text(oid, name, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let (value, infinity) = self.0.date_value()?;
        PgDate { value, infinity }.encode_binary(oid, name, buf)
    }
}

pub struct ViaTimestamp<T>(pub T);

impl<'a, T> FromSqlValue<'a> for ViaTimestamp<T>
where
    T: TimestampScanner + Default,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let carrier = PgTimestamp::from_sql_text(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_timestamp(carrier.value, carrier.infinity)?;
        Ok(ViaTimestamp(dst))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let carrier = PgTimestamp::from_sql_binary(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_timestamp(carrier.value, carrier.infinity)?;
        Ok(ViaTimestamp(dst))
    }
}

impl<T: TimestampValuer> ToSqlValue for ViaTimestamp<T> {
    fn natural_oid(&self) -> Oid {
        oid::TIMESTAMP
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let (value, infinity) = self.0.timestamp_value()?;
        PgTimestamp { value, infinity }.encode_text(oid, name, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let (value, infinity) = self.0.timestamp_value()?;
        PgTimestamp { value, infinity }.encode_binary(oid, name, buf)
    }
}

pub struct ViaTimestamptz<T>(pub T);

impl<'a, T> FromSqlValue<'a> for ViaTimestamptz<T>
where
    T: TimestamptzScanner + Default,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let carrier = PgTimestamptz::from_sql_text(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_timestamptz(carrier.value, carrier.infinity)?;
        Ok(ViaTimestamptz(dst))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let carrier = PgTimestamptz::from_sql_binary(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_timestamptz(carrier.value, carrier.infinity)?;
        Ok(ViaTimestamptz(dst))
    }
}

impl<T: TimestamptzValuer> ToSqlValue for ViaTimestamptz<T> {
    fn natural_oid(&self) -> Oid {
        oid::TIMESTAMPTZ
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let (value, infinity) = self.0.timestamptz_value()?;
        PgTimestamptz { value, infinity }.encode_text(oid, name, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let (value, infinity) = self.0.timestamptz_value()?;
        PgTimestamptz { value, infinity }.encode_binary(oid, name, buf)
    }
}

pub struct ViaInterval<T>(pub T);

impl<'a, T> FromSqlValue<'a> for ViaInterval<T>
where
    T: IntervalScanner + Default,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let carrier = PgInterval::from_sql_text(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_interval(carrier.microseconds, carrier.days, carrier.months)?;
        Ok(ViaInterval(dst))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let carrier = PgInterval::from_sql_binary(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_interval(carrier.microseconds, carrier.days, carrier.months)?;
        Ok(ViaInterval(dst))
    }
}

impl<T: IntervalValuer> ToSqlValue for ViaInterval<T> {
    fn natural_oid(&self) -> Oid {
        oid::INTERVAL
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let (microseconds, days, months) = self.0.interval_value()?;
        PgInterval { months, days, microseconds }.encode_text(oid, name, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let (microseconds, days, months) = self.0.interval_value()?;
        PgInterval { months, days, microseconds }.encode_binary(oid, name, buf)
    }
}

pub struct ViaInet<T>(pub T);

impl<'a, T> FromSqlValue<'a> for ViaInet<T>
where
    T: InetScanner + Default,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let carrier = Inet::from_sql_text(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_inet(carrier.addr, carrier.prefix_len)?;
        Ok(ViaInet(dst))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let carrier = Inet::from_sql_binary(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_inet(carrier.addr, carrier.prefix_len)?;
        Ok(ViaInet(dst))
    }
}

impl<T: InetValuer> ToSqlValue for ViaInet<T> {
    fn natural_oid(&self) -> Oid {
        oid::INET
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let (addr, prefix_len) = self.0.inet_value()?;
        Inet { addr, prefix_len }.encode_text(oid, name, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let (addr, prefix_len) = self.0.inet_value()?;
        Inet { addr, prefix_len }.encode_binary(oid, name, buf)
    }
}

pub struct ViaBits<T>(pub T);

impl<'a, T> FromSqlValue<'a> for ViaBits<T>
where
    T: BitsScanner + Default,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let carrier = VarBit::from_sql_text(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_bits(carrier.len, &carrier.bytes)?;
        Ok(ViaBits(dst))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let carrier = VarBit::from_sql_binary(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_bits(carrier.len, &carrier.bytes)?;
        Ok(ViaBits(dst))
    }
}

impl<T: BitsValuer> ToSqlValue for ViaBits<T> {
    fn natural_oid(&self) -> Oid {
        oid::VARBIT
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let (len, bytes) = self.0.bits_value()?;
        VarBit { len, bytes }.encode_text(oid, name, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let (len, bytes) = self.0.bits_value()?;
        VarBit { len, bytes }.encode_binary(oid, name, buf)
    }
}

pub struct ViaHstore<T>(pub T);

impl<'a, T> FromSqlValue<'a> for ViaHstore<T>
where
    T: HstoreScanner + Default,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let entries = Vec::<(String, Option<String>)>::from_sql_text(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_hstore(entries)?;
        Ok(ViaHstore(dst))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let entries = Vec::<(String, Option<String>)>::from_sql_binary(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_hstore(entries)?;
        Ok(ViaHstore(dst))
    }
}

impl<T: HstoreValuer> ToSqlValue for ViaHstore<T> {
    fn natural_oid(&self) -> Oid {
        oid::HSTORE
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.0.hstore_value()?.encode_text(oid, name, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.0.hstore_value()?.encode_binary(oid, name, buf)
    }
}

pub struct ViaTSVector<T>(pub T);

fn lexemes_to_pairs(vector: TsVector) -> Vec<(String, Vec<(u16, crate::value::tsvector::Weight)>)> {
    vector.lexemes.into_iter().map(|lex| (lex.word, lex.positions)).collect()
}

impl<'a, T> FromSqlValue<'a> for ViaTSVector<T>
where
    T: TSVectorScanner + Default,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let vector = TsVector::from_sql_text(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_tsvector(lexemes_to_pairs(vector))?;
        Ok(ViaTSVector(dst))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let vector = TsVector::from_sql_binary(oid, name, bytes)?;
        let mut dst = T::default();
        dst.scan_tsvector(lexemes_to_pairs(vector))?;
        Ok(ViaTSVector(dst))
    }
}

impl<T: TSVectorValuer> ToSqlValue for ViaTSVector<T> {
    fn natural_oid(&self) -> Oid {
        oid::TSVECTOR
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let lexemes = self.0.tsvector_value()?.into_iter().map(|(word, positions)| Lexeme { word, positions }).collect();
        TsVector { lexemes }.encode_text(oid, name, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let lexemes = self.0.tsvector_value()?.into_iter().map(|(word, positions)| Lexeme { word, positions }).collect();
        TsVector { lexemes }.encode_binary(oid, name, buf)
    }
}

/// The range/multirange capabilities are generic over the bound type, so
/// their bridges carry the bound type as a phantom parameter: `ViaRange<i64,
/// MySpan>` plans `MySpan` as an `int8range` destination.
pub struct ViaRange<T, U>(pub U, PhantomData<T>);

impl<T, U> ViaRange<T, U> {
    pub fn new(inner: U) -> Self {
        ViaRange(inner, PhantomData)
    }
}

impl<'a, T, U> FromSqlValue<'a> for ViaRange<T, U>
where
    T: FromSqlValue<'a>,
    U: RangeScanner<T> + Default,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let range = Range::<T>::from_sql_text(oid, name, bytes)?;
        let mut dst = U::default();
        dst.scan_range(range)?;
        Ok(ViaRange(dst, PhantomData))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let range = Range::<T>::from_sql_binary(oid, name, bytes)?;
        let mut dst = U::default();
        dst.scan_range(range)?;
        Ok(ViaRange(dst, PhantomData))
    }
}

impl<T, U> ToSqlValue for ViaRange<T, U>
where
    T: ToSqlValue,
    U: RangeValuer<T>,
{
    fn natural_oid(&self) -> Oid {
        self.0.range_value().map(|range| range.natural_oid()).unwrap_or(0)
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.0.range_value()?.encode_text(oid, name, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.0.range_value()?.encode_binary(oid, name, buf)
    }
}

pub struct ViaMultirange<T, U>(pub U, PhantomData<T>);

impl<T, U> ViaMultirange<T, U> {
    pub fn new(inner: U) -> Self {
        ViaMultirange(inner, PhantomData)
    }
}

impl<'a, T, U> FromSqlValue<'a> for ViaMultirange<T, U>
where
    T: FromSqlValue<'a>,
    U: MultirangeScanner<T> + Default,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let ranges = Multirange::<T>::from_sql_text(oid, name, bytes)?;
        let mut dst = U::default();
        dst.scan_multirange(ranges)?;
        Ok(ViaMultirange(dst, PhantomData))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let ranges = Multirange::<T>::from_sql_binary(oid, name, bytes)?;
        let mut dst = U::default();
        dst.scan_multirange(ranges)?;
        Ok(ViaMultirange(dst, PhantomData))
    }
}

impl<T, U> ToSqlValue for ViaMultirange<T, U>
where
    T: ToSqlValue,
    U: MultirangeValuer<T>,
{
    fn natural_oid(&self) -> Oid {
        self.0.multirange_value().map(|ranges| ranges.natural_oid()).unwrap_or(0)
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.0.multirange_value()?.encode_text(oid, name, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.0.multirange_value()?.encode_binary(oid, name, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::InfinityModifier;
    use crate::value::range::RangeBound;

    #[test]
    fn option_none_is_null() {
        let value: Option<i32> = None;
        assert!(value.is_null());
        assert_eq!(value.natural_oid(), 0);
    }

    #[test]
    fn option_some_round_trips_binary() {
        let mut buf = Vec::new();
        Some(5i32).encode_binary(oid::INT4, None, &mut buf).unwrap();
        let decoded = Option::<i32>::from_sql_binary(oid::INT4, None, &buf).unwrap();
        assert_eq!(decoded, Some(5));
    }

    #[derive(Default)]
    struct Meters(i64);

    impl Int64Scanner for Meters {
        fn scan_int64(&mut self, value: i64) -> Result<()> {
            self.0 = value;
            Ok(())
        }
    }

    impl Int64Valuer for Meters {
        fn int64_value(&self) -> Result<i64> {
            Ok(self.0)
        }
    }

    #[test]
    fn via_int64_bridges_a_capability_only_type() {
        let mut buf = Vec::new();
        ViaInt64(Meters(42)).encode_binary(oid::INT8, None, &mut buf).unwrap();
        let decoded = ViaInt64::<Meters>::from_sql_binary(oid::INT8, None, &buf).unwrap();
        assert_eq!(decoded.0.0, 42);
    }

    #[derive(Default)]
    struct Deadline {
        at: chrono::NaiveDateTime,
        infinity: InfinityModifier,
    }

    impl TimestampScanner for Deadline {
        fn scan_timestamp(&mut self, value: chrono::NaiveDateTime, infinity: InfinityModifier) -> Result<()> {
            self.at = value;
            self.infinity = infinity;
            Ok(())
        }
    }

    impl TimestampValuer for Deadline {
        fn timestamp_value(&self) -> Result<(chrono::NaiveDateTime, InfinityModifier)> {
            Ok((self.at, self.infinity))
        }
    }

    #[test]
    fn via_timestamp_carries_the_infinity_marker() {
        let deadline = Deadline { at: Default::default(), infinity: InfinityModifier::Infinity };
        let mut buf = Vec::new();
        ViaTimestamp(deadline).encode_binary(oid::TIMESTAMP, None, &mut buf).unwrap();
        let decoded = ViaTimestamp::<Deadline>::from_sql_binary(oid::TIMESTAMP, None, &buf).unwrap();
        assert_eq!(decoded.0.infinity, InfinityModifier::Infinity);
    }

    #[derive(Default)]
    struct IdSpan {
        lower: Option<i64>,
        upper: Option<i64>,
    }

    impl RangeScanner<i64> for IdSpan {
        fn scan_range(&mut self, value: Range<i64>) -> Result<()> {
            self.lower = value.lower.value().copied();
            self.upper = value.upper.value().copied();
            Ok(())
        }
    }

    impl RangeValuer<i64> for IdSpan {
        fn range_value(&self) -> Result<Range<i64>> {
            Ok(Range::new(
                self.lower.map_or(RangeBound::Unbounded, RangeBound::Inclusive),
                self.upper.map_or(RangeBound::Unbounded, RangeBound::Exclusive),
            ))
        }
    }

    #[test]
    fn via_range_bridges_a_generic_range_destination() {
        let span = IdSpan { lower: Some(10), upper: Some(20) };
        let bridged = ViaRange::<i64, _>::new(span);
        assert_eq!(bridged.natural_oid(), crate::oid::oid::INT8RANGE);
        let mut buf = Vec::new();
        bridged.encode_binary(crate::oid::oid::INT8RANGE, None, &mut buf).unwrap();
        let decoded = ViaRange::<i64, IdSpan>::from_sql_binary(crate::oid::oid::INT8RANGE, None, &buf).unwrap();
        assert_eq!(decoded.0.lower, Some(10));
        assert_eq!(decoded.0.upper, Some(20));
    }

    struct OrderId(i64);
    newtype_codec!(OrderId, i64);

    #[test]
    fn newtype_codec_delegates_to_the_wrapped_type() {
        let mut buf = Vec::new();
        OrderId(99).encode_binary(oid::INT8, None, &mut buf).unwrap();
        let decoded = OrderId::from_sql_binary(oid::INT8, None, &buf).unwrap();
        assert_eq!(decoded.0, 99);
    }
}
