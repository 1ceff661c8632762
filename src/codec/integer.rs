//! int2/int4/int8/oid codecs: binary decode widens into `i64` then narrows
//! with an overflow check; text decode/encode goes through `str`'s own
//! integer parsing and `to_string`.

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::IsNull;
use crate::oid::{Oid, oid};
use crate::wire;

/// Widens to `i64` first (whichever of int2/int4/int8's wire widths
/// actually arrived), then narrows with an explicit overflow check, so
/// scanning an int4 column's bytes into an `i16` destination overflows
/// instead of misreading the width.
fn narrow<T>(wide: i64) -> Result<T>
where
    T: TryFrom<i64> + 'static,
{
    T::try_from(wide).map_err(|_| Error::overflow("i64", core::any::type_name::<T>()))
}

fn parse_text<T>(oid: Oid, name: Option<&str>, bytes: &[u8]) -> Result<T>
where
    T: TryFrom<i64> + 'static,
{
    let text = core::str::from_utf8(bytes)
        .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), crate::format::FormatCode::Text, "not valid UTF-8"))?;
    let wide: i64 = text
        .trim()
        .parse()
        .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), crate::format::FormatCode::Text, "not a valid integer"))?;
    narrow(wide)
}

fn parse_binary<T>(oid: Oid, name: Option<&str>, bytes: &[u8]) -> Result<T>
where
    T: TryFrom<i64> + 'static,
{
    let wide: i64 = match bytes.len() {
        2 => i64::from(wire::read_i16(oid, name, bytes)?),
        4 => i64::from(wire::read_i32(oid, name, bytes)?),
        8 => wire::read_i64(oid, name, bytes)?,
        _ => {
            return Err(Error::wire_invalid(
                oid,
                name.map(str::to_owned),
                crate::format::FormatCode::Binary,
                "expected a 2, 4 or 8 byte integer",
            ));
        }
    };
    narrow(wide)
}

macro_rules! impl_integer {
    ($ty:ty, $natural_oid:expr, $put:path) => {
        impl<'a> FromSqlValue<'a> for $ty {
            fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
                parse_text(oid, name, bytes)
            }

            fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
                parse_binary(oid, name, bytes)
            }
        }

        impl ToSqlValue for $ty {
            fn natural_oid(&self) -> Oid {
                $natural_oid
            }

            fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
                buf.extend_from_slice(self.to_string().as_bytes());
                Ok(IsNull::No)
            }

            fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
                $put(buf, *self);
                Ok(IsNull::No)
            }
        }
    };
}

impl_integer!(i16, oid::INT2, wire::put_i16);
impl_integer!(i32, oid::INT4, wire::put_i32);
impl_integer!(i64, oid::INT8, wire::put_i64);

/// `oid`, `xid`, `cid` are unsigned 32-bit on the wire but PostgreSQL has no
/// signed/unsigned distinction at the SQL level; `u32` is the idiomatic
/// destination.
impl<'a> FromSqlValue<'a> for u32 {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        parse_text(oid, name, bytes)
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() != 4 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), crate::format::FormatCode::Binary, "expected 4 bytes"));
        }
        wire::read_u32(oid, name, bytes)
    }
}

impl ToSqlValue for u32 {
    fn natural_oid(&self) -> Oid {
        oid::OID
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(self.to_string().as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        wire::put_u32(buf, *self);
        Ok(IsNull::No)
    }
}

/// `xid8` is unsigned 64-bit on the wire, same layout as `int8`; `u64` is
/// its idiomatic destination, matching the `oid`/`u32` treatment above.
impl<'a> FromSqlValue<'a> for u64 {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), crate::format::FormatCode::Text, "not valid UTF-8"))?;
        text.trim().parse().map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), crate::format::FormatCode::Text, "not a valid unsigned integer"))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() != 8 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), crate::format::FormatCode::Binary, "expected 8 bytes"));
        }
        Ok(wire::read_i64(oid, name, bytes)? as u64)
    }
}

impl ToSqlValue for u64 {
    fn natural_oid(&self) -> Oid {
        oid::XID8
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(self.to_string().as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        wire::put_i64(buf, *self as i64);
        Ok(IsNull::No)
    }
}

/// `bool`: one byte on the wire, `t`/`f` in text.
impl<'a> FromSqlValue<'a> for bool {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        match bytes {
            b"t" | b"true" | b"TRUE" | b"1" => Ok(true),
            b"f" | b"false" | b"FALSE" | b"0" => Ok(false),
            _ => Err(Error::wire_invalid(oid, name.map(str::to_owned), crate::format::FormatCode::Text, "not a valid boolean")),
        }
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        match bytes {
            [0] => Ok(false),
            [_] => Ok(true),
            _ => Err(Error::wire_invalid(oid, name.map(str::to_owned), crate::format::FormatCode::Binary, "expected 1 byte")),
        }
    }
}

impl ToSqlValue for bool {
    fn natural_oid(&self) -> Oid {
        oid::BOOL
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.push(if *self { b't' } else { b'f' });
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.push(u8::from(*self));
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip() {
        let mut buf = Vec::new();
        (-7i32).encode_text(oid::INT4, None, &mut buf).unwrap();
        assert_eq!(i32::from_sql_text(oid::INT4, None, &buf).unwrap(), -7);
    }

    #[test]
    fn binary_round_trip() {
        let mut buf = Vec::new();
        42i64.encode_binary(oid::INT8, None, &mut buf).unwrap();
        assert_eq!(i64::from_sql_binary(oid::INT8, None, &buf).unwrap(), 42);
    }

    #[test]
    fn binary_overflow_names_destination_shape() {
        let bytes = 0x7FFF_FFFFi32.to_be_bytes();
        let err = i16::from_sql_binary(oid::INT4, None, &bytes).unwrap_err();
        match err {
            Error::Overflow { to, .. } => assert_eq!(to, core::any::type_name::<i16>()),
            other => panic!("expected Overflow, got {other:?}"),
        }
    }

    #[test]
    fn bool_binary_round_trip() {
        let mut buf = Vec::new();
        true.encode_binary(oid::BOOL, None, &mut buf).unwrap();
        assert!(bool::from_sql_binary(oid::BOOL, None, &buf).unwrap());
    }

    #[test]
    fn u64_binary_round_trip_above_i64_max() {
        let value = u64::MAX - 1;
        let mut buf = Vec::new();
        value.encode_binary(oid::XID8, None, &mut buf).unwrap();
        assert_eq!(u64::from_sql_binary(oid::XID8, None, &buf).unwrap(), value);
    }

    #[test]
    fn u64_text_round_trip() {
        let mut buf = Vec::new();
        42u64.encode_text(oid::XID8, None, &mut buf).unwrap();
        assert_eq!(u64::from_sql_text(oid::XID8, None, &buf).unwrap(), 42);
    }
}
