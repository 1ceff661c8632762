//! float4/float8 codecs: IEEE-754 big-endian in binary, decimal literals
//! plus the `NaN`/`Infinity`/`-Infinity` special values in text.

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::{Oid, oid};
use crate::wire;

fn parse_float_text(oid: Oid, name: Option<&str>, bytes: &[u8]) -> Result<f64> {
    let text = core::str::from_utf8(bytes)
        .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?
        .trim();
    match text {
        "NaN" => Ok(f64::NAN),
        "Infinity" => Ok(f64::INFINITY),
        "-Infinity" => Ok(f64::NEG_INFINITY),
        _ => text
            .parse()
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not a valid float")),
    }
}

fn float_text(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value.is_infinite() {
        if value.is_sign_negative() { "-Infinity".to_owned() } else { "Infinity".to_owned() }
    } else {
        value.to_string()
    }
}

impl<'a> FromSqlValue<'a> for f32 {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        Ok(parse_float_text(oid, name, bytes)? as f32)
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() != 4 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "expected 4 bytes"));
        }
        wire::read_f32(oid, name, bytes)
    }
}

impl ToSqlValue for f32 {
    fn natural_oid(&self) -> Oid {
        oid::FLOAT4
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(float_text(f64::from(*self)).as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        wire::put_f32(buf, *self);
        Ok(IsNull::No)
    }
}

impl<'a> FromSqlValue<'a> for f64 {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        parse_float_text(oid, name, bytes)
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() != 8 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "expected 8 bytes"));
        }
        wire::read_f64(oid, name, bytes)
    }
}

impl ToSqlValue for f64 {
    fn natural_oid(&self) -> Oid {
        oid::FLOAT8
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(float_text(*self).as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        wire::put_f64(buf, *self);
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip() {
        let mut buf = Vec::new();
        1.5f64.encode_text(oid::FLOAT8, None, &mut buf).unwrap();
        assert_eq!(f64::from_sql_text(oid::FLOAT8, None, &buf).unwrap(), 1.5);
    }

    #[test]
    fn binary_round_trip() {
        let mut buf = Vec::new();
        (-2.25f32).encode_binary(oid::FLOAT4, None, &mut buf).unwrap();
        assert_eq!(f32::from_sql_binary(oid::FLOAT4, None, &buf).unwrap(), -2.25);
    }

    #[test]
    fn infinity_text_round_trips() {
        let mut buf = Vec::new();
        f64::INFINITY.encode_text(oid::FLOAT8, None, &mut buf).unwrap();
        assert_eq!(buf, b"Infinity");
        assert!(f64::from_sql_text(oid::FLOAT8, None, &buf).unwrap().is_infinite());
    }
}
