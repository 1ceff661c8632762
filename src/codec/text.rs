//! text/varchar/bpchar/name/char codecs. Text and binary formats are both
//! the raw UTF-8 bytes for this family; the only work is validation.

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::{Oid, oid};

fn validate_utf8<'a>(oid: Oid, name: Option<&str>, format: FormatCode, bytes: &'a [u8]) -> Result<&'a str> {
    simdutf8::basic::from_utf8(bytes)
        .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), format, "not valid UTF-8"))
}

impl<'a> FromSqlValue<'a> for &'a str {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        validate_utf8(oid, name, FormatCode::Text, bytes)
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        validate_utf8(oid, name, FormatCode::Binary, bytes)
    }
}

impl ToSqlValue for &str {
    fn natural_oid(&self) -> Oid {
        oid::TEXT
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(self.as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.encode_text(oid, name, buf)
    }
}

impl<'a> FromSqlValue<'a> for String {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        <&str>::from_sql_text(oid, name, bytes).map(str::to_owned)
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        <&str>::from_sql_binary(oid, name, bytes).map(str::to_owned)
    }
}

impl ToSqlValue for String {
    fn natural_oid(&self) -> Oid {
        oid::TEXT
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.as_str().encode_text(oid, name, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.as_str().encode_binary(oid, name, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_text_round_trip() {
        let mut buf = Vec::new();
        "hello".encode_text(oid::TEXT, None, &mut buf).unwrap();
        assert_eq!(<&str>::from_sql_text(oid::TEXT, None, &buf).unwrap(), "hello");
    }

    #[test]
    fn string_binary_round_trip() {
        let mut buf = Vec::new();
        "world".to_owned().encode_binary(oid::TEXT, None, &mut buf).unwrap();
        assert_eq!(String::from_sql_binary(oid::TEXT, None, &buf).unwrap(), "world");
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = <&str>::from_sql_text(oid::TEXT, None, &[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::WireFormatInvalid { .. }));
    }
}
