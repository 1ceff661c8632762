//! `json`/`jsonb` codec. Both are carried as opaque text — this crate moves
//! JSON documents, it does not parse them — except for `jsonb`'s one-byte
//! version prefix on the wire, which is stripped/restored transparently.

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::{Oid, oid};

const JSONB_VERSION: u8 = 1;

/// Opaque JSON/JSONB text, tagged so `encode_binary` knows whether to emit
/// the jsonb version byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json(pub String);

impl<'a> FromSqlValue<'a> for Json {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = simdutf8::basic::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        Ok(Json(text.to_owned()))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if oid == oid::JSONB {
            let body = bytes
                .strip_prefix(&[JSONB_VERSION])
                .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "unrecognized jsonb version byte"))?;
            Self::from_sql_text(oid, name, body)
        } else {
            Self::from_sql_text(oid, name, bytes)
        }
    }
}

impl ToSqlValue for Json {
    fn natural_oid(&self) -> Oid {
        oid::JSONB
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(self.0.as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        if oid == oid::JSONB {
            buf.push(JSONB_VERSION);
        }
        buf.extend_from_slice(self.0.as_bytes());
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip() {
        let json = Json(r#"{"a":1}"#.to_owned());
        let mut buf = Vec::new();
        json.encode_text(oid::JSON, None, &mut buf).unwrap();
        assert_eq!(Json::from_sql_text(oid::JSON, None, &buf).unwrap(), json);
    }

    #[test]
    fn jsonb_binary_round_trip_strips_version_byte() {
        let json = Json(r#"{"b":2}"#.to_owned());
        let mut buf = Vec::new();
        json.encode_binary(oid::JSONB, None, &mut buf).unwrap();
        assert_eq!(buf[0], JSONB_VERSION);
        assert_eq!(Json::from_sql_binary(oid::JSONB, None, &buf).unwrap(), json);
    }
}
