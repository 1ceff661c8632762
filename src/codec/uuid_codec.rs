//! `uuid` codec: 16 raw bytes in binary, canonical 8-4-4-4-12 hex in text.

use uuid::Uuid;

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::{Oid, oid};

impl<'a> FromSqlValue<'a> for Uuid {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        Uuid::parse_str(text)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not a valid UUID"))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let arr: [u8; 16] = bytes
            .try_into()
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "expected 16 bytes"))?;
        Ok(Uuid::from_bytes(arr))
    }
}

impl ToSqlValue for Uuid {
    fn natural_oid(&self) -> Oid {
        oid::UUID
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(self.hyphenated().to_string().as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(self.as_bytes());
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip() {
        let id = Uuid::from_bytes([0xab; 16]);
        let mut buf = Vec::new();
        id.encode_text(oid::UUID, None, &mut buf).unwrap();
        assert_eq!(Uuid::from_sql_text(oid::UUID, None, &buf).unwrap(), id);
    }

    #[test]
    fn binary_round_trip() {
        let id = Uuid::from_bytes([0x01; 16]);
        let mut buf = Vec::new();
        id.encode_binary(oid::UUID, None, &mut buf).unwrap();
        assert_eq!(Uuid::from_sql_binary(oid::UUID, None, &buf).unwrap(), id);
    }
}
