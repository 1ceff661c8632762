//! `tid`/`pg_lsn` codecs: the two fixed-layout system locator types.

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::{Oid, oid};
use crate::value::special::{PgLsn, Tid};
use crate::wire;

impl<'a> FromSqlValue<'a> for Tid {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        let inner = text
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected (block,offset)"))?;
        let (block, offset) = inner
            .split_once(',')
            .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected (block,offset)"))?;
        let block: u32 = block.trim().parse().map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "invalid block number"))?;
        let offset: u16 = offset.trim().parse().map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "invalid offset"))?;
        Ok(Tid { block, offset })
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() != 6 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "expected 6 bytes"));
        }
        let block = wire::read_u32(oid, name, &bytes[0..4])?;
        let offset = wire::read_u16(oid, name, &bytes[4..6])?;
        Ok(Tid { block, offset })
    }
}

impl ToSqlValue for Tid {
    fn natural_oid(&self) -> Oid {
        oid::TID
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(format!("({},{})", self.block, self.offset).as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        wire::put_u32(buf, self.block);
        wire::put_u16(buf, self.offset);
        Ok(IsNull::No)
    }
}

impl<'a> FromSqlValue<'a> for PgLsn {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        PgLsn::parse(text).ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not a valid LSN"))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        wire::read_i64(oid, name, bytes).map(|v| PgLsn(v as u64))
    }
}

impl ToSqlValue for PgLsn {
    fn natural_oid(&self) -> Oid {
        oid::PG_LSN
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(self.to_string().as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        wire::put_i64(buf, self.0 as i64);
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tid_text_round_trip() {
        let tid = Tid { block: 7, offset: 3 };
        let mut buf = Vec::new();
        tid.encode_text(oid::TID, None, &mut buf).unwrap();
        assert_eq!(Tid::from_sql_text(oid::TID, None, &buf).unwrap(), tid);
    }

    #[test]
    fn tid_binary_round_trip() {
        let tid = Tid { block: 1, offset: 2 };
        let mut buf = Vec::new();
        tid.encode_binary(oid::TID, None, &mut buf).unwrap();
        assert_eq!(Tid::from_sql_binary(oid::TID, None, &buf).unwrap(), tid);
    }

    #[test]
    fn pg_lsn_binary_round_trip() {
        let lsn = PgLsn(123_456);
        let mut buf = Vec::new();
        lsn.encode_binary(oid::PG_LSN, None, &mut buf).unwrap();
        assert_eq!(PgLsn::from_sql_binary(oid::PG_LSN, None, &buf).unwrap(), lsn);
    }
}
