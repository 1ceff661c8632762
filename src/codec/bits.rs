//! `bit`/`varbit` codec. Binary layout is a 4-byte bit
//! length followed by the minimal big-endian byte packing.

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::{Oid, oid};
use crate::value::bits::VarBit;
use crate::wire;

impl<'a> FromSqlValue<'a> for VarBit {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        if !text.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected a string of 0s and 1s"));
        }
        let len = u32::try_from(text.len()).map_err(|_| Error::overflow("bit string length", "u32"))?;
        let mut packed = vec![0u8; text.len().div_ceil(8)];
        for (i, c) in text.bytes().enumerate() {
            if c == b'1' {
                packed[i / 8] |= 1 << (7 - i % 8);
            }
        }
        Ok(VarBit { len, bytes: packed })
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated bit length"));
        }
        let len = wire::read_u32(oid, name, &bytes[0..4])?;
        let expected_bytes = (usize::try_from(len).unwrap_or(0)).div_ceil(8);
        let body = &bytes[4..];
        if body.len() != expected_bytes {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "byte count does not match bit length"));
        }
        Ok(VarBit { len, bytes: body.to_vec() })
    }
}

impl ToSqlValue for VarBit {
    fn natural_oid(&self) -> Oid {
        oid::VARBIT
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        for i in 0..self.len {
            buf.push(if self.get(i).unwrap_or(false) { b'1' } else { b'0' });
        }
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        wire::put_u32(buf, self.len);
        buf.extend_from_slice(&self.bytes);
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip() {
        let mut buf = Vec::new();
        let bits = VarBit::from_sql_text(oid::VARBIT, None, b"1011").unwrap();
        bits.encode_text(oid::VARBIT, None, &mut buf).unwrap();
        assert_eq!(buf, b"1011");
    }

    #[test]
    fn binary_round_trip() {
        let bits = VarBit::from_sql_text(oid::VARBIT, None, b"10110").unwrap();
        let mut buf = Vec::new();
        bits.encode_binary(oid::VARBIT, None, &mut buf).unwrap();
        let decoded = VarBit::from_sql_binary(oid::VARBIT, None, &buf).unwrap();
        assert_eq!(decoded, bits);
    }
}
