//! `bytea` codec: binary format is the raw bytes; text decode accepts both
//! the `\x`-prefixed hex form and the legacy octal escape form, and text
//! encode always produces hex.

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::{Oid, oid};

fn hex_digit(oid: Oid, name: Option<&str>, b: u8) -> Result<u8> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "invalid hex digit in bytea")),
    }
}

fn decode_hex(oid: Oid, name: Option<&str>, hex: &[u8]) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "odd number of hex digits"));
    }
    hex.chunks_exact(2)
        .map(|pair| Ok((hex_digit(oid, name, pair[0])? << 4) | hex_digit(oid, name, pair[1])?))
        .collect()
}

/// The pre-9.0 `bytea_output = 'escape'` format: backslash doubles itself,
/// non-printable bytes appear as `\nnn` octal, everything else is literal.
fn decode_escape(oid: Oid, name: Option<&str>, bytes: &[u8]) -> Result<Vec<u8>> {
    let bad = || Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "malformed bytea escape sequence");
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        if bytes.get(i + 1) == Some(&b'\\') {
            out.push(b'\\');
            i += 2;
            continue;
        }
        if i + 3 < bytes.len() && bytes[i + 1..i + 4].iter().all(|b| (b'0'..=b'7').contains(b)) {
            let value = u16::from(bytes[i + 1] - b'0') * 64 + u16::from(bytes[i + 2] - b'0') * 8 + u16::from(bytes[i + 3] - b'0');
            out.push(u8::try_from(value).map_err(|_| bad())?);
            i += 4;
            continue;
        }
        return Err(bad());
    }
    Ok(out)
}

impl<'a> FromSqlValue<'a> for Vec<u8> {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        match bytes.strip_prefix(b"\\x") {
            Some(hex) => decode_hex(oid, name, hex),
            None => decode_escape(oid, name, bytes),
        }
    }

    fn from_sql_binary(_oid: Oid, _name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        Ok(bytes.to_vec())
    }
}

impl ToSqlValue for Vec<u8> {
    fn natural_oid(&self) -> Oid {
        oid::BYTEA
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(b"\\x");
        for byte in self {
            buf.extend_from_slice(format!("{byte:02x}").as_bytes());
        }
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(self);
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip() {
        let bytes: Vec<u8> = vec![0xde, 0xad, 0xbe, 0xef];
        let mut buf = Vec::new();
        bytes.encode_text(oid::BYTEA, None, &mut buf).unwrap();
        assert_eq!(buf, b"\\xdeadbeef");
        let decoded = Vec::<u8>::from_sql_text(oid::BYTEA, None, &buf).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn binary_round_trip() {
        let bytes: Vec<u8> = vec![1, 2, 3];
        let mut buf = Vec::new();
        bytes.encode_binary(oid::BYTEA, None, &mut buf).unwrap();
        let decoded = Vec::<u8>::from_sql_binary(oid::BYTEA, None, &buf).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn borrowed_slice_refuses_text_format() {
        let err = <&[u8]>::from_sql_text(oid::BYTEA, None, b"\\x00").unwrap_err();
        assert!(matches!(err, Error::FormatMismatch { .. }));
    }

    #[test]
    fn legacy_escape_text_decodes() {
        let decoded = Vec::<u8>::from_sql_text(oid::BYTEA, None, b"a\\\\b\\001").unwrap();
        assert_eq!(decoded, b"a\\b\x01");
    }

    #[test]
    fn undecoded_bytes_skips_hex_decoding() {
        let raw = UndecodedBytes::from_sql_text(oid::BYTEA, None, b"\\xdead").unwrap();
        assert_eq!(raw.0, b"\\xdead");
        let raw = UndecodedBytes::from_sql_binary(oid::BYTEA, None, &[0xde, 0xad]).unwrap();
        assert_eq!(raw.0, [0xde, 0xad]);
    }
}

/// Zero-copy destination: the scanned slice borrows the caller's wire
/// buffer, so the borrow checker pins it to the row being processed. Text
/// format is refused — hex decoding would have to allocate.
impl<'a> FromSqlValue<'a> for &'a [u8] {
    fn from_sql_text(oid: Oid, name: Option<&str>, _bytes: &'a [u8]) -> Result<Self> {
        Err(Error::format_mismatch(oid, name.map(str::to_owned), FormatCode::Text))
    }

    fn from_sql_binary(_oid: Oid, _name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        Ok(bytes)
    }
}

/// Captures the wire bytes verbatim, whatever the source type or format —
/// no hex decoding, no UTF-8 validation. For callers that forward values
/// without interpreting them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndecodedBytes(pub Vec<u8>);

impl<'a> FromSqlValue<'a> for UndecodedBytes {
    fn from_sql_text(_oid: Oid, _name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        Ok(UndecodedBytes(bytes.to_vec()))
    }

    fn from_sql_binary(_oid: Oid, _name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        Ok(UndecodedBytes(bytes.to_vec()))
    }
}

impl ToSqlValue for &[u8] {
    fn natural_oid(&self) -> Oid {
        oid::BYTEA
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.to_vec().encode_text(oid, name, buf)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(self);
        Ok(IsNull::No)
    }
}
