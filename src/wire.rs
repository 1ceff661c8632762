//! Low-level wire helpers shared by every codec: big-endian fixed-width
//! reads/writes and the length-prefixed helpers used by variable-length
//! binary encodings.

use crate::error::{Error, Result};
use crate::format::FormatCode;
use crate::oid::Oid;

pub fn read_i16(oid: Oid, name: Option<&str>, bytes: &[u8]) -> Result<i16> {
    let arr: [u8; 2] = bytes
        .try_into()
        .map_err(|_| wire_err(oid, name, "expected 2 bytes"))?;
    Ok(i16::from_be_bytes(arr))
}

pub fn read_i32(oid: Oid, name: Option<&str>, bytes: &[u8]) -> Result<i32> {
    let arr: [u8; 4] = bytes
        .try_into()
        .map_err(|_| wire_err(oid, name, "expected 4 bytes"))?;
    Ok(i32::from_be_bytes(arr))
}

pub fn read_i64(oid: Oid, name: Option<&str>, bytes: &[u8]) -> Result<i64> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| wire_err(oid, name, "expected 8 bytes"))?;
    Ok(i64::from_be_bytes(arr))
}

pub fn read_u16(oid: Oid, name: Option<&str>, bytes: &[u8]) -> Result<u16> {
    read_i16(oid, name, bytes).map(|v| v as u16)
}

pub fn read_u32(oid: Oid, name: Option<&str>, bytes: &[u8]) -> Result<u32> {
    read_i32(oid, name, bytes).map(|v| v as u32)
}

pub fn read_f32(oid: Oid, name: Option<&str>, bytes: &[u8]) -> Result<f32> {
    read_i32(oid, name, bytes).map(f32::from_bits_signed)
}

pub fn read_f64(oid: Oid, name: Option<&str>, bytes: &[u8]) -> Result<f64> {
    read_i64(oid, name, bytes).map(f64::from_bits_signed)
}

/// Bridges `from_bits` (which wants `u32`/`u64`) to the signed values
/// `read_i32`/`read_i64` already validated the width of.
trait FromBitsSigned: Sized {
    type Bits;
    fn from_bits_signed(bits: Self::Bits) -> Self;
}

impl FromBitsSigned for f32 {
    type Bits = i32;
    fn from_bits_signed(bits: i32) -> Self {
        f32::from_bits(bits as u32)
    }
}

impl FromBitsSigned for f64 {
    type Bits = i64;
    fn from_bits_signed(bits: i64) -> Self {
        f64::from_bits(bits as u64)
    }
}

fn wire_err(oid: Oid, name: Option<&str>, reason: &str) -> Error {
    Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, reason)
}

pub fn put_i16(buf: &mut Vec<u8>, value: i16) {
    buf.extend_from_slice(&value.to_be_bytes());
}

pub fn put_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

pub fn put_i64(buf: &mut Vec<u8>, value: i64) {
    buf.extend_from_slice(&value.to_be_bytes());
}

pub fn put_u16(buf: &mut Vec<u8>, value: u16) {
    put_i16(buf, value as i16);
}

pub fn put_u32(buf: &mut Vec<u8>, value: u32) {
    put_i32(buf, value as i32);
}

pub fn put_f32(buf: &mut Vec<u8>, value: f32) {
    put_i32(buf, value.to_bits() as i32);
}

pub fn put_f64(buf: &mut Vec<u8>, value: f64) {
    put_i64(buf, value.to_bits() as i64);
}

/// Splits a 4-byte length prefix (`-1` means SQL NULL) from the front of a
/// composite/array element stream, per PostgreSQL's nested binary encodings.
pub fn split_length_prefixed(bytes: &[u8]) -> Result<(Option<&[u8]>, &[u8])> {
    if bytes.len() < 4 {
        return Err(Error::wire_invalid(
            0,
            None,
            FormatCode::Binary,
            "truncated length prefix",
        ));
    }
    let (len_bytes, rest) = bytes.split_at(4);
    let len = i32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
    if len < 0 {
        return Ok((None, rest));
    }
    let len = usize::try_from(len)
        .map_err(|_| Error::wire_invalid(0, None, FormatCode::Binary, "negative length"))?;
    if rest.len() < len {
        return Err(Error::wire_invalid(
            0,
            None,
            FormatCode::Binary,
            "element shorter than its length prefix",
        ));
    }
    let (field, remainder) = rest.split_at(len);
    Ok((Some(field), remainder))
}
