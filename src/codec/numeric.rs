//! `numeric` codec over the base-10000 digit-group wire layout. Decode
//! accepts every sign value PostgreSQL has ever emitted on the wire; encode
//! only ever produces `NUMERIC_POS`/`NUMERIC_NEG`/`NUMERIC_NAN` — an
//! infinite `Numeric` fails binary encode with
//! [`Error::UnsupportedInfinity`], since servers predating infinity-NUMERIC
//! support reject the infinity sign values, while its text form
//! (`"Infinity"`) is accepted everywhere and always succeeds.
//!
//! The coefficient is reconstructed as a decimal digit string rather than
//! folded into a fixed-width type, so values outside
//! `rust_decimal::Decimal`'s 96-bit/scale-28 range still round-trip.
//! [`rust_decimal::Decimal`] is kept as a convenience destination type; its
//! `FromSqlValue`/`ToSqlValue` impls go through [`Numeric`]'s text form and
//! fail rather than round at the extremes.

use rust_decimal::Decimal;

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::{Oid, oid};
use crate::value::numeric::{NUMERIC_NAN, NUMERIC_NEG, NUMERIC_NINF, NUMERIC_PINF, NUMERIC_POS, Numeric, render_decimal_text, trim_leading_zeros};
use crate::wire;

fn decode_digits(oid: Oid, name: Option<&str>, bytes: &[u8]) -> Result<(i16, i16, u16, u16, Vec<i16>)> {
    if bytes.len() < 8 {
        return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated numeric header"));
    }
    let ndigits = wire::read_i16(oid, name, &bytes[0..2])?;
    let weight = wire::read_i16(oid, name, &bytes[2..4])?;
    let sign = wire::read_u16(oid, name, &bytes[4..6])?;
    let dscale = wire::read_u16(oid, name, &bytes[6..8])?;
    let ndigits_usize = usize::try_from(ndigits)
        .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "negative ndigits"))?;
    let expected_len = 8 + ndigits_usize * 2;
    if bytes.len() != expected_len {
        return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "digit count does not match payload length"));
    }
    let mut digits = Vec::with_capacity(ndigits_usize);
    for chunk in bytes[8..].chunks_exact(2) {
        digits.push(wire::read_i16(oid, name, chunk)?);
    }
    Ok((ndigits, weight, sign, dscale, digits))
}

/// Reconstructs the coefficient digit string and exponent from a decoded
/// digit-group array: `weight`/`dscale` place the decimal point, `digits` are
/// the base-10000 groups either side of it. Leading zeros contributed by the
/// top group's zero-padding are stripped; trailing zeros within `dscale` are
/// kept, since they are part of the value's displayed scale.
fn coefficient_from_groups(weight: i16, dscale: u16, digits: &[i16]) -> (String, i32) {
    let int_groups: usize = if weight >= 0 { (weight as usize) + 1 } else { 0 };
    let frac_groups: usize = (usize::from(dscale) + 3) / 4;
    let total_groups = int_groups + frac_groups;
    let top_power: i32 = if weight >= 0 { i32::from(weight) } else { -1 };

    let mut full = vec![0i16; total_groups];
    for (i, &d) in digits.iter().enumerate() {
        let power = i32::from(weight) - i32::try_from(i).unwrap_or(i32::MAX);
        let position = top_power - power;
        if position >= 0 {
            if let Ok(position) = usize::try_from(position) {
                if position < full.len() {
                    full[position] = d;
                }
            }
        }
    }

    let mut int_part = String::new();
    for &d in &full[..int_groups] {
        int_part.push_str(&format!("{d:04}"));
    }
    if int_part.is_empty() {
        int_part.push('0');
    }

    let mut frac_part = String::new();
    for &d in &full[int_groups..] {
        frac_part.push_str(&format!("{d:04}"));
    }
    frac_part.truncate(usize::from(dscale));
    while frac_part.len() < usize::from(dscale) {
        frac_part.push('0');
    }

    let mut coefficient = int_part;
    coefficient.push_str(&frac_part);
    (trim_leading_zeros(&coefficient), -i32::from(dscale))
}

fn decode_binary(oid: Oid, name: Option<&str>, bytes: &[u8]) -> Result<Numeric> {
    let (ndigits, weight, sign, dscale, digits) = decode_digits(oid, name, bytes)?;
    match sign {
        NUMERIC_NAN => return Ok(Numeric::NaN),
        NUMERIC_PINF => return Ok(Numeric::Infinity),
        NUMERIC_NINF => return Ok(Numeric::NegativeInfinity),
        NUMERIC_POS | NUMERIC_NEG => {}
        other => {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, format!("unrecognized numeric sign {other:#06x}")));
        }
    }
    let _ = ndigits;
    let (coefficient, exponent) = coefficient_from_groups(weight, dscale, &digits);
    Ok(Numeric::Value { negative: sign == NUMERIC_NEG, digits: coefficient, exponent })
}

/// Parses a plain decimal literal (`[-+]?digits(.digits)?`) into a
/// coefficient/exponent pair, without ever routing through a fixed-width
/// type — the only bound on precision is available memory.
fn parse_decimal_literal(oid: Oid, name: Option<&str>, text: &str) -> Result<Numeric> {
    let bad_literal = || Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not a valid numeric literal");

    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (rest, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(bad_literal());
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad_literal());
    }

    let mut coefficient = String::new();
    coefficient.push_str(if int_part.is_empty() { "0" } else { int_part });
    coefficient.push_str(frac_part);
    let exponent = -i32::try_from(frac_part.len()).map_err(|_| Error::overflow("numeric exponent", "i32"))?;
    Ok(Numeric::Value { negative, digits: trim_leading_zeros(&coefficient), exponent })
}

/// Normalizes `digits * 10^exponent` into base-10000 digit groups for the
/// wire format, driven off a decimal digit string so arbitrarily large
/// coefficients never pass through a fixed-width intermediate.
fn encode_digits(negative: bool, digits: &str, exponent: i32) -> Result<(u16, i16, u16, Vec<i16>)> {
    let sign = if negative { NUMERIC_NEG } else { NUMERIC_POS };

    let (digits_str, exponent) = if exponent > 0 {
        let mut padded = digits.to_owned();
        padded.push_str(&"0".repeat(usize::try_from(exponent).unwrap_or(0)));
        (padded, 0)
    } else {
        (digits.to_owned(), exponent)
    };
    let dscale_usize = usize::try_from(-exponent).unwrap_or(0);
    let dscale = u16::try_from(dscale_usize).map_err(|_| Error::overflow("numeric dscale", "u16"))?;

    let digits_str = if digits_str.len() < dscale_usize {
        format!("{}{digits_str}", "0".repeat(dscale_usize - digits_str.len()))
    } else {
        digits_str
    };
    let int_len = digits_str.len() - dscale_usize;

    let pad_front = (4 - int_len % 4) % 4;
    let padded_int_len = int_len + pad_front;
    let frac_len = digits_str.len() - int_len;
    let pad_back = (4 - frac_len % 4) % 4;

    let mut padded = "0".repeat(pad_front);
    padded.push_str(&digits_str);
    padded.push_str(&"0".repeat(pad_back));

    let total_len = padded_int_len + frac_len + pad_back;
    debug_assert_eq!(total_len, padded.len());
    debug_assert_eq!(total_len % 4, 0);

    let mut groups: Vec<i16> = padded
        .as_bytes()
        .chunks_exact(4)
        .map(|chunk| {
            let s = core::str::from_utf8(chunk).unwrap_or("0000");
            s.parse().unwrap_or(0)
        })
        .collect();

    let mut weight = i16::try_from(padded_int_len / 4).unwrap_or(i16::MAX) - 1;

    while groups.first() == Some(&0) && groups.len() > 1 {
        groups.remove(0);
        weight -= 1;
    }
    while groups.last() == Some(&0) && groups.len() > 1 {
        groups.pop();
    }
    if groups == [0] {
        groups.clear();
    }

    Ok((sign, weight, dscale, groups))
}

impl<'a> FromSqlValue<'a> for Numeric {
    fn from_sql_null(oid: Oid, name: Option<&str>, format: FormatCode) -> Result<Self> {
        Err(Error::null_assignment(oid, name.map(str::to_owned), format, "Numeric"))
    }

    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?
            .trim();
        match text {
            "NaN" => Ok(Numeric::NaN),
            "Infinity" => Ok(Numeric::Infinity),
            "-Infinity" => Ok(Numeric::NegativeInfinity),
            _ => parse_decimal_literal(oid, name, text),
        }
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        decode_binary(oid, name, bytes)
    }
}

impl ToSqlValue for Numeric {
    fn natural_oid(&self) -> Oid {
        oid::NUMERIC
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(self.to_string().as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        match self {
            Numeric::NaN => {
                wire::put_i16(buf, 0);
                wire::put_i16(buf, 0);
                wire::put_u16(buf, NUMERIC_NAN);
                wire::put_u16(buf, 0);
                Ok(IsNull::No)
            }
            Numeric::Infinity | Numeric::NegativeInfinity => {
                Err(Error::UnsupportedInfinity { oid, name: name.map(str::to_owned) })
            }
            Numeric::Value { negative, digits, exponent } => {
                let (sign, weight, dscale, digit_groups) = encode_digits(*negative, digits, *exponent)?;
                wire::put_i16(buf, i16::try_from(digit_groups.len()).map_err(|_| Error::overflow("numeric digit count", "i16"))?);
                wire::put_i16(buf, weight);
                wire::put_u16(buf, sign);
                wire::put_u16(buf, dscale);
                for d in digit_groups {
                    wire::put_i16(buf, d);
                }
                Ok(IsNull::No)
            }
        }
    }
}

/// `rust_decimal::Decimal` as a convenience destination: values outside its
/// 96-bit mantissa / scale-28 range fail rather than silently losing
/// precision.
impl<'a> FromSqlValue<'a> for Decimal {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        decimal_from_numeric(oid, name, FormatCode::Text, Numeric::from_sql_text(oid, name, bytes)?)
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        decimal_from_numeric(oid, name, FormatCode::Binary, decode_binary(oid, name, bytes)?)
    }
}

fn decimal_from_numeric(oid: Oid, name: Option<&str>, _format: FormatCode, value: Numeric) -> Result<Decimal> {
    match value {
        Numeric::Value { negative, digits, exponent } => render_decimal_text(negative, &digits, exponent)
            .parse()
            .map_err(|_| Error::overflow("numeric value", "rust_decimal::Decimal")),
        _ => Err(Error::UnsupportedInfinity { oid, name: name.map(str::to_owned) }),
    }
}

impl ToSqlValue for Decimal {
    fn natural_oid(&self) -> Oid {
        oid::NUMERIC
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        numeric_from_decimal(oid, name, *self)?.encode_text(oid, name, buf)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        numeric_from_decimal(oid, name, *self)?.encode_binary(oid, name, buf)
    }
}

fn numeric_from_decimal(oid: Oid, name: Option<&str>, value: Decimal) -> Result<Numeric> {
    parse_decimal_literal(oid, name, &value.to_string())
}
