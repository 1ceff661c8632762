//! Array codec. Binary layout is PostgreSQL's `ArrayType` header: `ndim:
//! i32, has_null: i32, elem_oid: i32, (dim_size: i32, lower_bound: i32) *
//! ndim`, followed by the flattened, length-prefixed elements in row-major
//! order. Text layout nests one brace-delimited, comma-separated group per
//! dimension.
//!
//! `Vec<T>` and `[T; N]` map to one-dimensional arrays; `Array2<T>` maps to
//! a two-dimensional array and rejects a ragged outer vector with
//! [`Error::RangeViolation`] rather than silently truncating it.

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::Oid;
use crate::value::array::Array2;
use crate::wire;

const DEFAULT_LOWER_BOUND: i32 = 1;

fn split_text_elements(oid: Oid, name: Option<&str>, inner: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if !in_quotes => in_quotes = true,
            '"' if in_quotes => in_quotes = false,
            '\\' if in_quotes => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '{' if !in_quotes => {
                depth += 1;
                current.push(c);
            }
            '}' if !in_quotes => {
                depth -= 1;
                current.push(c);
            }
            ',' if !in_quotes && depth == 0 => {
                out.push(core::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() || !out.is_empty() {
        out.push(current);
    }
    if in_quotes {
        return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "unterminated quoted array element"));
    }
    Ok(out)
}

fn unquote_element(text: &str) -> Option<&str> {
    if text == "NULL" { None } else { Some(text.trim_matches('"')) }
}

/// Writes one array element in text form, quoting it if its rendering would
/// otherwise be ambiguous against the array delimiters.
fn encode_text_element<T: ToSqlValue>(item: &T, elem_oid: Oid, buf: &mut Vec<u8>) -> Result<()> {
    if item.is_null() {
        buf.extend_from_slice(b"NULL");
        return Ok(());
    }
    let mut elem_buf = Vec::new();
    item.encode_text(elem_oid, None, &mut elem_buf)?;
    let elem_text = String::from_utf8_lossy(&elem_buf);
    if elem_text.is_empty() || elem_text.contains([',', '{', '}', ' ', '"', '\\']) {
        buf.push(b'"');
        for c in elem_text.chars() {
            if c == '"' || c == '\\' {
                buf.push(b'\\');
            }
            let mut tmp = [0u8; 4];
            buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
        }
        buf.push(b'"');
    } else {
        buf.extend_from_slice(&elem_buf);
    }
    Ok(())
}

impl<'a, T> FromSqlValue<'a> for Vec<T>
where
    T: FromSqlValue<'a>,
{
    fn from_sql_null(oid: Oid, name: Option<&str>, format: FormatCode) -> Result<Self> {
        Err(Error::null_assignment(oid, name.map(str::to_owned), format, "Vec<T>"))
    }

    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let elem_oid = crate::codec::element_or_self(oid);
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?
            .trim();
        let inner = text
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected {...}"))?;
        if inner.is_empty() {
            return Ok(Vec::new());
        }
        split_text_elements(oid, name, inner)?
            .into_iter()
            .map(|raw| match unquote_element(raw.trim()) {
                None => T::from_sql_null(elem_oid, None, FormatCode::Text),
                Some(value) => T::from_sql_text(elem_oid, None, value.as_bytes()),
            })
            .collect()
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < 12 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated array header"));
        }
        let ndim = wire::read_i32(oid, name, &bytes[0..4])?;
        let has_null = wire::read_i32(oid, name, &bytes[4..8])?;
        let wire_elem_oid = wire::read_u32(oid, name, &bytes[8..12])?;
        let _ = has_null;
        // The header's element OID is authoritative when the sender filled
        // it in; a zero falls back to the registry's registration.
        let elem_oid = if wire_elem_oid != 0 { wire_elem_oid } else { crate::codec::element_or_self(oid) };
        if ndim == 0 {
            return Ok(Vec::new());
        }
        if ndim != 1 {
            return Err(Error::range_violation(format!("expected a 1-dimensional array, found {ndim} dimensions")));
        }
        if bytes.len() < 20 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated array dimension"));
        }
        let count = wire::read_i32(oid, name, &bytes[12..16])?;
        let count = usize::try_from(count).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "negative element count"))?;
        let mut rest = &bytes[20..];
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let (field, next) = wire::split_length_prefixed(rest)?;
            out.push(match field {
                None => T::from_sql_null(elem_oid, None, FormatCode::Binary)?,
                Some(b) => T::from_sql_binary(elem_oid, None, b)?,
            });
            rest = next;
        }
        Ok(out)
    }
}

fn encode_slice_text<T: ToSqlValue>(items: &[T], array_oid: Oid, buf: &mut Vec<u8>) -> Result<IsNull> {
    let elem_oid = crate::codec::element_or_self(array_oid);
    buf.push(b'{');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        encode_text_element(item, elem_oid, buf)?;
    }
    buf.push(b'}');
    Ok(IsNull::No)
}

fn encode_slice_binary<T: ToSqlValue>(items: &[T], array_oid: Oid, buf: &mut Vec<u8>) -> Result<IsNull> {
    let elem_oid = crate::codec::element_or_self(array_oid);
    if items.is_empty() {
        // An empty array has zero dimensions, not one dimension of length zero.
        wire::put_i32(buf, 0);
        wire::put_i32(buf, 0);
        wire::put_u32(buf, elem_oid);
        return Ok(IsNull::No);
    }
    let has_null = items.iter().any(ToSqlValue::is_null);
    wire::put_i32(buf, 1);
    wire::put_i32(buf, i32::from(has_null));
    wire::put_u32(buf, elem_oid);
    wire::put_i32(buf, i32::try_from(items.len()).map_err(|_| Error::overflow("array length", "i32"))?);
    wire::put_i32(buf, DEFAULT_LOWER_BOUND);
    for item in items {
        if item.is_null() {
            wire::put_i32(buf, -1);
            continue;
        }
        let mut elem_buf = Vec::new();
        item.encode_binary(elem_oid, None, &mut elem_buf)?;
        wire::put_i32(buf, i32::try_from(elem_buf.len()).map_err(|_| Error::overflow("array element length", "i32"))?);
        buf.extend_from_slice(&elem_buf);
    }
    Ok(IsNull::No)
}

impl<T: ToSqlValue> ToSqlValue for Vec<T> {
    /// The array OID matching the first element's natural type; zero (defer
    /// to the registry's default-type table) when the array is empty or the
    /// element type has no built-in array variant.
    fn natural_oid(&self) -> Oid {
        self.first().and_then(|item| crate::oid::array_oid_of(item.natural_oid())).unwrap_or(0)
    }

    fn encode_text(&self, oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        encode_slice_text(self, oid, buf)
    }

    fn encode_binary(&self, oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        encode_slice_binary(self, oid, buf)
    }
}

/// Fixed-size arrays decode exactly like `Vec<T>` but additionally insist on
/// the compile-time element count, failing with [`Error::RangeViolation`]
/// when the wire value's length differs.
impl<'a, T, const N: usize> FromSqlValue<'a> for [T; N]
where
    T: FromSqlValue<'a>,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let items = Vec::<T>::from_sql_text(oid, name, bytes)?;
        let found = items.len();
        items
            .try_into()
            .map_err(|_| Error::range_violation(format!("expected an array of exactly {N} elements, found {found}")))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let items = Vec::<T>::from_sql_binary(oid, name, bytes)?;
        let found = items.len();
        items
            .try_into()
            .map_err(|_| Error::range_violation(format!("expected an array of exactly {N} elements, found {found}")))
    }
}

impl<T: ToSqlValue, const N: usize> ToSqlValue for [T; N] {
    fn natural_oid(&self) -> Oid {
        self.first().and_then(|item| crate::oid::array_oid_of(item.natural_oid())).unwrap_or(0)
    }

    fn encode_text(&self, oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        encode_slice_text(self, oid, buf)
    }

    fn encode_binary(&self, oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        encode_slice_binary(self, oid, buf)
    }
}

impl<'a, T> FromSqlValue<'a> for Array2<T>
where
    T: FromSqlValue<'a>,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let elem_oid = crate::codec::element_or_self(oid);
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?
            .trim();
        let outer = text
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected {...}"))?;
        if outer.is_empty() {
            return Ok(Array2::new(Vec::new()));
        }
        let rows = split_text_elements(oid, name, outer)?
            .into_iter()
            .map(|row| {
                let row = row.trim();
                let row_inner = row
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                    .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected a nested {...} row"))?;
                if row_inner.is_empty() {
                    return Ok(Vec::new());
                }
                split_text_elements(oid, name, row_inner)?
                    .into_iter()
                    .map(|raw| match unquote_element(raw.trim()) {
                        None => T::from_sql_null(elem_oid, None, FormatCode::Text),
                        Some(value) => T::from_sql_text(elem_oid, None, value.as_bytes()),
                    })
                    .collect()
            })
            .collect::<Result<Vec<Vec<T>>>>()?;
        Ok(Array2::new(rows))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < 12 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated array header"));
        }
        let ndim = wire::read_i32(oid, name, &bytes[0..4])?;
        let wire_elem_oid = wire::read_u32(oid, name, &bytes[8..12])?;
        let elem_oid = if wire_elem_oid != 0 { wire_elem_oid } else { crate::codec::element_or_self(oid) };
        if ndim == 0 {
            return Ok(Array2::new(Vec::new()));
        }
        if ndim != 2 {
            return Err(Error::range_violation(format!("expected a 2-dimensional array, found {ndim} dimensions")));
        }
        if bytes.len() < 28 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated array dimensions"));
        }
        let outer_len = wire::read_i32(oid, name, &bytes[12..16])?;
        let inner_len = wire::read_i32(oid, name, &bytes[20..24])?;
        let outer_len = usize::try_from(outer_len).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "negative outer length"))?;
        let inner_len = usize::try_from(inner_len).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "negative inner length"))?;

        let mut rest = &bytes[28..];
        let mut outer = Vec::with_capacity(outer_len);
        for _ in 0..outer_len {
            let mut inner = Vec::with_capacity(inner_len);
            for _ in 0..inner_len {
                let (field, next) = wire::split_length_prefixed(rest)?;
                inner.push(match field {
                    None => T::from_sql_null(elem_oid, None, FormatCode::Binary)?,
                    Some(b) => T::from_sql_binary(elem_oid, None, b)?,
                });
                rest = next;
            }
            outer.push(inner);
        }
        Ok(Array2::new(outer))
    }
}

impl<T: ToSqlValue> ToSqlValue for Array2<T> {
    fn natural_oid(&self) -> Oid {
        self.rows
            .first()
            .and_then(|row| row.first())
            .and_then(|item| crate::oid::array_oid_of(item.natural_oid()))
            .unwrap_or(0)
    }

    fn encode_text(&self, oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let elem_oid = crate::codec::element_or_self(oid);
        let inner_len = self.rows.first().map_or(0, Vec::len);
        if self.rows.iter().any(|row| row.len() != inner_len) {
            return Err(Error::range_violation("ragged two-dimensional array: rows have different lengths"));
        }
        buf.push(b'{');
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                buf.push(b',');
            }
            buf.push(b'{');
            for (j, item) in row.iter().enumerate() {
                if j > 0 {
                    buf.push(b',');
                }
                encode_text_element(item, elem_oid, buf)?;
            }
            buf.push(b'}');
        }
        buf.push(b'}');
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let elem_oid = crate::codec::element_or_self(oid);
        let inner_len = self.rows.first().map_or(0, Vec::len);
        if self.rows.iter().any(|row| row.len() != inner_len) {
            return Err(Error::range_violation("ragged two-dimensional array: rows have different lengths"));
        }
        if self.rows.is_empty() {
            wire::put_i32(buf, 0);
            wire::put_i32(buf, 0);
            wire::put_u32(buf, elem_oid);
            return Ok(IsNull::No);
        }
        let has_null = self.rows.iter().flatten().any(ToSqlValue::is_null);
        wire::put_i32(buf, 2);
        wire::put_i32(buf, i32::from(has_null));
        wire::put_u32(buf, elem_oid);
        wire::put_i32(buf, i32::try_from(self.rows.len()).map_err(|_| Error::overflow("array length", "i32"))?);
        wire::put_i32(buf, DEFAULT_LOWER_BOUND);
        wire::put_i32(buf, i32::try_from(inner_len).map_err(|_| Error::overflow("array length", "i32"))?);
        wire::put_i32(buf, DEFAULT_LOWER_BOUND);
        for row in &self.rows {
            for item in row {
                if item.is_null() {
                    wire::put_i32(buf, -1);
                    continue;
                }
                let mut elem_buf = Vec::new();
                item.encode_binary(elem_oid, None, &mut elem_buf)?;
                wire::put_i32(buf, i32::try_from(elem_buf.len()).map_err(|_| Error::overflow("array element length", "i32"))?);
                buf.extend_from_slice(&elem_buf);
            }
        }
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::oid;

    #[test]
    fn vec_text_round_trip() {
        let values: Vec<i32> = vec![1, 2, 3];
        let mut buf = Vec::new();
        values.encode_text(oid::INT4_ARRAY, None, &mut buf).unwrap();
        assert_eq!(buf, b"{1,2,3}");
        let decoded = Vec::<i32>::from_sql_text(oid::INT4_ARRAY, None, &buf).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn vec_binary_round_trip_with_null() {
        let values: Vec<Option<i32>> = vec![Some(1), None, Some(3)];
        let mut buf = Vec::new();
        values.encode_binary(oid::INT4_ARRAY, None, &mut buf).unwrap();
        let decoded = Vec::<Option<i32>>::from_sql_binary(oid::INT4_ARRAY, None, &buf).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn binary_header_carries_the_element_oid() {
        let values: Vec<i32> = vec![1];
        let mut buf = Vec::new();
        values.encode_binary(oid::INT4_ARRAY, None, &mut buf).unwrap();
        assert_eq!(buf[8..12], oid::INT4.to_be_bytes());
    }

    #[test]
    fn natural_oid_is_the_array_variant_of_the_element() {
        assert_eq!(vec![1i32].natural_oid(), oid::INT4_ARRAY);
        assert_eq!(vec!["a"].natural_oid(), oid::TEXT_ARRAY);
        assert_eq!([1.5f64; 2].natural_oid(), oid::FLOAT8_ARRAY);
        assert_eq!(Array2::new(vec![vec![1i16]]).natural_oid(), oid::INT2_ARRAY);
        // Empty containers defer to the registry's default-type table.
        assert_eq!(Vec::<i32>::new().natural_oid(), 0);
    }

    #[test]
    fn fixed_array_binary_round_trip() {
        let values: [i32; 3] = [7, 8, 9];
        let mut buf = Vec::new();
        values.encode_binary(oid::INT4_ARRAY, None, &mut buf).unwrap();
        let decoded = <[i32; 3]>::from_sql_binary(oid::INT4_ARRAY, None, &buf).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn fixed_array_rejects_wrong_length() {
        let values: Vec<i32> = vec![1, 2];
        let mut buf = Vec::new();
        values.encode_binary(oid::INT4_ARRAY, None, &mut buf).unwrap();
        let err = <[i32; 3]>::from_sql_binary(oid::INT4_ARRAY, None, &buf).unwrap_err();
        assert!(matches!(err, Error::RangeViolation(_)));
    }

    #[test]
    fn array2_binary_round_trip() {
        let rows = Array2::new(vec![vec![1, 2], vec![3, 4]]);
        let mut buf = Vec::new();
        rows.encode_binary(oid::INT4_ARRAY, None, &mut buf).unwrap();
        let decoded = Array2::<i32>::from_sql_binary(oid::INT4_ARRAY, None, &buf).unwrap();
        assert_eq!(decoded.rows, rows.rows);
    }

    #[test]
    fn array2_rejects_ragged_rows_on_encode() {
        let rows = Array2::new(vec![vec![1, 2], vec![3]]);
        let mut buf = Vec::new();
        let err = rows.encode_binary(oid::INT4_ARRAY, None, &mut buf).unwrap_err();
        assert!(matches!(err, Error::RangeViolation(_)));
    }

    #[test]
    fn array2_text_round_trip() {
        let rows = Array2::new(vec![vec![1, 2], vec![3, 4]]);
        let mut buf = Vec::new();
        rows.encode_text(oid::INT4_ARRAY, None, &mut buf).unwrap();
        assert_eq!(buf, b"{{1,2},{3,4}}");
        let decoded = Array2::<i32>::from_sql_text(oid::INT4_ARRAY, None, &buf).unwrap();
        assert_eq!(decoded.rows, rows.rows);
    }

    #[test]
    fn array2_text_rejects_ragged_rows_on_encode() {
        let rows = Array2::new(vec![vec![1, 2], vec![3]]);
        let mut buf = Vec::new();
        let err = rows.encode_text(oid::INT4_ARRAY, None, &mut buf).unwrap_err();
        assert!(matches!(err, Error::RangeViolation(_)));
    }
}
