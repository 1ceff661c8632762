//! Multirange codec: a count-prefixed list of length-prefixed range
//! encodings in binary, a brace-wrapped range list in text.

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::Oid;
use crate::value::multirange::Multirange;
use crate::value::range::Range;
use crate::wire;

impl<'a, T> FromSqlValue<'a> for Multirange<T>
where
    T: FromSqlValue<'a>,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let range_oid = crate::codec::element_or_self(oid);
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?
            .trim();
        let inner = text
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected {...}"))?;
        if inner.is_empty() {
            return Ok(Multirange::new(Vec::new()));
        }
        let mut ranges = Vec::new();
        let mut depth = 0i32;
        let mut current = String::new();
        for c in inner.chars() {
            match c {
                '[' | '(' => {
                    depth += 1;
                    current.push(c);
                }
                ']' | ')' => {
                    depth -= 1;
                    current.push(c);
                    if depth == 0 {
                        ranges.push(Range::<T>::from_sql_text(range_oid, None, core::mem::take(&mut current).as_bytes())?);
                    }
                }
                ',' if depth == 0 => {}
                _ => current.push(c),
            }
        }
        Ok(Multirange::new(ranges))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let range_oid = crate::codec::element_or_self(oid);
        if bytes.len() < 4 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated multirange header"));
        }
        let count = wire::read_i32(oid, name, &bytes[0..4])?;
        let count = usize::try_from(count).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "negative range count"))?;
        let mut rest = &bytes[4..];
        let mut ranges = Vec::with_capacity(count);
        for _ in 0..count {
            let (field, next) = wire::split_length_prefixed(rest)?;
            let field = field.ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "multirange element cannot be NULL"))?;
            ranges.push(Range::<T>::from_sql_binary(range_oid, None, field)?);
            rest = next;
        }
        Ok(Multirange::new(ranges))
    }
}

impl<T: ToSqlValue> ToSqlValue for Multirange<T> {
    /// The multirange OID matching the first member range's natural type;
    /// zero (defer to the registry's default-type table) when there is no
    /// member to inspect.
    fn natural_oid(&self) -> Oid {
        self.ranges
            .first()
            .and_then(|range| crate::oid::multirange_oid_of(range.natural_oid()))
            .unwrap_or(0)
    }

    fn encode_text(&self, oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let range_oid = crate::codec::element_or_self(oid);
        buf.push(b'{');
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                buf.push(b',');
            }
            range.encode_text(range_oid, None, buf)?;
        }
        buf.push(b'}');
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let range_oid = crate::codec::element_or_self(oid);
        wire::put_i32(buf, i32::try_from(self.ranges.len()).map_err(|_| Error::overflow("multirange length", "i32"))?);
        for range in &self.ranges {
            let mut elem = Vec::new();
            range.encode_binary(range_oid, None, &mut elem)?;
            wire::put_i32(buf, i32::try_from(elem.len()).map_err(|_| Error::overflow("multirange element length", "i32"))?);
            buf.extend_from_slice(&elem);
        }
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::range::RangeBound;

    #[test]
    fn text_round_trip() {
        let multirange = Multirange::new(vec![Range::new(RangeBound::Inclusive(1i32), RangeBound::Exclusive(3i32))]);
        let mut buf = Vec::new();
        multirange.encode_text(crate::oid::oid::INT4MULTIRANGE, None, &mut buf).unwrap();
        let decoded = Multirange::<i32>::from_sql_text(crate::oid::oid::INT4MULTIRANGE, None, &buf).unwrap();
        assert_eq!(decoded.ranges.len(), 1);
    }

    #[test]
    fn natural_oid_is_the_multirange_variant_of_the_member() {
        let multirange = Multirange::new(vec![Range::new(RangeBound::Inclusive(1i32), RangeBound::Exclusive(3i32))]);
        assert_eq!(multirange.natural_oid(), crate::oid::oid::INT4MULTIRANGE);
        assert_eq!(Multirange::<i32>::new(Vec::new()).natural_oid(), 0);
    }

    #[test]
    fn binary_round_trip() {
        let multirange = Multirange::new(vec![
            Range::new(RangeBound::Inclusive(1i32), RangeBound::Exclusive(3i32)),
            Range::new(RangeBound::Inclusive(5i32), RangeBound::Unbounded),
        ]);
        let mut buf = Vec::new();
        multirange.encode_binary(crate::oid::oid::INT4MULTIRANGE, None, &mut buf).unwrap();
        let decoded = Multirange::<i32>::from_sql_binary(crate::oid::oid::INT4MULTIRANGE, None, &buf).unwrap();
        assert_eq!(decoded.ranges.len(), 2);
    }
}
