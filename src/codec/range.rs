//! Range codec: PostgreSQL's `rangetypes.c` flag byte plus length-prefixed
//! bound values in binary, bracket/parenthesis literals in text.

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::Oid;
use crate::value::range::{Range, RangeBound, flags};
use crate::wire;

fn parse_text_bound(text: &str) -> Option<&str> {
    if text.is_empty() { None } else { Some(text) }
}

impl<'a, T> FromSqlValue<'a> for Range<T>
where
    T: FromSqlValue<'a>,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let bound_oid = crate::codec::element_or_self(oid);
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?
            .trim();
        if text == "empty" {
            return Ok(Range::empty());
        }
        let lower_inclusive = text.starts_with('[');
        let upper_inclusive = text.ends_with(']');
        let inner = text
            .get(1..text.len().saturating_sub(1))
            .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "malformed range literal"))?;
        let (lower_text, upper_text) = inner
            .split_once(',')
            .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected lower,upper"))?;

        let lower = match parse_text_bound(lower_text) {
            None => RangeBound::Unbounded,
            Some(t) => {
                let v = T::from_sql_text(bound_oid, None, t.as_bytes())?;
                if lower_inclusive { RangeBound::Inclusive(v) } else { RangeBound::Exclusive(v) }
            }
        };
        let upper = match parse_text_bound(upper_text) {
            None => RangeBound::Unbounded,
            Some(t) => {
                let v = T::from_sql_text(bound_oid, None, t.as_bytes())?;
                if upper_inclusive { RangeBound::Inclusive(v) } else { RangeBound::Exclusive(v) }
            }
        };
        Ok(Range::new(lower, upper))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let bound_oid = crate::codec::element_or_self(oid);
        if bytes.is_empty() {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "missing range flag byte"));
        }
        let flag = bytes[0];
        if flag & flags::EMPTY != 0 {
            return Ok(Range::empty());
        }
        let mut rest = &bytes[1..];

        let lower = if flag & flags::LB_INF != 0 {
            RangeBound::Unbounded
        } else {
            let (field, next) = wire::split_length_prefixed(rest)?;
            rest = next;
            let bytes = field.ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "lower bound cannot be NULL"))?;
            let v = T::from_sql_binary(bound_oid, None, bytes)?;
            if flag & flags::LB_INC != 0 { RangeBound::Inclusive(v) } else { RangeBound::Exclusive(v) }
        };
        let upper = if flag & flags::UB_INF != 0 {
            RangeBound::Unbounded
        } else {
            let (field, _next) = wire::split_length_prefixed(rest)?;
            let bytes = field.ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "upper bound cannot be NULL"))?;
            let v = T::from_sql_binary(bound_oid, None, bytes)?;
            if flag & flags::UB_INC != 0 { RangeBound::Inclusive(v) } else { RangeBound::Exclusive(v) }
        };
        Ok(Range::new(lower, upper))
    }
}

impl<T: ToSqlValue> ToSqlValue for Range<T> {
    /// The range OID matching the bound values' natural type; zero (defer
    /// to the registry's default-type table) for empty or fully unbounded
    /// ranges, which carry no bound value to inspect.
    fn natural_oid(&self) -> Oid {
        self.lower
            .value()
            .or_else(|| self.upper.value())
            .and_then(|v| crate::oid::range_oid_of(v.natural_oid()))
            .unwrap_or(0)
    }

    fn encode_text(&self, oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let bound_oid = crate::codec::element_or_self(oid);
        if self.empty {
            buf.extend_from_slice(b"empty");
            return Ok(IsNull::No);
        }
        buf.push(if matches!(self.lower, RangeBound::Inclusive(_)) { b'[' } else { b'(' });
        if let Some(v) = self.lower.value() {
            v.encode_text(bound_oid, None, buf)?;
        }
        buf.push(b',');
        if let Some(v) = self.upper.value() {
            v.encode_text(bound_oid, None, buf)?;
        }
        buf.push(if matches!(self.upper, RangeBound::Inclusive(_)) { b']' } else { b')' });
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let bound_oid = crate::codec::element_or_self(oid);
        if self.empty {
            buf.push(flags::EMPTY);
            return Ok(IsNull::No);
        }
        let mut flag = 0u8;
        if matches!(self.lower, RangeBound::Inclusive(_)) {
            flag |= flags::LB_INC;
        }
        if matches!(self.lower, RangeBound::Unbounded) {
            flag |= flags::LB_INF;
        }
        if matches!(self.upper, RangeBound::Inclusive(_)) {
            flag |= flags::UB_INC;
        }
        if matches!(self.upper, RangeBound::Unbounded) {
            flag |= flags::UB_INF;
        }
        buf.push(flag);
        if let Some(v) = self.lower.value() {
            let mut elem = Vec::new();
            v.encode_binary(bound_oid, None, &mut elem)?;
            wire::put_i32(buf, i32::try_from(elem.len()).map_err(|_| Error::overflow("range bound length", "i32"))?);
            buf.extend_from_slice(&elem);
        }
        if let Some(v) = self.upper.value() {
            let mut elem = Vec::new();
            v.encode_binary(bound_oid, None, &mut elem)?;
            wire::put_i32(buf, i32::try_from(elem.len()).map_err(|_| Error::overflow("range bound length", "i32"))?);
            buf.extend_from_slice(&elem);
        }
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip() {
        let range = Range::new(RangeBound::Inclusive(1i32), RangeBound::Exclusive(10i32));
        let mut buf = Vec::new();
        range.encode_text(crate::oid::oid::INT4RANGE, None, &mut buf).unwrap();
        assert_eq!(buf, b"[1,10)");
        let decoded = Range::<i32>::from_sql_text(crate::oid::oid::INT4RANGE, None, &buf).unwrap();
        assert_eq!(decoded.lower, range.lower);
        assert_eq!(decoded.upper, range.upper);
    }

    #[test]
    fn binary_round_trip() {
        let range = Range::new(RangeBound::Inclusive(1i32), RangeBound::Unbounded);
        let mut buf = Vec::new();
        range.encode_binary(crate::oid::oid::INT4RANGE, None, &mut buf).unwrap();
        let decoded = Range::<i32>::from_sql_binary(crate::oid::oid::INT4RANGE, None, &buf).unwrap();
        assert_eq!(decoded.lower, range.lower);
        assert!(matches!(decoded.upper, RangeBound::Unbounded));
    }

    #[test]
    fn natural_oid_is_the_range_variant_of_the_bound() {
        let range = Range::new(RangeBound::Inclusive(1i64), RangeBound::Unbounded);
        assert_eq!(range.natural_oid(), crate::oid::oid::INT8RANGE);
        assert_eq!(Range::<i32>::empty().natural_oid(), 0);
    }

    #[test]
    fn empty_range_round_trips() {
        let range: Range<i32> = Range::empty();
        let mut buf = Vec::new();
        range.encode_binary(crate::oid::oid::INT4RANGE, None, &mut buf).unwrap();
        let decoded = Range::<i32>::from_sql_binary(crate::oid::oid::INT4RANGE, None, &buf).unwrap();
        assert!(decoded.empty);
    }
}
