//! Composite/record codec over PostgreSQL's `record_recv`/`record_out` wire
//! layout: binary is `{field_count: i32, (field_oid: i32, length-prefixed
//! field bytes)*}`; text is parenthesized, comma-separated, with the same
//! quoting rules as array element text.
//!
//! Unlike the scalar `Via*` bridges in `wrapper.rs`, a composite destination
//! never has a single "natural" intermediate type to route through — its
//! shape is the caller's own [`CompositeIndexScanner`]/[`CompositeIndexGetter`]
//! implementation, field by field. `ViaComposite<T>` is the bridge newtype
//! for that case, kept here rather than in `wrapper.rs` since it has no
//! macro-shared structure with the scalar bridges.
//!
//! `encode_field` is implemented entirely by the caller's own type, so this
//! module can't see whether it recurses. `bridge::with_guard` is keyed on a
//! call-wide stack rather than one scoped to a single `encode_text`/
//! `encode_binary` invocation, so a field that re-encodes another
//! `ViaComposite` of the same `T` still trips the cycle check even though
//! the recursion happens outside this function's own call frame.

use crate::capability::{CompositeIndexGetter, CompositeIndexScanner};
use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::Oid;
use crate::wire;

/// Bridges a type implementing [`CompositeIndexScanner`]/[`CompositeIndexGetter`]
/// into the full codec contract.
pub struct ViaComposite<T>(pub T);

impl<'a, T> FromSqlValue<'a> for ViaComposite<T>
where
    T: CompositeIndexScanner + Default,
{
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?
            .trim();
        let inner = text
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected (...)"))?;
        let mut dst = T::default();
        let mut index = 0usize;
        let mut depth = 0i32;
        let mut current = String::new();
        let mut in_quotes = false;
        let mut push_field = |current: &mut String, dst: &mut T, index: &mut usize| -> Result<()> {
            let raw = current.trim();
            if raw.is_empty() {
                dst.scan_field(*index, oid, None)?;
            } else {
                dst.scan_field(*index, oid, Some(raw.as_bytes()))?;
            }
            *index += 1;
            current.clear();
            Ok(())
        };
        let mut chars = inner.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' => in_quotes = !in_quotes,
                '(' if !in_quotes => {
                    depth += 1;
                    current.push(c);
                }
                ')' if !in_quotes => {
                    depth -= 1;
                    current.push(c);
                }
                ',' if !in_quotes && depth == 0 => push_field(&mut current, &mut dst, &mut index)?,
                _ => current.push(c),
            }
        }
        if !inner.is_empty() {
            push_field(&mut current, &mut dst, &mut index)?;
        }
        Ok(ViaComposite(dst))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated record header"));
        }
        let count = wire::read_i32(oid, name, &bytes[0..4])?;
        let count = usize::try_from(count).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "negative field count"))?;
        let mut rest = &bytes[4..];
        let mut dst = T::default();
        for index in 0..count {
            if rest.len() < 4 {
                return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated record field oid"));
            }
            let field_oid = wire::read_u32(oid, name, &rest[0..4])?;
            let (field, next) = wire::split_length_prefixed(&rest[4..])?;
            dst.scan_field(index, field_oid, field)?;
            rest = next;
        }
        Ok(ViaComposite(dst))
    }
}

impl<T: CompositeIndexGetter> ToSqlValue for ViaComposite<T> {
    fn natural_oid(&self) -> Oid {
        crate::oid::oid::RECORD
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let _ = (oid, name);
        crate::bridge::with_guard(core::any::type_name::<T>(), || {
            buf.push(b'(');
            for index in 0..self.0.field_count() {
                if index > 0 {
                    buf.push(b',');
                }
                let mut field_buf = Vec::new();
                match self.0.encode_field(index, &mut field_buf)? {
                    IsNull::Yes => {}
                    IsNull::No => {
                        let text = String::from_utf8_lossy(&field_buf);
                        if text.is_empty() || text.contains([',', '(', ')', ' ', '"', '\\']) {
                            buf.push(b'"');
                            for c in text.chars() {
                                if c == '"' || c == '\\' {
                                    buf.push(b'\\');
                                }
                                let mut tmp = [0u8; 4];
                                buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
                            }
                            buf.push(b'"');
                        } else {
                            buf.extend_from_slice(&field_buf);
                        }
                    }
                }
            }
            buf.push(b')');
            Ok(IsNull::No)
        })
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let _ = (oid, name);
        crate::bridge::with_guard(core::any::type_name::<T>(), || {
            wire::put_i32(buf, i32::try_from(self.0.field_count()).map_err(|_| Error::overflow("field count", "i32"))?);
            for index in 0..self.0.field_count() {
                wire::put_u32(buf, self.0.field_oid(index));
                let mut field_buf = Vec::new();
                match self.0.encode_field(index, &mut field_buf)? {
                    IsNull::Yes => wire::put_i32(buf, -1),
                    IsNull::No => {
                        wire::put_i32(buf, i32::try_from(field_buf.len()).map_err(|_| Error::overflow("record field length", "i32"))?);
                        buf.extend_from_slice(&field_buf);
                    }
                }
            }
            Ok(IsNull::No)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::oid;

    #[derive(Default)]
    struct Pair {
        a: i32,
        b: Option<String>,
    }

    impl CompositeIndexScanner for Pair {
        fn scan_field(&mut self, index: usize, field_oid: Oid, raw: Option<&[u8]>) -> Result<()> {
            match index {
                0 => self.a = crate::codec::scan(field_oid, None, FormatCode::Binary, raw)?,
                1 => self.b = crate::codec::scan(field_oid, None, FormatCode::Binary, raw)?,
                _ => {}
            }
            Ok(())
        }
    }

    impl CompositeIndexGetter for Pair {
        fn field_count(&self) -> usize {
            2
        }

        fn field_oid(&self, index: usize) -> Oid {
            if index == 0 { oid::INT4 } else { oid::TEXT }
        }

        fn encode_field(&self, index: usize, buf: &mut Vec<u8>) -> Result<IsNull> {
            match index {
                0 => crate::codec::encode(&self.a, oid::INT4, None, FormatCode::Binary, buf),
                1 => crate::codec::encode(&self.b, oid::TEXT, None, FormatCode::Binary, buf),
                _ => Ok(IsNull::Yes),
            }
        }
    }

    #[test]
    fn round_trips_through_binary() {
        let pair = Pair { a: 7, b: Some("hi".to_owned()) };
        let mut buf = Vec::new();
        ViaComposite(pair).encode_binary(oid::RECORD, None, &mut buf).unwrap();
        let decoded = ViaComposite::<Pair>::from_sql_binary(oid::RECORD, None, &buf).unwrap();
        assert_eq!(decoded.0.a, 7);
        assert_eq!(decoded.0.b.as_deref(), Some("hi"));
    }
}
