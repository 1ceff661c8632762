//! `hstore` codec: a flat list of key/nullable-value text
//! pairs. Binary layout is `{count: i32, (key_len: i32, key, value_len: i32
//! (-1 = NULL), value)*}`. Keys are unique within a value, so both decode
//! and encode reject a repeated key with [`Error::RangeViolation`].

use std::collections::HashSet;

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::{Oid, oid};
use crate::wire;

type Entries = Vec<(String, Option<String>)>;

fn check_unique_keys(oid: Oid, name: Option<&str>, entries: &Entries) -> Result<()> {
    let mut seen = HashSet::with_capacity(entries.len());
    for (key, _) in entries {
        if !seen.insert(key.as_str()) {
            let _ = (oid, name);
            return Err(Error::range_violation(format!("duplicate hstore key {key:?}")));
        }
    }
    Ok(())
}

/// Consumes one double-quoted token, honoring backslash escapes, so quote
/// and escape characters inside a key or value never terminate it early.
fn next_quoted(oid: Oid, name: Option<&str>, chars: &mut core::iter::Peekable<core::str::Chars<'_>>) -> Result<String> {
    let bad = |reason: &str| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, reason.to_owned());
    if chars.next() != Some('"') {
        return Err(bad("expected a quoted hstore token"));
    }
    let mut out = String::new();
    loop {
        match chars.next() {
            Some('\\') => match chars.next() {
                Some(escaped) => out.push(escaped),
                None => return Err(bad("unterminated escape in hstore token")),
            },
            Some('"') => return Ok(out),
            Some(c) => out.push(c),
            None => return Err(bad("unterminated quoted hstore token")),
        }
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

impl<'a> FromSqlValue<'a> for Entries {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?
            .trim();
        let mut entries: Entries = Vec::new();
        let mut chars = text.chars().peekable();
        loop {
            while chars.peek().is_some_and(|c| *c == ' ' || *c == ',') {
                chars.next();
            }
            if chars.peek().is_none() {
                break;
            }
            let key = next_quoted(oid, name, &mut chars)?;
            while chars.peek().is_some_and(|c| *c == ' ') {
                chars.next();
            }
            if chars.next() != Some('=') || chars.next() != Some('>') {
                return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected => after hstore key"));
            }
            while chars.peek().is_some_and(|c| *c == ' ') {
                chars.next();
            }
            let value = if chars.peek() == Some(&'"') {
                Some(next_quoted(oid, name, &mut chars)?)
            } else {
                let mut bare = String::new();
                while let Some(&c) = chars.peek() {
                    if c == ',' {
                        break;
                    }
                    bare.push(c);
                    chars.next();
                }
                if bare.trim() == "NULL" {
                    None
                } else {
                    return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected a quoted hstore value or NULL"));
                }
            };
            entries.push((key, value));
        }
        check_unique_keys(oid, name, &entries)?;
        Ok(entries)
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated hstore header"));
        }
        let count = wire::read_i32(oid, name, &bytes[0..4])?;
        let count = usize::try_from(count).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "negative entry count"))?;
        let mut rest = &bytes[4..];
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let (key_bytes, next) = wire::split_length_prefixed(rest)?;
            let key = key_bytes
                .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "hstore key cannot be NULL"))
                .and_then(|b| core::str::from_utf8(b).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "hstore key is not valid UTF-8")))?
                .to_owned();
            let (value_bytes, next) = wire::split_length_prefixed(next)?;
            let value = value_bytes
                .map(|b| core::str::from_utf8(b).map(str::to_owned))
                .transpose()
                .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "hstore value is not valid UTF-8"))?;
            entries.push((key, value));
            rest = next;
        }
        check_unique_keys(oid, name, &entries)?;
        Ok(entries)
    }
}

impl ToSqlValue for Entries {
    fn natural_oid(&self) -> Oid {
        oid::HSTORE
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        check_unique_keys(oid, name, self)?;
        let rendered: Vec<String> = self
            .iter()
            .map(|(k, v)| match v {
                Some(v) => format!("{}=>{}", quote(k), quote(v)),
                None => format!("{}=>NULL", quote(k)),
            })
            .collect();
        buf.extend_from_slice(rendered.join(", ").as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        check_unique_keys(oid, name, self)?;
        wire::put_i32(buf, i32::try_from(self.len()).map_err(|_| Error::overflow("hstore entry count", "i32"))?);
        for (k, v) in self {
            wire::put_i32(buf, i32::try_from(k.len()).map_err(|_| Error::overflow("hstore key length", "i32"))?);
            buf.extend_from_slice(k.as_bytes());
            match v {
                Some(v) => {
                    wire::put_i32(buf, i32::try_from(v.len()).map_err(|_| Error::overflow("hstore value length", "i32"))?);
                    buf.extend_from_slice(v.as_bytes());
                }
                None => wire::put_i32(buf, -1),
            }
        }
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip() {
        let entries: Entries = vec![("a".to_owned(), Some("1".to_owned())), ("b".to_owned(), None)];
        let mut buf = Vec::new();
        entries.encode_text(oid::HSTORE, None, &mut buf).unwrap();
        let decoded = Entries::from_sql_text(oid::HSTORE, None, &buf).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn text_round_trip_with_delimiters_inside_tokens() {
        let entries: Entries = vec![
            ("a, b".to_owned(), Some("c, d".to_owned())),
            ("k=>v".to_owned(), Some("x\"y\\z".to_owned())),
            ("NULL".to_owned(), Some("literal key".to_owned())),
            ("absent".to_owned(), None),
        ];
        let mut buf = Vec::new();
        entries.encode_text(oid::HSTORE, None, &mut buf).unwrap();
        let decoded = Entries::from_sql_text(oid::HSTORE, None, &buf).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn binary_round_trip() {
        let entries: Entries = vec![("key".to_owned(), Some("value".to_owned()))];
        let mut buf = Vec::new();
        entries.encode_binary(oid::HSTORE, None, &mut buf).unwrap();
        let decoded = Entries::from_sql_binary(oid::HSTORE, None, &buf).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn rejects_duplicate_key_on_encode() {
        let entries: Entries = vec![("a".to_owned(), Some("1".to_owned())), ("a".to_owned(), Some("2".to_owned()))];
        let mut buf = Vec::new();
        let err = entries.encode_text(oid::HSTORE, None, &mut buf).unwrap_err();
        assert!(matches!(err, Error::RangeViolation(_)));
    }

    #[test]
    fn rejects_duplicate_key_on_decode() {
        let err = Entries::from_sql_text(oid::HSTORE, None, br#""a"=>"1", "a"=>"2""#).unwrap_err();
        assert!(matches!(err, Error::RangeViolation(_)));
    }
}
