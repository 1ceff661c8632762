//! `tsvector` codec over PostgreSQL's `tsvectorin`/`tsvectorout` text format
//! and the `WordEntry` binary layout. The top two bits of each binary
//! position carry the weight label.
//!
//! Encoding canonicalizes first (sorting/deduplicating lexemes and their
//! positions) and then enforces the wire format's limits: a word longer than
//! 2046 bytes, a position outside `1..=16383`, or a lexeme with more than 255
//! positions all fail with [`Error::RangeViolation`].

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::{Oid, oid};
use crate::value::tsvector::{Lexeme, TsVector, Weight};
use crate::wire;

fn parse_positions(oid: Oid, name: Option<&str>, text: &str) -> Result<Vec<(u16, Weight)>> {
    text.split(',')
        .filter(|s| !s.is_empty())
        .map(|part| {
            let (digits, weight_char) = match part.chars().last() {
                Some(c) if c.is_ascii_alphabetic() => (&part[..part.len() - 1], c),
                _ => (part, 'D'),
            };
            let pos: u16 = digits
                .parse()
                .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "invalid tsvector position"))?;
            let weight = match weight_char.to_ascii_uppercase() {
                'A' => Weight::A,
                'B' => Weight::B,
                'C' => Weight::C,
                _ => Weight::D,
            };
            Ok((pos, weight))
        })
        .collect()
}

impl<'a> FromSqlValue<'a> for TsVector {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?
            .trim();
        if text.is_empty() {
            return Ok(TsVector::default());
        }
        let mut lexemes = Vec::new();
        for token in text.split_whitespace() {
            let (word_part, pos_part) = token.split_once(':').unwrap_or((token, ""));
            let word = word_part
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .unwrap_or(word_part)
                .replace("''", "'");
            let positions = parse_positions(oid, name, pos_part)?;
            lexemes.push(Lexeme { word, positions });
        }
        Ok(TsVector { lexemes }.canonicalize())
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated tsvector header"));
        }
        let count = wire::read_i32(oid, name, &bytes[0..4])?;
        let count = usize::try_from(count).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "negative lexeme count"))?;
        let mut rest = &bytes[4..];
        let mut lexemes = Vec::with_capacity(count);
        for _ in 0..count {
            let nul = rest
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "unterminated lexeme"))?;
            let word = core::str::from_utf8(&rest[..nul])
                .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "lexeme is not valid UTF-8"))?
                .to_owned();
            rest = &rest[nul + 1..];
            if rest.len() < 2 {
                return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated position count"));
            }
            let npos = wire::read_u16(oid, name, &rest[0..2])?;
            rest = &rest[2..];
            let npos = usize::from(npos);
            if rest.len() < npos * 2 {
                return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated position list"));
            }
            let mut positions = Vec::with_capacity(npos);
            for chunk in rest[..npos * 2].chunks_exact(2) {
                let raw = wire::read_u16(oid, name, chunk)?;
                let pos = raw & 0x3FFF;
                let weight = Weight::from_bits(u8::try_from(raw >> 14).unwrap_or(0));
                positions.push((pos, weight));
            }
            rest = &rest[npos * 2..];
            lexemes.push(Lexeme { word, positions });
        }
        Ok(TsVector { lexemes }.canonicalize())
    }
}

const MAX_LEXEME_BYTES: usize = 2046;
const MAX_POSITION: u16 = 16383;
const MAX_POSITIONS_PER_LEXEME: usize = 255;

fn check_bounds(oid: Oid, name: Option<&str>, vector: &TsVector) -> Result<()> {
    for lexeme in &vector.lexemes {
        if lexeme.word.len() > MAX_LEXEME_BYTES {
            return Err(Error::range_violation(format!(
                "tsvector lexeme {:?} is {} bytes, exceeding the {MAX_LEXEME_BYTES}-byte limit",
                lexeme.word,
                lexeme.word.len()
            )));
        }
        if lexeme.positions.len() > MAX_POSITIONS_PER_LEXEME {
            return Err(Error::range_violation(format!(
                "tsvector lexeme {:?} has {} positions, exceeding the {MAX_POSITIONS_PER_LEXEME}-position limit",
                lexeme.word,
                lexeme.positions.len()
            )));
        }
        for (pos, _) in &lexeme.positions {
            if *pos == 0 || *pos > MAX_POSITION {
                return Err(Error::range_violation(format!("tsvector position {pos} is outside 1..={MAX_POSITION}")));
            }
        }
    }
    let _ = (oid, name);
    Ok(())
}

impl ToSqlValue for TsVector {
    fn natural_oid(&self) -> Oid {
        oid::TSVECTOR
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let canonical = self.clone().canonicalize();
        check_bounds(oid, name, &canonical)?;
        let rendered: Vec<String> = canonical
            .lexemes
            .iter()
            .map(|lex| {
                let escaped = lex.word.replace('\'', "''");
                if lex.positions.is_empty() {
                    format!("'{escaped}'")
                } else {
                    let positions: Vec<String> = lex
                        .positions
                        .iter()
                        .map(|(pos, weight)| match weight {
                            Weight::D => pos.to_string(),
                            Weight::A => format!("{pos}A"),
                            Weight::B => format!("{pos}B"),
                            Weight::C => format!("{pos}C"),
                        })
                        .collect();
                    format!("'{escaped}':{}", positions.join(","))
                }
            })
            .collect();
        buf.extend_from_slice(rendered.join(" ").as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let canonical = self.clone().canonicalize();
        check_bounds(oid, name, &canonical)?;
        wire::put_i32(buf, i32::try_from(canonical.lexemes.len()).map_err(|_| Error::overflow("tsvector lexeme count", "i32"))?);
        for lex in &canonical.lexemes {
            buf.extend_from_slice(lex.word.as_bytes());
            buf.push(0);
            wire::put_u16(buf, u16::try_from(lex.positions.len()).map_err(|_| Error::overflow("tsvector position count", "u16"))?);
            for (pos, weight) in &lex.positions {
                let raw = (pos & 0x3FFF) | (u16::from(weight.to_bits()) << 14);
                wire::put_u16(buf, raw);
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
        let vector = TsVector::from_sql_text(oid::TSVECTOR, None, b"'cat':1A 'dog':2,3").unwrap();
        let mut buf = Vec::new();
        vector.encode_text(oid::TSVECTOR, None, &mut buf).unwrap();
        let decoded = TsVector::from_sql_text(oid::TSVECTOR, None, &buf).unwrap();
        assert_eq!(decoded, vector);
    }

    #[test]
    fn binary_round_trip() {
        let vector = TsVector { lexemes: vec![Lexeme { word: "cat".to_owned(), positions: vec![(1, Weight::A), (2, Weight::D)] }] };
        let mut buf = Vec::new();
        vector.encode_binary(oid::TSVECTOR, None, &mut buf).unwrap();
        let decoded = TsVector::from_sql_binary(oid::TSVECTOR, None, &buf).unwrap();
        assert_eq!(decoded, vector);
    }

    #[test]
    fn encode_canonicalizes_lexemes_and_positions() {
        let vector = TsVector {
            lexemes: vec![
                Lexeme { word: "zebra".to_owned(), positions: vec![] },
                Lexeme { word: "apple".to_owned(), positions: vec![(5, Weight::D), (3, Weight::B), (5, Weight::D), (1, Weight::A)] },
            ],
        };
        let mut buf = Vec::new();
        vector.encode_text(oid::TSVECTOR, None, &mut buf).unwrap();
        assert_eq!(core::str::from_utf8(&buf).unwrap(), "'apple':1A,3B,5 'zebra'");
    }

    #[test]
    fn encode_rejects_oversized_word() {
        let vector = TsVector { lexemes: vec![Lexeme { word: "x".repeat(2047), positions: vec![] }] };
        let mut buf = Vec::new();
        let err = vector.encode_text(oid::TSVECTOR, None, &mut buf).unwrap_err();
        assert!(matches!(err, Error::RangeViolation(_)));
    }

    #[test]
    fn encode_rejects_position_out_of_range() {
        let vector = TsVector { lexemes: vec![Lexeme { word: "cat".to_owned(), positions: vec![(16384, Weight::D)] }] };
        let mut buf = Vec::new();
        let err = vector.encode_binary(oid::TSVECTOR, None, &mut buf).unwrap_err();
        assert!(matches!(err, Error::RangeViolation(_)));
    }

    #[test]
    fn encode_rejects_too_many_positions() {
        let positions = (1..=256u16).map(|p| (p, Weight::D)).collect();
        let vector = TsVector { lexemes: vec![Lexeme { word: "cat".to_owned(), positions }] };
        let mut buf = Vec::new();
        let err = vector.encode_binary(oid::TSVECTOR, None, &mut buf).unwrap_err();
        assert!(matches!(err, Error::RangeViolation(_)));
    }
}
