//! date/time/timestamp/timestamptz/interval codecs. Binary encodings count
//! from the PostgreSQL epoch (2000-01-01) rather than the Unix epoch;
//! `i64::MAX`/`i64::MIN` microseconds (and the `i32` pair for dates) are the
//! reserved `infinity`/`-infinity` sentinels.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, InfinityModifier, IsNull};
use crate::oid::{Oid, oid};
use crate::value::datetime::{PgDate, PgInterval, PgTimestamp, PgTimestamptz};
use crate::wire;

const USECS_PER_SEC: i64 = 1_000_000;

fn pg_epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

/// Splits PostgreSQL's ` BC` era suffix off a date/timestamp literal. Year
/// N BC is internal year `-(N-1)`, so `0001-01-01 BC` is year zero.
fn strip_bc_suffix(text: &str) -> (&str, bool) {
    match text.strip_suffix(" BC") {
        Some(body) => (body, true),
        None => (text, false),
    }
}

fn to_bc_year<T: Datelike>(value: T) -> Option<T> {
    value.with_year(1 - value.year())
}

fn pg_epoch_datetime() -> NaiveDateTime {
    pg_epoch_date().and_hms_opt(0, 0, 0).unwrap_or_default()
}

// ---- date ----

impl<'a> FromSqlValue<'a> for NaiveDate {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        let (body, bc) = strip_bc_suffix(text);
        let date = NaiveDate::parse_from_str(body, "%Y-%m-%d")
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not a valid date"))?;
        if bc {
            to_bc_year(date).ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "date out of range"))
        } else {
            Ok(date)
        }
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let days = wire::read_i32(oid, name, bytes)?;
        if days == i32::MIN || days == i32::MAX {
            return Err(Error::UnsupportedInfinity { oid, name: name.map(str::to_owned) });
        }
        pg_epoch_date()
            .checked_add_signed(chrono::Duration::days(i64::from(days)))
            .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "date out of range"))
    }
}

impl ToSqlValue for NaiveDate {
    fn natural_oid(&self) -> Oid {
        oid::DATE
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        if self.year() <= 0 {
            buf.extend_from_slice(
                format!("{:04}-{:02}-{:02} BC", 1 - self.year(), self.month(), self.day()).as_bytes(),
            );
        } else {
            buf.extend_from_slice(self.format("%Y-%m-%d").to_string().as_bytes());
        }
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let days = self.signed_duration_since(pg_epoch_date()).num_days();
        wire::put_i32(buf, i32::try_from(days).map_err(|_| Error::overflow("date", "i32 days"))?);
        Ok(IsNull::No)
    }
}

impl<'a> FromSqlValue<'a> for PgDate {
    fn from_sql_null(oid: Oid, name: Option<&str>, format: FormatCode) -> Result<Self> {
        Err(Error::null_assignment(oid, name.map(str::to_owned), format, "PgDate"))
    }

    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        match text {
            "infinity" => Ok(PgDate { value: pg_epoch_date(), infinity: InfinityModifier::Infinity }),
            "-infinity" => Ok(PgDate { value: pg_epoch_date(), infinity: InfinityModifier::NegativeInfinity }),
            _ => NaiveDate::from_sql_text(oid, name, bytes).map(|value| PgDate { value, infinity: InfinityModifier::Finite }),
        }
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let days = wire::read_i32(oid, name, bytes)?;
        match days {
            i32::MAX => Ok(PgDate { value: pg_epoch_date(), infinity: InfinityModifier::Infinity }),
            i32::MIN => Ok(PgDate { value: pg_epoch_date(), infinity: InfinityModifier::NegativeInfinity }),
            _ => NaiveDate::from_sql_binary(oid, name, bytes).map(|value| PgDate { value, infinity: InfinityModifier::Finite }),
        }
    }
}

impl ToSqlValue for PgDate {
    fn natural_oid(&self) -> Oid {
        oid::DATE
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        match self.infinity {
            InfinityModifier::Infinity => buf.extend_from_slice(b"infinity"),
            InfinityModifier::NegativeInfinity => buf.extend_from_slice(b"-infinity"),
            InfinityModifier::Finite => return self.value.encode_text(oid, name, buf),
        }
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        match self.infinity {
            InfinityModifier::Infinity => wire::put_i32(buf, i32::MAX),
            InfinityModifier::NegativeInfinity => wire::put_i32(buf, i32::MIN),
            InfinityModifier::Finite => return self.value.encode_binary(oid, name, buf),
        }
        Ok(IsNull::No)
    }
}

// ---- time ----

impl<'a> FromSqlValue<'a> for NaiveTime {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not a valid time"))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let micros = wire::read_i64(oid, name, bytes)?;
        let secs = micros.div_euclid(USECS_PER_SEC);
        let remainder_micros = micros.rem_euclid(USECS_PER_SEC);
        let secs = u32::try_from(secs).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "time out of range"))?;
        NaiveTime::from_num_seconds_from_midnight_opt(secs, u32::try_from(remainder_micros * 1000).unwrap_or(0))
            .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "time out of range"))
    }
}

impl ToSqlValue for NaiveTime {
    fn natural_oid(&self) -> Oid {
        oid::TIME
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(self.format("%H:%M:%S%.6f").to_string().as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let micros =
            i64::from(self.num_seconds_from_midnight()) * USECS_PER_SEC + i64::from(self.nanosecond()) / 1000;
        wire::put_i64(buf, micros);
        Ok(IsNull::No)
    }
}

// ---- timestamp ----

impl<'a> FromSqlValue<'a> for NaiveDateTime {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        let (body, bc) = strip_bc_suffix(text);
        let ts = NaiveDateTime::parse_from_str(body, "%Y-%m-%d %H:%M:%S%.f")
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not a valid timestamp"))?;
        if bc {
            to_bc_year(ts).ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "timestamp out of range"))
        } else {
            Ok(ts)
        }
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let micros = wire::read_i64(oid, name, bytes)?;
        if micros == i64::MIN || micros == i64::MAX {
            return Err(Error::UnsupportedInfinity { oid, name: name.map(str::to_owned) });
        }
        pg_epoch_datetime()
            .checked_add_signed(chrono::Duration::microseconds(micros))
            .ok_or_else(|| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "timestamp out of range"))
    }
}

impl ToSqlValue for NaiveDateTime {
    fn natural_oid(&self) -> Oid {
        oid::TIMESTAMP
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        if self.year() <= 0 {
            let shifted = to_bc_year(*self).ok_or_else(|| Error::overflow("timestamp year", "BC notation"))?;
            buf.extend_from_slice(shifted.format("%Y-%m-%d %H:%M:%S%.6f BC").to_string().as_bytes());
        } else {
            buf.extend_from_slice(self.format("%Y-%m-%d %H:%M:%S%.6f").to_string().as_bytes());
        }
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let micros = self.signed_duration_since(pg_epoch_datetime()).num_microseconds()
            .ok_or_else(|| Error::overflow("timestamp", "i64 microseconds"))?;
        wire::put_i64(buf, micros);
        Ok(IsNull::No)
    }
}

impl<'a> FromSqlValue<'a> for PgTimestamp {
    fn from_sql_null(oid: Oid, name: Option<&str>, format: FormatCode) -> Result<Self> {
        Err(Error::null_assignment(oid, name.map(str::to_owned), format, "PgTimestamp"))
    }

    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        match text {
            "infinity" => Ok(PgTimestamp { value: pg_epoch_datetime(), infinity: InfinityModifier::Infinity }),
            "-infinity" => Ok(PgTimestamp { value: pg_epoch_datetime(), infinity: InfinityModifier::NegativeInfinity }),
            _ => NaiveDateTime::from_sql_text(oid, name, bytes).map(|value| PgTimestamp { value, infinity: InfinityModifier::Finite }),
        }
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let micros = wire::read_i64(oid, name, bytes)?;
        match micros {
            i64::MAX => Ok(PgTimestamp { value: pg_epoch_datetime(), infinity: InfinityModifier::Infinity }),
            i64::MIN => Ok(PgTimestamp { value: pg_epoch_datetime(), infinity: InfinityModifier::NegativeInfinity }),
            _ => NaiveDateTime::from_sql_binary(oid, name, bytes).map(|value| PgTimestamp { value, infinity: InfinityModifier::Finite }),
        }
    }
}

impl ToSqlValue for PgTimestamp {
    fn natural_oid(&self) -> Oid {
        oid::TIMESTAMP
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        match self.infinity {
            InfinityModifier::Infinity => buf.extend_from_slice(b"infinity"),
            InfinityModifier::NegativeInfinity => buf.extend_from_slice(b"-infinity"),
            InfinityModifier::Finite => return self.value.encode_text(oid, name, buf),
        }
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        match self.infinity {
            InfinityModifier::Infinity => wire::put_i64(buf, i64::MAX),
            InfinityModifier::NegativeInfinity => wire::put_i64(buf, i64::MIN),
            InfinityModifier::Finite => return self.value.encode_binary(oid, name, buf),
        }
        Ok(IsNull::No)
    }
}

// ---- timestamptz ----

impl<'a> FromSqlValue<'a> for DateTime<Utc> {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z")
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not a valid timestamptz"))
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let naive = NaiveDateTime::from_sql_binary(oid, name, bytes)?;
        Ok(naive.and_utc())
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn natural_oid(&self) -> Oid {
        oid::TIMESTAMPTZ
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(self.format("%Y-%m-%d %H:%M:%S%.6f+00").to_string().as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.naive_utc().encode_binary(oid, name, buf)
    }
}

impl<'a> FromSqlValue<'a> for PgTimestamptz {
    fn from_sql_null(oid: Oid, name: Option<&str>, format: FormatCode) -> Result<Self> {
        Err(Error::null_assignment(oid, name.map(str::to_owned), format, "PgTimestamptz"))
    }

    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        match text {
            "infinity" => Ok(PgTimestamptz { value: pg_epoch_datetime().and_utc(), infinity: InfinityModifier::Infinity }),
            "-infinity" => Ok(PgTimestamptz { value: pg_epoch_datetime().and_utc(), infinity: InfinityModifier::NegativeInfinity }),
            _ => DateTime::<Utc>::from_sql_text(oid, name, bytes).map(|value| PgTimestamptz { value, infinity: InfinityModifier::Finite }),
        }
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let micros = wire::read_i64(oid, name, bytes)?;
        match micros {
            i64::MAX => Ok(PgTimestamptz { value: pg_epoch_datetime().and_utc(), infinity: InfinityModifier::Infinity }),
            i64::MIN => Ok(PgTimestamptz { value: pg_epoch_datetime().and_utc(), infinity: InfinityModifier::NegativeInfinity }),
            _ => DateTime::<Utc>::from_sql_binary(oid, name, bytes).map(|value| PgTimestamptz { value, infinity: InfinityModifier::Finite }),
        }
    }
}

impl ToSqlValue for PgTimestamptz {
    fn natural_oid(&self) -> Oid {
        oid::TIMESTAMPTZ
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        match self.infinity {
            InfinityModifier::Infinity => buf.extend_from_slice(b"infinity"),
            InfinityModifier::NegativeInfinity => buf.extend_from_slice(b"-infinity"),
            InfinityModifier::Finite => return self.value.encode_text(oid, name, buf),
        }
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        match self.infinity {
            InfinityModifier::Infinity => wire::put_i64(buf, i64::MAX),
            InfinityModifier::NegativeInfinity => wire::put_i64(buf, i64::MIN),
            InfinityModifier::Finite => return self.value.encode_binary(oid, name, buf),
        }
        Ok(IsNull::No)
    }
}

// ---- interval ----

/// Parses a single `[+-]?HH:MM:SS[.ffffff]` clock component into
/// microseconds, as PostgreSQL's `interval_in` does for the trailing time
/// portion of an interval literal.
fn parse_interval_time(oid: Oid, name: Option<&str>, tok: &str) -> Result<i64> {
    let bad = || Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not a valid interval");
    let (negative, rest) = match tok.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, tok.strip_prefix('+').unwrap_or(tok)),
    };
    let mut parts = rest.split(':');
    let hours: i64 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let minutes: i64 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let sec_field = parts.next().ok_or_else(bad)?;
    if parts.next().is_some() {
        return Err(bad());
    }
    let (sec_part, frac_part) = sec_field.split_once('.').unwrap_or((sec_field, ""));
    let seconds: i64 = sec_part.parse().map_err(|_| bad())?;
    let mut frac_digits = frac_part.to_owned();
    frac_digits.truncate(6);
    while frac_digits.len() < 6 {
        frac_digits.push('0');
    }
    let frac_micros: i64 = if frac_digits.is_empty() { 0 } else { frac_digits.parse().map_err(|_| bad())? };
    let total = hours * 3_600_000_000 + minutes * 60_000_000 + seconds * 1_000_000 + frac_micros;
    Ok(if negative { -total } else { total })
}

impl<'a> FromSqlValue<'a> for PgInterval {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let bad = || Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not a valid interval");
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?
            .trim();

        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut months: i64 = 0;
        let mut days: i64 = 0;
        let mut microseconds: i64 = 0;
        let mut i = 0;
        while i < tokens.len() {
            let tok = tokens[i];
            if tok.contains(':') {
                microseconds += parse_interval_time(oid, name, tok)?;
                i += 1;
                continue;
            }
            let amount: i64 = tok.parse().map_err(|_| bad())?;
            let unit = tokens.get(i + 1).ok_or_else(bad)?;
            let unit = unit.trim_end_matches('s').to_ascii_lowercase();
            match unit.as_str() {
                "year" => months += amount * 12,
                "mon" | "month" => months += amount,
                "day" => days += amount,
                _ => return Err(bad()),
            }
            i += 2;
        }

        Ok(PgInterval {
            months: i32::try_from(months).map_err(|_| Error::overflow("interval", "i32 months"))?,
            days: i32::try_from(days).map_err(|_| Error::overflow("interval", "i32 days"))?,
            microseconds,
        })
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() != 16 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "expected 16 bytes"));
        }
        let microseconds = wire::read_i64(oid, name, &bytes[0..8])?;
        let days = wire::read_i32(oid, name, &bytes[8..12])?;
        let months = wire::read_i32(oid, name, &bytes[12..16])?;
        Ok(PgInterval { months, days, microseconds })
    }
}

impl ToSqlValue for PgInterval {
    fn natural_oid(&self) -> Oid {
        oid::INTERVAL
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let mut parts = Vec::new();
        if self.months != 0 {
            let years = self.months / 12;
            let mons = self.months % 12;
            if years != 0 {
                parts.push(format!("{years} year{}", if years.abs() == 1 { "" } else { "s" }));
            }
            if mons != 0 {
                parts.push(format!("{mons} mon{}", if mons.abs() == 1 { "" } else { "s" }));
            }
        }
        if self.days != 0 {
            parts.push(format!("{} day{}", self.days, if self.days.abs() == 1 { "" } else { "s" }));
        }
        if self.microseconds != 0 || parts.is_empty() {
            let negative = self.microseconds < 0;
            let mut rest = self.microseconds.unsigned_abs();
            let hours = rest / 3_600_000_000;
            rest %= 3_600_000_000;
            let minutes = rest / 60_000_000;
            rest %= 60_000_000;
            let seconds = rest / 1_000_000;
            let micros = rest % 1_000_000;
            let mut time = format!("{:02}:{:02}:{:02}", hours, minutes, seconds);
            if micros != 0 {
                let frac = format!("{micros:06}");
                time.push('.');
                time.push_str(frac.trim_end_matches('0'));
            }
            parts.push(if negative { format!("-{time}") } else { time });
        }
        buf.extend_from_slice(parts.join(" ").as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        wire::put_i64(buf, self.microseconds);
        wire::put_i32(buf, self.days);
        wire::put_i32(buf, self.months);
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_text_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let mut buf = Vec::new();
        date.encode_text(oid::DATE, None, &mut buf).unwrap();
        assert_eq!(NaiveDate::from_sql_text(oid::DATE, None, &buf).unwrap(), date);
    }

    #[test]
    fn bc_date_text_round_trip() {
        // Year 10 BC is internal year -9.
        let date = NaiveDate::from_ymd_opt(-9, 3, 15).unwrap();
        let mut buf = Vec::new();
        date.encode_text(oid::DATE, None, &mut buf).unwrap();
        assert_eq!(buf, b"0010-03-15 BC");
        assert_eq!(NaiveDate::from_sql_text(oid::DATE, None, &buf).unwrap(), date);
    }

    #[test]
    fn bc_timestamp_text_round_trip() {
        let ts = NaiveDate::from_ymd_opt(0, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let mut buf = Vec::new();
        ts.encode_text(oid::TIMESTAMP, None, &mut buf).unwrap();
        assert!(buf.ends_with(b" BC"));
        assert_eq!(NaiveDateTime::from_sql_text(oid::TIMESTAMP, None, &buf).unwrap(), ts);
    }

    #[test]
    fn timestamp_binary_round_trip() {
        let ts = pg_epoch_datetime() + chrono::Duration::days(1);
        let mut buf = Vec::new();
        ts.encode_binary(oid::TIMESTAMP, None, &mut buf).unwrap();
        assert_eq!(NaiveDateTime::from_sql_binary(oid::TIMESTAMP, None, &buf).unwrap(), ts);
    }

    #[test]
    fn pg_timestamp_infinity_round_trips_through_binary() {
        let value = PgTimestamp { value: pg_epoch_datetime(), infinity: InfinityModifier::Infinity };
        let mut buf = Vec::new();
        value.encode_binary(oid::TIMESTAMP, None, &mut buf).unwrap();
        let decoded = PgTimestamp::from_sql_binary(oid::TIMESTAMP, None, &buf).unwrap();
        assert_eq!(decoded.infinity, InfinityModifier::Infinity);
    }

    #[test]
    fn plain_timestamp_rejects_infinity() {
        let bytes = i64::MAX.to_be_bytes();
        let err = NaiveDateTime::from_sql_binary(oid::TIMESTAMP, None, &bytes).unwrap_err();
        assert!(matches!(err, Error::UnsupportedInfinity { .. }));
    }

    #[test]
    fn interval_binary_round_trip() {
        let interval = PgInterval { months: 1, days: 2, microseconds: 3 };
        let mut buf = Vec::new();
        interval.encode_binary(oid::INTERVAL, None, &mut buf).unwrap();
        let decoded = PgInterval::from_sql_binary(oid::INTERVAL, None, &buf).unwrap();
        assert_eq!(decoded, interval);
    }

    #[test]
    fn interval_text_encode_matches_postgres_canonical_form() {
        let interval = PgInterval { months: 14, days: 3, microseconds: 3_661_500_000 };
        let mut buf = Vec::new();
        interval.encode_text(oid::INTERVAL, None, &mut buf).unwrap();
        assert_eq!(buf, b"1 year 2 mons 3 days 01:01:01.5");
    }

    #[test]
    fn interval_text_round_trip() {
        let interval = PgInterval { months: -13, days: 1, microseconds: -7_384_000_000 };
        let mut buf = Vec::new();
        interval.encode_text(oid::INTERVAL, None, &mut buf).unwrap();
        let decoded = PgInterval::from_sql_text(oid::INTERVAL, None, &buf).unwrap();
        assert_eq!(decoded, interval);
    }

    #[test]
    fn interval_text_parses_bare_time() {
        let decoded = PgInterval::from_sql_text(oid::INTERVAL, None, b"01:02:03").unwrap();
        assert_eq!(decoded, PgInterval { months: 0, days: 0, microseconds: 3_723_000_000 });
    }
}
