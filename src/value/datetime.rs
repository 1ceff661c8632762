//! Date/time carriers that can represent PostgreSQL's `infinity`/`-infinity`
//! sentinels, which plain `chrono` types cannot. Callers who
//! know their data never carries infinity can scan straight into
//! `chrono::NaiveDate`/`NaiveDateTime`/`DateTime<Utc>` instead; those impls
//! reject an infinite wire value with [`crate::error::Error::UnsupportedInfinity`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::format::InfinityModifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgDate {
    pub value: NaiveDate,
    pub infinity: InfinityModifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgTimestamp {
    pub value: NaiveDateTime,
    pub infinity: InfinityModifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgTimestamptz {
    pub value: DateTime<Utc>,
    pub infinity: InfinityModifier,
}

/// `interval`'s three independent fields; PostgreSQL never
/// folds months into days or days into microseconds since a month's length
/// is calendar-dependent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PgInterval {
    pub months: i32,
    pub days: i32,
    pub microseconds: i64,
}
