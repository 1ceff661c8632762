//! Error taxonomy for the type codec registry and planner.
//!
//! Every variant is recoverable by the caller; none of them abort the
//! process. Messages name the OID (numerically and, when known, by
//! registered name), the wire format, and the destination or source shape.

use thiserror::Error;

use crate::format::FormatCode;
use crate::oid::Oid;

/// Result type for this crate's operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Formats an OID for error messages: numerically, plus the registered name
/// when the caller has one on hand.
fn describe_oid(oid: Oid, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{name} (oid {oid})"),
        None => format!("oid {oid}"),
    }
}

fn describe_format(format: FormatCode) -> &'static str {
    match format {
        FormatCode::Text => "text",
        FormatCode::Binary => "binary",
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// NULL bytes scanned into a destination that cannot represent NULL.
    #[error("cannot assign NULL ({}, {}) into non-nullable destination {shape}", describe_oid(*oid, name.as_deref()), describe_format(*format))]
    NullAssignment { oid: Oid, name: Option<String>, format: FormatCode, shape: &'static str },

    /// A value's magnitude does not fit in the destination's representable range.
    #[error("value out of range converting {from} to {to}")]
    Overflow { from: &'static str, to: &'static str },

    /// The codec does not support the requested wire format.
    #[error("{} does not support {} format", describe_oid(*oid, name.as_deref()), describe_format(*format))]
    FormatMismatch { oid: Oid, name: Option<String>, format: FormatCode },

    /// Malformed wire bytes: truncated length prefix, wrong fixed-size
    /// length, invalid UTF-8 where required, or a bad sentinel value.
    #[error("invalid wire bytes for {} ({}): {reason}", describe_oid(*oid, name.as_deref()), describe_format(*format))]
    WireFormatInvalid { oid: Oid, name: Option<String>, format: FormatCode, reason: String },

    /// No codec, wrapper chain, or bridge could resolve the destination for
    /// this `(oid, format)` pair.
    #[error("no plan found for {} ({}) into {shape}", describe_oid(*oid, name.as_deref()), describe_format(*format))]
    PlanNotFound { oid: Oid, name: Option<String>, format: FormatCode, shape: &'static str },

    /// An infinity value was scanned into a carrier unable to represent it.
    #[error("{} does not support an infinite value", describe_oid(*oid, name.as_deref()))]
    UnsupportedInfinity { oid: Oid, name: Option<String> },

    /// A value-level invariant failed (duplicate hstore key, ragged array,
    /// out-of-range tsvector position, malformed range bounds, ...).
    #[error("value invariant violated: {0}")]
    RangeViolation(String),

    /// The encode bridge recursed on an identical destination shape; this is
    /// the cycle-break for the scalar-valuer re-encode compatibility path.
    #[error("encode bridge recursed without making progress on shape {0}")]
    Cycle(&'static str),
}

impl Error {
    pub fn overflow(from: &'static str, to: &'static str) -> Self {
        Error::Overflow { from, to }
    }

    pub fn format_mismatch(oid: Oid, name: Option<String>, format: FormatCode) -> Self {
        Error::FormatMismatch { oid, name, format }
    }

    pub fn wire_invalid(
        oid: Oid,
        name: Option<String>,
        format: FormatCode,
        reason: impl Into<String>,
    ) -> Self {
        Error::WireFormatInvalid { oid, name, format, reason: reason.into() }
    }

    pub fn plan_not_found(
        oid: Oid,
        name: Option<String>,
        format: FormatCode,
        shape: &'static str,
    ) -> Self {
        Error::PlanNotFound { oid, name, format, shape }
    }

    pub fn null_assignment(
        oid: Oid,
        name: Option<String>,
        format: FormatCode,
        shape: &'static str,
    ) -> Self {
        Error::NullAssignment { oid, name, format, shape }
    }

    pub fn range_violation(msg: impl Into<String>) -> Self {
        Error::RangeViolation(msg.into())
    }
}
