//! NUMERIC carrier: PostgreSQL's `numeric` is an
//! arbitrary-precision decimal `coefficient * 10^exponent`, plus NaN and the
//! two signed infinities that no fixed-width type can represent.
//!
//! The finite case carries its coefficient as a decimal digit string rather
//! than a fixed-width integer: `rust_decimal::Decimal` tops out at a 96-bit
//! mantissa and a scale of 28, well short of PostgreSQL's own limits (dscale
//! up to 16383, over a hundred thousand digits before the point), so a
//! digit-string coefficient is the only representation that round-trips
//! every value the wire format can carry.

/// Base for the wire format's digit groups (PostgreSQL `NBASE`).
pub const NBASE: i32 = 10_000;
pub const NUMERIC_POS: u16 = 0x0000;
pub const NUMERIC_NEG: u16 = 0x4000;
pub const NUMERIC_NAN: u16 = 0xC000;
pub const NUMERIC_PINF: u16 = 0xD000;
pub const NUMERIC_NINF: u16 = 0xF000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Numeric {
    /// `coefficient * 10^exponent`. `digits` is the unsigned decimal digit
    /// string of the coefficient (no sign, no point); `negative` carries the
    /// sign separately so an all-zero coefficient never needs a sign bit of
    /// its own.
    Value { negative: bool, digits: String, exponent: i32 },
    NaN,
    Infinity,
    NegativeInfinity,
}

impl Default for Numeric {
    fn default() -> Self {
        Numeric::zero()
    }
}

impl Numeric {
    pub fn is_finite(&self) -> bool {
        matches!(self, Numeric::Value { .. })
    }

    pub fn zero() -> Self {
        Numeric::Value { negative: false, digits: "0".to_owned(), exponent: 0 }
    }

    /// `(negative, digits, exponent)` for a finite value; `None` for
    /// NaN/Infinity/-Infinity.
    pub fn finite(&self) -> Option<(bool, &str, i32)> {
        match self {
            Numeric::Value { negative, digits, exponent } => Some((*negative, digits.as_str(), *exponent)),
            _ => None,
        }
    }
}

/// Strips leading zeros from a decimal digit string, collapsing an all-zero
/// string down to `"0"` rather than the empty string.
pub(crate) fn trim_leading_zeros(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() { "0".to_owned() } else { trimmed.to_owned() }
}

/// Renders `negative * digits * 10^exponent` as a plain decimal literal,
/// PostgreSQL's NUMERIC text form.
pub(crate) fn render_decimal_text(negative: bool, digits: &str, exponent: i32) -> String {
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if exponent >= 0 {
        out.push_str(digits);
        for _ in 0..exponent {
            out.push('0');
        }
        return out;
    }
    let frac_len = usize::try_from(-exponent).unwrap_or(usize::MAX);
    if digits.len() <= frac_len {
        out.push_str("0.");
        for _ in 0..(frac_len - digits.len()) {
            out.push('0');
        }
        out.push_str(digits);
    } else {
        let split = digits.len() - frac_len;
        out.push_str(&digits[..split]);
        out.push('.');
        out.push_str(&digits[split..]);
    }
    out
}

impl core::fmt::Display for Numeric {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Numeric::Value { negative, digits, exponent } => write!(f, "{}", render_decimal_text(*negative, digits, *exponent)),
            Numeric::NaN => write!(f, "NaN"),
            Numeric::Infinity => write!(f, "Infinity"),
            Numeric::NegativeInfinity => write!(f, "-Infinity"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_small_fraction_with_leading_zero() {
        assert_eq!(render_decimal_text(false, "314", -2), "3.14");
        assert_eq!(render_decimal_text(true, "5", -3), "-0.005");
    }

    #[test]
    fn renders_trailing_integer_zeros() {
        assert_eq!(render_decimal_text(false, "12", 2), "1200");
    }

    #[test]
    fn trims_leading_zeros_but_keeps_one() {
        assert_eq!(trim_leading_zeros("000"), "0");
        assert_eq!(trim_leading_zeros("007"), "7");
    }
}
