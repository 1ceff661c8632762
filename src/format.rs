//! Wire format code and the tri-state infinity modifier.

/// Data format code in the PostgreSQL extended query protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum FormatCode {
    #[default]
    Text = 0,
    Binary = 1,
}

impl FormatCode {
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => FormatCode::Binary,
            _ => FormatCode::Text,
        }
    }
}

impl From<u16> for FormatCode {
    fn from(value: u16) -> Self {
        Self::from_u16(value)
    }
}

/// Whether an `encode` call produced a value or a SQL NULL. The framing layer
/// (outside this crate) is responsible for emitting the length prefix; a
/// plan only ever appends payload bytes and reports which case applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsNull {
    No,
    Yes,
}

/// Tri-state infinity marker carried by date/time and numeric carriers.
/// Overrides the value fields when not `Finite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InfinityModifier {
    NegativeInfinity,
    #[default]
    Finite,
    Infinity,
}

impl InfinityModifier {
    pub fn is_finite(self) -> bool {
        matches!(self, InfinityModifier::Finite)
    }
}
