//! The codec contract: every destination/source type this
//! crate can scan into or encode from implements [`FromSqlValue`] and/or
//! [`ToSqlValue`] directly. Types that only implement a narrow
//! `crate::capability` trait reach these through `crate::wrapper`'s bridge
//! newtypes instead of through a blanket impl, so there is never more than
//! one applicable impl for a given concrete type (Rust's coherence rules
//! would reject overlapping blanket impls across capabilities anyway).

pub mod array;
pub mod bits;
pub mod bytea;
pub mod composite;
pub mod datetime;
pub mod float;
pub mod geometric;
pub mod hstore;
pub mod integer;
pub mod json;
pub mod multirange;
pub mod network;
pub mod numeric;
pub mod range;
pub mod special;
pub mod text;
pub mod tsvector;
pub mod uuid_codec;

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::format::{FormatCode, IsNull};
use crate::oid::Oid;

thread_local! {
    static ELEMENT_SCOPE: RefCell<Vec<Arc<HashMap<Oid, Oid>>>> = RefCell::new(Vec::new());
}

/// Runs `f` with `table` as the innermost container→element OID scope. The
/// `Map` entry points install their registry's table here so the array,
/// range, and multirange codecs can resolve element OIDs for extension
/// containers without every codec signature carrying a registry reference.
pub(crate) fn with_element_table<R>(table: Arc<HashMap<Oid, Oid>>, f: impl FnOnce() -> R) -> R {
    ELEMENT_SCOPE.with(|stack| stack.borrow_mut().push(table));
    let result = f();
    ELEMENT_SCOPE.with(|stack| {
        stack.borrow_mut().pop();
    });
    result
}

/// Element OID for an array, base OID for a range, range OID for a
/// multirange: the innermost in-scope registry first (installed by the
/// `Map` entry points), then the built-in catalog.
pub fn element_of(container: Oid) -> Option<Oid> {
    ELEMENT_SCOPE
        .with(|stack| stack.borrow().last().and_then(|table| table.get(&container).copied()))
        .or_else(|| crate::oid::builtin_element_of(container))
}

/// [`element_of`], falling back to the container OID itself when nothing is
/// registered for it. The fallback keeps element types whose codecs ignore
/// the OID working for unregistered containers.
pub(crate) fn element_or_self(container: Oid) -> Oid {
    element_of(container).unwrap_or(container)
}

/// Decodes wire bytes of a known OID and format into `Self`.
///
/// `oid` is always the OID of the value being scanned itself; the array,
/// range, and multirange codecs resolve their element's OID from it via
/// [`element_of`] rather than expecting the caller to pass the element OID.
///
/// `'a` lets borrowing destinations (`&'a str`, `&'a [u8]`) reuse the wire
/// buffer instead of copying; owned destinations simply ignore the lifetime.
pub trait FromSqlValue<'a>: Sized {
    /// Called for a SQL NULL. The default rejects it; nullable destinations
    /// (`Option<T>`, the `Pg*` carriers) override this.
    fn from_sql_null(oid: Oid, name: Option<&str>, format: FormatCode) -> Result<Self> {
        Err(crate::error::Error::null_assignment(
            oid,
            name.map(str::to_owned),
            format,
            core::any::type_name::<Self>(),
        ))
    }

    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self>;

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self>;
}

/// Encodes `Self` into wire bytes for a target OID and format.
///
/// `oid` is always the OID of `Self`'s own target type — an array encode
/// receives the array OID, never the element OID. Container codecs resolve
/// their element's OID internally via [`element_of`].
pub trait ToSqlValue {
    /// The OID this type would choose for itself when the caller hasn't
    /// named one. Zero means "no preference"; the registry's default-type
    /// table decides then.
    fn natural_oid(&self) -> Oid;

    /// `true` when this value represents SQL NULL; `encode_text`/
    /// `encode_binary` are not called in that case. Only the nullable
    /// wrapper and carrier types ever return `true` here.
    fn is_null(&self) -> bool {
        false
    }

    fn encode_text(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull>;

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull>;
}

/// Dispatches to [`ToSqlValue::encode_text`]/[`ToSqlValue::encode_binary`] by
/// format, and short-circuits on NULL. Every encode call site in the planner
/// and in composite/array/range codecs goes through this instead of the raw
/// trait methods.
pub fn encode<T: ToSqlValue>(
    value: &T,
    oid: Oid,
    name: Option<&str>,
    format: FormatCode,
    buf: &mut Vec<u8>,
) -> Result<IsNull> {
    if value.is_null() {
        return Ok(IsNull::Yes);
    }
    match format {
        FormatCode::Text => value.encode_text(oid, name, buf),
        FormatCode::Binary => value.encode_binary(oid, name, buf),
    }
}

/// Dispatches to [`FromSqlValue`] by format, routing through
/// `from_sql_null` when `src` is `None`.
pub fn scan<'a, T: FromSqlValue<'a>>(
    oid: Oid,
    name: Option<&str>,
    format: FormatCode,
    src: Option<&'a [u8]>,
) -> Result<T> {
    match src {
        None => T::from_sql_null(oid, name, format),
        Some(bytes) => match format {
            FormatCode::Text => T::from_sql_text(oid, name, bytes),
            FormatCode::Binary => T::from_sql_binary(oid, name, bytes),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::oid;

    #[test]
    fn encode_short_circuits_on_null() {
        let value: Option<i32> = None;
        let mut buf = Vec::new();
        let is_null = encode(&value, oid::INT4, None, FormatCode::Binary, &mut buf).unwrap();
        assert_eq!(is_null, IsNull::Yes);
        assert!(buf.is_empty());
    }

    #[test]
    fn scan_routes_null_source_through_from_sql_null() {
        let decoded: Option<i32> = scan(oid::INT4, None, FormatCode::Binary, None).unwrap();
        assert_eq!(decoded, None);
    }

    #[test]
    fn scan_routes_present_source_by_format() {
        let decoded: i32 = scan(oid::INT4, None, FormatCode::Text, Some(b"5")).unwrap();
        assert_eq!(decoded, 5);
    }
}
