//! OID resolution: deciding which OID a scan or encode runs against when
//! the caller hasn't named one, and the bounded NULL-scan probe for sources
//! with no usable type information at all.
//!
//! The wrapper chain needs no code here — `Option<T>`, `Vec<T>` and
//! `Array2<T>` resolve their own recursion through ordinary generic dispatch
//! in `codec::scan`/`codec::encode` (see `wrapper.rs`). What's left for a
//! planner to do is the part generic dispatch can't do for free: picking an
//! OID out of the registry when none was supplied.

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::FormatCode;
use crate::map::Map;
use crate::oid::Oid;

/// Resolves OIDs against a [`Map`] and runs the resulting scan/encode. Stateless
/// beyond the `&Map` it borrows — constructing one is free.
pub struct Planner<'m> {
    map: &'m Map,
}

impl<'m> Planner<'m> {
    pub fn new(map: &'m Map) -> Self {
        Planner { map }
    }

    /// Resolves the OID a scan into `T` should use: the caller's explicit
    /// choice, else the registry's default for `T`, else
    /// [`Error::PlanNotFound`].
    pub fn scan_oid<T: 'static>(&self, explicit: Option<Oid>) -> Result<Oid> {
        explicit
            .or_else(|| self.map.default_oid::<T>())
            .ok_or_else(|| Error::plan_not_found(0, None, FormatCode::Binary, core::any::type_name::<T>()))
    }

    /// Resolves the OID an encode of `value` should target: the caller's
    /// explicit choice, else the value's own preference
    /// ([`ToSqlValue::natural_oid`], when non-zero), else the registry's
    /// default for `T`.
    pub fn encode_oid<T: ToSqlValue + 'static>(&self, value: &T, explicit: Option<Oid>) -> Result<Oid> {
        if let Some(oid) = explicit {
            return Ok(oid);
        }
        let natural = value.natural_oid();
        if natural != 0 {
            return Ok(natural);
        }
        self.map
            .default_oid::<T>()
            .ok_or_else(|| Error::plan_not_found(0, None, FormatCode::Binary, core::any::type_name::<T>()))
    }

    /// Scans `src` into `T`, resolving the OID first when the caller didn't
    /// supply one.
    pub fn scan<'a, T: FromSqlValue<'a> + 'static>(
        &self,
        oid: Option<Oid>,
        format: FormatCode,
        src: Option<&'a [u8]>,
    ) -> Result<T> {
        let oid = self.scan_oid::<T>(oid)?;
        self.map.scan(oid, format, src)
    }

    pub fn encode<T: ToSqlValue + 'static>(
        &self,
        value: &T,
        oid: Option<Oid>,
        format: FormatCode,
        buf: &mut Vec<u8>,
    ) -> Result<crate::format::IsNull> {
        let oid = self.encode_oid(value, oid)?;
        self.map.encode(value, oid, format, buf)
    }

    /// Scans a SQL NULL into `T` against the first OID in `candidates` that
    /// the registry actually knows about, instead of walking every
    /// registered type. `candidates` is the caller's compatible-OID set for
    /// the destination shape, typically a handful of entries (e.g. `[INT4,
    /// INT8, INT2]` for an integer destination), not the whole catalog.
    pub fn scan_null_among<'a, T: FromSqlValue<'a> + 'static>(&self, candidates: &[Oid], format: FormatCode) -> Result<T> {
        for &oid in candidates {
            if self.map.type_for_oid(oid).is_some() {
                return self.map.scan(oid, format, None);
            }
        }
        Err(Error::plan_not_found(0, None, format, core::any::type_name::<T>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::oid;

    #[test]
    fn scan_oid_falls_back_to_registered_default() {
        let map = Map::new();
        map.register_default_type::<i32>(oid::INT4);
        let planner = Planner::new(&map);
        assert_eq!(planner.scan_oid::<i32>(None).unwrap(), oid::INT4);
    }

    #[test]
    fn scan_oid_prefers_explicit_choice() {
        let map = Map::new();
        map.register_default_type::<i32>(oid::INT4);
        let planner = Planner::new(&map);
        assert_eq!(planner.scan_oid::<i32>(Some(oid::INT2)).unwrap(), oid::INT2);
    }

    #[test]
    fn scan_oid_without_default_is_plan_not_found() {
        let map = Map::new();
        let planner = Planner::new(&map);
        assert!(matches!(planner.scan_oid::<i32>(None), Err(Error::PlanNotFound { .. })));
    }

    #[test]
    fn encode_oid_prefers_the_value_natural_oid() {
        let map = Map::new();
        let planner = Planner::new(&map);
        let value: i32 = 7;
        assert_eq!(planner.encode_oid(&value, None).unwrap(), oid::INT4);
    }

    #[test]
    fn scan_null_among_skips_unregistered_candidates() {
        let map = Map::new();
        let planner = Planner::new(&map);
        let result: Option<i32> = planner.scan_null_among(&[999_999, oid::INT4], FormatCode::Binary).unwrap();
        assert_eq!(result, None);
    }
}
