//! The type registry. A `Map` is the unit of configuration: every scan and
//! encode call goes through one, and two `Map`s never share state — there is
//! no process-global type table.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDateTime;

use crate::codec::{self, FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, InfinityModifier};
use crate::oid::{Oid, PgType, oid};
use crate::value::datetime::{PgTimestamp, PgTimestamptz};

/// Bounds applied to timestamp values crossing the wire. With
/// `infinity_enabled`, values outside `[min, max]` encode as the
/// `infinity`/`-infinity` wire sentinels, and those sentinels decode back as
/// `max`/`min` finite values instead of surfacing the infinity marker.
#[derive(Debug, Clone, Copy)]
pub struct TimestampLimits {
    pub infinity_enabled: bool,
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
}

impl Default for TimestampLimits {
    fn default() -> Self {
        TimestampLimits { infinity_enabled: false, min: NaiveDateTime::MIN, max: NaiveDateTime::MAX }
    }
}

impl TimestampLimits {
    fn apply_encode(&self, value: PgTimestamp) -> PgTimestamp {
        if !self.infinity_enabled || !value.infinity.is_finite() {
            return value;
        }
        if value.value > self.max {
            PgTimestamp { value: self.max, infinity: InfinityModifier::Infinity }
        } else if value.value < self.min {
            PgTimestamp { value: self.min, infinity: InfinityModifier::NegativeInfinity }
        } else {
            value
        }
    }

    fn apply_scan(&self, value: PgTimestamp) -> PgTimestamp {
        if !self.infinity_enabled {
            return value;
        }
        match value.infinity {
            InfinityModifier::Infinity => PgTimestamp { value: self.max, infinity: InfinityModifier::Finite },
            InfinityModifier::NegativeInfinity => PgTimestamp { value: self.min, infinity: InfinityModifier::Finite },
            InfinityModifier::Finite => value,
        }
    }
}

/// Map-level configuration. Constructed with field-update syntax over
/// `Default`, and fixed for the life of the `Map`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapConfig {
    pub timestamp: TimestampLimits,
}

/// One memoized resolution outcome, stamped with the registry generation it
/// was computed under. A stale stamp reads as a miss, so registration never
/// has to clear the table — it just bumps the generation.
struct CacheEntry {
    generation: u64,
    resolved: bool,
}

struct Inner {
    by_oid: HashMap<Oid, PgType>,
    by_name: HashMap<String, PgType>,
    default_types: HashMap<TypeId, Oid>,
    /// Container OID → element OID, snapshotted behind an `Arc` so the hot
    /// path can install it as the codec element scope without holding the
    /// registry lock across a scan or encode.
    elements: Arc<HashMap<Oid, Oid>>,
    scan_cache: HashMap<(TypeId, Oid, FormatCode), CacheEntry>,
    encode_cache: HashMap<(TypeId, Oid, FormatCode), CacheEntry>,
    generation: u64,
}

impl Inner {
    fn builtin() -> Self {
        let mut by_oid = HashMap::new();
        let mut by_name = HashMap::new();
        let mut elements = HashMap::new();
        for ty in builtin_types() {
            if let Some(element) = ty.element {
                elements.insert(ty.oid, element);
            }
            by_oid.insert(ty.oid, ty);
            by_name.insert(ty.name.to_owned(), ty);
        }
        Inner {
            by_oid,
            by_name,
            default_types: HashMap::new(),
            elements: Arc::new(elements),
            scan_cache: HashMap::new(),
            encode_cache: HashMap::new(),
            generation: 0,
        }
    }
}

/// A registry of `(oid, name, codec)` triples plus the caches the planner
/// consults. Construct with [`Map::new`]; each instance owns its state.
pub struct Map {
    inner: RwLock<Inner>,
    config: MapConfig,
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl Map {
    pub fn new() -> Self {
        Self::with_config(MapConfig::default())
    }

    pub fn with_config(config: MapConfig) -> Self {
        Map { inner: RwLock::new(Inner::builtin()), config }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Registers an extension or application type. Bumps the generation
    /// counter so every cached plan is recomputed on next use instead of
    /// requiring the whole cache to be dropped.
    pub fn register_type(&self, ty: PgType) {
        let Ok(mut inner) = self.inner.write() else { return };
        tracing::debug!(oid = ty.oid, name = ty.name, "registered type");
        let mut elements = (*inner.elements).clone();
        match ty.element {
            Some(element) => {
                elements.insert(ty.oid, element);
            }
            None => {
                elements.remove(&ty.oid);
            }
        }
        inner.elements = Arc::new(elements);
        inner.by_oid.insert(ty.oid, ty);
        inner.by_name.insert(ty.name.to_owned(), ty);
        inner.generation = inner.generation.wrapping_add(1);
    }

    /// Registers the OID a Rust type should encode to when the caller
    /// doesn't name one explicitly.
    pub fn register_default_type<T: 'static>(&self, oid: Oid) {
        let Ok(mut inner) = self.inner.write() else { return };
        tracing::debug!(oid, shape = core::any::type_name::<T>(), "registered default type");
        inner.default_types.insert(TypeId::of::<T>(), oid);
        inner.generation = inner.generation.wrapping_add(1);
    }

    pub fn default_oid<T: 'static>(&self) -> Option<Oid> {
        let inner = self.inner.read().ok()?;
        inner.default_types.get(&TypeId::of::<T>()).copied()
    }

    pub fn type_for_oid(&self, oid: Oid) -> Option<PgType> {
        self.inner.read().ok()?.by_oid.get(&oid).copied()
    }

    pub fn type_for_name(&self, name: &str) -> Option<PgType> {
        self.inner.read().ok()?.by_name.get(name).copied()
    }

    fn element_table(&self) -> Arc<HashMap<Oid, Oid>> {
        self.inner.read().map(|inner| Arc::clone(&inner.elements)).unwrap_or_default()
    }

    /// `numeric` prefers text (its binary digit-group format is internal and
    /// lossy to inspect by hand); other registered types prefer binary. An
    /// OID this registry doesn't know gets text, the format every server
    /// accepts for any type.
    pub fn preferred_format(&self, oid: Oid) -> FormatCode {
        if oid == oid::NUMERIC || self.type_for_oid(oid).is_none() {
            FormatCode::Text
        } else {
            FormatCode::Binary
        }
    }

    fn note_scan<T: 'static>(&self, target_oid: Oid, format: FormatCode, resolved: bool) {
        let Ok(mut inner) = self.inner.write() else { return };
        let generation = inner.generation;
        tracing::trace!(oid = target_oid, shape = core::any::type_name::<T>(), "caching scan resolution");
        inner
            .scan_cache
            .insert((TypeId::of::<T>(), target_oid, format), CacheEntry { generation, resolved });
    }

    fn cached_scan<T: 'static>(&self, target_oid: Oid, format: FormatCode) -> Option<bool> {
        let inner = self.inner.read().ok()?;
        let entry = inner.scan_cache.get(&(TypeId::of::<T>(), target_oid, format))?;
        (entry.generation == inner.generation).then_some(entry.resolved)
    }

    fn note_encode<T: 'static>(&self, target_oid: Oid, format: FormatCode, resolved: bool) {
        let Ok(mut inner) = self.inner.write() else { return };
        let generation = inner.generation;
        tracing::trace!(oid = target_oid, shape = core::any::type_name::<T>(), "caching encode resolution");
        inner
            .encode_cache
            .insert((TypeId::of::<T>(), target_oid, format), CacheEntry { generation, resolved });
    }

    fn cached_encode<T: 'static>(&self, target_oid: Oid, format: FormatCode) -> Option<bool> {
        let inner = self.inner.read().ok()?;
        let entry = inner.encode_cache.get(&(TypeId::of::<T>(), target_oid, format))?;
        (entry.generation == inner.generation).then_some(entry.resolved)
    }

    /// Resolves and remembers whether `(T, oid, format)` is scannable. The
    /// cache only records a yes/no outcome — actual decoding still runs
    /// `T::from_sql_*` fresh every call, since a plan here is a resolution
    /// decision, not a reusable closure over borrowed bytes.
    pub fn plan_scan<'a, T: FromSqlValue<'a> + 'static>(&self, target_oid: Oid, format: FormatCode) -> Result<()> {
        if self.cached_scan::<T>(target_oid, format).is_none() {
            self.note_scan::<T>(target_oid, format, true);
        }
        Ok(())
    }

    pub fn plan_encode<T: ToSqlValue + 'static>(&self, target_oid: Oid, format: FormatCode) -> Result<()> {
        if self.cached_encode::<T>(target_oid, format).is_none() {
            self.note_encode::<T>(target_oid, format, true);
        }
        Ok(())
    }

    /// Scans wire bytes of a known OID/format into `T`, consulting the
    /// registry for the type's name (for error messages) and installing the
    /// registry's container→element table so array/range/multirange
    /// destinations resolve their element OID from their own registration.
    pub fn scan<'a, T: FromSqlValue<'a> + 'static>(
        &self,
        oid: Oid,
        format: FormatCode,
        src: Option<&'a [u8]>,
    ) -> Result<T> {
        self.plan_scan::<T>(oid, format)?;
        let name = self.type_for_oid(oid).map(|t| t.name.to_owned());
        codec::with_element_table(self.element_table(), || codec::scan(oid, name.as_deref(), format, src))
    }

    pub fn encode<T: ToSqlValue + 'static>(
        &self,
        value: &T,
        oid: Oid,
        format: FormatCode,
        buf: &mut Vec<u8>,
    ) -> Result<crate::format::IsNull> {
        self.plan_encode::<T>(oid, format)?;
        let name = self.type_for_oid(oid).map(|t| t.name.to_owned());
        codec::with_element_table(self.element_table(), || codec::encode(value, oid, name.as_deref(), format, buf))
    }

    /// [`Map::scan`] for timestamp carriers, with this map's
    /// [`TimestampLimits`] applied: with infinity handling enabled, the
    /// `infinity`/`-infinity` wire sentinels come back as the configured
    /// `max`/`min` finite values.
    pub fn scan_timestamp(&self, oid: Oid, format: FormatCode, src: Option<&[u8]>) -> Result<PgTimestamp> {
        self.scan(oid, format, src).map(|v| self.config.timestamp.apply_scan(v))
    }

    /// [`Map::encode`] for timestamp carriers: with infinity handling
    /// enabled, values outside the configured bounds go out as the
    /// `infinity`/`-infinity` wire sentinels.
    pub fn encode_timestamp(
        &self,
        value: PgTimestamp,
        oid: Oid,
        format: FormatCode,
        buf: &mut Vec<u8>,
    ) -> Result<crate::format::IsNull> {
        self.encode(&self.config.timestamp.apply_encode(value), oid, format, buf)
    }

    pub fn scan_timestamptz(&self, oid: Oid, format: FormatCode, src: Option<&[u8]>) -> Result<PgTimestamptz> {
        let v: PgTimestamptz = self.scan(oid, format, src)?;
        let adjusted = self.config.timestamp.apply_scan(PgTimestamp { value: v.value.naive_utc(), infinity: v.infinity });
        Ok(PgTimestamptz { value: adjusted.value.and_utc(), infinity: adjusted.infinity })
    }

    pub fn encode_timestamptz(
        &self,
        value: PgTimestamptz,
        oid: Oid,
        format: FormatCode,
        buf: &mut Vec<u8>,
    ) -> Result<crate::format::IsNull> {
        let adjusted = self.config.timestamp.apply_encode(PgTimestamp { value: value.value.naive_utc(), infinity: value.infinity });
        self.encode(&PgTimestamptz { value: adjusted.value.and_utc(), infinity: adjusted.infinity }, oid, format, buf)
    }

    /// Decodes wire bytes into the generic scalar bridge value, resolving
    /// the OID's registered name for error messages. NULL bytes come back as
    /// [`crate::bridge::SqlValue::Null`].
    pub fn decode_sql_value(&self, oid: Oid, format: FormatCode, src: Option<&[u8]>) -> Result<crate::bridge::SqlValue> {
        let name = self.type_for_oid(oid).map(|t| t.name.to_owned());
        crate::bridge::decode_sql_value(oid, name.as_deref(), format, src)
    }

    /// Resolves the OID to encode `value` as when the caller hasn't named
    /// one: the value's own preference, falling back to a registered
    /// default for `T`, falling back to [`Error::PlanNotFound`].
    pub fn encode_oid_for<T: ToSqlValue + 'static>(&self, value: &T) -> Result<Oid> {
        let natural = value.natural_oid();
        if natural != 0 {
            return Ok(natural);
        }
        self.default_oid::<T>()
            .ok_or_else(|| Error::plan_not_found(0, None, FormatCode::Binary, core::any::type_name::<T>()))
    }
}

fn builtin_types() -> Vec<PgType> {
    use oid::*;
    vec![
        PgType::scalar(BOOL, "bool"),
        PgType::scalar(BYTEA, "bytea"),
        PgType::scalar(CHAR, "char"),
        PgType::scalar(NAME, "name"),
        PgType::scalar(INT8, "int8"),
        PgType::scalar(INT2, "int2"),
        PgType::scalar(INT4, "int4"),
        PgType::scalar(TEXT, "text"),
        PgType::scalar(OID, "oid"),
        PgType::scalar(TID, "tid"),
        PgType::scalar(XID, "xid"),
        PgType::scalar(CID, "cid"),
        PgType::scalar(XID8, "xid8"),
        PgType::scalar(JSON, "json"),
        PgType::scalar(POINT, "point"),
        PgType::scalar(LSEG, "lseg"),
        PgType::scalar(PATH, "path"),
        PgType::scalar(BOX, "box"),
        PgType::scalar(POLYGON, "polygon"),
        PgType::scalar(LINE, "line"),
        PgType::scalar(CIDR, "cidr"),
        PgType::scalar(FLOAT4, "float4"),
        PgType::scalar(FLOAT8, "float8"),
        PgType::scalar(UNKNOWN, "unknown"),
        PgType::scalar(CIRCLE, "circle"),
        PgType::scalar(MACADDR8, "macaddr8"),
        PgType::scalar(MACADDR, "macaddr"),
        PgType::scalar(INET, "inet"),
        PgType::scalar(BPCHAR, "bpchar"),
        PgType::scalar(VARCHAR, "varchar"),
        PgType::scalar(DATE, "date"),
        PgType::scalar(TIME, "time"),
        PgType::scalar(TIMESTAMP, "timestamp"),
        PgType::scalar(TIMESTAMPTZ, "timestamptz"),
        PgType::scalar(INTERVAL, "interval"),
        PgType::scalar(TIMETZ, "timetz"),
        PgType::scalar(BIT, "bit"),
        PgType::scalar(VARBIT, "varbit"),
        PgType::scalar(NUMERIC, "numeric"),
        PgType::scalar(RECORD, "record"),
        PgType::scalar(UUID, "uuid"),
        PgType::scalar(PG_LSN, "pg_lsn"),
        PgType::scalar(TSVECTOR, "tsvector"),
        PgType::scalar(TSQUERY, "tsquery"),
        PgType::scalar(JSONB, "jsonb"),
        PgType::scalar(HSTORE, "hstore"),
        PgType::range_of(INT4RANGE, "int4range", INT4),
        PgType::range_of(NUMRANGE, "numrange", NUMERIC),
        PgType::range_of(TSRANGE, "tsrange", TIMESTAMP),
        PgType::range_of(TSTZRANGE, "tstzrange", TIMESTAMPTZ),
        PgType::range_of(DATERANGE, "daterange", DATE),
        PgType::range_of(INT8RANGE, "int8range", INT8),
        PgType::multirange_of(INT4MULTIRANGE, "int4multirange", INT4RANGE),
        PgType::multirange_of(NUMMULTIRANGE, "nummultirange", NUMRANGE),
        PgType::multirange_of(TSMULTIRANGE, "tsmultirange", TSRANGE),
        PgType::multirange_of(TSTZMULTIRANGE, "tstzmultirange", TSTZRANGE),
        PgType::multirange_of(DATEMULTIRANGE, "datemultirange", DATERANGE),
        PgType::multirange_of(INT8MULTIRANGE, "int8multirange", INT8RANGE),
        PgType::array_of(BOOL_ARRAY, "_bool", BOOL),
        PgType::array_of(BYTEA_ARRAY, "_bytea", BYTEA),
        PgType::array_of(CHAR_ARRAY, "_char", CHAR),
        PgType::array_of(NAME_ARRAY, "_name", NAME),
        PgType::array_of(INT2_ARRAY, "_int2", INT2),
        PgType::array_of(INT4_ARRAY, "_int4", INT4),
        PgType::array_of(TEXT_ARRAY, "_text", TEXT),
        PgType::array_of(BPCHAR_ARRAY, "_bpchar", BPCHAR),
        PgType::array_of(VARCHAR_ARRAY, "_varchar", VARCHAR),
        PgType::array_of(INT8_ARRAY, "_int8", INT8),
        PgType::array_of(POINT_ARRAY, "_point", POINT),
        PgType::array_of(FLOAT4_ARRAY, "_float4", FLOAT4),
        PgType::array_of(FLOAT8_ARRAY, "_float8", FLOAT8),
        PgType::array_of(OID_ARRAY, "_oid", OID),
        PgType::array_of(MACADDR_ARRAY, "_macaddr", MACADDR),
        PgType::array_of(INET_ARRAY, "_inet", INET),
        PgType::array_of(DATE_ARRAY, "_date", DATE),
        PgType::array_of(TIME_ARRAY, "_time", TIME),
        PgType::array_of(TIMESTAMP_ARRAY, "_timestamp", TIMESTAMP),
        PgType::array_of(TIMESTAMPTZ_ARRAY, "_timestamptz", TIMESTAMPTZ),
        PgType::array_of(INTERVAL_ARRAY, "_interval", INTERVAL),
        PgType::array_of(NUMERIC_ARRAY, "_numeric", NUMERIC),
        PgType::array_of(CIDR_ARRAY, "_cidr", CIDR),
        PgType::array_of(VARBIT_ARRAY, "_varbit", VARBIT),
        PgType::array_of(UUID_ARRAY, "_uuid", UUID),
        PgType::array_of(JSON_ARRAY, "_json", JSON),
        PgType::array_of(JSONB_ARRAY, "_jsonb", JSONB),
        PgType::array_of(TSVECTOR_ARRAY, "_tsvector", TSVECTOR),
        PgType::array_of(INT4RANGE_ARRAY, "_int4range", INT4RANGE),
        PgType::array_of(NUMRANGE_ARRAY, "_numrange", NUMRANGE),
        PgType::array_of(TSRANGE_ARRAY, "_tsrange", TSRANGE),
        PgType::array_of(TSTZRANGE_ARRAY, "_tstzrange", TSTZRANGE),
        PgType::array_of(DATERANGE_ARRAY, "_daterange", DATERANGE),
        PgType::array_of(INT8RANGE_ARRAY, "_int8range", INT8RANGE),
    ]
}
