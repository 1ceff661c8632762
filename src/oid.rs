//! PostgreSQL object identifiers and the catalog of well-known types.

/// PostgreSQL Object Identifier (OID).
pub type Oid = u32;

/// Well-known PostgreSQL type OIDs, including the array, range, and
/// multirange variants of the base catalog types.
pub mod oid {
    use super::Oid;

    pub const BOOL: Oid = 16;
    pub const BYTEA: Oid = 17;
    pub const CHAR: Oid = 18;
    pub const NAME: Oid = 19;
    pub const INT8: Oid = 20;
    pub const INT2: Oid = 21;
    pub const INT2VECTOR: Oid = 22;
    pub const INT4: Oid = 23;
    pub const TEXT: Oid = 25;
    pub const OID: Oid = 26;
    pub const TID: Oid = 27;
    pub const XID: Oid = 28;
    pub const CID: Oid = 29;
    pub const XID8: Oid = 5069;
    pub const OIDVECTOR: Oid = 30;
    pub const JSON: Oid = 114;
    pub const POINT: Oid = 600;
    pub const LSEG: Oid = 601;
    pub const PATH: Oid = 602;
    pub const BOX: Oid = 603;
    pub const POLYGON: Oid = 604;
    pub const LINE: Oid = 628;
    pub const CIDR: Oid = 650;
    pub const FLOAT4: Oid = 700;
    pub const FLOAT8: Oid = 701;
    pub const UNKNOWN: Oid = 705;
    pub const CIRCLE: Oid = 718;
    pub const MACADDR8: Oid = 774;
    pub const MACADDR: Oid = 829;
    pub const INET: Oid = 869;
    pub const BPCHAR: Oid = 1042;
    pub const VARCHAR: Oid = 1043;
    pub const DATE: Oid = 1082;
    pub const TIME: Oid = 1083;
    pub const TIMESTAMP: Oid = 1114;
    pub const TIMESTAMPTZ: Oid = 1184;
    pub const INTERVAL: Oid = 1186;
    pub const TIMETZ: Oid = 1266;
    pub const BIT: Oid = 1560;
    pub const VARBIT: Oid = 1562;
    pub const NUMERIC: Oid = 1700;
    pub const RECORD: Oid = 2249;
    pub const UUID: Oid = 2950;
    pub const PG_LSN: Oid = 3220;
    pub const TSVECTOR: Oid = 3614;
    pub const TSQUERY: Oid = 3615;
    pub const JSONB: Oid = 3802;
    pub const INT4RANGE: Oid = 3904;
    pub const NUMRANGE: Oid = 3906;
    pub const TSRANGE: Oid = 3908;
    pub const TSTZRANGE: Oid = 3910;
    pub const DATERANGE: Oid = 3912;
    pub const INT8RANGE: Oid = 3926;
    pub const INT4MULTIRANGE: Oid = 4451;
    pub const NUMMULTIRANGE: Oid = 4532;
    pub const TSMULTIRANGE: Oid = 4533;
    pub const TSTZMULTIRANGE: Oid = 4534;
    pub const DATEMULTIRANGE: Oid = 4535;
    pub const INT8MULTIRANGE: Oid = 4536;
    pub const HSTORE: Oid = 33670;

    // Array OIDs (the "_name" catalog convention). Values follow PostgreSQL's
    // own pg_type assignments; any extension array OID is registered by the
    // caller at runtime (see `Map::register_type`).
    pub const BOOL_ARRAY: Oid = 1000;
    pub const BYTEA_ARRAY: Oid = 1001;
    pub const CHAR_ARRAY: Oid = 1002;
    pub const NAME_ARRAY: Oid = 1003;
    pub const INT2_ARRAY: Oid = 1005;
    pub const INT4_ARRAY: Oid = 1007;
    pub const TEXT_ARRAY: Oid = 1009;
    pub const BPCHAR_ARRAY: Oid = 1014;
    pub const VARCHAR_ARRAY: Oid = 1015;
    pub const INT8_ARRAY: Oid = 1016;
    pub const POINT_ARRAY: Oid = 1017;
    pub const FLOAT4_ARRAY: Oid = 1021;
    pub const FLOAT8_ARRAY: Oid = 1022;
    pub const OID_ARRAY: Oid = 1028;
    pub const MACADDR_ARRAY: Oid = 1040;
    pub const INET_ARRAY: Oid = 1041;
    pub const DATE_ARRAY: Oid = 1182;
    pub const TIME_ARRAY: Oid = 1183;
    pub const TIMESTAMP_ARRAY: Oid = 1115;
    pub const TIMESTAMPTZ_ARRAY: Oid = 1185;
    pub const INTERVAL_ARRAY: Oid = 1187;
    pub const NUMERIC_ARRAY: Oid = 1231;
    pub const CIDR_ARRAY: Oid = 651;
    pub const VARBIT_ARRAY: Oid = 1563;
    pub const UUID_ARRAY: Oid = 2951;
    pub const JSON_ARRAY: Oid = 199;
    pub const JSONB_ARRAY: Oid = 3807;
    pub const TSVECTOR_ARRAY: Oid = 3643;
    pub const INT4RANGE_ARRAY: Oid = 3905;
    pub const NUMRANGE_ARRAY: Oid = 3907;
    pub const TSRANGE_ARRAY: Oid = 3909;
    pub const TSTZRANGE_ARRAY: Oid = 3911;
    pub const DATERANGE_ARRAY: Oid = 3913;
    pub const INT8RANGE_ARRAY: Oid = 3927;
}

/// Element OID for the built-in array, range, and multirange catalog
/// entries. Extension containers resolve through the `Map` they were
/// registered on instead (see [`crate::codec::element_of`]).
pub(crate) fn builtin_element_of(container: Oid) -> Option<Oid> {
    use self::oid::*;
    match container {
        BOOL_ARRAY => Some(BOOL),
        BYTEA_ARRAY => Some(BYTEA),
        CHAR_ARRAY => Some(CHAR),
        NAME_ARRAY => Some(NAME),
        INT2_ARRAY => Some(INT2),
        INT4_ARRAY => Some(INT4),
        TEXT_ARRAY => Some(TEXT),
        BPCHAR_ARRAY => Some(BPCHAR),
        VARCHAR_ARRAY => Some(VARCHAR),
        INT8_ARRAY => Some(INT8),
        POINT_ARRAY => Some(POINT),
        FLOAT4_ARRAY => Some(FLOAT4),
        FLOAT8_ARRAY => Some(FLOAT8),
        OID_ARRAY => Some(OID),
        MACADDR_ARRAY => Some(MACADDR),
        INET_ARRAY => Some(INET),
        DATE_ARRAY => Some(DATE),
        TIME_ARRAY => Some(TIME),
        TIMESTAMP_ARRAY => Some(TIMESTAMP),
        TIMESTAMPTZ_ARRAY => Some(TIMESTAMPTZ),
        INTERVAL_ARRAY => Some(INTERVAL),
        NUMERIC_ARRAY => Some(NUMERIC),
        CIDR_ARRAY => Some(CIDR),
        VARBIT_ARRAY => Some(VARBIT),
        UUID_ARRAY => Some(UUID),
        JSON_ARRAY => Some(JSON),
        JSONB_ARRAY => Some(JSONB),
        TSVECTOR_ARRAY => Some(TSVECTOR),
        INT4RANGE_ARRAY => Some(INT4RANGE),
        NUMRANGE_ARRAY => Some(NUMRANGE),
        TSRANGE_ARRAY => Some(TSRANGE),
        TSTZRANGE_ARRAY => Some(TSTZRANGE),
        DATERANGE_ARRAY => Some(DATERANGE),
        INT8RANGE_ARRAY => Some(INT8RANGE),
        INT4RANGE => Some(INT4),
        NUMRANGE => Some(NUMERIC),
        TSRANGE => Some(TIMESTAMP),
        TSTZRANGE => Some(TIMESTAMPTZ),
        DATERANGE => Some(DATE),
        INT8RANGE => Some(INT8),
        INT4MULTIRANGE => Some(INT4RANGE),
        NUMMULTIRANGE => Some(NUMRANGE),
        TSMULTIRANGE => Some(TSRANGE),
        TSTZMULTIRANGE => Some(TSTZRANGE),
        DATEMULTIRANGE => Some(DATERANGE),
        INT8MULTIRANGE => Some(INT8RANGE),
        _ => None,
    }
}

/// Array OID whose element type is `element`, for the built-in catalog.
/// A container of extension elements has no builtin array OID; its
/// `natural_oid` is zero and resolution falls to the registry's
/// default-type table.
pub fn array_oid_of(element: Oid) -> Option<Oid> {
    use self::oid::*;
    match element {
        BOOL => Some(BOOL_ARRAY),
        BYTEA => Some(BYTEA_ARRAY),
        CHAR => Some(CHAR_ARRAY),
        NAME => Some(NAME_ARRAY),
        INT2 => Some(INT2_ARRAY),
        INT4 => Some(INT4_ARRAY),
        TEXT => Some(TEXT_ARRAY),
        BPCHAR => Some(BPCHAR_ARRAY),
        VARCHAR => Some(VARCHAR_ARRAY),
        INT8 => Some(INT8_ARRAY),
        POINT => Some(POINT_ARRAY),
        FLOAT4 => Some(FLOAT4_ARRAY),
        FLOAT8 => Some(FLOAT8_ARRAY),
        OID => Some(OID_ARRAY),
        MACADDR => Some(MACADDR_ARRAY),
        INET => Some(INET_ARRAY),
        DATE => Some(DATE_ARRAY),
        TIME => Some(TIME_ARRAY),
        TIMESTAMP => Some(TIMESTAMP_ARRAY),
        TIMESTAMPTZ => Some(TIMESTAMPTZ_ARRAY),
        INTERVAL => Some(INTERVAL_ARRAY),
        NUMERIC => Some(NUMERIC_ARRAY),
        CIDR => Some(CIDR_ARRAY),
        VARBIT => Some(VARBIT_ARRAY),
        UUID => Some(UUID_ARRAY),
        JSON => Some(JSON_ARRAY),
        JSONB => Some(JSONB_ARRAY),
        TSVECTOR => Some(TSVECTOR_ARRAY),
        INT4RANGE => Some(INT4RANGE_ARRAY),
        NUMRANGE => Some(NUMRANGE_ARRAY),
        TSRANGE => Some(TSRANGE_ARRAY),
        TSTZRANGE => Some(TSTZRANGE_ARRAY),
        DATERANGE => Some(DATERANGE_ARRAY),
        INT8RANGE => Some(INT8RANGE_ARRAY),
        _ => None,
    }
}

/// Range OID whose base type is `element`, for the built-in catalog.
pub fn range_oid_of(element: Oid) -> Option<Oid> {
    use self::oid::*;
    match element {
        INT4 => Some(INT4RANGE),
        NUMERIC => Some(NUMRANGE),
        TIMESTAMP => Some(TSRANGE),
        TIMESTAMPTZ => Some(TSTZRANGE),
        DATE => Some(DATERANGE),
        INT8 => Some(INT8RANGE),
        _ => None,
    }
}

/// Multirange OID whose range type is `range`, for the built-in catalog.
pub fn multirange_oid_of(range: Oid) -> Option<Oid> {
    use self::oid::*;
    match range {
        INT4RANGE => Some(INT4MULTIRANGE),
        NUMRANGE => Some(NUMMULTIRANGE),
        TSRANGE => Some(TSMULTIRANGE),
        TSTZRANGE => Some(TSTZMULTIRANGE),
        DATERANGE => Some(DATEMULTIRANGE),
        INT8RANGE => Some(INT8MULTIRANGE),
        _ => None,
    }
}

/// A registered type: OID plus catalog name, with an optional back-reference
/// to the element/base type for arrays, ranges and multiranges.
#[derive(Clone, Copy)]
pub struct PgType {
    pub oid: Oid,
    pub name: &'static str,
    pub kind: TypeKind,
    /// Element OID for arrays, base OID for ranges and multiranges. `None`
    /// for scalar types.
    pub element: Option<Oid>,
}

/// The structural category of a registered type. Used by the planner to
/// decide which wrapper chains are even worth attempting, and by codecs that
/// delegate to an element type (array/range/multirange).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Scalar,
    Array,
    Range,
    Multirange,
    Composite,
}

impl PgType {
    pub const fn scalar(oid: Oid, name: &'static str) -> Self {
        PgType { oid, name, kind: TypeKind::Scalar, element: None }
    }

    pub const fn array_of(oid: Oid, name: &'static str, element: Oid) -> Self {
        PgType { oid, name, kind: TypeKind::Array, element: Some(element) }
    }

    pub const fn range_of(oid: Oid, name: &'static str, element: Oid) -> Self {
        PgType { oid, name, kind: TypeKind::Range, element: Some(element) }
    }

    pub const fn multirange_of(oid: Oid, name: &'static str, range: Oid) -> Self {
        PgType { oid, name, kind: TypeKind::Multirange, element: Some(range) }
    }
}
