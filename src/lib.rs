//! A PostgreSQL wire-format type codec registry and scan/encode planner.
//!
//! # Features
//!
//! - **Zero-copy scans**: borrowing destinations (`&str`, `&[u8]`) read
//!   directly out of the caller's wire buffer instead of copying.
//! - **Sans-I/O**: this crate never opens a socket, spawns a thread, or
//!   parses SQL — it maps `(oid, format, bytes)` to and from Rust values for
//!   a driver that owns the wire itself.
//! - **Per-`Map` registries**: no process-global type table; every `Map` is
//!   an independent, explicitly constructed registry.
//!
//! # Example
//!
//! ```
//! use pg_typemap::{Map, Planner};
//! use pg_typemap::format::FormatCode;
//! use pg_typemap::oid::oid;
//!
//! let map = Map::new();
//! let planner = Planner::new(&map);
//! let value: i32 = planner.scan(Some(oid::INT4), FormatCode::Binary, Some(&42i32.to_be_bytes())).unwrap();
//! assert_eq!(value, 42);
//! ```

pub mod bridge;
pub mod capability;
pub mod codec;
pub mod error;
pub mod format;
pub mod map;
pub mod oid;
pub mod planner;
pub mod value;
pub mod wire;
pub mod wrapper;

pub use bridge::{BridgeGuard, SqlScanner, SqlValue, SqlValuer, ViaSql};
pub use codec::{FromSqlValue, ToSqlValue};
pub use error::{Error, Result};
pub use format::{FormatCode, InfinityModifier, IsNull};
pub use map::{Map, MapConfig, TimestampLimits};
pub use oid::{Oid, PgType, TypeKind};
pub use planner::Planner;
