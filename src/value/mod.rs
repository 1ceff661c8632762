//! In-memory carrier shapes for PostgreSQL types with no exact Rust-native
//! equivalent. Plain Rust primitives and `chrono`/`uuid`/
//! `rust_decimal` types are used directly wherever they already have the
//! PostgreSQL type's full value space; the types here exist only where that
//! is not the case (numeric NaN/Infinity, ranges, tsvector, network, bits,
//! geometric, and the fixed-layout oddities tid/pg_lsn).

pub mod array;
pub mod bits;
pub mod datetime;
pub mod geometric;
pub mod multirange;
pub mod network;
pub mod numeric;
pub mod range;
pub mod special;
pub mod tsvector;
