//! Unitmath Core - Fundamental types
//!
//! This crate provides the types shared by the unit engine:
//! - `UnitError`: Typed errors (unknown unit, malformed specification, unit mismatch)
//! - `UnitTables`: Base records, prefixes and derived specifications

mod error;
mod tables;

pub use error::{UnitError, codes};
pub use tables::{UnitTables, DIMENSIONS, BASE_RECORD_LEN, DIMENSIONLESS_SYMBOL};
