//! Unitmath Units - Dimensional unit algebra
//!
//! Units are vectors over a fixed basis of 6 base dimensions plus a scale,
//! an offset and a display precision. The registry derives compound and
//! prefixed units from short specifications and memoizes every result.
//!
//! Specification forms:
//! - Ratio (e.g. "60 s", "1 m.kg/s^2")
//! - Affine (e.g. "K-273.14")
//!
//! Quantities combine only when their dimension vectors are equal, and
//! convert through the canonical base representation.

mod dimension;
mod record;
mod unit;
mod quantity;
mod format;
mod parse;
mod registry;

pub use dimension::{Dimension, BASIS};
pub use record::{UnitRecord, RATIO_PRECISION, AFFINE_PRECISION};
pub use unit::Unit;
pub use quantity::Quantity;
pub use format::{format_general, format_significant};
pub use parse::{parse_quantity_string, Definition, Factor, Specification};
pub use registry::UnitRegistry;
pub use unitmath_core::{UnitError, UnitTables};
