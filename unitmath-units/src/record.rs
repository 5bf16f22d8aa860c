//! Resolved unit records

use serde::{Serialize, Deserialize};
use unitmath_core::{UnitError, BASE_RECORD_LEN, DIMENSIONS};
use crate::Dimension;

/// Default display precision for ratio specifications
pub const RATIO_PRECISION: u32 = 7;
/// Default display precision for affine specifications
pub const AFFINE_PRECISION: u32 = 2;

/// The resolved form of a unit symbol
///
/// `base = (value + offset) * scale`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub dims: Dimension,
    /// Factor converting one unit into the canonical base representation
    pub scale: f64,
    /// Shift applied before scaling (affine units only)
    pub offset: f64,
    /// Suggested significant digits for display; advisory
    pub precision: u32,
}

impl UnitRecord {
    pub fn new(dims: Dimension, scale: f64, offset: f64, precision: u32) -> Self {
        UnitRecord { dims, scale, offset, precision }
    }

    /// The dimensionless identity record
    pub fn dimensionless() -> Self {
        UnitRecord::new(Dimension::DIMENSIONLESS, 1.0, 0.0, 16)
    }

    /// Build from a 9-element base table row
    pub fn from_base_row(symbol: &str, row: &[f64]) -> Result<Self, UnitError> {
        if row.len() != BASE_RECORD_LEN {
            return Err(UnitError::invalid_tables(format!(
                "base unit '{}' has {} fields, expected {}",
                symbol,
                row.len(),
                BASE_RECORD_LEN
            )));
        }
        Ok(UnitRecord {
            dims: Dimension::from_record(&row[..DIMENSIONS]),
            scale: row[DIMENSIONS],
            offset: row[DIMENSIONS + 1],
            precision: row[DIMENSIONS + 2].max(0.0) as u32,
        })
    }

    /// Convert a value in this unit into the canonical base representation
    pub fn to_base(&self, value: f64) -> f64 {
        (value + self.offset) * self.scale
    }

    /// Convert a canonical base value into this unit
    pub fn from_base(&self, base: f64) -> f64 {
        base / self.scale - self.offset
    }

    /// Same record with its scale multiplied by `10^exponent`
    pub fn with_prefix(&self, exponent: i32) -> Self {
        UnitRecord {
            scale: self.scale * 10f64.powi(exponent),
            ..*self
        }
    }
}
