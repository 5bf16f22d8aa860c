//! Unit identifier: a symbol paired with its resolved record

use std::fmt;
use serde::{Serialize, Deserialize};
use unitmath_core::{UnitError, DIMENSIONLESS_SYMBOL};
use crate::{Dimension, UnitRecord};
use crate::parse::Definition;

/// A validated unit symbol with the dimension and conversion factors
/// copied from its record at construction time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// The unit symbol (e.g., "m", "kWh", "m/s^2")
    pub symbol: String,
    /// The dimensional signature
    pub dimension: Dimension,
    /// Factor to the canonical base representation (base = (value + offset) * scale)
    pub scale: f64,
    /// Shift for affine units like degC and degF
    pub offset: f64,
    /// Advisory display precision
    pub precision: u32,
}

impl Unit {
    pub fn from_record(symbol: impl Into<String>, record: &UnitRecord) -> Self {
        Unit {
            symbol: symbol.into(),
            dimension: record.dims,
            scale: record.scale,
            offset: record.offset,
            precision: record.precision,
        }
    }

    /// The dimensionless unit
    pub fn dimensionless() -> Self {
        Unit::from_record(DIMENSIONLESS_SYMBOL, &UnitRecord::dimensionless())
    }

    pub fn record(&self) -> UnitRecord {
        UnitRecord::new(self.dimension, self.scale, self.offset, self.precision)
    }

    /// Check if two units are dimensionally compatible.
    /// Scale and offset do not take part.
    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }

    /// Like `is_compatible`, but fails with `UnitMismatch`
    pub fn matches(&self, other: &Unit) -> Result<(), UnitError> {
        if self.is_compatible(other) {
            Ok(())
        } else {
            Err(UnitError::mismatch(
                &self.symbol,
                &other.symbol,
                self.dimension,
                other.dimension,
            ))
        }
    }

    pub fn to_base(&self, value: f64) -> f64 {
        (value + self.offset) * self.scale
    }

    pub fn from_base(&self, base: f64) -> f64 {
        base / self.scale - self.offset
    }

    /// Convert a value from this unit to another unit
    pub fn convert_to(&self, value: f64, target: &Unit) -> Result<f64, UnitError> {
        self.matches(target)?;
        Ok(target.from_base(self.to_base(value)))
    }

    /// The symbol read as a compound definition
    pub fn definition(&self) -> Definition {
        Definition::parse(&self.symbol).unwrap_or_else(|_| Definition::atom(&self.symbol))
    }

    /// Multiply two units (e.g., N * m -> N.m). Offsets are dropped:
    /// a compound symbol always names a ratio unit.
    pub fn multiply(&self, other: &Unit) -> Result<Unit, UnitError> {
        let overflow = || exponent_overflow(&self.symbol, format!("{}.{}", self.symbol, other.symbol));
        Ok(Unit {
            symbol: self
                .definition()
                .multiply(&other.definition())
                .ok_or_else(overflow)?
                .to_string(),
            dimension: self.dimension.checked_multiply(&other.dimension).ok_or_else(overflow)?,
            scale: self.scale * other.scale,
            offset: 0.0,
            precision: self.precision.min(other.precision),
        })
    }

    /// Divide two units (e.g., m / s -> m/s)
    pub fn divide(&self, other: &Unit) -> Result<Unit, UnitError> {
        let overflow = || exponent_overflow(&self.symbol, format!("{}/{}", self.symbol, other.symbol));
        Ok(Unit {
            symbol: self
                .definition()
                .divide(&other.definition())
                .ok_or_else(overflow)?
                .to_string(),
            dimension: self.dimension.checked_divide(&other.dimension).ok_or_else(overflow)?,
            scale: self.scale / other.scale,
            offset: 0.0,
            precision: self.precision.min(other.precision),
        })
    }

    /// Raise unit to an integer power (e.g., m^2, s^-1)
    pub fn power(&self, exp: i32) -> Result<Unit, UnitError> {
        let overflow = || exponent_overflow(&self.symbol, format!("{}^{}", self.symbol, exp));
        Ok(Unit {
            symbol: self.definition().power(exp).ok_or_else(overflow)?.to_string(),
            dimension: self.dimension.checked_power(exp).ok_or_else(overflow)?,
            scale: self.scale.powi(exp),
            offset: 0.0,
            precision: self.precision,
        })
    }
}

fn exponent_overflow(symbol: &str, expression: String) -> UnitError {
    UnitError::malformed(symbol, expression, "exponent overflow")
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}
