//! Dimensional analysis types
//!
//! Each unit has dimensions represented as a 6-element vector of exponents
//! over an abstract basis tagged [c, e, h, k, m, s].

use std::fmt;
use serde::{Serialize, Deserialize};
use unitmath_core::DIMENSIONS;

/// Basis tags, in vector order
pub const BASIS: [&str; DIMENSIONS] = ["c", "e", "h", "k", "m", "s"];

/// Represents the dimensions of a unit as exponents of the base dimensions.
/// Two units are compatible iff their dimensions are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    pub exponents: [i32; DIMENSIONS],
}

impl Dimension {
    /// Dimensionless quantity (all exponents zero)
    pub const DIMENSIONLESS: Dimension = Dimension { exponents: [0; DIMENSIONS] };

    pub fn new(exponents: [i32; DIMENSIONS]) -> Self {
        Dimension { exponents }
    }

    /// Build from the leading exponents of a base record.
    /// Callers validate that the exponents are integral.
    pub fn from_record(record: &[f64]) -> Self {
        let mut exponents = [0i32; DIMENSIONS];
        for (slot, value) in exponents.iter_mut().zip(record) {
            *slot = *value as i32;
        }
        Dimension { exponents }
    }

    pub fn is_dimensionless(&self) -> bool {
        self.exponents.iter().all(|&e| e == 0)
    }

    /// Multiply dimensions (add exponents); `None` on exponent overflow
    pub fn checked_multiply(&self, other: &Dimension) -> Option<Dimension> {
        let mut exponents = self.exponents;
        for (e, o) in exponents.iter_mut().zip(other.exponents) {
            *e = e.checked_add(o)?;
        }
        Some(Dimension { exponents })
    }

    /// Divide dimensions (subtract exponents); `None` on exponent overflow
    pub fn checked_divide(&self, other: &Dimension) -> Option<Dimension> {
        let mut exponents = self.exponents;
        for (e, o) in exponents.iter_mut().zip(other.exponents) {
            *e = e.checked_sub(o)?;
        }
        Some(Dimension { exponents })
    }

    /// Raise to integer power (multiply exponents); `None` on exponent overflow
    pub fn checked_power(&self, exp: i32) -> Option<Dimension> {
        let mut exponents = self.exponents;
        for e in exponents.iter_mut() {
            *e = e.checked_mul(exp)?;
        }
        Some(Dimension { exponents })
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .exponents
            .iter()
            .zip(BASIS)
            .filter(|(exp, _)| **exp != 0)
            .map(|(exp, tag)| {
                if *exp == 1 {
                    tag.to_string()
                } else {
                    format!("{}^{}", tag, exp)
                }
            })
            .collect();

        if parts.is_empty() {
            write!(f, "1")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::DIMENSIONLESS
    }
}
