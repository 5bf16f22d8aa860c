//! Unit tables - the base records, prefixes and derived specifications
//! the registry is seeded from.
//!
//! Every table is an ordered list: specifications are resolved in
//! declaration order and prefixes are matched first-come.

use serde::{Deserialize, Serialize};
use crate::UnitError;

/// Number of base dimensions in a dimension vector
pub const DIMENSIONS: usize = 6;

/// Length of a base record: 6 exponents, scale, offset, precision
pub const BASE_RECORD_LEN: usize = DIMENSIONS + 3;

/// Symbol of the dimensionless unit every table must define
pub const DIMENSIONLESS_SYMBOL: &str = "unit";

const BUILTIN_JSON: &str = include_str!("../data/default_tables.json");

/// External data consumed by the unit registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTables {
    /// Base symbol -> [6 exponents, scale, offset, precision]
    pub base: Vec<(String, Vec<f64>)>,
    /// Prefix -> power-of-ten exponent, in matching order
    pub prefixes: Vec<(String, i32)>,
    /// Derived symbol -> specification string, in resolution order
    #[serde(default)]
    pub specs: Vec<(String, String)>,
}

impl UnitTables {
    /// Parse tables from a JSON document and validate them
    pub fn from_json(json: &str) -> Result<Self, UnitError> {
        let tables: UnitTables = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    /// The tables shipped with the crate
    pub fn builtin() -> Result<Self, UnitError> {
        Self::from_json(BUILTIN_JSON)
    }

    /// Check structural invariants that deserialization cannot express
    pub fn validate(&self) -> Result<(), UnitError> {
        if !self.base.iter().any(|(symbol, _)| symbol == DIMENSIONLESS_SYMBOL) {
            return Err(UnitError::invalid_tables(format!(
                "missing dimensionless base unit '{}'",
                DIMENSIONLESS_SYMBOL
            )));
        }

        for (symbol, record) in &self.base {
            if symbol.is_empty() {
                return Err(UnitError::invalid_tables("empty base symbol"));
            }
            if record.len() != BASE_RECORD_LEN {
                return Err(UnitError::invalid_tables(format!(
                    "base unit '{}' has {} fields, expected {}",
                    symbol,
                    record.len(),
                    BASE_RECORD_LEN
                )));
            }
            if let Some(exp) = record[..DIMENSIONS].iter().find(|e| e.fract() != 0.0) {
                return Err(UnitError::invalid_tables(format!(
                    "base unit '{}' has non-integral exponent {}",
                    symbol, exp
                )));
            }
            let scale = record[DIMENSIONS];
            if !scale.is_finite() || scale == 0.0 {
                return Err(UnitError::invalid_tables(format!(
                    "base unit '{}' has invalid scale {}",
                    symbol, scale
                )));
            }
        }

        if let Some((prefix, _)) = self.prefixes.iter().find(|(p, _)| p.is_empty()) {
            return Err(UnitError::invalid_tables(format!("empty prefix '{}'", prefix)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_loads() {
        let tables = UnitTables::builtin().unwrap();
        assert_eq!(tables.base.len(), 8);
        assert_eq!(tables.prefixes.len(), 20);
        assert_eq!(tables.base[0].0, "unit");
        assert!(tables.prefixes.contains(&("k".to_string(), 3)));
        assert!(tables.prefixes.contains(&("da".to_string(), 1)));
    }

    #[test]
    fn test_builtin_order_preserved() {
        let tables = UnitTables::builtin().unwrap();
        let prefixes: Vec<&str> = tables.prefixes.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(&prefixes[..3], &["Y", "Z", "E"]);
        assert_eq!(prefixes.last(), Some(&"y"));

        let min = tables.specs.iter().position(|(s, _)| s == "min").unwrap();
        let h = tables.specs.iter().position(|(s, _)| s == "h").unwrap();
        assert!(min < h);
    }

    #[test]
    fn test_wrong_record_length() {
        let json = r#"{"base": [["unit", [0,0,0,0,0,0,1,0]]], "prefixes": []}"#;
        let err = UnitTables::from_json(json).unwrap_err();
        assert!(err.to_string().contains("expected 9"));
    }

    #[test]
    fn test_missing_dimensionless() {
        let json = r#"{"base": [["m", [1,0,0,0,0,0,1,0,7]]], "prefixes": []}"#;
        assert!(UnitTables::from_json(json).is_err());
    }

    #[test]
    fn test_fractional_exponent_rejected() {
        let json = r#"{"base": [["unit", [0.5,0,0,0,0,0,1,0,16]]], "prefixes": []}"#;
        assert!(UnitTables::from_json(json).is_err());
    }

    #[test]
    fn test_specs_default_empty() {
        let json = r#"{"base": [["unit", [0,0,0,0,0,0,1,0,16]]], "prefixes": [["k", 3]]}"#;
        let tables = UnitTables::from_json(json).unwrap();
        assert!(tables.specs.is_empty());
    }

    #[test]
    fn test_not_json() {
        assert!(UnitTables::from_json("not json").is_err());
    }
}
