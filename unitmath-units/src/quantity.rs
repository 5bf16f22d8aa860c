//! Quantity type - a value with an optional unit

use std::cmp::Ordering;
use std::fmt;
use serde::{Serialize, Deserialize};
use unitmath_core::{UnitError, DIMENSIONLESS_SYMBOL};
use crate::{Dimension, Unit, UnitRecord, UnitRegistry};
use crate::format::{format_general, format_significant};
use crate::parse::parse_quantity_string;

/// A numeric value with an associated unit; dimensionless without one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Option<Unit>,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Quantity { value, unit: Some(unit) }
    }

    /// Create a dimensionless quantity (pure number)
    pub fn dimensionless(value: f64) -> Self {
        Quantity { value, unit: None }
    }

    /// Parse "<number> <symbol>", or a bare number
    pub fn parse(text: &str, registry: &UnitRegistry) -> Result<Self, UnitError> {
        let (value, symbol) = parse_quantity_string(text)?;
        match symbol {
            Some(symbol) => Quantity::with_symbol(value, symbol, registry),
            None => Ok(Quantity::dimensionless(value)),
        }
    }

    /// Create a quantity, resolving the unit symbol
    pub fn with_symbol(value: f64, symbol: &str, registry: &UnitRegistry) -> Result<Self, UnitError> {
        Ok(Quantity::new(value, registry.unit(symbol)?))
    }

    pub fn dimension(&self) -> Dimension {
        self.unit
            .as_ref()
            .map(|u| u.dimension)
            .unwrap_or(Dimension::DIMENSIONLESS)
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dimension().is_dimensionless()
    }

    pub fn symbol(&self) -> &str {
        self.unit
            .as_ref()
            .map(|u| u.symbol.as_str())
            .unwrap_or(DIMENSIONLESS_SYMBOL)
    }

    fn record(&self) -> UnitRecord {
        self.unit
            .as_ref()
            .map(Unit::record)
            .unwrap_or_else(UnitRecord::dimensionless)
    }

    /// Check if two quantities have compatible dimensions
    pub fn is_compatible(&self, other: &Quantity) -> bool {
        self.dimension() == other.dimension()
    }

    fn check_compatible(&self, other: &Quantity) -> Result<(), UnitError> {
        if self.is_compatible(other) {
            Ok(())
        } else {
            Err(UnitError::mismatch(
                self.symbol(),
                other.symbol(),
                self.dimension(),
                other.dimension(),
            ))
        }
    }

    /// Value in the canonical base representation
    pub fn to_base(&self) -> f64 {
        self.record().to_base(self.value)
    }

    /// Express this quantity in another unit
    pub fn convert_to(&self, target: &Unit) -> Result<Quantity, UnitError> {
        if self.dimension() != target.dimension {
            return Err(UnitError::mismatch(
                self.symbol(),
                &target.symbol,
                self.dimension(),
                target.dimension,
            ));
        }
        Ok(Quantity::new(target.from_base(self.to_base()), target.clone()))
    }

    /// `other` converted into this quantity's unit
    fn value_in_own_unit(&self, other: &Quantity) -> Result<f64, UnitError> {
        self.check_compatible(other)?;
        Ok(self.record().from_base(other.to_base()))
    }

    /// Add two quantities; the result is in `self`'s unit
    pub fn add(&self, other: &Quantity) -> Result<Quantity, UnitError> {
        let converted = self.value_in_own_unit(other)?;
        Ok(Quantity {
            value: self.value + converted,
            unit: self.unit.clone(),
        })
    }

    /// Subtract two quantities; the result is in `self`'s unit
    pub fn sub(&self, other: &Quantity) -> Result<Quantity, UnitError> {
        let converted = self.value_in_own_unit(other)?;
        Ok(Quantity {
            value: self.value - converted,
            unit: self.unit.clone(),
        })
    }

    /// Multiply two quantities (dimensions are added, no unit match needed)
    pub fn mul(&self, other: &Quantity) -> Result<Quantity, UnitError> {
        let unit = match (&self.unit, &other.unit) {
            (None, None) => None,
            (Some(u), None) | (None, Some(u)) => Some(u.clone()),
            (Some(a), Some(b)) => Some(a.multiply(b)?),
        };
        Ok(Quantity { value: self.value * other.value, unit })
    }

    /// Divide two quantities (dimensions are subtracted)
    pub fn div(&self, other: &Quantity) -> Result<Quantity, UnitError> {
        let unit = match (&self.unit, &other.unit) {
            (None, None) => None,
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(Unit::dimensionless().divide(b)?),
            (Some(a), Some(b)) => Some(a.divide(b)?),
        };
        Ok(Quantity { value: self.value / other.value, unit })
    }

    /// Raise quantity to an integer power
    pub fn powi(&self, exp: i32) -> Result<Quantity, UnitError> {
        Ok(Quantity {
            value: self.value.powi(exp),
            unit: self.unit.as_ref().map(|u| u.power(exp)).transpose()?,
        })
    }

    /// Order two compatible quantities by their base values
    pub fn compare(&self, other: &Quantity) -> Result<Ordering, UnitError> {
        self.check_compatible(other)?;
        Ok(self.to_base().total_cmp(&other.to_base()))
    }

    /// Equality of base values within a relative tolerance
    pub fn approx_eq(&self, other: &Quantity, rel_tol: f64) -> Result<bool, UnitError> {
        self.check_compatible(other)?;
        let (a, b) = (self.to_base(), other.to_base());
        Ok((a - b).abs() <= rel_tol * a.abs().max(b.abs()))
    }

    /// Value truncated toward zero, unit discarded
    pub fn to_i64(&self) -> i64 {
        self.value as i64
    }

    /// Value as a float, unit discarded
    pub fn to_f64(&self) -> f64 {
        self.value
    }

    /// Display using the unit's advisory precision
    pub fn to_precision_string(&self) -> String {
        let value = format_significant(self.value, self.record().precision as usize);
        match &self.unit {
            Some(unit) => format!("{} {}", value, unit.symbol),
            None => value,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{} {}", format_general(self.value), unit.symbol),
            None => write!(f, "{}", format_general(self.value)),
        }
    }
}

impl From<&Quantity> for f64 {
    fn from(q: &Quantity) -> f64 {
        q.value
    }
}

impl From<Quantity> for f64 {
    fn from(q: Quantity) -> f64 {
        q.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> UnitRegistry {
        UnitRegistry::builtin().unwrap()
    }

    fn q(reg: &UnitRegistry, text: &str) -> Quantity {
        Quantity::parse(text, reg).unwrap()
    }

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_parse() {
        let reg = registry();
        let x = q(&reg, "1.23 m");
        assert_eq!(x.value, 1.23);
        assert_eq!(x.symbol(), "m");
        assert_eq!(x.dimension(), reg.resolve("m").unwrap().dims);

        let n = q(&reg, "42");
        assert!(n.unit.is_none());
        assert!(n.is_dimensionless());
    }

    #[test]
    fn test_parse_errors() {
        let reg = registry();
        assert_eq!(
            Quantity::parse("1 xyzzy", &reg).unwrap_err(),
            UnitError::unknown_unit("xyzzy")
        );
        assert_eq!(
            Quantity::parse("one m", &reg).unwrap_err(),
            UnitError::invalid_number("one")
        );
    }

    #[test]
    fn test_add_cross_unit() {
        let reg = registry();
        let sum = q(&reg, "1.23 m").add(&q(&reg, "1 cm")).unwrap();
        assert!(close(sum.value, 1.24, 1e-12));
        assert_eq!(sum.symbol(), "m");
        assert_eq!(sum.to_string(), "1.24 m");
    }

    #[test]
    fn test_sub_cross_unit() {
        let reg = registry();
        let diff = q(&reg, "1.23 m").sub(&q(&reg, "1 cm")).unwrap();
        assert!(close(diff.value, 1.22, 1e-12));
        assert_eq!(diff.symbol(), "m");
    }

    #[test]
    fn test_add_energy() {
        let reg = registry();
        let p = Quantity::with_symbol(1.0, "kWh", &reg)
            .unwrap()
            .add(&Quantity::with_symbol(1.0, "MJ", &reg).unwrap())
            .unwrap();
        assert!(close(p.value, 1.0 + 1.0 / 3.6, 1e-9));
        assert_eq!(p.to_string(), "1.27778 kWh");
    }

    #[test]
    fn test_add_same_unit() {
        let reg = registry();
        let sum = q(&reg, "2 ft").add(&q(&reg, "3 ft")).unwrap();
        assert!(close(sum.value, 5.0, 1e-12));
    }

    #[test]
    fn test_mismatch() {
        let reg = registry();
        let err = q(&reg, "1 m").add(&q(&reg, "1 s")).unwrap_err();
        assert!(matches!(err, UnitError::UnitMismatch { .. }));
        assert!(q(&reg, "1 m").sub(&q(&reg, "1 kg")).is_err());
        assert!(q(&reg, "1 m").compare(&q(&reg, "1 s")).is_err());
        assert!(q(&reg, "1 m").add(&q(&reg, "3")).is_err());
    }

    #[test]
    fn test_compatibility_is_dimension_equality() {
        let reg = registry();
        let symbols = ["m", "km", "ft", "s", "min", "N", "J", "kWh", "unit", "rad"];
        for a in symbols {
            for b in symbols {
                let qa = Quantity::with_symbol(1.0, a, &reg).unwrap();
                let qb = Quantity::with_symbol(1.0, b, &reg).unwrap();
                let same = reg.resolve(a).unwrap().dims == reg.resolve(b).unwrap().dims;
                assert_eq!(qa.add(&qb).is_ok(), same, "{} + {}", a, b);
                assert_eq!(qa.is_compatible(&qb), qb.is_compatible(&qa));
            }
        }
    }

    #[test]
    fn test_dimensionless_arithmetic() {
        let reg = registry();
        let sum = q(&reg, "2").add(&q(&reg, "3 unit")).unwrap();
        assert!(sum.unit.is_none());
        assert!(close(sum.value, 5.0, 1e-12));
        assert_eq!(sum.to_string(), "5");
    }

    #[test]
    fn test_affine_add() {
        let reg = registry();
        // 5 K expressed in degC is 5 - 273.14
        let sum = q(&reg, "10 degC").add(&q(&reg, "5 K")).unwrap();
        assert!(close(sum.value, 10.0 + 5.0 - 273.14, 1e-9));
        assert_eq!(sum.symbol(), "degC");
    }

    #[test]
    fn test_affine_convert() {
        let reg = registry();
        let zero_c = q(&reg, "0 degC");
        let k = reg.unit("K").unwrap();
        let in_k = zero_c.convert_to(&k).unwrap();
        assert!(close(in_k.value, 273.14, 1e-9));

        let freezing = q(&reg, "32 degF").convert_to(&reg.unit("degC").unwrap()).unwrap();
        assert!(freezing.value.abs() < 0.01);
    }

    #[test]
    fn test_convert_mismatch() {
        let reg = registry();
        assert!(q(&reg, "1 m").convert_to(&reg.unit("s").unwrap()).is_err());
    }

    #[test]
    fn test_mul_div() {
        let reg = registry();
        let work = q(&reg, "3 N").mul(&q(&reg, "2 m")).unwrap();
        assert_eq!(work.symbol(), "N.m");
        assert_eq!(work.dimension(), reg.resolve("J").unwrap().dims);
        assert!(close(work.value, 6.0, 1e-12));
        let joules = work.convert_to(&reg.unit("J").unwrap()).unwrap();
        assert!(close(joules.value, 6.0, 1e-9));

        let speed = q(&reg, "100 m").div(&q(&reg, "10 s")).unwrap();
        assert_eq!(speed.symbol(), "m/s");
        let mps = speed.convert_to(&reg.unit("mps").unwrap()).unwrap();
        assert!(close(mps.value, 10.0, 1e-9));

        let freq = q(&reg, "2").div(&q(&reg, "4 s")).unwrap();
        assert_eq!(freq.symbol(), "unit/s");
        assert_eq!(freq.dimension(), reg.resolve("Hz").unwrap().dims);
    }

    #[test]
    fn test_mul_no_match_required() {
        let reg = registry();
        let scaled = q(&reg, "3").mul(&q(&reg, "2 kg")).unwrap();
        assert_eq!(scaled.symbol(), "kg");
        assert!(close(scaled.value, 6.0, 1e-12));
    }

    #[test]
    fn test_powi() {
        let reg = registry();
        let area = q(&reg, "3 m").powi(2).unwrap();
        assert_eq!(area.symbol(), "m^2");
        assert!(close(area.value, 9.0, 1e-12));
        assert_eq!(area.dimension(), reg.resolve("m").unwrap().dims.checked_power(2).unwrap());
        let ha = area.convert_to(&reg.unit("ha").unwrap()).unwrap();
        assert!(close(ha.value, 9.0e-4, 1e-9));
    }

    #[test]
    fn test_powi_exponent_overflow() {
        let reg = registry();
        let t = q(&reg, "1 s").powi(2_000_000_000).unwrap();
        assert_eq!(t.symbol(), "s^2000000000");
        assert!(matches!(
            t.powi(2),
            Err(UnitError::MalformedSpecification { ref reason, .. }) if reason == "exponent overflow"
        ));
        assert!(t.mul(&t).is_err());
        // No unit, nothing to overflow
        assert!(q(&reg, "2").powi(i32::MAX).is_ok());
    }

    #[test]
    fn test_compare() {
        let reg = registry();
        assert_eq!(q(&reg, "1 km").compare(&q(&reg, "999 m")).unwrap(), Ordering::Greater);
        assert_eq!(q(&reg, "1 h").compare(&q(&reg, "61 min")).unwrap(), Ordering::Less);
        assert!(q(&reg, "1 h").approx_eq(&q(&reg, "60 min"), 1e-12).unwrap());
        assert!(!q(&reg, "1 h").approx_eq(&q(&reg, "59 min"), 1e-12).unwrap());
    }

    #[test]
    fn test_coercions() {
        let reg = registry();
        let x = q(&reg, "-2.7 m");
        assert_eq!(x.to_i64(), -2);
        assert_eq!(x.to_f64(), -2.7);
        assert_eq!(f64::from(&x), -2.7);
    }

    #[test]
    fn test_display() {
        let reg = registry();
        assert_eq!(q(&reg, "1 cm").to_string(), "1 cm");
        assert_eq!(q(&reg, "1500000 W").to_string(), "1.5e+06 W");
        assert_eq!(q(&reg, "21.456 degC").to_precision_string(), "21 degC");
    }

    #[test]
    fn test_round_trip() {
        let reg = registry();
        let samples = [
            q(&reg, "1.23 m"),
            q(&reg, "-0.000123 kWh"),
            q(&reg, "42"),
            q(&reg, "7 N").div(&q(&reg, "2 m^2")).unwrap(),
            q(&reg, "9.81 m").div(&q(&reg, "1 s").powi(2).unwrap()).unwrap(),
        ];
        for original in samples {
            let text = original.to_string();
            let parsed = Quantity::parse(&text, &reg).unwrap();
            assert_eq!(parsed.dimension(), original.dimension(), "{}", text);
            assert_eq!(parsed.symbol(), original.symbol());
            assert!(close(parsed.value, original.value, 1e-5), "{}", text);
            assert!(close(parsed.to_base(), original.to_base(), 1e-5), "{}", text);
        }
    }

    #[test]
    fn test_serialize() {
        let reg = registry();
        let json = serde_json::to_value(q(&reg, "2 km")).unwrap();
        assert_eq!(json["value"], 2.0);
        assert_eq!(json["unit"]["symbol"], "km");
    }
}
