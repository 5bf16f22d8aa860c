//! Specification and quantity string parsing
//!
//! Specification grammar:
//! - Ratio:  "<scale> <definition>"     e.g. "60 s", "1 m.kg/s^2"
//! - Affine: "<definition>-<offset>"    e.g. "K-273.14"
//!
//! A definition is `<numerator>[/<denominator>]`, each side a `.`-separated
//! product of `symbol[^exponent]` factors.

use std::fmt;
use unitmath_core::{UnitError, DIMENSIONLESS_SYMBOL};
use crate::record::{AFFINE_PRECISION, RATIO_PRECISION};

/// Largest exponent magnitude a written factor may carry
const MAX_EXPONENT: i32 = 100;

/// A single `symbol^exponent` term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factor {
    pub symbol: String,
    pub exponent: i32,
}

impl Factor {
    pub fn new(symbol: impl Into<String>, exponent: i32) -> Self {
        Factor { symbol: symbol.into(), exponent }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponent == 1 {
            write!(f, "{}", self.symbol)
        } else {
            write!(f, "{}^{}", self.symbol, self.exponent)
        }
    }
}

/// A compound definition: numerator factors over denominator factors.
/// An empty side stands for the dimensionless unit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Definition {
    pub numerator: Vec<Factor>,
    pub denominator: Vec<Factor>,
}

impl Definition {
    /// A definition consisting of one symbol
    pub fn atom(symbol: impl Into<String>) -> Self {
        Definition {
            numerator: vec![Factor::new(symbol, 1)],
            denominator: Vec::new(),
        }
    }

    /// Parse `num[/den]`; the error string is the reason
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("empty definition".to_string());
        }

        let (num, den) = match text.split_once('/') {
            Some((num, den)) => (num, Some(den)),
            None => (text, None),
        };

        let numerator = parse_product(num)?;
        let denominator = match den {
            Some(den) if den.contains('/') => {
                return Err("more than one '/'".to_string());
            }
            Some(den) => parse_product(den)?,
            None => Vec::new(),
        };

        Ok(Definition { numerator, denominator })
    }

    /// Product of two definitions; `None` on exponent overflow
    pub fn multiply(&self, other: &Definition) -> Option<Definition> {
        let mut terms = self.signed_terms()?;
        terms.extend(other.signed_terms()?);
        Definition::from_signed_terms(terms)
    }

    /// Quotient of two definitions
    pub fn divide(&self, other: &Definition) -> Option<Definition> {
        self.multiply(&other.power(-1)?)
    }

    /// Every exponent multiplied by `exp`
    pub fn power(&self, exp: i32) -> Option<Definition> {
        let terms = self
            .signed_terms()?
            .into_iter()
            .map(|(symbol, e)| Some((symbol, e.checked_mul(exp)?)))
            .collect::<Option<Vec<_>>>()?;
        Definition::from_signed_terms(terms)
    }

    fn signed_terms(&self) -> Option<Vec<(String, i32)>> {
        let num = self.numerator.iter().map(|f| Some((f.symbol.clone(), f.exponent)));
        let den = self
            .denominator
            .iter()
            .map(|f| Some((f.symbol.clone(), f.exponent.checked_neg()?)));
        num.chain(den).collect()
    }

    /// Merge repeated symbols, keeping first-appearance order
    fn from_signed_terms(terms: Vec<(String, i32)>) -> Option<Definition> {
        let mut merged: Vec<(String, i32)> = Vec::new();
        for (symbol, exp) in terms {
            if symbol == DIMENSIONLESS_SYMBOL {
                continue;
            }
            match merged.iter_mut().find(|(s, _)| *s == symbol) {
                Some((_, total)) => *total = total.checked_add(exp)?,
                None => merged.push((symbol, exp)),
            }
        }

        let mut def = Definition::default();
        for (symbol, exp) in merged {
            if exp > 0 {
                def.numerator.push(Factor::new(symbol, exp));
            } else if exp < 0 {
                def.denominator.push(Factor::new(symbol, exp.checked_neg()?));
            }
        }
        Some(def)
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.numerator.is_empty() {
            write!(f, "{}", DIMENSIONLESS_SYMBOL)?;
        } else {
            write!(f, "{}", join_factors(&self.numerator))?;
        }
        if !self.denominator.is_empty() {
            write!(f, "/{}", join_factors(&self.denominator))?;
        }
        Ok(())
    }
}

fn join_factors(factors: &[Factor]) -> String {
    factors
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Parse a product like "m.kg" or "ft^2"
fn parse_product(s: &str) -> Result<Vec<Factor>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty product".to_string());
    }
    s.split('.').map(parse_factor).collect()
}

/// Parse a factor with optional integer power like "s^2" or "s^-1"
fn parse_factor(s: &str) -> Result<Factor, String> {
    let s = s.trim();
    let (symbol, exponent) = match s.split_once('^') {
        Some((base, exp)) => {
            let exponent: i32 = exp
                .trim()
                .parse()
                .map_err(|_| format!("invalid exponent '{}'", exp))?;
            if exponent.unsigned_abs() > MAX_EXPONENT.unsigned_abs() {
                return Err(format!("exponent out of range '{}'", exp));
            }
            (base.trim(), exponent)
        }
        None => (s, 1),
    };

    if symbol.is_empty() {
        return Err(format!("empty factor in '{}'", s));
    }
    if symbol.chars().any(char::is_whitespace) {
        return Err(format!("whitespace inside factor '{}'", s));
    }
    Ok(Factor::new(symbol, exponent))
}

/// A parsed specification string
#[derive(Debug, Clone, PartialEq)]
pub struct Specification {
    pub scale: f64,
    pub offset: f64,
    pub precision: u32,
    pub definition: Definition,
}

impl Specification {
    /// Parse a specification for `symbol`
    ///
    /// In the affine form `"K-273.14"` the unit is the definition shifted
    /// down by the offset, so the stored offset is `+273.14`:
    /// `base = (value + 273.14) * scale(K)`.
    pub fn parse(symbol: &str, spec: &str) -> Result<Self, UnitError> {
        let malformed = |reason: String| UnitError::malformed(symbol, spec, reason);
        let tokens: Vec<&str> = spec.split_whitespace().collect();

        match tokens.as_slice() {
            [scale, defn] => {
                let scale: f64 = scale
                    .parse()
                    .map_err(|_| malformed(format!("non-numeric scale '{}'", scale)))?;
                let definition = Definition::parse(defn).map_err(malformed)?;
                Ok(Specification {
                    scale,
                    offset: 0.0,
                    precision: RATIO_PRECISION,
                    definition,
                })
            }
            [affine] => {
                let (defn, offset) = affine.rsplit_once('-').ok_or_else(|| {
                    malformed("expected \"<scale> <definition>\" or \"<definition>-<offset>\"".to_string())
                })?;
                let offset: f64 = offset
                    .parse()
                    .map_err(|_| malformed(format!("non-numeric offset '{}'", offset)))?;
                let definition = Definition::parse(defn).map_err(malformed)?;
                Ok(Specification {
                    scale: 1.0,
                    offset,
                    precision: AFFINE_PRECISION,
                    definition,
                })
            }
            _ => Err(malformed(format!("expected 1 or 2 tokens, got {}", tokens.len()))),
        }
    }
}

/// Whether a symbol is a compound expression rather than an atomic name
pub fn is_compound(symbol: &str) -> bool {
    symbol.contains(['.', '/', '^'])
}

/// Parse a quantity string like "1.23 m" or "42"
///
/// Splits on the first whitespace; the unit token is `None` when absent.
pub fn parse_quantity_string(s: &str) -> Result<(f64, Option<&str>), UnitError> {
    let s = s.trim();
    let (num_str, unit_str) = match s.split_once(char::is_whitespace) {
        Some((num, unit)) => (num, Some(unit.trim())),
        None => (s, None),
    };

    let value: f64 = num_str
        .parse()
        .map_err(|_| UnitError::invalid_number(num_str))?;

    Ok((value, unit_str.filter(|u| !u.is_empty())))
}
