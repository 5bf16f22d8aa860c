//! Unit registry - memoizing resolver from symbols to unit records
//!
//! Resolution order for a symbol:
//! 1. direct hit in the registry
//! 2. first prefix (in table order) whose suffix is already registered
//! 3. a registered specification for the symbol
//! 4. a compound symbol ("m/s^2") derived factor by factor
//!
//! Prefixes only apply to atomic symbols; a compound symbol gets its
//! prefixes through its factors ("km/h" is k+m over h). This deliberately
//! narrows the first-match scan, which would otherwise read "min/s" as
//! milli-"in/s" once "in/s" is registered.
//!
//! A symbol registered with its own specification skips step 2: "dam"
//! defined as "5 m" is five metres, not deca-metres.
//!
//! Anything else is `UnknownUnit`. Every successful resolution is inserted
//! and never changed afterwards.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};
use unitmath_core::{UnitError, UnitTables};
use crate::{Dimension, Quantity, Unit, UnitRecord};
use crate::parse::{is_compound, Definition, Specification};
use crate::record::RATIO_PRECISION;

#[derive(Debug, Default)]
struct RegistryState {
    records: HashMap<String, UnitRecord>,
    specs: HashMap<String, String>,
}

/// Registry of all resolved units
///
/// The read-check-insert sequence runs under a write lock, so concurrent
/// first-time resolution of one symbol derives it once.
#[derive(Debug)]
pub struct UnitRegistry {
    prefixes: Vec<(String, i32)>,
    state: RwLock<RegistryState>,
}

impl UnitRegistry {
    /// Seed a registry from base records, then derive every specification
    /// in declaration order. Fails on the first bad entry.
    pub fn new(tables: &UnitTables) -> Result<Self, UnitError> {
        tables.validate()?;

        let mut state = RegistryState::default();
        for (symbol, row) in &tables.base {
            let record = UnitRecord::from_base_row(symbol, row)?;
            state.records.insert(symbol.clone(), record);
        }

        let registry = UnitRegistry {
            prefixes: tables.prefixes.clone(),
            state: RwLock::new(state),
        };

        {
            let mut state = registry.write();
            for (symbol, spec) in &tables.specs {
                if state.records.contains_key(symbol) {
                    return Err(UnitError::malformed(symbol, spec, "symbol already defined"));
                }
                let parsed = Specification::parse(symbol, spec)?;
                let mut visiting = vec![symbol.clone()];
                let record = registry.derive(&mut state, symbol, spec, &parsed, &mut visiting)?;
                state.records.insert(symbol.clone(), record);
                state.specs.insert(symbol.clone(), spec.clone());
            }
            info!(units = state.records.len(), "unit registry seeded");
        }

        Ok(registry)
    }

    /// Registry seeded from the builtin tables
    pub fn builtin() -> Result<Self, UnitError> {
        Self::new(&UnitTables::builtin()?)
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        // Records are inserted only after a successful derivation, so a
        // poisoned lock still guards consistent data.
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resolve a symbol to its record, memoizing the result
    pub fn resolve(&self, symbol: &str) -> Result<UnitRecord, UnitError> {
        if let Some(record) = self.read().records.get(symbol) {
            return Ok(*record);
        }
        let mut state = self.write();
        self.resolve_in(&mut state, symbol, &mut Vec::new())
    }

    /// Resolve a symbol into a `Unit` identifier
    pub fn unit(&self, symbol: &str) -> Result<Unit, UnitError> {
        let record = self.resolve(symbol)?;
        Ok(Unit::from_record(symbol, &record))
    }

    /// Parse a quantity string like "1.23 m"
    pub fn parse_quantity(&self, text: &str) -> Result<Quantity, UnitError> {
        Quantity::parse(text, self)
    }

    fn resolve_in(
        &self,
        state: &mut RegistryState,
        symbol: &str,
        visiting: &mut Vec<String>,
    ) -> Result<UnitRecord, UnitError> {
        if let Some(record) = state.records.get(symbol) {
            return Ok(*record);
        }

        let own_spec = state.specs.get(symbol).cloned();
        if own_spec.is_none() && !is_compound(symbol) {
            if let Some(record) = self.resolve_prefixed(state, symbol) {
                state.records.insert(symbol.to_string(), record);
                return Ok(record);
            }
        }

        if visiting.iter().any(|s| s == symbol) {
            let chain = format!("{} -> {}", visiting.join(" -> "), symbol);
            let spec = state.specs.get(&visiting[0]).cloned().unwrap_or_default();
            return Err(UnitError::malformed(
                &visiting[0],
                spec,
                format!("circular reference: {}", chain),
            ));
        }

        let (text, parsed) = if let Some(spec) = own_spec {
            debug!(symbol, spec = %spec, "deriving from specification");
            let parsed = Specification::parse(symbol, &spec)?;
            (spec, parsed)
        } else if is_compound(symbol) {
            debug!(symbol, "deriving compound symbol");
            let text = format!("1 {}", symbol);
            let definition = Definition::parse(symbol)
                .map_err(|reason| UnitError::malformed(symbol, &text, reason))?;
            let parsed = Specification {
                scale: 1.0,
                offset: 0.0,
                precision: RATIO_PRECISION,
                definition,
            };
            (text, parsed)
        } else {
            return Err(UnitError::unknown_unit(symbol));
        };

        visiting.push(symbol.to_string());
        let record = self.derive(state, symbol, &text, &parsed, visiting);
        visiting.pop();

        let record = record?;
        state.records.insert(symbol.to_string(), record);
        Ok(record)
    }

    /// First prefix in table order whose remainder is already registered.
    /// "min" stays minutes only because it is registered before this runs.
    fn resolve_prefixed(&self, state: &RegistryState, symbol: &str) -> Option<UnitRecord> {
        self.prefixes.iter().find_map(|(prefix, exponent)| {
            let suffix = symbol.strip_prefix(prefix.as_str())?;
            let base = state.records.get(suffix)?;
            debug!(symbol, prefix = %prefix, suffix, "resolved by prefix");
            Some(base.with_prefix(*exponent))
        })
    }

    /// Accumulate dimensions and scale over the definition's factors.
    /// `symbol` and `text` only label errors.
    fn derive(
        &self,
        state: &mut RegistryState,
        symbol: &str,
        text: &str,
        spec: &Specification,
        visiting: &mut Vec<String>,
    ) -> Result<UnitRecord, UnitError> {
        let overflow = || UnitError::malformed(symbol, text, "exponent overflow");
        let mut dims = Dimension::DIMENSIONLESS;
        let mut scale = spec.scale;

        for factor in &spec.definition.numerator {
            let record = self.resolve_in(state, &factor.symbol, visiting)?;
            let term = record.dims.checked_power(factor.exponent).ok_or_else(overflow)?;
            dims = dims.checked_multiply(&term).ok_or_else(overflow)?;
            scale *= record.scale.powi(factor.exponent);
        }
        for factor in &spec.definition.denominator {
            let record = self.resolve_in(state, &factor.symbol, visiting)?;
            let term = record.dims.checked_power(factor.exponent).ok_or_else(overflow)?;
            dims = dims.checked_divide(&term).ok_or_else(overflow)?;
            scale /= record.scale.powi(factor.exponent);
        }

        Ok(UnitRecord::new(dims, scale, spec.offset, spec.precision))
    }

    /// Register a specification to be derived on first use.
    /// The syntax is checked now; referenced symbols are checked on resolution.
    pub fn register_spec(&self, symbol: &str, spec: &str) -> Result<(), UnitError> {
        Specification::parse(symbol, spec)?;

        let mut state = self.write();
        if state.records.contains_key(symbol) || state.specs.contains_key(symbol) {
            return Err(UnitError::malformed(symbol, spec, "symbol already defined"));
        }
        state.specs.insert(symbol.to_string(), spec.to_string());
        Ok(())
    }

    /// Register a specification and derive it immediately, as seeding does.
    /// A specification that fails to resolve is withdrawn.
    pub fn define(&self, symbol: &str, spec: &str) -> Result<UnitRecord, UnitError> {
        let parsed = Specification::parse(symbol, spec)?;

        let mut state = self.write();
        if state.records.contains_key(symbol) || state.specs.contains_key(symbol) {
            return Err(UnitError::malformed(symbol, spec, "symbol already defined"));
        }
        state.specs.insert(symbol.to_string(), spec.to_string());

        let mut visiting = vec![symbol.to_string()];
        match self.derive(&mut state, symbol, spec, &parsed, &mut visiting) {
            Ok(record) => {
                state.records.insert(symbol.to_string(), record);
                Ok(record)
            }
            Err(e) => {
                state.specs.remove(symbol);
                Err(e)
            }
        }
    }

    /// Get a record without resolving
    pub fn get(&self, symbol: &str) -> Option<UnitRecord> {
        self.read().records.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.read().records.contains_key(symbol)
    }

    /// The specification a symbol was registered with, if any
    pub fn specification(&self, symbol: &str) -> Option<String> {
        self.read().specs.get(symbol).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All resolved symbols, sorted
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.read().records.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Prefixes in matching order
    pub fn prefixes(&self) -> &[(String, i32)] {
        &self.prefixes
    }
}
