//! Unitmath demo
//!
//! Seeds a unit registry and prints a few unit-checked sums.
//!
//! Environment:
//! - UNITMATH_TABLES: path to a JSON unit table document (builtin tables otherwise)
//! - RUST_LOG: log filter, defaults to "info"

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use unitmath_units::{Quantity, UnitError, UnitRegistry, UnitTables};

/// Get the unit table path from environment
fn tables_path() -> Option<PathBuf> {
    env::var_os("UNITMATH_TABLES").map(PathBuf::from)
}

fn load_tables() -> Result<UnitTables, UnitError> {
    match tables_path() {
        Some(path) => {
            info!(path = %path.display(), "loading unit tables");
            let json = fs::read_to_string(&path).map_err(|e| {
                UnitError::invalid_tables(format!("{}: {}", path.display(), e))
            })?;
            UnitTables::from_json(&json)
        }
        None => UnitTables::builtin(),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), UnitError> {
    let registry = UnitRegistry::new(&load_tables()?)?;

    let x = registry.parse_quantity("1.23 m")?;
    println!("x = {}", x);
    let y = registry.parse_quantity("1 cm")?;
    println!("y = {}", y);
    println!("x+y = {}", x.add(&y)?);
    println!("x-y = {}", x.sub(&y)?);

    let p = Quantity::with_symbol(1.0, "kWh", &registry)?
        .add(&Quantity::with_symbol(1.0, "MJ", &registry)?)?;
    println!("{}", p);

    for symbol in ["s", "min", "h"] {
        let record = registry.resolve(symbol)?;
        println!(
            "{}: dims [{}] scale {:e} offset {} precision {}",
            symbol, record.dims, record.scale, record.offset, record.precision
        );
    }

    info!(units = registry.len(), "demo finished");
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = e.code(), "{}", e);
            eprintln!("error: {} ({})", e, e.suggestion());
            ExitCode::FAILURE
        }
    }
}
