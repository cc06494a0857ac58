//! Arithmetic atoms. All pure; division by zero is a distinct runtime fault
//! so a test that divides by zero classifies as an error, not a failure.

use crate::atoms::{Atom, AtomRegistry, PureAtomFn};
use crate::signal::Fault;
use crate::value::Value;

fn extract_number(value: &Value, atom_name: &str) -> Result<f64, Fault> {
    value
        .as_number()
        .ok_or_else(|| Fault::type_mismatch(atom_name, "Number", value.type_name()))
}

/// Adds numbers.
///
/// Usage: (+ <a> <b> ...)
pub const ATOM_ADD: PureAtomFn = |args| {
    let mut sum = 0.0;
    for arg in args {
        sum += extract_number(arg, "+")?;
    }
    Ok(Value::Number(sum))
};

/// Subtracts numbers left to right; unary form negates.
///
/// Usage: (- <a> <b> ...)
pub const ATOM_SUB: PureAtomFn = |args| {
    if args.is_empty() {
        return Err(Fault::arity_mismatch("-", "at least 1", args.len()));
    }
    let first = extract_number(&args[0], "-")?;
    if args.len() == 1 {
        return Ok(Value::Number(-first));
    }
    let mut result = first;
    for arg in &args[1..] {
        result -= extract_number(arg, "-")?;
    }
    Ok(Value::Number(result))
};

/// Multiplies numbers.
///
/// Usage: (* <a> <b> ...)
pub const ATOM_MUL: PureAtomFn = |args| {
    let mut product = 1.0;
    for arg in args {
        product *= extract_number(arg, "*")?;
    }
    Ok(Value::Number(product))
};

/// Divides numbers left to right. Division by zero faults.
///
/// Usage: (/ <a> <b> ...)
pub const ATOM_DIV: PureAtomFn = |args| {
    if args.len() < 2 {
        return Err(Fault::arity_mismatch("/", "at least 2", args.len()));
    }
    let mut result = extract_number(&args[0], "/")?;
    for arg in &args[1..] {
        let divisor = extract_number(arg, "/")?;
        if divisor == 0.0 {
            return Err(Fault::division_by_zero());
        }
        result /= divisor;
    }
    Ok(Value::Number(result))
};

/// Remainder. Zero modulus faults like division.
///
/// Usage: (mod <a> <b>)
pub const ATOM_MOD: PureAtomFn = |args| {
    if args.len() != 2 {
        return Err(Fault::arity_mismatch("mod", "2", args.len()));
    }
    let a = extract_number(&args[0], "mod")?;
    let b = extract_number(&args[1], "mod")?;
    if b == 0.0 {
        return Err(Fault::division_by_zero());
    }
    Ok(Value::Number(a % b))
};

pub fn register_math_atoms(registry: &mut AtomRegistry) {
    registry.register("+", Atom::Pure(ATOM_ADD));
    registry.register("-", Atom::Pure(ATOM_SUB));
    registry.register("*", Atom::Pure(ATOM_MUL));
    registry.register("/", Atom::Pure(ATOM_DIV));
    registry.register("mod", Atom::Pure(ATOM_MOD));
}
