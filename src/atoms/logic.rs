//! Logic and comparison atoms. All pure, all boolean-valued.

use crate::atoms::{Atom, AtomRegistry, PureAtomFn};
use crate::signal::Fault;
use crate::value::Value;

fn validate_binary_arity(args: &[Value], atom_name: &str) -> Result<(), Fault> {
    if args.len() < 2 {
        return Err(Fault::arity_mismatch(atom_name, "at least 2", args.len()));
    }
    Ok(())
}

fn numeric_sequence_comparison(
    args: &[Value],
    fails: fn(f64, f64) -> bool,
    atom_name: &str,
) -> Result<Value, Fault> {
    validate_binary_arity(args, atom_name)?;
    let mut numbers = Vec::with_capacity(args.len());
    for arg in args {
        numbers.push(
            arg.as_number()
                .ok_or_else(|| Fault::type_mismatch(atom_name, "Number", arg.type_name()))?,
        );
    }
    for window in numbers.windows(2) {
        if fails(window[0], window[1]) {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

/// Returns true if all arguments are equal.
///
/// Usage: (= <a> <b> ...)
pub const ATOM_EQ: PureAtomFn = |args| {
    validate_binary_arity(args, "=")?;
    for window in args.windows(2) {
        if window[0] != window[1] {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
};

/// Returns true if any adjacent pair differs.
///
/// Usage: (!= <a> <b> ...)
pub const ATOM_NE: PureAtomFn = |args| {
    let equal = ATOM_EQ(args)?;
    Ok(Value::Bool(!equal.as_bool().unwrap_or(false)))
};

pub const ATOM_GT: PureAtomFn = |args| numeric_sequence_comparison(args, |a, b| a <= b, ">");
pub const ATOM_LT: PureAtomFn = |args| numeric_sequence_comparison(args, |a, b| a >= b, "<");
pub const ATOM_GTE: PureAtomFn = |args| numeric_sequence_comparison(args, |a, b| a < b, ">=");
pub const ATOM_LTE: PureAtomFn = |args| numeric_sequence_comparison(args, |a, b| a > b, "<=");

/// Logical negation of a truthy value.
///
/// Usage: (not <a>)
pub const ATOM_NOT: PureAtomFn = |args| {
    if args.len() != 1 {
        return Err(Fault::arity_mismatch("not", "1", args.len()));
    }
    Ok(Value::Bool(!args[0].is_truthy()))
};

/// True when every argument is truthy.
///
/// Usage: (and <a> <b> ...)
pub const ATOM_AND: PureAtomFn = |args| Ok(Value::Bool(args.iter().all(Value::is_truthy)));

/// True when any argument is truthy.
///
/// Usage: (or <a> <b> ...)
pub const ATOM_OR: PureAtomFn = |args| Ok(Value::Bool(args.iter().any(Value::is_truthy)));

pub fn register_logic_atoms(registry: &mut AtomRegistry) {
    registry.register("=", Atom::Pure(ATOM_EQ));
    registry.register("!=", Atom::Pure(ATOM_NE));
    registry.register(">", Atom::Pure(ATOM_GT));
    registry.register("<", Atom::Pure(ATOM_LT));
    registry.register(">=", Atom::Pure(ATOM_GTE));
    registry.register("<=", Atom::Pure(ATOM_LTE));
    registry.register("not", Atom::Pure(ATOM_NOT));
    registry.register("and", Atom::Pure(ATOM_AND));
    registry.register("or", Atom::Pure(ATOM_OR));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chained_equality() {
        let args = [Value::Number(1.0), Value::Number(1.0), Value::Number(1.0)];
        assert_eq!(ATOM_EQ(&args).unwrap(), Value::Bool(true));
        let args = [Value::Number(1.0), Value::Number(2.0)];
        assert_eq!(ATOM_EQ(&args).unwrap(), Value::Bool(false));
    }

    #[test]
    fn ordered_comparisons() {
        let args = [Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)];
        assert_eq!(ATOM_LT(&args).unwrap(), Value::Bool(true));
        assert_eq!(ATOM_GT(&args).unwrap(), Value::Bool(false));
    }

    #[test]
    fn comparison_rejects_strings() {
        let args = [Value::String("a".into()), Value::Number(1.0)];
        assert!(ATOM_LT(&args).is_err());
    }
}
