//! Collection atoms: list construction and inspection. All pure.

use crate::atoms::{Atom, AtomRegistry, PureAtomFn};
use crate::signal::Fault;
use crate::value::Value;

/// Builds a list from its arguments.
///
/// Usage: (list <a> <b> ...)
pub const ATOM_LIST: PureAtomFn = |args| Ok(Value::List(args.to_vec()));

/// Element count of a list or character count of a string.
///
/// Usage: (len <collection>)
pub const ATOM_LEN: PureAtomFn = |args| {
    if args.len() != 1 {
        return Err(Fault::arity_mismatch("len", "1", args.len()));
    }
    match &args[0] {
        Value::List(items) => Ok(Value::Number(items.len() as f64)),
        Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
        other => Err(Fault::type_mismatch(
            "len",
            "List or String",
            other.type_name(),
        )),
    }
};

/// Zero-based element access.
///
/// Usage: (nth <index> <list>)
pub const ATOM_NTH: PureAtomFn = |args| {
    if args.len() != 2 {
        return Err(Fault::arity_mismatch("nth", "2", args.len()));
    }
    let index = args[0]
        .as_number()
        .ok_or_else(|| Fault::type_mismatch("nth", "Number", args[0].type_name()))?;
    let Value::List(items) = &args[1] else {
        return Err(Fault::type_mismatch("nth", "List", args[1].type_name()));
    };
    if index < 0.0 || index.fract() != 0.0 {
        return Err(Fault::type_mismatch(
            "nth",
            "a non-negative integer index",
            &index.to_string(),
        ));
    }
    Ok(items.get(index as usize).cloned().unwrap_or(Value::Nil))
};

pub fn register_collection_atoms(registry: &mut AtomRegistry) {
    registry.register("list", Atom::Pure(ATOM_LIST));
    registry.register("len", Atom::Pure(ATOM_LEN));
    registry.register("nth", Atom::Pure(ATOM_NTH));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_builds_from_arguments() {
        let args = [Value::Number(1.0), Value::String("a".into())];
        assert_eq!(
            ATOM_LIST(&args).unwrap(),
            Value::List(vec![Value::Number(1.0), Value::String("a".into())])
        );
        assert_eq!(ATOM_LIST(&[]).unwrap(), Value::List(vec![]));
    }

    #[test]
    fn len_counts_lists_and_strings() {
        let list = Value::List(vec![Value::Nil, Value::Nil]);
        assert_eq!(ATOM_LEN(&[list]).unwrap(), Value::Number(2.0));
        let s = Value::String("abc".into());
        assert_eq!(ATOM_LEN(&[s]).unwrap(), Value::Number(3.0));
        assert!(ATOM_LEN(&[Value::Number(1.0)]).is_err());
    }

    #[test]
    fn nth_indexes_and_falls_back_to_nil() {
        let list = Value::List(vec![Value::Number(10.0), Value::Number(20.0)]);
        let args = [Value::Number(1.0), list.clone()];
        assert_eq!(ATOM_NTH(&args).unwrap(), Value::Number(20.0));
        let args = [Value::Number(5.0), list.clone()];
        assert_eq!(ATOM_NTH(&args).unwrap(), Value::Nil);
        let args = [Value::Number(-1.0), list];
        assert!(ATOM_NTH(&args).is_err());
    }

    #[test]
    fn empty_list_is_falsy() {
        assert!(!ATOM_LIST(&[]).unwrap().is_truthy());
        assert!(ATOM_LIST(&[Value::Nil]).unwrap().is_truthy());
    }
}
