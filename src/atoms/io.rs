//! Output atoms. These are the only operations with an effect outside the
//! evaluator: each writes to one channel of the invocation's capture region.

use crate::atoms::{Atom, AtomRegistry, EffectAtomFn, PureAtomFn};
use crate::capture::SharedCapture;
use crate::signal::Fault;
use crate::value::Value;

fn join_args(args: &[Value]) -> String {
    args.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Writes a line to the captured stdout channel.
///
/// Usage: (print <a> ...)
pub const ATOM_PRINT: EffectAtomFn = |args, capture| {
    capture.emit_out(&join_args(args));
    Ok(Value::Nil)
};

/// Writes a line to the captured stderr channel.
///
/// Usage: (eprint <a> ...)
pub const ATOM_EPRINT: EffectAtomFn = |args, capture| {
    capture.emit_err(&join_args(args));
    Ok(Value::Nil)
};

/// Records a runtime warning for the current invocation.
///
/// Usage: (warn <message> ...)
pub const ATOM_WARN: EffectAtomFn = |args, capture| {
    if args.is_empty() {
        return Err(Fault::arity_mismatch("warn", "at least 1", args.len()));
    }
    capture.warn(&join_args(args));
    Ok(Value::Nil)
};

/// Concatenates arguments into a string.
///
/// Usage: (str <a> ...)
pub const ATOM_STR: PureAtomFn = |args| {
    let mut out = String::new();
    for arg in args {
        out.push_str(&arg.to_string());
    }
    Ok(Value::String(out))
};

pub fn register_io_atoms(registry: &mut AtomRegistry) {
    registry.register("print", Atom::Effect(ATOM_PRINT));
    registry.register("eprint", Atom::Effect(ATOM_EPRINT));
    registry.register("warn", Atom::Effect(ATOM_WARN));
    registry.register("str", Atom::Pure(ATOM_STR));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_goes_to_stdout_channel_only() {
        let capture = SharedCapture::new();
        ATOM_PRINT(&[Value::String("A".into())], &capture).unwrap();
        let (stdout, stderr, _) = capture.drain();
        assert_eq!(stdout, "A\n");
        assert!(stderr.is_empty());
    }

    #[test]
    fn warn_records_a_warning() {
        let capture = SharedCapture::new();
        ATOM_WARN(&[Value::String("deprecated".into())], &capture).unwrap();
        let (_, _, warnings) = capture.drain();
        assert_eq!(warnings, vec!["deprecated".to_string()]);
    }

    #[test]
    fn str_concatenates() {
        let value = ATOM_STR(&[Value::String("n=".into()), Value::Number(3.0)]).unwrap();
        assert_eq!(value, Value::String("n=3".into()));
    }
}
