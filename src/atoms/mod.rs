//! Builtin operations available inside test bodies.
//!
//! Atoms are the primitive operations of the script language. They come in
//! two calling conventions: pure atoms operate only on values, effect atoms
//! additionally write to the invocation's capture channels. Arguments are
//! always eagerly evaluated by the caller; special forms (`assert`, `raises`,
//! `if`, `do`) live in the evaluator, not here.
//!
//! Module structure mirrors the concerns:
//! - `math`: `+`, `-`, `*`, `/`, `mod`
//! - `logic`: `=`, `!=`, `<`, `<=`, `>`, `>=`, `not`, `and`, `or`
//! - `collections`: `list`, `len`, `nth`
//! - `io`: `print`, `eprint`, `warn`, `str`

use std::collections::HashMap;

use crate::capture::SharedCapture;
use crate::signal::Fault;
use crate::value::Value;

/// Pure atoms: values in, value out, no side channel.
pub type PureAtomFn = fn(args: &[Value]) -> Result<Value, Fault>;

/// Effect atoms: may write to the capture region's channels.
pub type EffectAtomFn = fn(args: &[Value], capture: &SharedCapture) -> Result<Value, Fault>;

#[derive(Clone)]
pub enum Atom {
    Pure(PureAtomFn),
    Effect(EffectAtomFn),
}

/// Registry for all atoms, inspectable at runtime.
#[derive(Default)]
pub struct AtomRegistry {
    atoms: HashMap<String, Atom>,
}

impl AtomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Atom> {
        self.atoms.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.atoms.contains_key(name)
    }

    pub fn register(&mut self, name: &str, atom: Atom) {
        self.atoms.insert(name.to_string(), atom);
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.atoms.keys().cloned().collect();
        names.sort();
        names
    }
}

pub mod collections;
pub mod io;
pub mod logic;
pub mod math;

/// Build the registry every test invocation starts from.
pub fn build_default_registry() -> AtomRegistry {
    let mut registry = AtomRegistry::new();
    math::register_math_atoms(&mut registry);
    logic::register_logic_atoms(&mut registry);
    collections::register_collection_atoms(&mut registry);
    io::register_io_atoms(&mut registry);
    registry
}
