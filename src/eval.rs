//! Test-body evaluation.
//!
//! A loaded module is a flat environment of named zero-argument functions.
//! The evaluator walks a body's AST, dispatching calls to user functions
//! (checked first, so a script can shadow a builtin) or to registry atoms
//! with eagerly evaluated arguments. `assert`, `raises`, `if`, and `do` are
//! special forms because they control their own evaluation.
//!
//! Every fault carries the call trace accumulated while unwinding, which the
//! runner surfaces as the error record's traceback.

use std::collections::HashMap;

use crate::ast::{AstNode, Expr};
use crate::atoms::{self, Atom, AtomRegistry};
use crate::capture::SharedCapture;
use crate::signal::{Fault, FaultKind};
use crate::value::Value;

/// Depth guard for runaway recursion through user functions.
pub const MAX_CALL_DEPTH: usize = 64;

/// A zero-argument function as parsed from a module.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub body: Vec<AstNode>,
}

/// Evaluation context for one test invocation.
pub struct Evaluator<'a> {
    pub functions: &'a HashMap<String, FunctionDef>,
    pub registry: &'a AtomRegistry,
    pub capture: SharedCapture,
}

impl Evaluator<'_> {
    /// Invoke a defined function by name, recording it in fault traces.
    pub fn call_function(&self, name: &str, depth: usize) -> Result<Value, Fault> {
        if depth >= MAX_CALL_DEPTH {
            return Err(Fault::new(
                FaultKind::RecursionLimit,
                vec![format!("call depth exceeded {}", MAX_CALL_DEPTH)],
            ));
        }
        let def = self
            .functions
            .get(name)
            .ok_or_else(|| Fault::undefined_symbol(name))?;
        let mut last = Value::Nil;
        for node in &def.body {
            last = self
                .eval(node, depth + 1)
                .map_err(|fault| fault.push_frame(name))?;
        }
        Ok(last)
    }

    pub fn eval(&self, node: &AstNode, depth: usize) -> Result<Value, Fault> {
        if depth >= MAX_CALL_DEPTH {
            return Err(Fault::new(
                FaultKind::RecursionLimit,
                vec![format!("call depth exceeded {}", MAX_CALL_DEPTH)],
            ));
        }
        match &node.expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Symbol(s) if s == "nil" => Ok(Value::Nil),
            Expr::Symbol(s) => Err(Fault::undefined_symbol(s)),
            Expr::List(items) => self.eval_list(items, depth),
        }
    }

    fn eval_list(&self, items: &[AstNode], depth: usize) -> Result<Value, Fault> {
        let Some(head_node) = items.first() else {
            return Ok(Value::Nil);
        };
        let head = head_node.as_symbol().ok_or_else(|| {
            Fault::type_mismatch("call head", "Symbol", &head_node.pretty())
        })?;
        let args = &items[1..];

        match head {
            "assert" => self.eval_assert(args, depth),
            "raises" => self.eval_raises(args, depth),
            "if" => self.eval_if(args, depth),
            "do" => self.eval_sequence(args, depth),
            _ if self.functions.contains_key(head) => {
                if !args.is_empty() {
                    return Err(Fault::arity_mismatch(head, "0", args.len()));
                }
                self.call_function(head, depth + 1)
            }
            _ => match self.registry.get(head) {
                Some(Atom::Pure(pure_fn)) => {
                    let values = self.eval_args(args, depth)?;
                    pure_fn(&values)
                }
                Some(Atom::Effect(effect_fn)) => {
                    let values = self.eval_args(args, depth)?;
                    effect_fn(&values, &self.capture)
                }
                None => Err(Fault::undefined_symbol(head)),
            },
        }
    }

    fn eval_args(&self, args: &[AstNode], depth: usize) -> Result<Vec<Value>, Fault> {
        args.iter()
            .map(|arg| self.eval(arg, depth + 1))
            .collect()
    }

    /// (assert <condition> <message>...)
    ///
    /// A falsy condition raises an assertion fault carrying the evaluated
    /// message arguments; with no message, the condition's own text stands in.
    fn eval_assert(&self, args: &[AstNode], depth: usize) -> Result<Value, Fault> {
        let Some(condition) = args.first() else {
            return Err(Fault::arity_mismatch("assert", "at least 1", args.len()));
        };
        if self.eval(condition, depth + 1)?.is_truthy() {
            return Ok(Value::Nil);
        }
        let mut messages = Vec::with_capacity(args.len() - 1);
        for message in &args[1..] {
            messages.push(self.eval(message, depth + 1)?.to_string());
        }
        if messages.is_empty() {
            messages.push(format!("assertion failed: {}", condition.pretty()));
        }
        Err(Fault::assertion(messages))
    }

    /// (raises <FaultName> <body>...)
    ///
    /// Succeeds only when evaluating the body raises the named fault kind.
    fn eval_raises(&self, args: &[AstNode], depth: usize) -> Result<Value, Fault> {
        if args.len() < 2 {
            return Err(Fault::arity_mismatch("raises", "at least 2", args.len()));
        }
        let name = args[0]
            .as_symbol()
            .ok_or_else(|| Fault::type_mismatch("raises", "Symbol", &args[0].pretty()))?;
        let expected = fault_kind_by_name(name).ok_or_else(|| {
            Fault::type_mismatch("raises", "a fault name", name)
        })?;
        match self.eval_sequence(&args[1..], depth) {
            Ok(_) => Err(Fault::assertion(vec![format!(
                "expected fault {} was not raised",
                name
            )])),
            Err(fault) if fault.kind == expected => Ok(Value::Nil),
            Err(fault) => Err(fault),
        }
    }

    /// (if <condition> <then> <else>?)
    fn eval_if(&self, args: &[AstNode], depth: usize) -> Result<Value, Fault> {
        if args.len() < 2 || args.len() > 3 {
            return Err(Fault::arity_mismatch("if", "2 or 3", args.len()));
        }
        if self.eval(&args[0], depth + 1)?.is_truthy() {
            self.eval(&args[1], depth + 1)
        } else if let Some(alternative) = args.get(2) {
            self.eval(alternative, depth + 1)
        } else {
            Ok(Value::Nil)
        }
    }

    fn eval_sequence(&self, nodes: &[AstNode], depth: usize) -> Result<Value, Fault> {
        let mut last = Value::Nil;
        for node in nodes {
            last = self.eval(node, depth + 1)?;
        }
        Ok(last)
    }
}

fn fault_kind_by_name(name: &str) -> Option<FaultKind> {
    match name {
        "AssertionFailure" => Some(FaultKind::Assertion),
        "UndefinedSymbol" => Some(FaultKind::UndefinedSymbol),
        "TypeMismatch" => Some(FaultKind::TypeMismatch),
        "ArityMismatch" => Some(FaultKind::ArityMismatch),
        "DivisionByZero" => Some(FaultKind::DivisionByZero),
        "RecursionLimit" => Some(FaultKind::RecursionLimit),
        _ => None,
    }
}

/// Evaluate a standalone expression against the default registry, with no
/// functions in scope. Used for wrap-time conditions during module loading.
pub fn eval_condition(node: &AstNode) -> Result<Value, Fault> {
    let functions = HashMap::new();
    let registry = atoms::build_default_registry();
    let evaluator = Evaluator {
        functions: &functions,
        registry: &registry,
        capture: SharedCapture::new(),
    };
    evaluator.eval(node, 0)
}
