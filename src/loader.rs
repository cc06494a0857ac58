//! Module loading.
//!
//! Execution must run exactly the files discovery found, each as a fresh,
//! isolated unit. A `ModuleUnit` holds every function a file defines plus
//! the decoration recorded for each test; units are keyed by the file's
//! unique module identity in a write-once map, so two files sharing a base
//! name in different directories can never collide or share cached state.
//!
//! Loading is where wrap time happens: `skipif`/`xfail` conditions are
//! evaluated once here, never again at invocation time. Any problem at this
//! stage is a harness-level fault, not a per-test outcome.

use std::collections::HashMap;

use miette::NamedSource;

use crate::ast::AstNode;
use crate::capture::SharedCapture;
use crate::discovery::TestFile;
use crate::errors::HarnessError;
use crate::eval::{self, Evaluator, FunctionDef};
use crate::signal::{self, TestCallable, TestSignal};
use crate::syntax::parser;

/// How a top-level definition was wrapped, with conditions already resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoration {
    Skip { reason: String },
    SkipIf { condition: bool, reason: String },
    XFail { condition: bool, reason: String },
}

/// One loaded test file: its functions and their decorations.
#[derive(Debug)]
pub struct ModuleUnit {
    pub file: TestFile,
    functions: HashMap<String, FunctionDef>,
    decorations: HashMap<String, Decoration>,
}

impl ModuleUnit {
    /// Build a runnable callable for a named test, decoration applied.
    /// Returns `None` when the unit defines no such function.
    ///
    /// Each callable owns a snapshot of the unit's environment and the given
    /// capture handle, and evaluates against a registry built fresh for the
    /// invocation.
    pub fn callable_for(&self, name: &str, capture: SharedCapture) -> Option<TestCallable> {
        if !self.functions.contains_key(name) {
            return None;
        }
        let name_owned = name.to_string();
        let functions = self.functions.clone();
        let base: TestCallable = Box::new(move || {
            let registry = crate::atoms::build_default_registry();
            let evaluator = Evaluator {
                functions: &functions,
                registry: &registry,
                capture,
            };
            evaluator
                .call_function(&name_owned, 0)
                .map(|_| ())
                .map_err(TestSignal::from)
        });
        Some(match self.decorations.get(name) {
            None => base,
            Some(Decoration::Skip { reason }) => signal::skip(reason.clone(), base),
            Some(Decoration::SkipIf { condition, reason }) => {
                signal::skipif(*condition, reason.clone(), base)
            }
            Some(Decoration::XFail { condition, reason }) => {
                signal::xfail(*condition, reason.clone(), base)
            }
        })
    }

    pub fn function_names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }
}

/// Loads test files into isolated units, at most once each.
#[derive(Default)]
pub struct ModuleLoader {
    units: HashMap<String, ModuleUnit>,
}

impl ModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a discovered file, or return the already-loaded unit. The
    /// identity map is write-once: a unit is never rebuilt or mutated.
    pub fn load(&mut self, file: &TestFile) -> Result<&ModuleUnit, HarnessError> {
        if !self.units.contains_key(&file.module_id) {
            let unit = build_unit(file)?;
            self.units.insert(file.module_id.clone(), unit);
        }
        Ok(&self.units[&file.module_id])
    }
}

fn build_unit(file: &TestFile) -> Result<ModuleUnit, HarnessError> {
    let path_str = file.path.display().to_string();
    let source = std::fs::read_to_string(&file.path).map_err(|e| HarnessError::Read {
        path: path_str.clone(),
        source: e,
    })?;
    let nodes = parser::parse(&source, &path_str)?;

    let mut functions = HashMap::new();
    let mut decorations = HashMap::new();
    for node in &nodes {
        let (def_items, decoration) = split_top_level_form(node, file, &path_str, &source)?;
        let def = parse_def(def_items, file, &path_str, &source, node)?;
        if functions.contains_key(&def.name) {
            return Err(load_error(
                file,
                format!("duplicate definition of '{}'", def.name),
                &path_str,
                &source,
                node,
            ));
        }
        if let Some(decoration) = decoration {
            decorations.insert(def.name.clone(), decoration);
        }
        functions.insert(def.name.clone(), def);
    }

    Ok(ModuleUnit {
        file: file.clone(),
        functions,
        decorations,
    })
}

/// Tear a top-level form into its def and optional decoration.
///
/// Accepted shapes:
///   (def (name) body...)
///   (skip "reason" <def>)
///   (skipif <condition> "reason" <def>)
///   (xfail <condition> "reason" <def>)
fn split_top_level_form<'a>(
    node: &'a AstNode,
    file: &TestFile,
    path: &str,
    source: &str,
) -> Result<(&'a [AstNode], Option<Decoration>), HarnessError> {
    let items = node
        .as_list()
        .filter(|items| !items.is_empty())
        .ok_or_else(|| {
            load_error(
                file,
                "top-level form must be a list".to_string(),
                path,
                source,
                node,
            )
        })?;
    let head = items[0].as_symbol().unwrap_or_default();

    match head {
        "def" => Ok((items, None)),
        "skip" => {
            if items.len() != 3 {
                return Err(load_error(
                    file,
                    "skip form takes a reason and a definition".to_string(),
                    path,
                    source,
                    node,
                ));
            }
            let reason = wrapper_reason(&items[1], file, path, source)?;
            let inner = wrapped_def(&items[2], file, path, source)?;
            Ok((inner, Some(Decoration::Skip { reason })))
        }
        "skipif" | "xfail" => {
            if items.len() != 4 {
                return Err(load_error(
                    file,
                    format!("{} form takes a condition, a reason, and a definition", head),
                    path,
                    source,
                    node,
                ));
            }
            let condition = eval::eval_condition(&items[1])
                .map_err(|fault| {
                    load_error(
                        file,
                        format!(
                            "{} condition failed to evaluate: {}",
                            head,
                            fault.messages.join("; ")
                        ),
                        path,
                        source,
                        &items[1],
                    )
                })?
                .is_truthy();
            let reason = wrapper_reason(&items[2], file, path, source)?;
            let inner = wrapped_def(&items[3], file, path, source)?;
            let decoration = if head == "skipif" {
                Decoration::SkipIf { condition, reason }
            } else {
                Decoration::XFail { condition, reason }
            };
            Ok((inner, Some(decoration)))
        }
        _ => Err(load_error(
            file,
            format!("unsupported top-level form '{}'", head),
            path,
            source,
            node,
        )),
    }
}

fn wrapper_reason(
    node: &AstNode,
    file: &TestFile,
    path: &str,
    source: &str,
) -> Result<String, HarnessError> {
    node.as_string().map(str::to_string).ok_or_else(|| {
        load_error(
            file,
            "wrapper reason must be a string".to_string(),
            path,
            source,
            node,
        )
    })
}

fn wrapped_def<'a>(
    node: &'a AstNode,
    file: &TestFile,
    path: &str,
    source: &str,
) -> Result<&'a [AstNode], HarnessError> {
    let items = node.as_list().unwrap_or_default();
    if items.first().and_then(AstNode::as_symbol) == Some("def") {
        Ok(items)
    } else {
        Err(load_error(
            file,
            "wrapper must enclose a definition".to_string(),
            path,
            source,
            node,
        ))
    }
}

fn parse_def(
    items: &[AstNode],
    file: &TestFile,
    path: &str,
    source: &str,
    node: &AstNode,
) -> Result<FunctionDef, HarnessError> {
    let signature = items.get(1).and_then(AstNode::as_list).ok_or_else(|| {
        load_error(
            file,
            "def needs a (name) signature".to_string(),
            path,
            source,
            node,
        )
    })?;
    if signature.len() != 1 {
        return Err(load_error(
            file,
            "test functions take no arguments".to_string(),
            path,
            source,
            node,
        ));
    }
    let name = signature[0].as_symbol().ok_or_else(|| {
        load_error(
            file,
            "function name must be a symbol".to_string(),
            path,
            source,
            node,
        )
    })?;
    Ok(FunctionDef {
        name: name.to_string(),
        body: items[2..].to_vec(),
    })
}

fn load_error(
    file: &TestFile,
    message: String,
    path: &str,
    source: &str,
    node: &AstNode,
) -> HarnessError {
    HarnessError::Load {
        module: file.module_id.clone(),
        message,
        src: NamedSource::new(path, source.to_string()),
        span: node.span.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_module(dir: &std::path::Path, name: &str, source: &str) -> TestFile {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(source.as_bytes()).unwrap();
        TestFile {
            path: path.clone(),
            module_id: PathBuf::from(name)
                .file_stem()
                .unwrap()
                .to_string_lossy()
                .into_owned(),
        }
    }

    #[test]
    fn loads_defs_and_decorations() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_module(
            dir.path(),
            "test_mod.st",
            r#"
            (def (test_plain) (assert true))
            (skip "later" (def (test_skipped) (assert false)))
            (xfail (= 1 1) "known bug" (def (test_known) (assert false)))
            "#,
        );
        let mut loader = ModuleLoader::new();
        let unit = loader.load(&file).unwrap();
        let mut names = unit.function_names();
        names.sort();
        assert_eq!(names, vec!["test_known", "test_plain", "test_skipped"]);
    }

    #[test]
    fn wrap_time_condition_is_resolved_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_module(
            dir.path(),
            "test_cond.st",
            r#"(skipif (= 1 2) "posix only" (def (test_posix) (assert true)))"#,
        );
        let mut loader = ModuleLoader::new();
        let unit = loader.load(&file).unwrap();
        // condition is false, so the callable runs the real body
        let capture = SharedCapture::new();
        let callable = unit.callable_for("test_posix", capture).unwrap();
        assert!(callable().is_ok());
    }

    #[test]
    fn duplicate_definitions_are_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_module(
            dir.path(),
            "test_dup.st",
            "(def (test_a) (assert true)) (def (test_a) (assert false))",
        );
        let mut loader = ModuleLoader::new();
        let err = loader.load(&file).unwrap_err();
        assert!(matches!(err, HarnessError::Load { .. }));
    }

    #[test]
    fn unknown_top_level_forms_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_module(dir.path(), "test_bad.st", "(print \"import side effect\")");
        let mut loader = ModuleLoader::new();
        assert!(loader.load(&file).is_err());
    }

    #[test]
    fn units_are_cached_by_identity() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_module(dir.path(), "test_once.st", "(def (test_a) (assert true))");
        let mut loader = ModuleLoader::new();
        loader.load(&file).unwrap();
        // Overwrite on disk; the cached unit must win (write-once identity map).
        std::fs::write(&file.path, "(def (test_b) (assert true))").unwrap();
        let unit = loader.load(&file).unwrap();
        assert_eq!(unit.function_names(), vec!["test_a"]);
    }
}
