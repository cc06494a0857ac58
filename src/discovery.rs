//! Test discovery.
//!
//! Finds test files on disk and statically determines which top-level
//! functions are tests. Discovery never evaluates a script: it parses the
//! syntax tree and reads names out of it, so scanning a directory is always
//! side-effect free. A file that fails to parse aborts discovery with a
//! structured error naming the file; malformed scripts are never silently
//! skipped.
//!
//! The returned ordering is deterministic (files sorted, functions in
//! declaration order), so discovery over an unchanged tree is replayable.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::ast::AstNode;
use crate::errors::HarnessError;
use crate::syntax::parser;

/// Default filename patterns identifying test files.
pub const TEST_FILE_PATTERNS: &[&str] = &["test_*.st", "*_test.st"];

/// Folder names that are searched wherever they occur under the root.
pub const TEST_FOLDER_NAMES: &[&str] = &["tests"];

/// Default test-function name prefix.
pub const TEST_PREFIX: &str = "test_";

/// Wrapper heads that may decorate a top-level definition.
const WRAPPER_HEADS: &[&str] = &["skip", "skipif", "xfail"];

/// A source file that may contain test functions.
///
/// `module_id` is the identity the loader keys units by and the prefix of
/// every qualified test name from this file. It is the file stem unless an
/// earlier discovered file already claimed that stem, in which case a short
/// path digest disambiguates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestFile {
    pub path: PathBuf,
    pub module_id: String,
}

/// Ordered mapping from test file to its test-function names. The sole
/// contract between discovery and execution.
pub type TestMap = Vec<(TestFile, Vec<String>)>;

/// Find test files under `root` (the current directory when omitted).
///
/// A file is a candidate when its name matches one of `file_patterns` and it
/// sits either directly under `root` or anywhere below a directory whose name
/// is in `folder_names`.
pub fn find_test_files(
    root: Option<&Path>,
    file_patterns: &[&str],
    folder_names: &[&str],
) -> Result<Vec<TestFile>, HarnessError> {
    let root = match root {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().map_err(|e| HarnessError::Walk {
            path: ".".to_string(),
            message: e.to_string(),
        })?,
    };
    let root = root.canonicalize().map_err(|e| HarnessError::Walk {
        path: root.display().to_string(),
        message: e.to_string(),
    })?;

    let matchers = file_patterns
        .iter()
        .map(|pattern| compile_file_pattern(pattern))
        .collect::<Result<Vec<_>, _>>()?;

    let mut paths = Vec::new();
    for entry in WalkDir::new(&root) {
        let entry = entry.map_err(|e| HarnessError::Walk {
            path: root.display().to_string(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !matchers.iter().any(|m| m.is_match(file_name)) {
            continue;
        }
        if !in_search_scope(path, &root, folder_names) {
            continue;
        }
        paths.push(path.to_path_buf());
    }
    paths.sort();

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let module_id = if seen_ids.contains(&stem) {
            format!("{}#{}", stem, short_path_digest(&path))
        } else {
            stem
        };
        seen_ids.insert(module_id.clone());
        files.push(TestFile { path, module_id });
    }
    Ok(files)
}

/// Statically collect prefix-matching top-level function names per file, in
/// declaration order. Files with no matches still appear, with an empty list.
pub fn find_test_functions(files: &[TestFile], prefix: &str) -> Result<TestMap, HarnessError> {
    let mut test_map = Vec::with_capacity(files.len());
    for file in files {
        let path_str = file.path.display().to_string();
        let source = std::fs::read_to_string(&file.path).map_err(|e| HarnessError::Read {
            path: path_str.clone(),
            source: e,
        })?;
        let nodes = parser::parse(&source, &path_str)?;
        let names = nodes
            .iter()
            .filter_map(top_level_def_name)
            .filter(|name| name.starts_with(prefix))
            .map(str::to_string)
            .collect();
        test_map.push((file.clone(), names));
    }
    Ok(test_map)
}

/// Discovery in one step: find files, then their test functions.
pub fn discover_tests(
    root: Option<&Path>,
    file_patterns: &[&str],
    folder_names: &[&str],
    prefix: &str,
) -> Result<TestMap, HarnessError> {
    let files = find_test_files(root, file_patterns, folder_names)?;
    find_test_functions(&files, prefix)
}

/// The name of the function a top-level form defines, if any. A form counts
/// when it is a bare `(def (name) ...)` or such a def directly inside one
/// `skip`/`skipif`/`xfail` wrapper. Nested defs never match.
fn top_level_def_name(node: &AstNode) -> Option<&str> {
    let items = node.as_list()?;
    let head = items.first()?.as_symbol()?;
    if head == "def" {
        return def_name(items);
    }
    if WRAPPER_HEADS.contains(&head) {
        let inner = items.last()?.as_list()?;
        if inner.first()?.as_symbol()? == "def" {
            return def_name(inner);
        }
    }
    None
}

fn def_name(items: &[AstNode]) -> Option<&str> {
    // (def (name) body...)
    items.get(1)?.as_list()?.first()?.as_symbol()
}

fn in_search_scope(path: &Path, root: &Path, folder_names: &[&str]) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };
    let mut dirs: Vec<_> = relative.components().collect();
    dirs.pop(); // the file name itself
    if dirs.is_empty() {
        return true;
    }
    dirs.iter().any(|component| {
        component
            .as_os_str()
            .to_str()
            .is_some_and(|name| folder_names.contains(&name))
    })
}

/// Translate a filename glob (only `*` is special) into an anchored regex.
fn compile_file_pattern(pattern: &str) -> Result<Regex, HarnessError> {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    for (i, part) in pattern.split('*').enumerate() {
        if i > 0 {
            regex.push_str(".*");
        }
        regex.push_str(&regex::escape(part));
    }
    regex.push('$');
    Regex::new(&regex).map_err(|e| HarnessError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn short_path_digest(path: &Path) -> String {
    let digest = Sha256::digest(path.to_string_lossy().as_bytes());
    digest
        .iter()
        .take(4)
        .map(|byte| format!("{:02x}", byte))
        .collect()
}
