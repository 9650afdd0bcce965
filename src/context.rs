//! Code context — what the assistant knows about the open editor buffer.
//!
//! DESIGN
//! ======
//! A [`CodeContext`] is rebuilt from scratch on every editor change and
//! cloned into each request, so a request always sees one consistent
//! snapshot. Name extraction is line-anchored regex matching over Python
//! source: only top-level (column 0) assignments and `def`s are picked up.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Lines of code kept on each side of the cursor.
const SURROUNDING_RADIUS: usize = 10;

pub const DEFAULT_PROJECT_TYPE: &str = "python";

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(?:import|from)[ \t]+([a-zA-Z_][a-zA-Z0-9_.]*(?:[ \t]+as[ \t]+[a-zA-Z_][a-zA-Z0-9_]*)?)[ \t]*(?:import.*)?$",
    )
    .expect("import regex is valid")
});

static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([a-zA-Z_][a-zA-Z0-9_]*)[ \t]*=.*$").expect("variable regex is valid"));

static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^def[ \t]+([a-zA-Z_][a-zA-Z0-9_]*)[ \t]*\(.*\):.*$").expect("function regex is valid")
});

/// Immutable snapshot of the user's editing position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeContext {
    pub current_file: String,
    pub current_line: usize,
    pub selected_text: String,
    pub surrounding_code: String,
    pub project_type: String,
    pub imports: Vec<String>,
    /// Top-level assignment targets, de-duplicated in first-seen order.
    pub variables: Vec<String>,
    pub functions: Vec<String>,
}

impl Default for CodeContext {
    fn default() -> Self {
        Self {
            current_file: String::new(),
            current_line: 0,
            selected_text: String::new(),
            surrounding_code: String::new(),
            project_type: DEFAULT_PROJECT_TYPE.to_string(),
            imports: Vec::new(),
            variables: Vec::new(),
            functions: Vec::new(),
        }
    }
}

impl CodeContext {
    /// Build a context from the full buffer text and cursor position.
    ///
    /// `project_type` is carried over from `self`; everything else is replaced.
    #[must_use]
    pub fn rebuild(&self, code: &str, selected_text: &str, current_file: &str, current_line: usize) -> Self {
        Self {
            current_file: current_file.to_string(),
            current_line,
            selected_text: selected_text.to_string(),
            surrounding_code: surrounding_code(code, current_line),
            project_type: self.project_type.clone(),
            imports: extract_imports(code),
            variables: extract_variables(code),
            functions: extract_functions(code),
        }
    }
}

/// Up to [`SURROUNDING_RADIUS`] lines either side of `line` (0-based, end exclusive).
#[must_use]
pub fn surrounding_code(code: &str, line: usize) -> String {
    let lines: Vec<&str> = code.split('\n').collect();
    let end = lines.len().min(line.saturating_add(SURROUNDING_RADIUS));
    let start = line.saturating_sub(SURROUNDING_RADIUS).min(end);
    lines[start..end].join("\n")
}

#[must_use]
pub fn extract_imports(code: &str) -> Vec<String> {
    IMPORT_RE
        .captures_iter(code)
        .map(|c| c[1].to_string())
        .collect()
}

#[must_use]
pub fn extract_variables(code: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    VARIABLE_RE
        .captures_iter(code)
        .map(|c| c[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[must_use]
pub fn extract_functions(code: &str) -> Vec<String> {
    FUNCTION_RE
        .captures_iter(code)
        .map(|c| c[1].to_string())
        .collect()
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
