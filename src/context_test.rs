use super::*;

const SAMPLE: &str = "\
import os
import numpy as np
from collections import defaultdict
count = 0
name = 'x'
count = 1
def greet(who):
    local = 3
    return who
def add(a, b):  # sum
    return a + b
";

#[test]
fn imports_capture_module_and_alias() {
    assert_eq!(extract_imports(SAMPLE), vec!["os", "numpy as np", "collections"]);
}

#[test]
fn consecutive_import_lines_are_separate_matches() {
    let code = "import os\nimport sys\nimport numpy as np\n\nfrom typing import List\nimport re";
    assert_eq!(extract_imports(code), vec!["os", "sys", "numpy as np", "typing", "re"]);
}

#[test]
fn bare_keyword_line_does_not_join_next_line() {
    assert_eq!(extract_imports("import\nos = 1"), Vec::<String>::new());
    assert_eq!(extract_variables("x\n= 1"), Vec::<String>::new());
    assert_eq!(extract_functions("def\nfoo():"), Vec::<String>::new());
}

#[test]
fn variables_are_top_level_and_deduplicated() {
    assert_eq!(extract_variables(SAMPLE), vec!["count", "name"]);
}

#[test]
fn functions_are_top_level_defs() {
    assert_eq!(extract_functions(SAMPLE), vec!["greet", "add"]);
}

#[test]
fn nothing_to_extract_from_empty_source() {
    assert!(extract_imports("").is_empty());
    assert!(extract_variables("").is_empty());
    assert!(extract_functions("").is_empty());
}

#[test]
fn surrounding_window_is_ten_lines_each_side() {
    let code: String = (0..30).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n");
    let window = surrounding_code(&code, 15);
    let lines: Vec<&str> = window.split('\n').collect();
    assert_eq!(lines.len(), 20);
    assert_eq!(lines[0], "line5");
    assert_eq!(lines[19], "line24");
}

#[test]
fn surrounding_window_clamps_at_start() {
    let window = surrounding_code("a\nb\nc", 0);
    assert_eq!(window, "a\nb\nc");
}

#[test]
fn surrounding_window_past_end_is_empty() {
    assert_eq!(surrounding_code("a\nb", 50), "");
}

#[test]
fn rebuild_replaces_everything_but_project_type() {
    let base = CodeContext { project_type: "django".into(), selected_text: "old".into(), ..CodeContext::default() };
    let ctx = base.rebuild(SAMPLE, "greet", "hello.py", 6);

    assert_eq!(ctx.current_file, "hello.py");
    assert_eq!(ctx.current_line, 6);
    assert_eq!(ctx.selected_text, "greet");
    assert_eq!(ctx.project_type, "django");
    assert_eq!(ctx.functions, vec!["greet", "add"]);
    assert!(ctx.surrounding_code.starts_with("import os"));
}

#[test]
fn default_project_type_is_python() {
    assert_eq!(CodeContext::default().project_type, "python");
}
