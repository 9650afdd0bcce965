use super::*;

#[test]
fn numbered_lines() {
    assert_eq!(extract_suggestions("1. foo\n2. bar"), vec!["foo", "bar"]);
}

#[test]
fn numbered_items_on_one_line_split_at_next_number() {
    assert_eq!(extract_suggestions("1. use a set 2. avoid globals"), vec!["use a set", "avoid globals"]);
}

#[test]
fn hyphen_and_asterisk_bullets() {
    let text = "Tips:\n- use enumerate\n- prefer f-strings\n* cache results";
    assert_eq!(extract_suggestions(text), vec!["use enumerate", "prefer f-strings", "cache results"]);
}

#[test]
fn passes_concatenate_in_pass_order() {
    let text = "* star first in text\n- hyphen second\n1. number last";
    assert_eq!(extract_suggestions(text), vec!["number last", "hyphen second", "star first in text"]);
}

#[test]
fn truncates_to_five_in_first_pass_order() {
    let text = "1. a\n2. b\n3. c\n4. d\n5. e\n6. f\n- g";
    let out = extract_suggestions(text);
    assert_eq!(out.len(), 5);
    assert_eq!(out, vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn long_items_are_excluded() {
    let long = "x".repeat(200);
    let text = format!("1. {long}\n2. short one");
    assert_eq!(extract_suggestions(&text), vec!["short one"]);
}

#[test]
fn item_just_under_limit_is_kept() {
    let item = "y".repeat(199);
    assert_eq!(extract_suggestions(&format!("- {item}")), vec![item]);
}

#[test]
fn blank_items_are_dropped() {
    assert!(extract_suggestions("1.    \n-  \n").is_empty());
}

#[test]
fn marker_without_body_is_skipped() {
    assert_eq!(extract_suggestions("1. \n2. real"), vec!["real"]);
}

#[test]
fn prose_without_lists_yields_nothing() {
    assert!(extract_suggestions("hello").is_empty());
    assert!(extract_suggestions("").is_empty());
}

#[test]
fn overlapping_styles_are_counted_twice() {
    assert_eq!(extract_suggestions("1. - x"), vec!["- x", "x"]);
}

#[test]
fn version_numbers_terminate_numbered_items() {
    assert_eq!(extract_suggestions("1. Target Python 3.11"), vec!["Target Python"]);
}

#[test]
fn multibyte_text_is_handled() {
    assert_eq!(extract_suggestions("- café ☕\n- naïve"), vec!["café ☕", "naïve"]);
}

#[test]
fn only_ascii_digits_number_items() {
    assert!(extract_suggestions("١. foo").is_empty());
    assert!(extract_suggestions("३. bar").is_empty());
    assert_eq!(extract_suggestions("1. foo ٢. bar"), vec!["foo ٢. bar"]);
}
