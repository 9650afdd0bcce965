//! Suggestion extraction — short list items pulled out of a model reply.
//!
//! DESIGN
//! ======
//! Three independent passes run in order: numbered items (`1. text`),
//! hyphen bullets (`- text`) and asterisk bullets (`* text`). An item runs
//! from its marker to the nearest following terminator on the same line
//! (the next `N.`, `- ` or `* ` respectively) or to the end of the line.
//! The `regex` crate has no lookahead, so each pass pairs a marker regex
//! with a terminator regex and scans manually; the terminator is not
//! consumed, so it may begin the next item.
//!
//! TRADE-OFFS
//! ==========
//! Results are not de-duplicated across passes: a line like `1. - x` yields
//! an entry from both the numbered and the hyphen pass.

use std::sync::LazyLock;

use regex::Regex;

pub const MAX_SUGGESTIONS: usize = 5;

/// Items of this many characters or more are discarded.
pub const MAX_SUGGESTION_CHARS: usize = 200;

struct ListPattern {
    marker: Regex,
    terminator: Regex,
}

impl ListPattern {
    fn new(marker: &str, terminator: &str) -> Self {
        Self {
            marker: Regex::new(marker).expect("marker regex is valid"),
            terminator: Regex::new(terminator).expect("terminator regex is valid"),
        }
    }
}

static PATTERNS: LazyLock<[ListPattern; 3]> = LazyLock::new(|| {
    [
        ListPattern::new(r"[0-9]+\. ", r"[0-9]+\."),
        ListPattern::new(r"- ", r"- "),
        ListPattern::new(r"\* ", r"\* "),
    ]
});

/// Extract up to [`MAX_SUGGESTIONS`] short list items from `text`.
#[must_use]
pub fn extract_suggestions(text: &str) -> Vec<String> {
    PATTERNS
        .iter()
        .flat_map(|pattern| scan(pattern, text))
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty() && item.chars().count() < MAX_SUGGESTION_CHARS)
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// All raw (untrimmed) item bodies for one pattern, in text order.
fn scan<'t>(pattern: &ListPattern, text: &'t str) -> Vec<&'t str> {
    let mut items = Vec::new();
    let mut pos = 0;

    while let Some(marker) = pattern.marker.find_at(text, pos) {
        let body_start = marker.end();
        let line_end = text[body_start..]
            .find('\n')
            .map_or(text.len(), |i| body_start + i);

        // An item needs at least one character before the line ends.
        let Some(first) = text[body_start..line_end].chars().next() else {
            pos = next_char_boundary(text, marker.start());
            continue;
        };
        let min_end = body_start + first.len_utf8();

        let body_end = pattern
            .terminator
            .find_at(text, min_end)
            .map(|m| m.start())
            .filter(|&start| start < line_end)
            .unwrap_or(line_end);

        items.push(&text[body_start..body_end]);
        pos = body_end;
    }

    items
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    text[from..]
        .chars()
        .next()
        .map_or(text.len(), |c| from + c.len_utf8())
}

#[cfg(test)]
#[path = "suggestions_test.rs"]
mod tests;
