//! Blank-line and indentation cleanup of rewritten text.

use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n\s*\n").expect("hardcoded blank run regex"));

static LEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[^\S\n]+").expect("hardcoded leading whitespace regex"));

static TRAILING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)[^\S\n]+$").expect("hardcoded trailing whitespace regex"));

/// Canonicalizes blank lines and indentation.
///
/// Runs of three or more newlines (whitespace-only lines included) become a
/// single blank line, every line loses its leading and trailing horizontal
/// whitespace, and the result is trimmed. Applying it twice changes nothing.
pub fn normalize(input: &str) -> String {
    let text = BLANK_RUN_RE.replace_all(input, "\n\n");
    let text = LEADING_RE.replace_all(&text, "");
    let text = TRAILING_RE.replace_all(&text, "");
    text.trim().to_string()
}
