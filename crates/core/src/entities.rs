//! Character reference decoding and text cleanup helpers.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// Named, decimal and hexadecimal character references (terminating `;` required).
pub(crate) static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("hardcoded entity regex")
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("hardcoded tag regex"));

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("hardcoded whitespace regex"));

/// Decodes a single character reference such as `&amp;` or `&#x2F;`.
///
/// Unknown named references come back unchanged.
pub fn decode_entity(reference: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(reference)
}

/// Decodes every character reference in `input`.
///
/// Only well-formed references are touched, so a lone `&` survives and
/// decoding text that holds no references returns it unchanged.
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    ENTITY_RE.replace_all(input, |caps: &regex::Captures<'_>| {
        decode_entity(&caps[0]).into_owned()
    })
}

/// Collapses every whitespace run (newlines included) to a single space and trims.
pub fn collapse_whitespace(input: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(input, " ").trim().to_string()
}

/// Removes every tag, keeping the text between them.
pub fn strip_tags(input: &str) -> Cow<'_, str> {
    TAG_RE.replace_all(input, "")
}

/// Turns a fragment of heading markup into a one-line title.
pub fn clean_text(input: &str) -> String {
    let without_tags = strip_tags(input);
    collapse_whitespace(&decode_entities(&without_tags))
}
