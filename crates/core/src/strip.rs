//! Removal of head, navigation and presentational markup.
//!
//! Steps run in a fixed order: head and doctype first so nothing in the
//! metadata can look like content, then tag whitespace is canonicalized,
//! then navigation is dropped, and presentational attributes go last.
//! After [`MarkupStripper::strip`] every tag is on one line, and the only
//! `CLASS` attributes left are structural ones in the form ` CLASS="VALUE"`.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::ConvertError;

static DOCTYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<!DOCTYPE[^>]*>").expect("hardcoded doctype regex"));

static HEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<HEAD\b.*?</HEAD\s*>").expect("hardcoded head regex"));

static ANY_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([^<>]+)>").expect("hardcoded tag regex"));

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("hardcoded whitespace regex"));

static DIV_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(/?)DIV\b[^>]*>").expect("hardcoded div regex"));

static NAV_RULE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<HR\s+ALIGN="LEFT"\s+WIDTH="100%"\s*/?>"#).expect("hardcoded hr regex")
});

static PRESENTATIONAL_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+(CLASS|STYLE)\s*=\s*"([^"]*)""#).expect("hardcoded attribute regex")
});

/// What to treat as navigation and which classes survive stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripOptions {
    /// `DIV` classes whose whole element is navigation.
    pub nav_block_classes: Vec<String>,
    /// Link texts of standalone navigation links.
    pub nav_link_labels: Vec<String>,
    /// Class values the rewrite rules and end anchors key on.
    pub structural_classes: Vec<String>,
}

impl Default for StripOptions {
    fn default() -> Self {
        Self {
            nav_block_classes: vec!["NAVHEADER".into(), "NAVFOOTER".into()],
            nav_link_labels: vec!["Next".into(), "Previous".into(), "Home".into()],
            structural_classes: vec![
                "SECT1".into(),
                "SECT2".into(),
                "SCREEN".into(),
                "NAVFOOTER".into(),
            ],
        }
    }
}

/// Counts of what each stripping step removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripReport {
    /// Whether a `<HEAD>` section was removed.
    pub head_removed: bool,
    /// Navigation `DIV` blocks removed.
    pub nav_blocks: usize,
    /// Navigation `<HR>` separators removed.
    pub nav_rules: usize,
    /// Next/Previous/Home links removed.
    pub nav_links: usize,
    /// Class and style attributes removed.
    pub attributes: usize,
}

/// Compiled stripping passes for one set of [`StripOptions`].
#[derive(Debug)]
pub struct MarkupStripper {
    nav_block_re: Option<Regex>,
    nav_link_re: Option<Regex>,
    structural_classes: Vec<String>,
}

impl MarkupStripper {
    /// Compiles the navigation patterns described by `options`.
    pub fn new(options: &StripOptions) -> Result<Self, ConvertError> {
        let nav_block_re = alternation(&options.nav_block_classes)
            .map(|classes| {
                compile(&format!(
                    r#"(?i)<DIV\b[^>]*\bCLASS\s*=\s*"(?:{classes})"[^>]*>"#
                ))
            })
            .transpose()?;
        let nav_link_re = alternation(&options.nav_link_labels)
            .map(|labels| {
                compile(&format!(
                    r#"(?is)(?:<TD\b[^>]*>\s*)?<A\b[^>]*\bHREF="[^"]*"(?:\s+ACCESSKEY="[^"]*")?[^>]*>\s*(?:{labels})\s*</A\s*>(?:\s*</TD\s*>)?"#
                ))
            })
            .transpose()?;

        Ok(Self {
            nav_block_re,
            nav_link_re,
            structural_classes: options
                .structural_classes
                .iter()
                .map(|class| class.trim().to_ascii_uppercase())
                .collect(),
        })
    }

    /// Runs every stripping step in canonical order.
    pub fn strip(&self, input: &str) -> (String, StripReport) {
        let mut report = StripReport::default();

        let (text, head_removed) = remove_head(input);
        report.head_removed = head_removed;
        let text = canonicalize_tags(&text);

        let (text, nav_blocks) = match &self.nav_block_re {
            Some(re) => remove_balanced_divs(&text, re),
            None => (text.into_owned(), 0),
        };
        report.nav_blocks = nav_blocks;

        let (text, nav_rules) = replace_counting(&NAV_RULE_RE, &text);
        report.nav_rules = nav_rules;

        let (text, nav_links) = match &self.nav_link_re {
            Some(re) => replace_counting(re, &text),
            None => (text, 0),
        };
        report.nav_links = nav_links;

        let (text, attributes) = self.strip_attributes(&text);
        report.attributes = attributes;

        log::debug!("stripped markup: {:?}", report);
        (text, report)
    }

    /// Drops `STYLE` attributes and non-structural `CLASS` attributes.
    ///
    /// Only text inside tags is touched; structural classes are rewritten as
    /// ` CLASS="VALUE"` with the value upper-cased.
    pub fn strip_attributes(&self, input: &str) -> (String, usize) {
        let mut removed = 0usize;
        let text = ANY_TAG_RE.replace_all(input, |tag: &Captures<'_>| {
            let inner = PRESENTATIONAL_ATTR_RE.replace_all(&tag[1], |attr: &Captures<'_>| {
                let value = attr[2].trim().to_ascii_uppercase();
                if attr[1].eq_ignore_ascii_case("class") && self.structural_classes.contains(&value)
                {
                    format!(r#" CLASS="{value}""#)
                } else {
                    removed += 1;
                    String::new()
                }
            });
            format!("<{inner}>")
        });
        (text.into_owned(), removed)
    }
}

/// Removes the doctype declaration and the `<HEAD>` section, inclusive.
///
/// A head without a closing tag is left in place.
pub fn remove_head(input: &str) -> (Cow<'_, str>, bool) {
    let without_doctype = DOCTYPE_RE.replace(input, "");
    let Some(head) = HEAD_RE.find(&without_doctype).map(|m| m.range()) else {
        return (without_doctype, false);
    };
    let mut text = String::with_capacity(without_doctype.len() - head.len());
    text.push_str(&without_doctype[..head.start]);
    text.push_str(&without_doctype[head.end..]);
    (Cow::Owned(text), true)
}

/// Puts every tag on one line: whitespace runs inside a tag become one space
/// and whitespace before the closing `>` is dropped.
pub fn canonicalize_tags(input: &str) -> Cow<'_, str> {
    ANY_TAG_RE.replace_all(input, |tag: &Captures<'_>| {
        let inner = WHITESPACE_RUN_RE.replace_all(tag[1].trim_end(), " ");
        format!("<{inner}>")
    })
}

/// Removes every element opened by `open_re`, nested `DIV`s included.
///
/// An element that is never closed runs to the end of the input.
fn remove_balanced_divs(input: &str, open_re: &Regex) -> (String, usize) {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;
    let mut removed = 0;

    while let Some(open) = open_re.find_at(input, cursor) {
        out.push_str(&input[cursor..open.start()]);
        cursor = balanced_div_end(input, open.end());
        removed += 1;
    }
    out.push_str(&input[cursor..]);
    (out, removed)
}

fn balanced_div_end(input: &str, from: usize) -> usize {
    let mut depth = 1usize;
    for token in DIV_TOKEN_RE.captures_iter(&input[from..]) {
        if token[1].is_empty() {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return from + token.get(0).map_or(0, |m| m.end());
            }
        }
    }
    input.len()
}

fn replace_counting(re: &Regex, input: &str) -> (String, usize) {
    let count = re.find_iter(input).count();
    if count == 0 {
        return (input.to_string(), 0);
    }
    (re.replace_all(input, "").into_owned(), count)
}

fn alternation(items: &[String]) -> Option<String> {
    let escaped: Vec<String> = items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(regex::escape)
        .collect();
    (!escaped.is_empty()).then(|| escaped.join("|"))
}

fn compile(pattern: &str) -> Result<Regex, ConvertError> {
    Regex::new(pattern).map_err(|source| ConvertError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripper() -> MarkupStripper {
        MarkupStripper::new(&StripOptions::default()).expect("default options compile")
    }

    #[test]
    fn removes_doctype_and_head() {
        let input = "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01//EN\">\n<HTML\n><HEAD\n><TITLE\n>Directories</TITLE\n></HEAD\n><BODY>x</BODY></HTML>";
        let (text, removed) = remove_head(input);
        assert!(removed);
        assert!(!text.contains("TITLE"));
        assert!(!text.contains("DOCTYPE"));
        assert!(text.contains("<BODY>x</BODY>"));
    }

    #[test]
    fn unclosed_head_is_left_alone() {
        let (text, removed) = remove_head("<HEAD><TITLE>x</TITLE><BODY>y");
        assert!(!removed);
        assert_eq!(text, "<HEAD><TITLE>x</TITLE><BODY>y");
    }

    #[test]
    fn head_match_does_not_swallow_header_elements() {
        let (text, removed) = remove_head("<HEADER>kept</HEADER>");
        assert!(!removed);
        assert_eq!(text, "<HEADER>kept</HEADER>");
    }

    #[test]
    fn canonicalizes_multi_line_tags() {
        let input = "<H1\nCLASS=\"SECT1\"\n><A\nNAME=\"DIRS\"\n>9. Directories</A\n></H1\n>";
        assert_eq!(
            canonicalize_tags(input),
            "<H1 CLASS=\"SECT1\"><A NAME=\"DIRS\">9. Directories</A></H1>"
        );
    }

    #[test]
    fn removes_nav_header_with_nested_divs() {
        let input = "<DIV CLASS=\"NAVHEADER\"><DIV>inner <B>Prev</B></DIV>still nav</DIV><P>body</P>";
        let (text, report) = stripper().strip(input);
        assert_eq!(report.nav_blocks, 1);
        assert_eq!(text, "<P>body</P>");
    }

    #[test]
    fn removes_multi_line_nav_footer() {
        let input = "<P>body</P><DIV\nCLASS=\"NAVFOOTER\"\n><HR\nALIGN=\"LEFT\"\nWIDTH=\"100%\"><TABLE>Next</TABLE></DIV\n>";
        let (text, report) = stripper().strip(input);
        assert_eq!(report.nav_blocks, 1);
        assert_eq!(text, "<P>body</P>");
    }

    #[test]
    fn unclosed_nav_block_runs_to_end() {
        let input = "<P>keep</P><DIV CLASS=\"NAVFOOTER\"><DIV>never closed";
        let (text, _) = stripper().strip(input);
        assert_eq!(text, "<P>keep</P>");
    }

    #[test]
    fn removes_separator_rules() {
        let (text, report) = stripper().strip("a<HR ALIGN=\"LEFT\" WIDTH=\"100%\">b<HR>c");
        assert_eq!(report.nav_rules, 1);
        assert_eq!(text, "ab<HR>c");
    }

    #[test]
    fn removes_nav_links_with_and_without_cells_and_accesskeys() {
        let input = concat!(
            "<TD WIDTH=\"10%\" ALIGN=\"left\"><A HREF=\"files.html\" ACCESSKEY=\"P\">Previous</A></TD>",
            "<A HREF=\"index.html\">Home</A>",
            "<TD><A\nHREF=\"x.html\"\nACCESSKEY=\"N\"\n>Next</A\n></TD\n>",
            "<A HREF=\"other.html\">Nextgen</A>",
        );
        let (text, report) = stripper().strip(input);
        assert_eq!(report.nav_links, 3);
        assert_eq!(text, "<A HREF=\"other.html\">Nextgen</A>");
    }

    #[test]
    fn keeps_structural_classes_and_drops_the_rest() {
        let input = "<PRE\nclass=\"screen\"\nSTYLE=\"color: red\">x</PRE><P CLASS=\"para\">y</P><H2 CLASS=\"SECT2\">z</H2>";
        let (text, report) = stripper().strip(input);
        assert_eq!(report.attributes, 2);
        assert_eq!(
            text,
            "<PRE CLASS=\"SCREEN\">x</PRE><P>y</P><H2 CLASS=\"SECT2\">z</H2>"
        );
    }

    #[test]
    fn attribute_text_outside_tags_is_untouched() {
        let input = "<P>write(\" class=\\\"x\\\"\");</P>";
        let (text, report) = stripper().strip(input);
        assert_eq!(report.attributes, 0);
        assert_eq!(text, input);
    }

    #[test]
    fn empty_nav_options_disable_navigation_removal() {
        let options = StripOptions {
            nav_block_classes: Vec::new(),
            nav_link_labels: Vec::new(),
            ..StripOptions::default()
        };
        let stripper = MarkupStripper::new(&options).expect("compiles");
        let input = "<DIV CLASS=\"NAVHEADER\">nav</DIV><A HREF=\"a\">Next</A>";
        let (text, report) = stripper.strip(input);
        assert_eq!(report.nav_blocks, 0);
        assert_eq!(report.nav_links, 0);
        assert!(text.contains("nav"));
        assert!(text.contains("Next"));
    }
}
