//! Ordered rewrite rules turning the supported HTML subset into Markdown.
//!
//! Each rule is a pattern plus a render function, applied once, in table
//! order. Rendered headings and code blocks are parked behind placeholders
//! until the tag-stripping and entity rules have run, so their text is
//! decoded exactly once.
//!
//! ## Adding a rule
//!
//! 1. Write a `fn(&Captures, &mut RewriteContext) -> String` renderer
//! 2. Add a `RewriteRule` entry to `RULES` at the position it must run
//! 3. Add a table case to the tests below

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::code_block::{CodeBlock, CodeBlockKind, CodeBlockOptions};
use crate::entities::{ENTITY_RE, clean_text, decode_entity};

// ============ Compiled Regexes ============

static SECTION_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<H1\s+CLASS="SECT1"\s*>\s*<A\b[^>]*\bNAME="[^"]*"[^>]*>(.*?)</A\s*>\s*</H1\s*>"#)
        .expect("hardcoded section heading regex")
});

static SUBSECTION_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<H2\s+CLASS="SECT2"\s*>\s*<A\b[^>]*\bNAME="[^"]*"[^>]*>(.*?)</A\s*>\s*</H2\s*>"#)
        .expect("hardcoded subsection heading regex")
});

static SCREEN_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<PRE\s+CLASS="SCREEN"\s*>(.*?)</PRE\s*>"#).expect("hardcoded screen regex")
});

static PLAIN_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<PRE\s*>(.*?)</PRE\s*>").expect("hardcoded pre regex")
});

static PARAGRAPH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<P\b[^>]*>(.*?)</P\s*>").expect("hardcoded paragraph regex")
});

static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<BR\s*/?>").expect("hardcoded line break regex"));

static ANY_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("hardcoded tag regex"));

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("\u{E000}([0-9]+)\u{E001}").expect("hardcoded placeholder regex")
});

/// State shared by the renderers during one rewrite.
pub struct RewriteContext<'a> {
    options: &'a CodeBlockOptions,
    parked: Vec<String>,
}

impl<'a> RewriteContext<'a> {
    fn new(options: &'a CodeBlockOptions) -> Self {
        Self {
            options,
            parked: Vec::new(),
        }
    }

    fn park(&mut self, rendered: String) -> String {
        self.parked.push(rendered);
        format!("\u{E000}{}\u{E001}", self.parked.len() - 1)
    }

    fn unpark(&self, text: &str) -> String {
        PLACEHOLDER_RE
            .replace_all(text, |caps: &Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.parked.get(index))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// One pattern-to-Markdown rewrite.
pub struct RewriteRule {
    /// Stable identifier used in reports and logs.
    pub name: &'static str,
    /// What the rule rewrites.
    pub description: &'static str,
    pattern: &'static Lazy<Regex>,
    render: fn(&Captures<'_>, &mut RewriteContext<'_>) -> String,
}

impl RewriteRule {
    /// The compiled pattern this rule matches.
    pub fn pattern(&self) -> &Regex {
        self.pattern
    }
}

/// All rewrite rules, in the order they are applied.
pub static RULES: &[RewriteRule] = &[
    RewriteRule {
        name: "section_heading",
        description: "<H1 CLASS=\"SECT1\"> with a named anchor becomes a ## heading",
        pattern: &SECTION_HEADING_RE,
        render: render_section_heading,
    },
    RewriteRule {
        name: "subsection_heading",
        description: "<H2 CLASS=\"SECT2\"> with a named anchor becomes a ### heading",
        pattern: &SUBSECTION_HEADING_RE,
        render: render_subsection_heading,
    },
    RewriteRule {
        name: "screen_code",
        description: "<PRE CLASS=\"SCREEN\"> becomes a fenced block with the language hint",
        pattern: &SCREEN_CODE_RE,
        render: render_screen_code,
    },
    RewriteRule {
        name: "plain_code",
        description: "<PRE> becomes a fenced block keeping line breaks",
        pattern: &PLAIN_CODE_RE,
        render: render_plain_code,
    },
    RewriteRule {
        name: "paragraph",
        description: "<P> becomes a newline-delimited block",
        pattern: &PARAGRAPH_RE,
        render: render_paragraph,
    },
    RewriteRule {
        name: "line_break",
        description: "<BR> becomes a newline",
        pattern: &LINE_BREAK_RE,
        render: render_line_break,
    },
    RewriteRule {
        name: "strip_tags",
        description: "Remove every remaining tag, keeping its text",
        pattern: &ANY_TAG_RE,
        render: render_nothing,
    },
    RewriteRule {
        name: "decode_entities",
        description: "Decode character references",
        pattern: &ENTITY_RE,
        render: render_entity,
    },
];

fn render_section_heading(caps: &Captures<'_>, ctx: &mut RewriteContext<'_>) -> String {
    render_heading("##", &caps[1], ctx)
}

fn render_subsection_heading(caps: &Captures<'_>, ctx: &mut RewriteContext<'_>) -> String {
    render_heading("###", &caps[1], ctx)
}

fn render_heading(marker: &str, inner: &str, ctx: &mut RewriteContext<'_>) -> String {
    // Already decoded, so it must not reach the tag and entity rules
    let placeholder = ctx.park(format!("{marker} {}", clean_text(inner)));
    format!("\n\n{placeholder}\n\n")
}

fn render_screen_code(caps: &Captures<'_>, ctx: &mut RewriteContext<'_>) -> String {
    render_code(CodeBlockKind::Screen, &caps[1], ctx)
}

fn render_plain_code(caps: &Captures<'_>, ctx: &mut RewriteContext<'_>) -> String {
    render_code(CodeBlockKind::Plain, &caps[1], ctx)
}

fn render_code(kind: CodeBlockKind, inner: &str, ctx: &mut RewriteContext<'_>) -> String {
    let block = CodeBlock::from_markup(kind, inner, ctx.options);
    let placeholder = ctx.park(block.to_markdown(ctx.options));
    format!("\n\n{placeholder}\n\n")
}

fn render_paragraph(caps: &Captures<'_>, _: &mut RewriteContext<'_>) -> String {
    format!("\n{}\n", &caps[1])
}

fn render_line_break(_: &Captures<'_>, _: &mut RewriteContext<'_>) -> String {
    "\n".to_string()
}

fn render_nothing(_: &Captures<'_>, _: &mut RewriteContext<'_>) -> String {
    String::new()
}

fn render_entity(caps: &Captures<'_>, _: &mut RewriteContext<'_>) -> String {
    decode_entity(&caps[0]).into_owned()
}

/// How often a rule matched during one rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleHit {
    /// Rule name.
    pub rule: &'static str,
    /// Number of matches replaced.
    pub count: usize,
}

/// Result of running the rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Rewritten text, before whitespace normalization.
    pub text: String,
    /// Per-rule match counts, in table order.
    pub hits: Vec<RuleHit>,
}

impl Rewrite {
    /// Names of rules that matched nothing.
    pub fn unmatched(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.hits
            .iter()
            .filter(|hit| hit.count == 0)
            .map(|hit| hit.rule)
    }
}

/// Applies every rule in [`RULES`] once, in order.
pub fn rewrite(input: &str, options: &CodeBlockOptions) -> Rewrite {
    let mut ctx = RewriteContext::new(options);
    let mut text = input.to_string();
    let mut hits = Vec::with_capacity(RULES.len());

    for rule in RULES {
        let mut count = 0usize;
        let replaced = rule
            .pattern()
            .replace_all(&text, |caps: &Captures<'_>| {
                count += 1;
                (rule.render)(caps, &mut ctx)
            })
            .into_owned();
        text = replaced;

        if count > 0 {
            log::debug!("rule '{}' rewrote {} match(es)", rule.name, count);
        } else {
            log::debug!("rule '{}' matched nothing", rule.name);
        }
        hits.push(RuleHit {
            rule: rule.name,
            count,
        });
    }

    Rewrite {
        text: ctx.unpark(&text),
        hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> Rewrite {
        rewrite(input, &CodeBlockOptions::default())
    }

    fn hits(rewrite: &Rewrite, rule: &str) -> usize {
        rewrite
            .hits
            .iter()
            .find(|hit| hit.rule == rule)
            .map(|hit| hit.count)
            .expect("rule exists")
    }

    #[test]
    fn rule_table_cases() {
        let cases: &[(&str, &str, &str)] = &[
            (
                "section_heading",
                "<H1 CLASS=\"SECT1\"><A NAME=\"DIRECTORIES\">9. Directories</A></H1>",
                "\n\n## 9. Directories\n\n",
            ),
            (
                "subsection_heading",
                "<H2 CLASS=\"SECT2\"><A NAME=\"AEN1\">9.1. Getting &amp; Setting</A></H2>",
                "\n\n### 9.1. Getting & Setting\n\n",
            ),
            (
                "screen_code",
                "<PRE CLASS=\"SCREEN\">foo\n  bar</PRE>",
                "\n\n```pike\nfoo bar\n```\n\n",
            ),
            ("plain_code", "<PRE>foo\nbar</PRE>", "\n\n```\nfoo\nbar\n```\n\n"),
            ("paragraph", "<P>Hello</P>", "\nHello\n"),
            ("line_break", "a<BR>b<br/>c", "a\nb\nc"),
            ("strip_tags", "<EM>keep</EM> <A HREF=\"x\">me</A>", "keep me"),
            ("decode_entities", "a &amp; b", "a & b"),
        ];

        for (rule, input, expected) in cases {
            let result = run(input);
            assert_eq!(&result.text, expected, "rule {rule}");
            assert!(hits(&result, rule) > 0, "rule {rule} should match");
        }
    }

    #[test]
    fn heading_titles_are_cleaned() {
        let result = run("<H2 CLASS=\"SECT2\"><A NAME=\"A\">\n  Deleting a\n  Directory </A></H2>");
        assert_eq!(result.text, "\n\n### Deleting a Directory\n\n");
    }

    #[test]
    fn heading_entities_are_decoded_once() {
        let cases: &[(&str, &str)] = &[
            (
                "<H1 CLASS=\"SECT1\"><A NAME=\"x\">9. Reading &lt;TT&gt; text</A></H1>",
                "\n\n## 9. Reading <TT> text\n\n",
            ),
            (
                "<H1 CLASS=\"SECT1\"><A NAME=\"x\">9. The &amp;lt; entity</A></H1>",
                "\n\n## 9. The &lt; entity\n\n",
            ),
            (
                "<H2 CLASS=\"SECT2\"><A NAME=\"y\">Reading &lt;dir&gt; entries</A></H2>",
                "\n\n### Reading <dir> entries\n\n",
            ),
            (
                "<H2 CLASS=\"SECT2\"><A NAME=\"y\">Escaping &amp;lt;TT&amp;gt;</A></H2>",
                "\n\n### Escaping &lt;TT&gt;\n\n",
            ),
        ];

        for (input, expected) in cases {
            let result = run(input);
            assert_eq!(&result.text, expected, "{input}");
            assert_eq!(hits(&result, "strip_tags"), 0, "{input}");
            assert_eq!(hits(&result, "decode_entities"), 0, "{input}");
        }
    }

    #[test]
    fn headings_without_structural_class_are_plain_text() {
        let result = run("<H3><A NAME=\"x\">Title</A></H3>");
        assert_eq!(result.text, "Title");
        assert_eq!(hits(&result, "section_heading"), 0);
    }

    #[test]
    fn code_content_survives_tag_stripping() {
        let result = run("<PRE CLASS=\"SCREEN\">#include &lt;stdio.h&gt;</PRE>");
        assert_eq!(result.text, "\n\n```pike\n#include <stdio.h>\n```\n\n");
        assert_eq!(hits(&result, "strip_tags"), 0);
    }

    #[test]
    fn code_content_is_not_decoded_twice() {
        let result = run("<PRE>&amp;lt;</PRE>");
        assert_eq!(result.text, "\n\n```\n&lt;\n```\n\n");
    }

    #[test]
    fn paragraphs_keep_inline_text() {
        let result = run("<P>Use <TT>mkdir</TT> &amp; <EM>rmdir</EM>.</P>");
        assert_eq!(result.text, "\nUse mkdir & rmdir.\n");
    }

    #[test]
    fn unmatched_rules_are_reported() {
        let result = run("just text");
        let unmatched: Vec<_> = result.unmatched().collect();
        assert_eq!(unmatched.len(), RULES.len());
        assert_eq!(result.text, "just text");
    }

    #[test]
    fn hits_follow_table_order() {
        let result = run("<P>x</P>");
        let names: Vec<_> = result.hits.iter().map(|hit| hit.rule).collect();
        let expected: Vec<_> = RULES.iter().map(|rule| rule.name).collect();
        assert_eq!(names, expected);
    }
}
