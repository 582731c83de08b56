//! Preformatted blocks rendered as fenced Markdown code.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::entities::{collapse_whitespace, decode_entities, strip_tags};

static FONT_SPAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<FONT\b[^>]*>.*?</FONT\s*>").expect("hardcoded font regex")
});

static SPAN_SPAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<SPAN\b[^>]*>.*?</SPAN\s*>").expect("hardcoded span regex")
});

static STRAY_STYLE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(?:FONT|SPAN)\b[^>]*>").expect("hardcoded stray style regex")
});

/// Which kind of `<PRE>` a block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeBlockKind {
    /// `<PRE CLASS="SCREEN">`: tagged with the language hint.
    Screen,
    /// Any other `<PRE>`: no language hint, line breaks kept.
    Plain,
}

/// How whitespace inside screen blocks is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenWhitespace {
    /// Every whitespace run, newlines included, becomes one space.
    #[default]
    Collapse,
    /// Line breaks are kept as in plain blocks. Indentation is not: the
    /// whitespace normalizer trims every output line.
    Preserve,
}

/// Settings for code block rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockOptions {
    /// Info string put on screen blocks' opening fence.
    pub screen_language: Option<String>,
    /// Whitespace treatment for screen blocks.
    pub screen_whitespace: ScreenWhitespace,
    /// Drop `<FONT>`/`<SPAN>` elements in screen blocks together with the
    /// text they wrap; when false only the tags go.
    pub drop_styled_text: bool,
}

impl Default for CodeBlockOptions {
    fn default() -> Self {
        Self {
            screen_language: Some("pike".to_string()),
            screen_whitespace: ScreenWhitespace::Collapse,
            drop_styled_text: true,
        }
    }
}

/// Cleaned contents of one preformatted block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Origin of the block.
    pub kind: CodeBlockKind,
    /// Decoded text, without markup.
    pub content: String,
}

impl CodeBlock {
    /// Cleans the inner markup of a `<PRE>` element.
    pub fn from_markup(kind: CodeBlockKind, inner: &str, options: &CodeBlockOptions) -> Self {
        let content = match kind {
            CodeBlockKind::Screen => {
                let unstyled = remove_styling(inner, options.drop_styled_text);
                let text = decode_entities(&strip_tags(&unstyled)).into_owned();
                match options.screen_whitespace {
                    ScreenWhitespace::Collapse => collapse_whitespace(&text),
                    ScreenWhitespace::Preserve => trim_newlines(&text).to_string(),
                }
            }
            CodeBlockKind::Plain => {
                let text = decode_entities(&strip_tags(inner)).into_owned();
                trim_newlines(&text).to_string()
            }
        };
        Self { kind, content }
    }

    /// Renders the block as a fenced code block (no surrounding blank lines).
    pub fn to_markdown(&self, options: &CodeBlockOptions) -> String {
        let fence = "`".repeat(fence_length(&self.content));
        let info = match self.kind {
            CodeBlockKind::Screen => options.screen_language.as_deref().unwrap_or(""),
            CodeBlockKind::Plain => "",
        };
        format!("{fence}{info}\n{}\n{fence}", self.content)
    }
}

fn remove_styling(inner: &str, drop_styled_text: bool) -> String {
    let mut text = inner.to_string();
    if drop_styled_text {
        text = FONT_SPAN_RE.replace_all(&text, "").into_owned();
        text = SPAN_SPAN_RE.replace_all(&text, "").into_owned();
    }
    STRAY_STYLE_TAG_RE.replace_all(&text, "").into_owned()
}

fn trim_newlines(text: &str) -> &str {
    text.trim_matches(|c: char| c == '\n' || c == '\r')
}

/// Fence length that cannot be closed by a backtick run inside `content`.
pub fn fence_length(content: &str) -> usize {
    let mut longest = 0usize;
    let mut run = 0usize;
    for ch in content.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    (longest + 1).max(3)
}
