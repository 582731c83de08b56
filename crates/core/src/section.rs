//! Locating the section to convert inside stripped markup.

use regex::Regex;

use crate::ConvertError;

/// End anchors used when the caller doesn't supply any: the next top-level
/// section heading and a trailing navigation footer.
pub const DEFAULT_END_ANCHORS: &[&str] = &[
    r#"(?i)<H1\s+CLASS="SECT1""#,
    r#"(?i)<DIV\s+CLASS="NAVFOOTER""#,
];

/// Identifies the heading that opens the section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionAnchor {
    /// Visible heading text, e.g. `9. Directories`.
    pub title: String,
    /// Heading element level (`1` for `<H1>`).
    pub level: u8,
}

impl SectionAnchor {
    /// Anchor on a top-level `<H1>` heading with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            level: 1,
        }
    }

    /// Anchor on a heading of a different level.
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    fn pattern(&self) -> String {
        let raw = title_pattern(&self.title);
        let escaped = title_pattern(&html_escape::encode_text(&self.title));
        let title = if raw == escaped {
            raw
        } else {
            format!("{raw}|{escaped}")
        };
        let level = self.level;
        format!(
            r"(?is)<H{level}\b[^>]*>\s*<A\b[^>]*>\s*(?-i:{title})\s*</A\s*>\s*</H{level}\s*>"
        )
    }
}

fn title_pattern(title: &str) -> String {
    title
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// Resolved section boundaries inside a document.
///
/// `heading_start <= body_start <= end` always holds, and the heading is
/// never empty, so `heading_start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedSection<'a> {
    source: &'a str,
    /// Offset of the heading element that holds the start anchor.
    pub heading_start: usize,
    /// Offset just past that heading element.
    pub body_start: usize,
    /// Offset of the nearest end anchor, or the document length.
    pub end: usize,
    /// Whether no end anchor matched.
    pub open_ended: bool,
}

impl<'a> ExtractedSection<'a> {
    /// The section including its opening heading.
    pub fn text(&self) -> &'a str {
        &self.source[self.heading_start..self.end]
    }

    /// The section content after the opening heading.
    pub fn body(&self) -> &'a str {
        &self.source[self.body_start..self.end]
    }

    /// The opening heading markup.
    pub fn heading(&self) -> &'a str {
        &self.source[self.heading_start..self.body_start]
    }
}

/// Compiled start and end anchors.
#[derive(Debug)]
pub struct SectionExtractor {
    title: String,
    start: Regex,
    ends: Vec<Regex>,
}

impl SectionExtractor {
    /// Compiles `anchor` and the end-anchor patterns.
    ///
    /// An empty `end_patterns` slice falls back to [`DEFAULT_END_ANCHORS`].
    pub fn new(anchor: &SectionAnchor, end_patterns: &[String]) -> Result<Self, ConvertError> {
        let start = compile(&anchor.pattern())?;
        let ends = if end_patterns.is_empty() {
            DEFAULT_END_ANCHORS
                .iter()
                .map(|pattern| compile(pattern))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            end_patterns
                .iter()
                .map(|pattern| compile(pattern))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self {
            title: anchor.title.clone(),
            start,
            ends,
        })
    }

    /// Finds the first heading matching the anchor and the nearest end anchor after it.
    pub fn extract<'a>(&self, markup: &'a str) -> Result<ExtractedSection<'a>, ConvertError> {
        let heading = self
            .start
            .find(markup)
            .ok_or_else(|| ConvertError::section_not_found(&self.title))?;

        let body_start = heading.end();
        let nearest = self
            .ends
            .iter()
            .filter_map(|re| re.find_at(markup, body_start))
            .map(|m| m.start())
            .min();

        let section = ExtractedSection {
            source: markup,
            heading_start: heading.start(),
            body_start,
            end: nearest.unwrap_or(markup.len()),
            open_ended: nearest.is_none(),
        };
        log::debug!(
            "section '{}' spans {}..{} (body from {})",
            self.title,
            section.heading_start,
            section.end,
            section.body_start
        );
        Ok(section)
    }
}

fn compile(pattern: &str) -> Result<Regex, ConvertError> {
    Regex::new(pattern).map_err(|source| ConvertError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
