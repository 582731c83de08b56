#![deny(missing_docs)]
//! sectmd core: turns one section of a generated documentation chapter into
//! Markdown with YAML frontmatter.

/// Preformatted blocks rendered as fenced code.
pub mod code_block;
/// End-to-end conversion pipeline and file output.
pub mod convert;
/// Character reference decoding and text cleanup.
pub mod entities;
/// Core error and warning types.
pub mod error;
/// Frontmatter rendering and document assembly.
pub mod frontmatter;
/// Ordered HTML-to-Markdown rewrite rules.
pub mod rules;
/// Section boundary detection.
pub mod section;
/// Slug and section-number helpers for frontmatter values.
pub mod slug;
/// Head, navigation and attribute stripping.
pub mod strip;
/// Blank-line and indentation normalization.
pub mod whitespace;

pub use code_block::{CodeBlock, CodeBlockKind, CodeBlockOptions, ScreenWhitespace};
pub use convert::{
    Conversion, ConversionOptions, ConversionReport, Converter, SectionBounds, convert,
    write_atomically,
};
pub use error::{ConversionWarning, ConvertError};
pub use frontmatter::{Frontmatter, assemble};
pub use rules::{RULES, Rewrite, RewriteRule, RuleHit, rewrite};
pub use section::{DEFAULT_END_ANCHORS, ExtractedSection, SectionAnchor, SectionExtractor};
pub use strip::{MarkupStripper, StripOptions, StripReport};
