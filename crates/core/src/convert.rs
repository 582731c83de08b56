//! End-to-end conversion: strip, extract, rewrite, normalize, assemble.

use std::io::Write;
use std::path::Path;

use crate::code_block::CodeBlockOptions;
use crate::error::{ConversionWarning, ConvertError};
use crate::frontmatter::{Frontmatter, assemble};
use crate::rules::{RuleHit, rewrite};
use crate::section::{SectionAnchor, SectionExtractor};
use crate::strip::{MarkupStripper, StripOptions, StripReport};
use crate::whitespace::normalize;

/// Everything one conversion needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Heading that opens the section to convert.
    pub section: SectionAnchor,
    /// Regex patterns that end the section; empty means the defaults.
    pub end_anchors: Vec<String>,
    /// Metadata written ahead of the body.
    pub frontmatter: Frontmatter,
    /// Navigation and attribute stripping.
    pub strip: StripOptions,
    /// Code block rendering.
    pub code: CodeBlockOptions,
}

impl ConversionOptions {
    /// Options for the section titled `title`, with frontmatter derived from it.
    pub fn for_section(title: &str) -> Self {
        Self {
            section: SectionAnchor::new(title),
            end_anchors: Vec::new(),
            frontmatter: Frontmatter::from_section_title(title),
            strip: StripOptions::default(),
            code: CodeBlockOptions::default(),
        }
    }
}

/// Byte offsets of the converted section in the stripped markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionBounds {
    /// Start of the opening heading.
    pub heading_start: usize,
    /// End of the opening heading.
    pub body_start: usize,
    /// End of the section.
    pub end: usize,
}

/// What happened during a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    /// Stripping counts.
    pub strip: StripReport,
    /// Where the section was found.
    pub section: SectionBounds,
    /// Per-rule match counts.
    pub rule_hits: Vec<RuleHit>,
    /// Degraded-input findings.
    pub warnings: Vec<ConversionWarning>,
    /// Characters in the produced document.
    pub chars: usize,
}

/// A finished conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Frontmatter plus Markdown body.
    pub markdown: String,
    /// Diagnostics.
    pub report: ConversionReport,
}

/// Compiled pipeline for one set of options.
#[derive(Debug)]
pub struct Converter {
    stripper: MarkupStripper,
    extractor: SectionExtractor,
    options: ConversionOptions,
}

impl Converter {
    /// Compiles every pattern the options describe.
    pub fn new(options: ConversionOptions) -> Result<Self, ConvertError> {
        let stripper = MarkupStripper::new(&options.strip)?;
        let extractor = SectionExtractor::new(&options.section, &options.end_anchors)?;
        Ok(Self {
            stripper,
            extractor,
            options,
        })
    }

    /// The options this converter was built from.
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Converts markup text into a Markdown document.
    pub fn convert(&self, raw: &str) -> Result<Conversion, ConvertError> {
        let (stripped, strip) = self.stripper.strip(raw);
        let section = self.extractor.extract(&stripped)?;

        let mut warnings = Vec::new();
        if section.open_ended {
            log::warn!(
                "no end anchor after '{}'; converting to end of document",
                self.options.section.title
            );
            warnings.push(ConversionWarning::OpenEndedSection);
        }

        let rewritten = rewrite(section.text(), &self.options.code);
        for rule in rewritten.unmatched() {
            warnings.push(ConversionWarning::RuleUnmatched { rule });
        }

        let body = normalize(&rewritten.text);
        let markdown = assemble(&self.options.frontmatter, &body)?;

        let report = ConversionReport {
            strip,
            section: SectionBounds {
                heading_start: section.heading_start,
                body_start: section.body_start,
                end: section.end,
            },
            rule_hits: rewritten.hits,
            warnings,
            chars: markdown.chars().count(),
        };
        Ok(Conversion { markdown, report })
    }

    /// Reads `input` and converts it without writing anything.
    pub fn convert_path(&self, input: &Path) -> Result<Conversion, ConvertError> {
        let raw = std::fs::read_to_string(input).map_err(|err| ConvertError::io(input, err))?;
        self.convert(&raw)
    }

    /// Reads `input`, converts it and replaces `output` with the result.
    ///
    /// Nothing is written when the conversion fails.
    pub fn convert_file(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<ConversionReport, ConvertError> {
        let conversion = self.convert_path(input)?;
        write_atomically(output, &conversion.markdown)?;
        log::info!(
            "converted {} characters from {} to {}",
            conversion.report.chars,
            input.display(),
            output.display()
        );
        Ok(conversion.report)
    }
}

/// Converts `raw` with freshly compiled options.
pub fn convert(raw: &str, options: &ConversionOptions) -> Result<Conversion, ConvertError> {
    Converter::new(options.clone())?.convert(raw)
}

/// Writes `contents` through a temporary file in the target directory, so
/// `path` either keeps its old contents or gets all of the new ones.
///
/// A new file gets the usual `0644` mode (less the umask) rather than the
/// temp file's owner-only mode; an existing file keeps its permissions.
pub fn write_atomically(path: &Path, contents: &str) -> Result<(), ConvertError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|err| ConvertError::io(dir, err))?;

    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }
    let mut file = builder
        .tempfile_in(dir)
        .map_err(|err| ConvertError::io(dir, err))?;
    file.write_all(contents.as_bytes())
        .map_err(|err| ConvertError::io(path, err))?;
    if let Ok(existing) = std::fs::metadata(path) {
        file.as_file()
            .set_permissions(existing.permissions())
            .map_err(|err| ConvertError::io(path, err))?;
    }
    file.persist(path)
        .map_err(|err| ConvertError::io(path, err.error))?;
    Ok(())
}
