use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The heading that starts the requested section is not in the document.
    #[error("Section not found: no heading titled '{title}'")]
    SectionNotFound {
        /// Title that was searched for
        title: String,
    },
    /// A caller-supplied anchor pattern failed to compile.
    #[error("Invalid anchor pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Compilation error from the regex engine
        #[source]
        source: regex::Error,
    },
    /// Reading the input or writing the output failed.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// File the operation was acting on
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// Frontmatter could not be serialized.
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] serde_yaml::Error),
}

impl ConvertError {
    /// Create a section-not-found error for the given title
    pub fn section_not_found(title: impl Into<String>) -> Self {
        Self::SectionNotFound {
            title: title.into(),
        }
    }

    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Non-fatal findings that don't prevent writing output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionWarning {
    /// A rewrite rule found nothing to rewrite
    RuleUnmatched {
        /// Rule name
        rule: &'static str,
    },
    /// No end anchor matched, so the section runs to the end of the document
    OpenEndedSection,
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionWarning::RuleUnmatched { rule } => {
                write!(f, "rule '{}' matched nothing", rule)
            }
            ConversionWarning::OpenEndedSection => {
                write!(f, "no end anchor found; section runs to end of document")
            }
        }
    }
}
