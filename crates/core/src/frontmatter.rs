use serde::{Deserialize, Serialize};

use crate::ConvertError;
use crate::slug::{slugify, strip_section_number};

/// YAML frontmatter written ahead of the converted body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Document id.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Navigation label.
    pub sidebar_label: String,
}

impl Frontmatter {
    /// Creates frontmatter from explicit values.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        sidebar_label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            sidebar_label: sidebar_label.into(),
        }
    }

    /// Derives all three fields from a section heading such as `9. Directories`.
    ///
    /// The section number is dropped for the title and label, and the id is
    /// the slug of the title.
    pub fn from_section_title(section_title: &str) -> Self {
        let title = strip_section_number(section_title);
        Self::new(slugify(title), title, title)
    }

    /// Renders the fenced YAML block, closing fence and trailing newline included.
    pub fn render(&self) -> Result<String, ConvertError> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(format!("---\n{yaml}---\n"))
    }
}

/// Prepends the frontmatter block and a blank line to `body`.
pub fn assemble(frontmatter: &Frontmatter, body: &str) -> Result<String, ConvertError> {
    let block = frontmatter.render()?;
    let mut document = String::with_capacity(block.len() + 1 + body.len());
    document.push_str(&block);
    document.push('\n');
    document.push_str(body);
    Ok(document)
}
