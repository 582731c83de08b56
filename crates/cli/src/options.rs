use clap::Args;
use serde::Deserialize;

use sectmd_core::{ConversionOptions, ScreenWhitespace};

/// Frontmatter values; anything left out is derived from the section title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrontmatterArgs {
    /// Frontmatter `id` (default: slug of the title)
    #[arg(long)]
    pub id: Option<String>,
    /// Frontmatter `title` (default: section title without its number)
    #[arg(long)]
    pub title: Option<String>,
    /// Frontmatter `sidebar_label` (default: the title)
    #[arg(long)]
    pub sidebar_label: Option<String>,
}

/// Settings shared by `convert` flags and manifest jobs.
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    pub section: String,
    pub frontmatter: FrontmatterArgs,
    pub language: String,
    pub keep_screen_lines: bool,
    pub end_anchors: Vec<String>,
}

impl OptionsBuilder {
    pub fn build(self) -> ConversionOptions {
        let mut options = ConversionOptions::for_section(&self.section);

        let fm = &mut options.frontmatter;
        if let Some(title) = self.frontmatter.title {
            // An explicit title also becomes the default id and label
            fm.id = sectmd_core::slug::slugify(&title);
            fm.sidebar_label = title.clone();
            fm.title = title;
        }
        if let Some(id) = self.frontmatter.id {
            fm.id = id;
        }
        if let Some(label) = self.frontmatter.sidebar_label {
            fm.sidebar_label = label;
        }

        options.code.screen_language = (!self.language.is_empty()).then_some(self.language);
        if self.keep_screen_lines {
            options.code.screen_whitespace = ScreenWhitespace::Preserve;
        }
        options.end_anchors = self.end_anchors;
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> OptionsBuilder {
        OptionsBuilder {
            section: "9. Directories".to_string(),
            frontmatter: FrontmatterArgs::default(),
            language: "pike".to_string(),
            keep_screen_lines: false,
            end_anchors: Vec::new(),
        }
    }

    #[test]
    fn defaults_follow_the_section_title() {
        let options = builder().build();
        assert_eq!(options.section.title, "9. Directories");
        assert_eq!(options.frontmatter.id, "directories");
        assert_eq!(options.frontmatter.title, "Directories");
        assert_eq!(options.frontmatter.sidebar_label, "Directories");
        assert_eq!(options.code.screen_language.as_deref(), Some("pike"));
        assert_eq!(options.code.screen_whitespace, ScreenWhitespace::Collapse);
    }

    #[test]
    fn explicit_title_feeds_id_and_label() {
        let mut b = builder();
        b.frontmatter.title = Some("Working With Directories".to_string());
        let options = b.build();
        assert_eq!(options.frontmatter.id, "working-with-directories");
        assert_eq!(options.frontmatter.sidebar_label, "Working With Directories");
    }

    #[test]
    fn explicit_fields_win() {
        let mut b = builder();
        b.frontmatter = FrontmatterArgs {
            id: Some("dirs".to_string()),
            title: Some("Dirs".to_string()),
            sidebar_label: Some("Directory ops".to_string()),
        };
        let options = b.build();
        assert_eq!(options.frontmatter.id, "dirs");
        assert_eq!(options.frontmatter.title, "Dirs");
        assert_eq!(options.frontmatter.sidebar_label, "Directory ops");
    }

    #[test]
    fn empty_language_drops_the_hint_and_lines_can_be_kept() {
        let mut b = builder();
        b.language = String::new();
        b.keep_screen_lines = true;
        let options = b.build();
        assert_eq!(options.code.screen_language, None);
        assert_eq!(options.code.screen_whitespace, ScreenWhitespace::Preserve);
    }
}
