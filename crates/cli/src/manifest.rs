//! YAML manifest describing several conversions.
//!
//! ```yaml
//! jobs:
//!   - input: pleac_pike/directories.html
//!     output: docs/files/directories.md
//!     section: "9. Directories"
//!   - input: pleac_pike/subroutines.html
//!     output: docs/files/subroutines.md
//!     section: "10. Subroutines"
//!     frontmatter:
//!       sidebar_label: Subs
//!     language: pike
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::options::{FrontmatterArgs, OptionsBuilder};

/// Parsed manifest file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub jobs: Vec<Job>,
}

/// One input/output pair and how to convert it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
    pub section: String,
    #[serde(default)]
    pub frontmatter: FrontmatterArgs,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub keep_screen_lines: bool,
    #[serde(default)]
    pub end_anchors: Vec<String>,
}

fn default_language() -> String {
    "pike".to_string()
}

impl Job {
    pub fn builder(&self) -> OptionsBuilder {
        OptionsBuilder {
            section: self.section.clone(),
            frontmatter: self.frontmatter.clone(),
            language: self.language.clone(),
            keep_screen_lines: self.keep_screen_lines,
            end_anchors: self.end_anchors.clone(),
        }
    }
}

impl Manifest {
    /// Reads a manifest and resolves relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        let mut manifest: Manifest = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing manifest {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for job in &mut manifest.jobs {
            job.input = base.join(&job.input);
            job.output = base.join(&job.output);
        }
        Ok(manifest)
    }
}
