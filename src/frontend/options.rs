//! Rendering options, loadable from an `apimark.toml` file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    /// Emit `<a id="..."></a>` anchors after each heading.
    #[serde(default = "default_true")]
    pub link: bool,

    /// Base heading level for module sections.
    #[serde(default = "default_level")]
    pub level: usize,

    /// Emit a leading table of contents. Implies `link`.
    #[serde(default)]
    pub toc: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            link: true,
            level: 1,
            toc: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_level() -> usize {
    1
}

impl Options {
    pub fn new(link: bool, level: usize, toc: bool) -> Self {
        Self { link, level, toc }.normalized()
    }

    /// The table of contents needs anchors to point at.
    pub fn normalized(mut self) -> Self {
        if self.toc {
            self.link = true;
        }
        self
    }

    /// Parse options from a TOML string.
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str::<Options>(content)
            .map(Options::normalized)
            .map_err(|e| format!("failed to parse options: {}", e))
    }

    /// Load options from a TOML file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("failed to read options: {}", e))?;
        Self::parse(&content)
    }

    /// Find and load an `apimark.toml` from the given directory or its
    /// parents, falling back to defaults.
    pub fn discover(start: &Path) -> Self {
        let mut current = Some(start.to_path_buf());
        while let Some(dir) = current {
            let candidate = dir.join("apimark.toml");
            if candidate.exists() {
                if let Ok(options) = Self::load(&candidate) {
                    return options;
                }
            }
            current = dir.parent().map(|p| p.to_path_buf());
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.link);
        assert_eq!(options.level, 1);
        assert!(!options.toc);
    }

    #[test]
    fn test_parse() {
        let options = Options::parse("level = 2\nlink = false\n").unwrap();
        assert_eq!(options.level, 2);
        assert!(!options.link);
    }

    #[test]
    fn test_toc_forces_link() {
        let options = Options::parse("toc = true\nlink = false\n").unwrap();
        assert!(options.toc);
        assert!(options.link);
    }
}
