/*!
 * Include rule handling
 *
 * The rule file holds an ordered list of gitignore-style patterns, one per
 * line. A pattern that matches a path *selects* it for assembly; a negated
 * (`!`) pattern deselects paths matched by earlier rules.
 */

use std::fs;
use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::Result;

/// Compiled include rules loaded from a rule file
#[derive(Clone)]
pub struct IncludeRules {
    matcher: Gitignore,
    patterns: Vec<String>,
}

impl IncludeRules {
    /// Load rules from a file, skipping blank lines and `#` comments
    pub fn load(path: &Path, root: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_lines(root, text.lines())
    }

    /// Build rules from an iterator of pattern lines
    pub fn from_lines<'a, I>(root: &Path, lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut builder = GitignoreBuilder::new(root);
        let mut patterns = Vec::new();

        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            builder.add_line(None, line)?;
            patterns.push(line.to_string());
        }

        let matcher = builder.build()?;
        Ok(Self { matcher, patterns })
    }

    /// Check whether a path (relative to the rule root) is selected
    pub fn is_match(&self, rel_path: &Path, is_dir: bool) -> bool {
        self.matcher
            .matched_path_or_any_parents(rel_path, is_dir)
            .is_ignore()
    }

    /// Number of loaded patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when no pattern survived loading
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn rules(lines: &[&str]) -> IncludeRules {
        IncludeRules::from_lines(Path::new("/project"), lines.iter().copied()).unwrap()
    }

    #[test]
    fn test_glob_selection() {
        let rules = rules(&["*.rs", "docs/*.md"]);
        assert!(rules.is_match(&PathBuf::from("src/main.rs"), false));
        assert!(rules.is_match(&PathBuf::from("docs/intro.md"), false));
        assert!(!rules.is_match(&PathBuf::from("README.txt"), false));
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        let rules = rules(&["# only sources", "", "  ", "*.rs"]);
        assert_eq!(rules.len(), 1);
        assert!(rules.is_match(&PathBuf::from("lib.rs"), false));
    }

    #[test]
    fn test_negation_deselects() {
        let rules = rules(&["*.rs", "!generated.rs"]);
        assert!(rules.is_match(&PathBuf::from("main.rs"), false));
        assert!(!rules.is_match(&PathBuf::from("generated.rs"), false));
    }

    #[test]
    fn test_directory_rule_selects_children() {
        let rules = rules(&["src/"]);
        assert!(rules.is_match(&PathBuf::from("src/deep/nested.rs"), false));
        assert!(!rules.is_match(&PathBuf::from("tests/nested.rs"), false));
    }

    #[test]
    fn test_empty_rule_set_matches_nothing() {
        let rules = rules(&[]);
        assert!(rules.is_empty());
        assert!(!rules.is_match(&PathBuf::from("anything.rs"), false));
    }
}
