/*!
 * Directory walking and file selection
 */

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use glob_match::glob_match;
use ignore::WalkBuilder;
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::config::AssembleConfig;
use crate::report::FileReportInfo;
use crate::rules::IncludeRules;
use crate::tokenizer::Tokenizer;
use crate::utils::{language_tag, DEFAULT_IGNORE};

/// A file selected by the include rules
#[derive(Debug, Clone)]
pub struct MatchedFile {
    /// Absolute path on disk
    pub abs_path: PathBuf,
    /// Path relative to the scan root
    pub rel_path: PathBuf,
}

/// Content of a selected file, ready for the document writer
#[derive(Debug, Clone)]
pub struct FileSection {
    /// Path relative to the scan root
    pub rel_path: PathBuf,
    /// Fence language tag derived from the extension
    pub language: String,
    /// File content
    pub content: String,
}

/// Scan statistics
#[derive(Debug, Clone, Default)]
pub struct ScanStatistics {
    /// Number of files whose content made it into the document
    pub files_included: usize,
    /// Total number of lines across included files
    pub total_lines: usize,
    /// Total number of characters across included files
    pub total_chars: usize,
    /// Details for each file
    pub file_details: HashMap<String, FileReportInfo>,
}

/// Scanner selecting and reading files for the output document
pub struct Scanner {
    config: AssembleConfig,
    rules: IncludeRules,
    tokenizer: Option<Arc<Tokenizer>>,
    /// Progress bar shared with the CLI
    pub progress: Arc<ProgressBar>,
    statistics: Arc<Mutex<ScanStatistics>>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(
        config: AssembleConfig,
        rules: IncludeRules,
        tokenizer: Option<Arc<Tokenizer>>,
        progress: Arc<ProgressBar>,
    ) -> Self {
        Self {
            config,
            rules,
            tokenizer,
            progress,
            statistics: Arc::new(Mutex::new(ScanStatistics::default())),
        }
    }

    /// Get scan statistics
    pub fn statistics(&self) -> ScanStatistics {
        self.statistics.lock().unwrap().clone()
    }

    /// Walk the target directory and collect selected files in lexical order
    pub fn scan(&self) -> std::io::Result<Vec<MatchedFile>> {
        let root = fs::canonicalize(&self.config.target_dir)?;
        let ignore_patterns = self.config.ignore_patterns.clone();
        let output_file = self.config.output_file.clone();

        let mut matched = Vec::new();

        if self.config.respect_gitignore {
            // The ignore walker prunes .gitignore'd entries while descending
            let mut walker = WalkBuilder::new(&root);
            walker.filter_entry(move |entry| {
                !should_ignore_path(entry.path(), &ignore_patterns, &output_file)
            });

            for entry in walker.build().filter_map(Result::ok) {
                if !entry.file_type().map_or(false, |ft| ft.is_file()) {
                    continue;
                }
                if let Some(m) = self.match_entry(&root, entry.path()) {
                    matched.push(m);
                }
            }
        } else {
            let walker = walkdir::WalkDir::new(&root).into_iter().filter_entry(
                move |entry| !should_ignore_path(entry.path(), &ignore_patterns, &output_file),
            );

            for entry in walker.filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Some(m) = self.match_entry(&root, entry.path()) {
                    matched.push(m);
                }
            }
        }

        // Document order is lexical path order
        matched.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        Ok(matched)
    }

    /// Read the selected files in parallel, preserving document order
    pub fn collect_sections(&self, matched: &[MatchedFile]) -> Vec<FileSection> {
        let sections: Vec<FileSection> = matched
            .par_iter()
            .filter_map(|file| match self.read_section(file) {
                Ok(section) => Some(section),
                Err(e) => {
                    self.progress
                        .println(format!("Warning: skipping {}: {}", file.rel_path.display(), e));
                    None
                }
            })
            .collect();

        sections
    }

    /// Check if a path should be skipped regardless of the include rules
    pub fn should_ignore(&self, path: &Path) -> bool {
        should_ignore_path(path, &self.config.ignore_patterns, &self.config.output_file)
    }

    fn match_entry(&self, root: &Path, abs_path: &Path) -> Option<MatchedFile> {
        let rel_path = abs_path.strip_prefix(root).ok()?;
        if !self.rules.is_match(rel_path, false) {
            return None;
        }

        Some(MatchedFile {
            abs_path: abs_path.to_path_buf(),
            rel_path: rel_path.to_path_buf(),
        })
    }

    fn read_section(&self, file: &MatchedFile) -> std::io::Result<FileSection> {
        self.progress.inc(1);

        let file_name = file
            .abs_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let display_name = if file_name.len() > 40 {
            format!("...{}", &file_name[file_name.len().saturating_sub(37)..])
        } else {
            file_name
        };
        self.progress
            .set_message(format!("Current file: {}", display_name));

        // Non-UTF-8 content fails here and the caller warns and skips
        let content = fs::read_to_string(&file.abs_path)?;

        let lines = content.lines().count();
        let chars = content.chars().count();
        let tokens = self
            .tokenizer
            .as_ref()
            .map(|tokenizer| tokenizer.count_tokens(&content));

        {
            let mut stats = self.statistics.lock().unwrap();
            stats.files_included += 1;
            stats.total_lines += lines;
            stats.total_chars += chars;
            stats.file_details.insert(
                file.rel_path.to_string_lossy().to_string(),
                FileReportInfo {
                    lines,
                    chars,
                    tokens,
                },
            );
        }

        Ok(FileSection {
            rel_path: file.rel_path.clone(),
            language: language_tag(&file.abs_path).to_string(),
            content,
        })
    }
}

/// Shared ignore check for both walkers
///
/// Matches the entry name against the user's glob patterns and the default
/// ignore list, and keeps the output document itself out of its own input.
fn should_ignore_path(path: &Path, ignore_patterns: &[String], output_file: &Path) -> bool {
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();

    for pattern in ignore_patterns {
        if glob_match(pattern, &file_name) {
            return true;
        }
    }

    if DEFAULT_IGNORE.iter().any(|p| glob_match(p, &file_name)) {
        return true;
    }

    if path.ends_with(output_file) {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_should_ignore_path_defaults() {
        let none: Vec<String> = vec![];
        let output = PathBuf::from("prompt.txt");

        assert!(should_ignore_path(Path::new("/p/.git"), &none, &output));
        assert!(should_ignore_path(Path::new("/p/node_modules"), &none, &output));
        assert!(should_ignore_path(Path::new("/p/debug.log"), &none, &output));
        assert!(!should_ignore_path(Path::new("/p/src"), &none, &output));
    }

    #[test]
    fn test_should_ignore_path_user_patterns() {
        let patterns = vec!["*.min.js".to_string()];
        let output = PathBuf::from("prompt.txt");

        assert!(should_ignore_path(Path::new("/p/app.min.js"), &patterns, &output));
        assert!(!should_ignore_path(Path::new("/p/app.js"), &patterns, &output));
    }

    #[test]
    fn test_output_document_excluded_from_scan() {
        let none: Vec<String> = vec![];
        let output = PathBuf::from("prompt.txt");

        assert!(should_ignore_path(Path::new("/p/prompt.txt"), &none, &output));
        assert!(!should_ignore_path(Path::new("/p/other.txt"), &none, &output));
    }
}
