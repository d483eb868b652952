/*!
 * Configuration handling for both promptpack binaries
 */

use std::io;
use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

use crate::tokenizer::Model;

/// Command-line arguments for the assembler
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "promptpack",
    version = env!("CARGO_PKG_VERSION"),
    about = "Assemble selected files and prompt fragments into one LLM context document",
    long_about = "Walks a directory tree, selects files matching the gitignore-style \
                  patterns of a rule file, and concatenates their contents together \
                  with auxiliary prompt text into a single output document, reporting \
                  size, line and token statistics."
)]
pub struct AssembleArgs {
    /// Target directory to process
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// Output document file name
    #[clap(default_value = "prompt.txt")]
    pub output_file: String,

    /// Include rule file (gitignore-style patterns selecting files)
    #[clap(long, default_value = ".llminclude")]
    pub rules_file: String,

    /// Directory holding instructions.txt and numbered prompt fragments
    #[clap(long, default_value = "prompts")]
    pub prompts_dir: String,

    /// Comma-separated list of glob patterns to ignore
    #[clap(long, value_delimiter = ',')]
    pub ignore_patterns: Vec<String>,

    /// Number of threads to use for reading files
    #[clap(long, default_value = "4")]
    pub threads: usize,

    /// Also respect .gitignore files in the target directory
    #[clap(long)]
    pub respect_gitignore: bool,

    /// LLM model to use for tokenization (enables exact token counting)
    #[clap(long, value_enum)]
    pub model: Option<Model>,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Command-line arguments for the applier
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "promptapply",
    version = env!("CARGO_PKG_VERSION"),
    about = "Extract the JSON/XML payload from a model response and apply its file operations",
    long_about = "Reads a structured document containing an embedded JSON block and an \
                  embedded XML block, pretty-prints the JSON metadata, and applies the \
                  create/update/delete file operations described by the XML."
)]
pub struct ApplyArgs {
    /// Input document holding the payload
    #[clap(default_value = "output.txt")]
    pub input_file: String,

    /// Directory the file operations are applied under
    #[clap(long, default_value = ".")]
    pub root: String,

    /// Report intended operations without touching the filesystem
    #[clap(long)]
    pub dry_run: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Resolved assembler configuration
#[derive(Clone, Debug)]
pub struct AssembleConfig {
    /// Target directory to process
    pub target_dir: PathBuf,

    /// Output document path
    pub output_file: PathBuf,

    /// Include rule file path
    pub rules_file: PathBuf,

    /// Prompt fragment directory
    pub prompts_dir: PathBuf,

    /// Glob patterns to ignore
    pub ignore_patterns: Vec<String>,

    /// Number of threads to use for reading files
    pub num_threads: usize,

    /// Whether to respect .gitignore files
    pub respect_gitignore: bool,

    /// LLM model to use for tokenization
    pub model: Option<Model>,
}

impl AssembleConfig {
    /// Create configuration from command-line arguments
    ///
    /// Relative rule-file and prompts-dir paths are anchored at the target
    /// directory so assembling a sibling project picks up its own files.
    pub fn from_args(args: AssembleArgs) -> Self {
        let target_dir = PathBuf::from(args.directory_path);
        let rules_file = anchor(&target_dir, PathBuf::from(args.rules_file));
        let prompts_dir = anchor(&target_dir, PathBuf::from(args.prompts_dir));

        Self {
            target_dir,
            output_file: PathBuf::from(args.output_file),
            rules_file,
            prompts_dir,
            ignore_patterns: args.ignore_patterns,
            num_threads: args.threads,
            respect_gitignore: args.respect_gitignore,
            model: args.model,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> io::Result<()> {
        if !self.target_dir.exists() || !self.target_dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Target directory not found: {}", self.target_dir.display()),
            ));
        }

        if !self.rules_file.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Include rule file not found: {}", self.rules_file.display()),
            ));
        }

        // Check if output file directory exists and is writable
        if let Some(parent) = self.output_file.parent() {
            if !parent.exists() && parent != PathBuf::from("") {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Output directory not found: {}", parent.display()),
                ));
            }
        }

        Ok(())
    }
}

/// Resolved applier configuration
#[derive(Clone, Debug)]
pub struct ApplyConfig {
    /// Input document path
    pub input_file: PathBuf,

    /// Root directory operations are applied under
    pub root_dir: PathBuf,

    /// Dry-run mode
    pub dry_run: bool,
}

impl ApplyConfig {
    /// Create configuration from command-line arguments
    pub fn from_args(args: ApplyArgs) -> Self {
        Self {
            input_file: PathBuf::from(args.input_file),
            root_dir: PathBuf::from(args.root),
            dry_run: args.dry_run,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> io::Result<()> {
        if !self.input_file.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Input file not found: {}", self.input_file.display()),
            ));
        }

        if !self.root_dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Apply root not found: {}", self.root_dir.display()),
            ));
        }

        Ok(())
    }
}

fn anchor(target_dir: &std::path::Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        target_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_anchor_at_target() {
        let args = AssembleArgs {
            directory_path: "/work/project".to_string(),
            output_file: "prompt.txt".to_string(),
            rules_file: ".llminclude".to_string(),
            prompts_dir: "prompts".to_string(),
            ignore_patterns: vec![],
            threads: 4,
            respect_gitignore: false,
            model: None,
            generate: None,
        };

        let config = AssembleConfig::from_args(args);
        assert_eq!(config.rules_file, PathBuf::from("/work/project/.llminclude"));
        assert_eq!(config.prompts_dir, PathBuf::from("/work/project/prompts"));
    }

    #[test]
    fn test_absolute_paths_kept() {
        let args = AssembleArgs {
            directory_path: "/work/project".to_string(),
            output_file: "prompt.txt".to_string(),
            rules_file: "/etc/llminclude".to_string(),
            prompts_dir: "/srv/prompts".to_string(),
            ignore_patterns: vec![],
            threads: 4,
            respect_gitignore: false,
            model: None,
            generate: None,
        };

        let config = AssembleConfig::from_args(args);
        assert_eq!(config.rules_file, PathBuf::from("/etc/llminclude"));
        assert_eq!(config.prompts_dir, PathBuf::from("/srv/prompts"));
    }
}
