/*!
 * Utility helpers shared by both binaries
 */

use std::ffi::OsStr;
use std::path::Path;

use once_cell::sync::Lazy;

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Language tag for a fenced code block, taken from the file extension
pub fn language_tag(path: &Path) -> &str {
    path.extension().and_then(OsStr::to_str).unwrap_or("")
}

/// Names that are never worth feeding to a model, even when an include
/// rule would otherwise select them
pub static DEFAULT_IGNORE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version control
        ".git",
        ".svn",
        ".hg",
        // OS junk
        ".DS_Store",
        "Thumbs.db",
        "desktop.ini",
        // Dependency trees
        "node_modules",
        "vendor",
        ".venv",
        "venv",
        "__pycache__",
        // Build output
        "target",
        "dist",
        "build",
        "out",
        // Lockfiles
        "Cargo.lock",
        "package-lock.json",
        "yarn.lock",
        // Editor state
        ".idea",
        ".vscode",
        "*.swp",
        "*.swo",
        "*~",
        // Caches and logs
        ".cache",
        ".pytest_cache",
        "*.log",
        // Binary archives
        "*.zip",
        "*.tar.gz",
        "*.tgz",
    ]
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_language_tag() {
        assert_eq!(language_tag(&PathBuf::from("src/main.rs")), "rs");
        assert_eq!(language_tag(&PathBuf::from("notes/todo.txt")), "txt");
        assert_eq!(language_tag(&PathBuf::from("Makefile")), "");
    }
}
