/*!
 * PromptPack - assemble LLM prompt context and apply model-suggested file changes
 *
 * This library backs two command-line tools: `promptpack`, which selects
 * files from a directory tree via gitignore-style include rules and
 * concatenates them with auxiliary prompt text into a single document, and
 * `promptapply`, which extracts a JSON/XML payload from a model response and
 * applies the file operations it describes.
 */

pub mod assembler;
pub mod config;
pub mod error;
pub mod ops;
pub mod parser;
pub mod report;
pub mod rules;
pub mod scanner;
pub mod tokenizer;
pub mod utils;


// Re-export main components for easier access
pub use assembler::DocumentWriter;
pub use config::{ApplyConfig, AssembleConfig};
pub use error::{PromptPackError, Result};
pub use ops::{Applier, ApplySummary, FileOperation, OpKind};
pub use parser::Payload;
pub use report::{AssembleReport, FileReportInfo, ReportFormat, Reporter};
pub use rules::IncludeRules;
pub use scanner::{FileSection, MatchedFile, Scanner};
pub use tokenizer::{Model, Tokenizer};
pub use utils::format_file_size;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
