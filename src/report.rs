/*!
 * Report rendering for assembly and apply runs
 *
 * Uses the tabled library for clean, consistent table output.
 */

use std::collections::HashMap;
use std::time::Duration;

use chrono::Local;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::ops::ApplySummary;
use crate::utils::format_file_size;

/// Information about one included file
#[derive(Debug, Clone, Default)]
pub struct FileReportInfo {
    /// Number of lines in the file
    pub lines: usize,
    /// Number of characters in the file
    pub chars: usize,
    /// Number of tokens in the file (if a model was selected)
    pub tokens: Option<usize>,
}

/// Statistics for an assembly run
#[derive(Debug, Clone)]
pub struct AssembleReport {
    /// Output document path
    pub output_file: String,
    /// Time taken to scan and write
    pub duration: Duration,
    /// Number of files included in the document
    pub files_included: usize,
    /// Number of lines in the output document
    pub output_lines: usize,
    /// Number of characters in the output document
    pub output_chars: usize,
    /// Size of the output document in bytes
    pub output_bytes: u64,
    /// Token count of the output document (if a model was selected)
    pub total_tokens: Option<usize>,
    /// Details for each included file
    pub file_details: HashMap<String, FileReportInfo>,
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Truncate a path for display, keeping the trailing segments
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.len() <= max_len {
            return path.to_string();
        }

        let mut kept = Vec::new();
        let mut current_len = 3; // room for "..."
        for part in path.split('/').rev() {
            let part_len = part.len() + 1;
            if current_len + part_len > max_len {
                break;
            }
            kept.push(part);
            current_len += part_len;
        }

        if kept.is_empty() {
            return format!("...{}", &path[path.len().saturating_sub(max_len - 3)..]);
        }

        let mut result = String::from("...");
        for part in kept.iter().rev() {
            result.push('/');
            result.push_str(part);
        }
        result
    }

    /// Generate a report string for an assembly run
    pub fn generate_report(&self, report: &AssembleReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &AssembleReport) {
        println!("\n{}", self.generate_report(report));
    }

    /// Print the summary of an apply run
    pub fn print_apply_summary(&self, summary: &ApplySummary) {
        println!("\n{}", self.generate_apply_summary(summary));
    }

    /// Generate the summary table of an apply run
    pub fn generate_apply_summary(&self, summary: &ApplySummary) -> String {
        #[derive(Tabled)]
        struct OutcomeRow {
            #[tabled(rename = "Outcome")]
            outcome: String,

            #[tabled(rename = "Files")]
            count: String,
        }

        let rows = vec![
            OutcomeRow {
                outcome: "Created".to_string(),
                count: summary.created.to_string(),
            },
            OutcomeRow {
                outcome: "Updated".to_string(),
                count: summary.updated.to_string(),
            },
            OutcomeRow {
                outcome: "Deleted".to_string(),
                count: summary.deleted.to_string(),
            },
            OutcomeRow {
                outcome: "Skipped (existing)".to_string(),
                count: summary.skipped.to_string(),
            },
            OutcomeRow {
                outcome: "Failed".to_string(),
                count: summary.failed.to_string(),
            },
        ];

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        format!(
            "APPLY COMPLETE ({} records)\n{}",
            summary.total(),
            table
        )
    }

    // Summary table for an assembly run
    fn create_summary_table(&self, report: &AssembleReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let token_text = if let Some(tokens) = report.total_tokens {
            format!("{} tokens (counted)", self.format_number(tokens))
        } else {
            let estimated = report.output_chars / 4;
            format!("{} tokens (estimated)", self.format_number(estimated))
        };

        let rows = vec![
            SummaryRow {
                key: "📂 Output File".to_string(),
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "🕒 Finished At".to_string(),
                value: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "📄 Files Included".to_string(),
                value: self.format_number(report.files_included),
            },
            SummaryRow {
                key: "📝 Output Lines".to_string(),
                value: self.format_number(report.output_lines),
            },
            SummaryRow {
                key: "💾 Output Size".to_string(),
                value: format_file_size(report.output_bytes),
            },
            SummaryRow {
                key: "📦 LLM Tokens".to_string(),
                value: token_text,
            },
        ];

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Per-file table for an assembly run
    fn create_files_table(&self, report: &AssembleReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File")]
            path: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Tokens")]
            tokens: String,
        }

        let mut files: Vec<_> = report.file_details.iter().collect();
        files.sort_by(|(_, a), (_, b)| b.chars.cmp(&a.chars));

        let files_to_show = if report.file_details.len() > 15 {
            &files[0..10]
        } else {
            &files[..]
        };

        let rows: Vec<FileRow> = files_to_show
            .iter()
            .map(|(path, info)| {
                let tokens = if let Some(tokens) = info.tokens {
                    self.format_number(tokens)
                } else {
                    format!("~{}", self.format_number(info.chars / 4))
                };

                FileRow {
                    path: self.format_path(path, 60),
                    lines: self.format_number(info.lines),
                    tokens,
                }
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn generate_console_report(&self, report: &AssembleReport) -> String {
        let files_title = if report.file_details.len() > 15 {
            "📋 TOP 10 LARGEST INCLUDED FILES"
        } else {
            "📋 INCLUDED FILES"
        };

        format!(
            "{}\n{}\n\n✅ ASSEMBLY COMPLETE\n{}",
            files_title,
            self.create_files_table(report),
            self.create_summary_table(report)
        )
    }
}
