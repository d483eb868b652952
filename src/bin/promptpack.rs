/*!
 * Command-line interface for the prompt assembler
 */

use std::fs;
use std::io;
use std::sync::Arc;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;

use promptpack::assembler::DocumentWriter;
use promptpack::config::{AssembleArgs, AssembleConfig};
use promptpack::report::{AssembleReport, ReportFormat, Reporter};
use promptpack::rules::IncludeRules;
use promptpack::scanner::Scanner;
use promptpack::tokenizer::Tokenizer;

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = AssembleArgs::parse();

    // Shell completion generation short-circuits everything else
    if let Some(shell) = args.generate {
        let mut cmd = AssembleArgs::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    // Create and validate configuration
    let config = AssembleConfig::from_args(args);
    config.validate()?;

    // Configure thread pool
    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        eprintln!("Warning: Failed to set thread pool size: {}", e);
    }

    // Exact token counting only when a model was selected
    let tokenizer = match config.model {
        Some(model) => Some(Arc::new(
            Tokenizer::new(model).map_err(promptpack::PromptPackError::from)?,
        )),
        None => None,
    };

    // Load include rules
    let rules = IncludeRules::load(&config.rules_file, &config.target_dir)?;

    // Create progress bar
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%) Elapsed: {elapsed_precise}")
            .unwrap(),
    );
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress.set_prefix("Scanning");
    progress.set_message(format!(
        "{} include rules from {}",
        rules.len(),
        config.rules_file.display()
    ));

    let scanner = Scanner::new(
        config.clone(),
        rules,
        tokenizer.clone(),
        Arc::new(progress.clone()),
    );

    // Time the scan and the write together
    let start_time = Instant::now();

    let matched = scanner.scan()?;
    if matched.is_empty() {
        progress.println("No files matched the include rules.");
    }

    progress.set_length(matched.len() as u64);
    progress.set_prefix("Assembling");

    let sections = scanner.collect_sections(&matched);

    if !config.prompts_dir.is_dir() {
        progress.println(format!(
            "Prompts directory {} not found, skipping prompt sections",
            config.prompts_dir.display()
        ));
    }

    let writer = DocumentWriter::new(config.clone());
    writer.write(&sections)?;

    let total_duration = start_time.elapsed();
    progress.finish_and_clear();

    // Size the finished document for the report
    let output_text = fs::read_to_string(&config.output_file)?;
    let output_bytes = fs::metadata(&config.output_file)?.len();
    let total_tokens = tokenizer
        .as_ref()
        .map(|tokenizer| tokenizer.count_tokens(&output_text));

    let stats = scanner.statistics();
    let report = AssembleReport {
        output_file: config.output_file.display().to_string(),
        duration: total_duration,
        files_included: stats.files_included,
        output_lines: output_text.lines().count(),
        output_chars: output_text.chars().count(),
        output_bytes,
        total_tokens,
        file_details: stats.file_details,
    };

    let reporter = Reporter::new(ReportFormat::ConsoleTable);
    reporter.print_report(&report);

    Ok(())
}
