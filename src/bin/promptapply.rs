/*!
 * Command-line interface for the change applier
 */

use std::fs::File;
use std::io::{self, BufReader};

use clap::{CommandFactory, Parser};

use promptpack::config::{ApplyArgs, ApplyConfig};
use promptpack::ops::Applier;
use promptpack::parser;
use promptpack::report::{ReportFormat, Reporter};

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = ApplyArgs::parse();

    if let Some(shell) = args.generate {
        let mut cmd = ApplyArgs::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    // Create and validate configuration
    let config = ApplyConfig::from_args(args);
    config.validate()?;

    // Locate the payload blocks
    let file = File::open(&config.input_file)?;
    let payload = parser::extract_payload(BufReader::new(file))?;

    // Pretty-print the JSON metadata when present
    if let Some(json) = &payload.meta_json {
        let value = parser::parse_meta(json)?;
        println!("Metadata:");
        print!("{}", parser::render_meta(&value));
    }

    // Apply the XML operations when present
    match &payload.ops_xml {
        Some(xml) => {
            let operations = parser::parse_operations(xml)?;
            let applier = Applier::new(&config.root_dir, config.dry_run);
            let summary = applier.apply_all(&operations);

            let reporter = Reporter::new(ReportFormat::ConsoleTable);
            reporter.print_apply_summary(&summary);
        }
        None => println!(
            "No operations payload found in {}",
            config.input_file.display()
        ),
    }

    Ok(())
}
