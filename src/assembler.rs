/*!
 * Output document assembly
 *
 * The document is append-only and written in a fixed order: selected file
 * sections first, then the instructions block, then the numbered prompt
 * fragments.
 */

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::config::AssembleConfig;
use crate::error::{Result, ResultExt};
use crate::scanner::FileSection;

const INSTRUCTIONS_FILE: &str = "instructions.txt";

/// Writer producing the assembled output document
pub struct DocumentWriter {
    config: AssembleConfig,
}

impl DocumentWriter {
    /// Create a new document writer
    pub fn new(config: AssembleConfig) -> Self {
        Self { config }
    }

    /// Write the full document to the configured output file
    pub fn write(&self, sections: &[FileSection]) -> Result<()> {
        let file = File::create(&self.config.output_file)?;
        let mut writer = BufWriter::new(file);

        for section in sections {
            self.write_file_section(&mut writer, section)?;
        }

        self.write_instructions(&mut writer)?;
        self.write_prompt_fragments(&mut writer)?;

        writer.flush()?;
        Ok(())
    }

    fn write_file_section<W: Write>(&self, writer: &mut W, section: &FileSection) -> Result<()> {
        write!(
            writer,
            "<file_contents>\nFile: {}\n```{}\n{}\n```\n</file_contents>\n",
            section.rel_path.display(),
            section.language,
            section.content
        )?;
        Ok(())
    }

    /// Write the instructions block when prompts/instructions.txt exists
    fn write_instructions<W: Write>(&self, writer: &mut W) -> Result<()> {
        let path = self.config.prompts_dir.join(INSTRUCTIONS_FILE);
        if !path.is_file() {
            return Ok(());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        write!(writer, "<user_instructions>\n{}\n</user_instructions>\n", content)?;
        Ok(())
    }

    /// Write the remaining *.txt prompt fragments, numbered in name order
    fn write_prompt_fragments<W: Write>(&self, writer: &mut W) -> Result<()> {
        if !self.config.prompts_dir.is_dir() {
            return Ok(());
        }

        let mut fragments: Vec<PathBuf> = fs::read_dir(&self.config.prompts_dir)?
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().map_or(false, |ft| ft.is_file()))
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension().map_or(false, |ext| ext == "txt")
                    && path.file_name().map_or(false, |name| name != INSTRUCTIONS_FILE)
            })
            .collect();
        fragments.sort();

        let mut number = 1;
        for path in fragments {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Warning: skipping prompt fragment {}: {}", path.display(), e);
                    continue;
                }
            };

            write!(
                writer,
                "<meta prompt {0}>\n{1}\n</meta prompt {0}>\n",
                number, content
            )?;
            number += 1;
        }

        Ok(())
    }
}
