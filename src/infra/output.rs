use crate::domain::models::RunSummary;
use crossterm::{
    ExecutableCommand,
    style::{Color, ResetColor, SetForegroundColor},
};
use log::{debug, info};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub trait OutputWriter {
    fn write(&self, content: &str) -> anyhow::Result<()>;
}

pub struct FileWriter {
    path: PathBuf,
}

impl FileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputWriter for FileWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to file: {}", self.path.display());
        fs::write(&self.path, content)?;
        info!(
            "Output written to file: {} ({} bytes)",
            self.path.display(),
            content.len()
        );
        Ok(())
    }
}

/// Overwrites `path` with the rendered document.
pub fn write_output(formatted_content: &str, path: &Path) -> anyhow::Result<()> {
    FileWriter::new(path).write(formatted_content)
}

pub fn print_summary(summary: &RunSummary) -> io::Result<()> {
    let mut stdout = io::stdout();

    stdout.execute(SetForegroundColor(Color::Green))?;
    writeln!(stdout, "✓ Project log written: {}", summary.output_path.display())?;
    stdout.execute(ResetColor)?;

    writeln!(
        stdout,
        "  {} files, ~{} tokens",
        summary.files_written, summary.token_count
    )?;

    if !summary.warnings.is_empty() {
        stdout.execute(SetForegroundColor(Color::Yellow))?;
        writeln!(stdout, "  {} warnings:", summary.warnings.len())?;
        stdout.execute(ResetColor)?;
        for warning in &summary.warnings {
            writeln!(stdout, "  - {}", warning)?;
        }
    }

    Ok(())
}
