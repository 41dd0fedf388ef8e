use crate::domain::errors::CollectorError;
use crate::domain::models::{FileContent, FileContext, OutputDocument};
use crate::infra::file_system::relative_display;
use log::{debug, info, warn};
use std::io;
use std::path::{Path, PathBuf};

fn count_tokens(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Reads each selected file in order. Unreadable files are dropped with a warning;
/// binary files are kept as placeholders and also reported.
pub fn load_files(
    paths: Vec<PathBuf>,
    root: &Path,
    file_reader: impl Fn(&Path) -> io::Result<FileContent>,
    skip_empty: bool,
) -> (Vec<FileContext>, Vec<CollectorError>) {
    debug!("Loading {} files", paths.len());
    let mut files = Vec::new();
    let mut warnings = Vec::new();

    for path in paths {
        let content = match file_reader(&path) {
            Ok(content) => content,
            Err(e) => {
                let err = CollectorError::io(&path, e);
                warn!("{}", err);
                warnings.push(err);
                continue;
            }
        };

        match &content {
            FileContent::Binary { len } => {
                let err = CollectorError::Decode {
                    path: path.clone(),
                    reason: format!("{} bytes of binary or non-UTF-8 data", len),
                };
                warn!("{}", err);
                warnings.push(err);
            }
            FileContent::Text(text) if skip_empty && text.trim().is_empty() => {
                info!("Skipped empty file: {}", path.display());
                continue;
            }
            FileContent::Text(_) => {}
        }

        let relative_path = relative_display(&path, root);
        files.push(FileContext {
            path,
            relative_path,
            content,
        });
    }

    info!("Successfully loaded {} files", files.len());
    (files, warnings)
}

/// Three backticks, or one more than the longest backtick run opening any line.
fn fence_for(content: &str) -> String {
    let longest = content
        .lines()
        .map(|line| line.trim_start().chars().take_while(|&c| c == '`').count())
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// Inline code span for a path, so `_` and `*` in names stay literal.
fn code_span(text: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        run = if c == '`' { run + 1 } else { 0 };
        longest = longest.max(run);
    }
    let ticks = "`".repeat(longest + 1);
    let pad = if text.starts_with('`') || text.ends_with('`') { " " } else { "" };
    format!("{ticks}{pad}{text}{pad}{ticks}")
}

fn render_section(file: &FileContext, language: Option<&str>) -> String {
    match &file.content {
        FileContent::Text(text) => {
            let fence = fence_for(text);
            let newline = if text.is_empty() || text.ends_with('\n') { "" } else { "\n" };
            format!(
                "## {}\n\n{}{}\n{}{}{}\n",
                code_span(&file.relative_path),
                fence,
                language.unwrap_or(""),
                text,
                newline,
                fence
            )
        }
        FileContent::Binary { len } => format!(
            "## {}\n\n_Binary or non-UTF-8 content omitted ({} bytes)._\n",
            code_span(&file.relative_path),
            len
        ),
    }
}

pub fn build_document(files: &[FileContext], language: Option<&str>, title: &str) -> OutputDocument {
    debug!("Building document from {} files", files.len());
    let mut sections = Vec::with_capacity(files.len());
    let mut total_tokens = 0;

    for file in files {
        if let FileContent::Text(text) = &file.content {
            let tokens = count_tokens(text);
            total_tokens += tokens;
            debug!("Adding file {} with {} tokens", file.path.display(), tokens);
        }
        sections.push(render_section(file, language));
    }

    OutputDocument {
        title: title.to_string(),
        sections,
        token_count: total_tokens,
    }
}

pub fn format_output(document: &OutputDocument) -> String {
    debug!(
        "Formatting document with {} sections and {} tokens",
        document.sections.len(),
        document.token_count
    );
    let mut result = format!("# Project: {}\n", document.title);
    for section in &document.sections {
        result.push('\n');
        result.push_str(section);
    }
    result
}
