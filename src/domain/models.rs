use crate::domain::errors::CollectorError;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionRule {
    Include { path: String, recursive: bool },
    Exclude { pattern: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary { len: usize },
}

#[derive(Debug, Clone)]
pub struct FileContext {
    pub path: PathBuf,
    pub relative_path: String,
    pub content: FileContent,
}

/// Everything the collector needs for one run, resolved from the logging directory.
#[derive(Debug, Clone)]
pub struct CollectConfig {
    pub log_dir: PathBuf,
    pub project_root: PathBuf,
    pub rules: Vec<SelectionRule>,
    pub language: Option<String>,
    pub output_path: PathBuf,
    pub title: String,
    pub exclude_names: Vec<String>,
    pub skip_empty: bool,
}

#[derive(Debug, Default)]
pub struct Selection {
    pub files: Vec<PathBuf>,
    pub warnings: Vec<CollectorError>,
}

#[derive(Debug)]
pub struct OutputDocument {
    pub title: String,
    pub sections: Vec<String>,
    pub token_count: usize,
}

#[derive(Debug)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub files_written: usize,
    pub warnings: Vec<CollectorError>,
    pub token_count: usize,
}
