//! Snapshots a configured selection of project files into one Markdown document.
//!
//! A logging directory holds `config.toml` (project root, language tag, output
//! name) and `files.txt` (ordered include/exclude rules). [`cli::commands::collect`]
//! resolves the rules, reads every selected file and writes the document back into
//! the logging directory.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infra;
