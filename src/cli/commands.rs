use crate::core::renderer::{build_document, format_output, load_files};
use crate::core::selector::{SelectOptions, select_files};
use crate::domain::models::{CollectConfig, RunSummary};
use crate::infra::config::load_config;
use crate::infra::file_system::read_file_contents;
use crate::infra::logger::setup_logger;
use crate::infra::output::{print_summary, write_output};
use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "project-log", version)]
#[command(about = "Snapshot selected project files into one Markdown log", long_about = None)]
pub struct Cli {
    /// Logging directory holding config.toml and files.txt
    pub log_dir: PathBuf,

    /// Language tag used on every code fence
    #[arg(short, long)]
    pub language: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logger(cli.verbose)?;

    info!("Starting project log generation");
    debug!(
        "Command parameters: log_dir={}, language={:?}",
        cli.log_dir.display(),
        cli.language
    );

    let summary = collect(&cli.log_dir, cli.language)?;
    print_summary(&summary)?;
    Ok(())
}

/// Loads the configuration in `log_dir`, renders the selected files and writes
/// the document. Only configuration and output failures are returned as errors.
pub fn collect(log_dir: &Path, language: Option<String>) -> anyhow::Result<RunSummary> {
    let config = load_config(log_dir, language)?;
    generate_log(&config)
}

fn generate_log(config: &CollectConfig) -> anyhow::Result<RunSummary> {
    info!("Logging directory: {}", config.log_dir.display());
    info!("Project root: {}", config.project_root.display());
    info!("Default language: {:?}", config.language);
    info!("Output file: {}", config.output_path.display());

    let options = SelectOptions {
        exclude_names: config.exclude_names.clone(),
        ignored_path: Some(config.output_path.clone()),
    };

    info!("Selecting files");
    let selection = select_files(&config.project_root, &config.rules, &options)?;
    let mut warnings = selection.warnings;

    info!("Reading {} files", selection.files.len());
    let (files, read_warnings) = load_files(
        selection.files,
        &config.project_root,
        read_file_contents,
        config.skip_empty,
    );
    warnings.extend(read_warnings);

    info!("Building project log");
    let document = build_document(&files, config.language.as_deref(), &config.title);
    let formatted_output = format_output(&document);

    info!("Writing output");
    write_output(&formatted_output, &config.output_path)
        .with_context(|| format!("Failed to write {}", config.output_path.display()))?;

    Ok(RunSummary {
        output_path: config.output_path.clone(),
        files_written: files.len(),
        warnings,
        token_count: document.token_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::CollectorError;
    use crate::infra::config::{DEFAULT_OUTPUT_FILE, SELECTION_FILE, SETTINGS_FILE};
    use std::fs;
    use tempfile::TempDir;

    struct Workspace {
        project: TempDir,
        log_dir: TempDir,
    }

    impl Workspace {
        fn new(settings_extra: &str, files: &str) -> Self {
            let project = TempDir::new().unwrap();
            let log_dir = TempDir::new().unwrap();
            fs::write(
                log_dir.path().join(SETTINGS_FILE),
                format!(
                    "[settings]\nproject_root = \"{}\"\ntitle = \"proj\"\n{}",
                    project.path().display(),
                    settings_extra
                ),
            )
            .unwrap();
            fs::write(log_dir.path().join(SELECTION_FILE), files).unwrap();
            Self { project, log_dir }
        }

        fn add_file(&self, rel: &str, content: &[u8]) -> &Self {
            let path = self.project.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
            self
        }

        fn output(&self) -> String {
            fs::read_to_string(self.log_dir.path().join(DEFAULT_OUTPUT_FILE)).unwrap()
        }
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["project-log", "./logs/app", "-l", "rust", "-vv"]).unwrap();

        assert_eq!(cli.log_dir, PathBuf::from("./logs/app"));
        assert_eq!(cli.language, Some("rust".to_string()));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_requires_log_dir() {
        assert!(Cli::try_parse_from(["project-log"]).is_err());

        let cli = Cli::try_parse_from(["project-log", "logs", "--language", "go"]).unwrap();
        assert_eq!(cli.language.as_deref(), Some("go"));
    }

    #[test]
    fn test_collect_renders_sections_in_rule_order() {
        let workspace = Workspace::new("", "src/main.ext\nsrc/utils/\n");
        workspace
            .add_file("src/main.ext", b"A")
            .add_file("src/utils/a.ext", b"B")
            .add_file("src/utils/b.ext", b"C");

        let summary = collect(workspace.log_dir.path(), None).unwrap();

        assert_eq!(summary.files_written, 3);
        assert!(summary.warnings.is_empty());
        assert_eq!(
            workspace.output(),
            "# Project: proj\n\n\
             ## `src/main.ext`\n\n```\nA\n```\n\n\
             ## `src/utils/a.ext`\n\n```\nB\n```\n\n\
             ## `src/utils/b.ext`\n\n```\nC\n```\n"
        );
    }

    #[test]
    fn test_collect_survives_missing_and_binary_files() {
        let workspace = Workspace::new("default_language = \"rust\"\n", "src/missing.ext\nsrc/\n");
        workspace
            .add_file("src/blob.bin", &[0x00, 0x9f, 0x92, 0x96])
            .add_file("src/lib.rs", b"pub fn f() {}\n");

        let summary = collect(workspace.log_dir.path(), None).unwrap();

        assert_eq!(summary.files_written, 2);
        assert_eq!(summary.warnings.len(), 2);
        assert!(matches!(summary.warnings[0], CollectorError::MissingFile { .. }));
        assert!(matches!(summary.warnings[1], CollectorError::Decode { .. }));

        let output = workspace.output();
        assert!(output.contains("## `src/blob.bin`\n\n_Binary or non-UTF-8 content omitted (4 bytes)._\n"));
        assert!(output.contains("```rust\npub fn f() {}\n```\n"));
        assert!(!output.contains("missing.ext"));
    }

    #[test]
    fn test_collect_is_deterministic() {
        let workspace = Workspace::new("", "**\n!*.lock\n");
        workspace
            .add_file("b.rs", b"b")
            .add_file("a/x.rs", b"x")
            .add_file("Cargo.lock", b"lock");

        collect(workspace.log_dir.path(), Some("rust".to_string())).unwrap();
        let first = workspace.output();
        collect(workspace.log_dir.path(), Some("rust".to_string())).unwrap();
        let second = workspace.output();

        assert_eq!(first, second);
        assert!(!first.contains("Cargo.lock"));
    }

    #[test]
    fn test_collect_takes_bracketed_file_names_literally() {
        let workspace = Workspace::new("", "app/[id]/page.tsx\nroutes/[slug].svelte\n");
        workspace
            .add_file("app/[id]/page.tsx", b"export default Page")
            .add_file("routes/[slug].svelte", b"<h1>slug</h1>");

        let summary = collect(workspace.log_dir.path(), None).unwrap();

        assert_eq!(summary.files_written, 2);
        assert!(summary.warnings.is_empty());
        let output = workspace.output();
        assert!(output.contains("## `app/[id]/page.tsx`\n\n```\nexport default Page\n```\n"));
        assert!(output.contains("## `routes/[slug].svelte`"));
    }

    #[test]
    fn test_configuration_error_writes_nothing() {
        let workspace = Workspace::new("", "src/\n");
        fs::remove_file(workspace.log_dir.path().join(SELECTION_FILE)).unwrap();

        assert!(collect(workspace.log_dir.path(), None).is_err());
        assert!(!workspace.log_dir.path().join(DEFAULT_OUTPUT_FILE).exists());
    }
}
