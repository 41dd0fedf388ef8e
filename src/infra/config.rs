use crate::domain::errors::{CollectorError, CollectorResult};
use crate::domain::models::{CollectConfig, SelectionRule};
use crate::infra::file_system::expand_home;
use log::{debug, info, warn};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "config.toml";
pub const SELECTION_FILE: &str = "files.txt";
pub const DEFAULT_OUTPUT_FILE: &str = "project_log.md";

const DEFAULT_EXCLUDE_NAMES: &[&str] = &[
    ".keep",
    ".gitkeep",
    ".DS_Store",
    "Thumbs.db",
    ".tmp",
    ".temp",
];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    settings: Settings,
    #[serde(default)]
    filtering: Filtering,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Settings {
    project_root: String,
    default_language: Option<String>,
    output_file: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Filtering {
    exclude_names: Vec<String>,
    skip_empty: bool,
}

impl Default for Filtering {
    fn default() -> Self {
        Self {
            exclude_names: DEFAULT_EXCLUDE_NAMES.iter().map(|s| s.to_string()).collect(),
            skip_empty: false,
        }
    }
}

/// Loads `config.toml` and `files.txt` from the logging directory.
/// `language_override` wins over the configured `default_language`.
pub fn load_config(
    log_dir: &Path,
    language_override: Option<String>,
) -> CollectorResult<CollectConfig> {
    if !log_dir.is_dir() {
        return Err(CollectorError::configuration(
            log_dir,
            "logging directory not found or is not a directory",
        ));
    }
    let log_dir = log_dir
        .canonicalize()
        .map_err(|e| CollectorError::configuration(log_dir, e.to_string()))?;
    info!("Loading configuration from {}", log_dir.display());

    let settings_path = log_dir.join(SETTINGS_FILE);
    let settings_text = read_required(
        &settings_path,
        "expected a [settings] table with at least project_root",
    )?;
    let parsed: SettingsFile = toml::from_str(&settings_text)
        .map_err(|e| CollectorError::configuration(&settings_path, e.to_string()))?;
    let SettingsFile { settings, filtering } = parsed;

    let project_root = resolve_project_root(&settings_path, &log_dir, &settings.project_root)?;
    debug!("Project root: {}", project_root.display());

    let output_name = settings
        .output_file
        .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string());
    if !is_bare_file_name(&output_name) {
        return Err(CollectorError::configuration(
            &settings_path,
            format!("output_file must be a plain file name, got '{}'", output_name),
        ));
    }

    let selection_path = log_dir.join(SELECTION_FILE);
    let selection_text = read_required(
        &selection_path,
        "expected one file or directory per line",
    )?;
    let rules = parse_selection_list(&selection_text)
        .map_err(|reason| CollectorError::configuration(&selection_path, reason))?;
    if rules.is_empty() {
        warn!("Selection list {} is empty", selection_path.display());
    }
    debug!("Parsed {} selection rules", rules.len());

    let language = language_override
        .or(settings.default_language)
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty());
    if let Some(tag) = &language {
        validate_language_tag(tag)
            .map_err(|reason| CollectorError::configuration(&settings_path, reason))?;
    }

    let title = settings.title.unwrap_or_else(|| {
        log_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    });

    Ok(CollectConfig {
        output_path: log_dir.join(output_name),
        log_dir,
        project_root,
        rules,
        language,
        title,
        exclude_names: filtering.exclude_names,
        skip_empty: filtering.skip_empty,
    })
}

fn read_required(path: &Path, hint: &str) -> CollectorResult<String> {
    fs::read_to_string(path).map_err(|e| {
        let reason = if e.kind() == ErrorKind::NotFound {
            format!("file not found ({})", hint)
        } else {
            e.to_string()
        };
        CollectorError::configuration(path, reason)
    })
}

fn resolve_project_root(
    settings_path: &Path,
    log_dir: &Path,
    raw: &str,
) -> CollectorResult<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CollectorError::configuration(settings_path, "project_root is empty"));
    }

    let expanded = expand_home(raw);
    let candidate = if expanded.is_absolute() {
        expanded
    } else {
        log_dir.join(expanded)
    };

    let root = candidate.canonicalize().map_err(|e| {
        CollectorError::configuration(
            settings_path,
            format!("project root '{}' not found: {}", candidate.display(), e),
        )
    })?;
    if !root.is_dir() {
        return Err(CollectorError::configuration(
            settings_path,
            format!("project root '{}' is not a directory", root.display()),
        ));
    }
    Ok(root)
}

/// The tag lands on the opening fence line, so it cannot carry backticks or line breaks.
fn validate_language_tag(tag: &str) -> Result<(), String> {
    if tag.contains('`') || tag.chars().any(char::is_control) {
        return Err(format!(
            "language tag {:?} must not contain backticks or control characters",
            tag
        ));
    }
    Ok(())
}

fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && Path::new(name).file_name().map(|f| f == name).unwrap_or(false)
}

/// Parses the selection list, one rule per line. Errors name the offending line.
pub fn parse_selection_list(text: &str) -> Result<Vec<SelectionRule>, String> {
    let mut rules = Vec::new();
    for (index, line) in text.lines().enumerate() {
        match parse_rule(line) {
            Ok(Some(rule)) => rules.push(rule),
            Ok(None) => {}
            Err(reason) => return Err(format!("line {}: {}", index + 1, reason)),
        }
    }
    Ok(rules)
}

/// `path` or `dir/` is non-recursive, `dir/**` is recursive, `!glob` excludes.
/// Include paths are literal, so `app/[id]/page.tsx` names exactly that file.
pub fn parse_rule(line: &str) -> Result<Option<SelectionRule>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    if let Some(pattern) = line.strip_prefix('!') {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err("exclusion marker '!' without a pattern".to_string());
        }
        glob::Pattern::new(pattern.trim_end_matches('/'))
            .map_err(|e| format!("invalid exclusion pattern '{}': {}", pattern, e))?;
        return Ok(Some(SelectionRule::Exclude {
            pattern: pattern.to_string(),
        }));
    }

    let (path, recursive) = if line == "**" {
        (".", true)
    } else if let Some(dir) = line.strip_suffix("/**") {
        (if dir.is_empty() { "/" } else { dir }, true)
    } else {
        let trimmed = line.trim_end_matches('/');
        (if trimmed.is_empty() { "/" } else { trimmed }, false)
    };

    Ok(Some(SelectionRule::Include {
        path: path.to_string(),
        recursive,
    }))
}
