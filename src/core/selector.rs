use crate::domain::errors::{CollectorError, CollectorResult};
use crate::domain::models::{Selection, SelectionRule};
use crate::infra::config::SELECTION_FILE;
use crate::infra::file_system::{expand_home, list_directory_files, normalize_lexically, relative_display};
use glob::{MatchOptions, Pattern};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// Case-insensitive file-name substrings that drop a file.
    pub exclude_names: Vec<String>,
    /// A path that must never be selected, typically the output document.
    pub ignored_path: Option<PathBuf>,
}

struct Exclusion {
    pattern: Pattern,
    anchored: bool,
}

impl Exclusion {
    fn new(raw: &str) -> CollectorResult<Self> {
        let trimmed = raw.trim_end_matches('/');
        let anchored = trimmed.contains('/');
        let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
        let trimmed = trimmed.trim_start_matches('/');

        let pattern = Pattern::new(trimmed).map_err(|e| {
            CollectorError::configuration(
                SELECTION_FILE,
                format!("invalid exclusion pattern '{}': {}", raw, e),
            )
        })?;
        Ok(Self { pattern, anchored })
    }

    fn matches(&self, rel_path: &str) -> bool {
        if !self.anchored {
            return rel_path
                .split('/')
                .any(|component| self.pattern.matches_with(component, MATCH_OPTIONS));
        }

        rel_path
            .match_indices('/')
            .any(|(end, _)| self.pattern.matches_with(&rel_path[..end], MATCH_OPTIONS))
            || self.pattern.matches_with(rel_path, MATCH_OPTIONS)
    }
}

/// Resolves the ordered rules into existing files under `root`.
///
/// Inclusions are expanded first, in rule order, keeping the first occurrence of
/// each file. Exclusions and name filters are then subtracted as a set, so their
/// order never matters. `root` must already be canonical.
pub fn select_files(
    root: &Path,
    rules: &[SelectionRule],
    options: &SelectOptions,
) -> CollectorResult<Selection> {
    debug!("Selecting files under {} from {} rules", root.display(), rules.len());

    let mut selection = Selection::default();
    let mut seen = HashSet::new();
    let mut exclusions = Vec::new();

    for rule in rules {
        match rule {
            SelectionRule::Include { path, recursive } => {
                let resolved = match resolve_rule_path(root, path) {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        warn!("{}", e);
                        selection.warnings.push(e);
                        continue;
                    }
                };

                let candidates = if resolved.is_dir() {
                    info!("Processing directory: {}", resolved.display());
                    list_directory_files(&resolved, *recursive)
                } else {
                    info!("Processing file: {}", resolved.display());
                    vec![resolved]
                };

                for candidate in candidates {
                    if options.ignored_path.as_deref() == Some(candidate.as_path()) {
                        debug!("Skipping output document {}", candidate.display());
                        continue;
                    }
                    if seen.insert(candidate.clone()) {
                        selection.files.push(candidate);
                    } else {
                        debug!("Already selected: {}", candidate.display());
                    }
                }
            }
            SelectionRule::Exclude { pattern } => exclusions.push(Exclusion::new(pattern)?),
        }
    }

    let name_filters: Vec<String> = options
        .exclude_names
        .iter()
        .filter(|name| !name.is_empty())
        .map(|name| name.to_lowercase())
        .collect();

    selection.files.retain(|path| {
        let rel_path = relative_display(path, root);
        if exclusions.iter().any(|exclusion| exclusion.matches(&rel_path)) {
            debug!("Excluded by rule: {}", rel_path);
            return false;
        }
        if is_name_excluded(path, &name_filters) {
            info!("Excluded file: {}", rel_path);
            return false;
        }
        true
    });

    info!(
        "Selected {} files ({} warnings)",
        selection.files.len(),
        selection.warnings.len()
    );
    Ok(selection)
}

fn is_name_excluded(path: &Path, name_filters: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_lowercase();
    name_filters.iter().any(|filter| name.contains(filter.as_str()))
}

/// Turns a rule path into a canonical, existing path inside `root`.
/// Escapes are checked lexically first and again after symlinks are resolved.
fn resolve_rule_path(root: &Path, raw: &str) -> CollectorResult<PathBuf> {
    let expanded = expand_home(raw);
    let joined = if expanded.is_absolute() {
        expanded
    } else {
        root.join(expanded)
    };
    let normalized = normalize_lexically(&joined);

    if !normalized.starts_with(root) {
        return Err(CollectorError::PathEscape {
            rule: raw.to_string(),
            path: normalized,
        });
    }
    if !normalized.exists() {
        return Err(CollectorError::MissingFile {
            rule: raw.to_string(),
            path: normalized,
        });
    }

    let canonical = normalized
        .canonicalize()
        .map_err(|e| CollectorError::io(&normalized, e))?;
    if !canonical.starts_with(root) {
        return Err(CollectorError::PathEscape {
            rule: raw.to_string(),
            path: canonical,
        });
    }
    Ok(canonical)
}
