use crate::domain::models::FileContent;
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Expands a leading `~` or `~/` to the user's home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Resolves `.` and `..` components without touching the filesystem.
/// `..` never climbs above the filesystem root.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_relative_top = matches!(
                    normalized.components().next_back(),
                    None | Some(Component::ParentDir)
                );
                if at_relative_top {
                    normalized.push(component);
                } else {
                    normalized.pop();
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Path of `path` relative to `root`, always with `/` separators.
pub fn relative_display(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Regular files under `dir`, in lexical order per directory level.
/// Without `recursive` only the direct children are listed. Symlinks are skipped.
pub fn list_directory_files(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    debug!(
        "Listing files in {} (recursive: {})",
        dir.display(),
        recursive
    );

    let mut walker = walkdir::WalkDir::new(dir).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut result = Vec::new();
    for entry in walker.into_iter().filter_map(|entry| match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
            None
        }
    }) {
        if !entry.file_type().is_file() {
            continue;
        }
        result.push(entry.into_path());
    }

    debug!("Found {} files in {}", result.len(), dir.display());
    result
}

/// Reads a whole file. Content that is not UTF-8, or that carries NUL bytes,
/// comes back as [`FileContent::Binary`].
pub fn read_file_contents(path: &Path) -> io::Result<FileContent> {
    debug!("Reading file contents: {}", path.display());
    let bytes = fs::read(path)?;
    debug!("Read {} bytes from file", bytes.len());

    if bytes.contains(&0) {
        return Ok(FileContent::Binary { len: bytes.len() });
    }

    let len = bytes.len();
    match String::from_utf8(bytes) {
        Ok(text) => Ok(FileContent::Text(text)),
        Err(_) => Ok(FileContent::Binary { len }),
    }
}
