use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Configuration error in {}: {reason}", .path.display())]
    Configuration { path: PathBuf, reason: String },

    #[error("Rule '{rule}' resolves outside the project root: {}", .path.display())]
    PathEscape { rule: String, path: PathBuf },

    #[error("Rule '{rule}' names a path that does not exist: {}", .path.display())]
    MissingFile { rule: String, path: PathBuf },

    #[error("Cannot decode {} as text: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CollectorError {
    pub fn configuration(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type CollectorResult<T> = Result<T, CollectorError>;
