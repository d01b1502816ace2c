use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a sweep before anything is listed or deleted.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("failed to scan {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("invalid folder name: {name:?}")]
    InvalidName { name: String },
}

impl SweepError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }
}
