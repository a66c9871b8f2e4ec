use crate::core::fetch::FetchError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DepsError>;

#[derive(Error, Debug)]
pub enum DepsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("A path prefix filter cannot be used with zip archive {url}")]
    PrefixWithZip { url: String },

    #[error("Extraction into {path} failed: {message}")]
    Extraction { path: PathBuf, message: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },
}

impl DepsError {
    pub fn extraction_error<S: Into<String>>(path: &std::path::Path, message: S) -> Self {
        DepsError::Extraction {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Whether this error came from a 404 on the remote archive.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DepsError::Fetch(FetchError::NotFound { .. }))
    }
}
