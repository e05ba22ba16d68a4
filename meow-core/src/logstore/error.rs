use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogStoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no free log file name in {folder} after {attempts} attempts")]
    NameExhausted { folder: PathBuf, attempts: usize },
    #[error("max lines per file must be at least 1, got {0}")]
    InvalidThreshold(usize),
}

impl LogStoreError {
    pub(crate) fn io(path: impl AsRef<Path>) -> impl FnOnce(io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| Self::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, LogStoreError>;
