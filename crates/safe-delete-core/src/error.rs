use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No file path provided")]
    EmptyPath,

    #[error("File not found or inaccessible: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Could not read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Backup of '{}' to '{}' failed: {source}", path.display(), backup_path.display())]
    Backup {
        path: PathBuf,
        backup_path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "File backed up to '{}' but not moved to trash: {source}",
        backup_path.display()
    )]
    Move {
        path: PathBuf,
        backup_path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Confirmation prompt failed: {0}")]
    Prompt(#[source] io::Error),

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
