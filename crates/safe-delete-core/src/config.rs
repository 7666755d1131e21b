use crate::error::Error;
use crate::paths;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_TRASH_DIR: &str = "~/.trash";
pub const DEFAULT_LOG_FILE: &str = "deletion_log.txt";
pub const DEFAULT_CHUNK_SIZE: usize = 128 * 1024;
pub const DEFAULT_PREVIEW_LINES: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub trash_dir: String,
    pub log_file: String,
    pub chunk_size: usize,
    pub preview_lines: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            trash_dir: DEFAULT_TRASH_DIR.to_string(),
            log_file: DEFAULT_LOG_FILE.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            preview_lines: DEFAULT_PREVIEW_LINES,
        }
    }
}

impl AppConfig {
    /// Trash directory with a leading `~` expanded.
    pub fn trash_dir_path(&self) -> Result<PathBuf, Error> {
        paths::expand_tilde(&self.trash_dir)
    }

    pub fn log_file_path(&self) -> Result<PathBuf, Error> {
        paths::expand_tilde(&self.log_file)
    }
}

/// Defaults, then an optional `SafeDelete.toml`, then `SAFE_DELETE_*` env vars.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    build(ConfigFile::with_name("SafeDelete").required(false))
}

pub fn load_configuration_file(path: &Path) -> Result<AppConfig, ConfigError> {
    build(ConfigFile::from(path).required(true))
}

fn build<S>(file_source: S) -> Result<AppConfig, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = Config::builder()
        .set_default("trash_dir", DEFAULT_TRASH_DIR)?
        .set_default("log_file", DEFAULT_LOG_FILE)?
        .set_default("chunk_size", DEFAULT_CHUNK_SIZE as u64)?
        .set_default("preview_lines", DEFAULT_PREVIEW_LINES as u64)?
        .add_source(file_source)
        .add_source(Environment::with_prefix("SAFE_DELETE").try_parsing(true))
        .build()?;

    let config = builder.try_deserialize::<AppConfig>()?;
    if config.chunk_size == 0 {
        return Err(ConfigError::Message(
            "chunk_size must be greater than zero".to_string(),
        ));
    }
    Ok(config)
}
