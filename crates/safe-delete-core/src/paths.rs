use crate::error::Error;
use std::path::PathBuf;

/// Turn a path as typed by the user into a filesystem path.
///
/// Surrounding whitespace and quote characters are stripped (paths pasted
/// from a file manager often arrive quoted), then a leading `~` is expanded.
pub fn normalize_user_path(raw: &str) -> Result<PathBuf, Error> {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    if trimmed.is_empty() {
        return Err(Error::EmptyPath);
    }
    expand_tilde(trimmed)
}

/// Expand `~` and `~/rest` to the user's home directory. `~user` forms are
/// left untouched.
pub fn expand_tilde(path: &str) -> Result<PathBuf, Error> {
    if path == "~" {
        return dirs::home_dir().ok_or(Error::NoHomeDir);
    }
    if let Some(rest) = path.strip_prefix("~/") {
        let home_dir = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        return Ok(home_dir.join(rest));
    }
    Ok(PathBuf::from(path))
}
