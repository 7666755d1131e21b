use crate::mover::FileSystem;
use chrono::{DateTime, Local};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const BACKUP_SUFFIX: &str = ".bak";

/// `<stem>_<YYYYMMDD_HHMMSS><.ext>.bak` next to `source`.
pub fn backup_path(fs: &dyn FileSystem, source: &Path, at: &DateTime<Local>) -> PathBuf {
    unique_path(fs, &parent_dir(source), source, at, BACKUP_SUFFIX)
}

/// `<stem>_<YYYYMMDD_HHMMSS><.ext>` inside `trash_dir`.
pub fn trash_path(
    fs: &dyn FileSystem,
    source: &Path,
    trash_dir: &Path,
    at: &DateTime<Local>,
) -> PathBuf {
    unique_path(fs, trash_dir, source, at, "")
}

/// Split a file name at its last dot. A leading dot does not start an
/// extension, so `.bashrc` has none. The returned extension keeps its dot.
pub fn split_file_name(path: &Path) -> (OsString, OsString) {
    let stem = path
        .file_stem()
        .map(OsStr::to_os_string)
        .unwrap_or_default();
    let ext = match path.extension() {
        Some(ext) => {
            let mut dotted = OsString::from(".");
            dotted.push(ext);
            dotted
        }
        None => OsString::new(),
    };
    (stem, ext)
}

fn parent_dir(source: &Path) -> PathBuf {
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn unique_path(
    fs: &dyn FileSystem,
    dir: &Path,
    source: &Path,
    at: &DateTime<Local>,
    suffix: &str,
) -> PathBuf {
    let (stem, ext) = split_file_name(source);
    let stamp = at.format(TIMESTAMP_FORMAT).to_string();

    let mut counter = 0u32;
    loop {
        let candidate = dir.join(candidate_name(&stem, &stamp, counter, &ext, suffix));
        if !fs.exists(&candidate) {
            return candidate;
        }
        counter += 1;
        tracing::trace!("{} exists, trying counter {}", candidate.display(), counter);
    }
}

fn candidate_name(stem: &OsStr, stamp: &str, counter: u32, ext: &OsStr, suffix: &str) -> OsString {
    let mut name = stem.to_os_string();
    name.push("_");
    name.push(stamp);
    if counter > 0 {
        name.push(format!("_{}", counter));
    }
    name.push(ext);
    name.push(suffix);
    name
}
