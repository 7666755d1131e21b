use crate::error::{Error, Result};
use crate::namer;
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The filesystem operations the mover depends on. Tests substitute
/// implementations that fail on demand.
pub trait FileSystem {
    /// True if anything, including a dangling symlink, occupies `path`.
    fn exists(&self, path: &Path) -> bool;
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    /// Copies content, permissions and modification time. Refuses to touch
    /// an existing `to`, failing with `AlreadyExists` instead.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let mut reader = File::open(from)?;
        let metadata = reader.metadata()?;
        let mut writer = OpenOptions::new().write(true).create_new(true).open(to)?;
        let bytes = io::copy(&mut reader, &mut writer)?;

        if let Err(e) = writer.set_permissions(metadata.permissions()) {
            debug!("Could not preserve permissions on {}: {}", to.display(), e);
        }
        if let Ok(modified) = metadata.modified() {
            if let Err(e) = writer.set_modified(modified) {
                debug!("Could not preserve mtime on {}: {}", to.display(), e);
            }
        }
        Ok(bytes)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}

/// Backup-then-move. The two steps are separate calls so the caller can log
/// in between and never reach the move when the backup failed.
pub struct Mover<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> Mover<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Copy `source` to a fresh backup name in its own directory.
    pub fn backup(&self, source: &Path, at: &DateTime<Local>) -> Result<PathBuf> {
        let backup_path = namer::backup_path(self.fs, source, at);
        match self.fs.copy(source, &backup_path) {
            Ok(bytes) => {
                debug!("Copied {} bytes to {}", bytes, backup_path.display());
                Ok(backup_path)
            }
            Err(source_err) => {
                self.discard_partial(&backup_path, &source_err);
                Err(Error::Backup {
                    path: source.to_path_buf(),
                    backup_path,
                    source: source_err,
                })
            }
        }
    }

    /// Move `source` into `trash_dir` under a fresh name. `backup_path` is
    /// only carried into the error so the caller can report it.
    pub fn move_to_trash(
        &self,
        source: &Path,
        backup_path: &Path,
        trash_dir: &Path,
        at: &DateTime<Local>,
    ) -> Result<PathBuf> {
        let move_error = |e: io::Error| Error::Move {
            path: source.to_path_buf(),
            backup_path: backup_path.to_path_buf(),
            source: e,
        };

        self.fs.create_dir_all(trash_dir).map_err(move_error)?;
        let trash_path = namer::trash_path(self.fs, source, trash_dir, at);
        self.relocate(source, &trash_path).map_err(move_error)?;
        Ok(trash_path)
    }

    /// Rename, falling back to copy + delete when the rename is refused
    /// (e.g. the trash lives on another device).
    fn relocate(&self, from: &Path, to: &Path) -> io::Result<()> {
        let rename_err = match self.fs.rename(from, to) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        debug!(
            "Rename {} -> {} failed ({}), copying instead",
            from.display(),
            to.display(),
            rename_err
        );

        if let Err(e) = self.fs.copy(from, to) {
            self.discard_partial(to, &e);
            return Err(e);
        }
        if let Err(e) = self.fs.remove_file(from) {
            warn!(
                "Copied {} into trash but could not remove it, undoing copy",
                from.display()
            );
            if let Err(cleanup) = self.fs.remove_file(to) {
                warn!("Could not remove trash copy {}: {}", to.display(), cleanup);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Remove whatever a failed copy left at `to`. An `AlreadyExists` failure
    /// means the file there is not ours and stays.
    fn discard_partial(&self, to: &Path, copy_err: &io::Error) {
        if copy_err.kind() == io::ErrorKind::AlreadyExists || !self.fs.exists(to) {
            return;
        }
        match self.fs.remove_file(to) {
            Ok(()) => debug!("Removed partial copy {}", to.display()),
            Err(e) => warn!("Could not remove partial copy {}: {}", to.display(), e),
        }
    }
}
