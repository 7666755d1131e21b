use crate::metadata::FileAnalysis;
use crate::session::TrashEntry;
use std::path::Path;

/// Trait for reporting the progress of a trash run.
///
/// The CLI implements it with coloured banners and indicatif bars; tests use
/// [`SilentReporter`]. All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_hash_start(&self, _total_bytes: u64) {}
    fn on_hash_progress(&self, _bytes_read: u64) {}
    fn on_hash_complete(&self, _digest: &str) {}
    fn on_analysis_complete(&self, _analysis: &FileAnalysis) {}
    fn on_backup_created(&self, _backup_path: &Path) {}
    fn on_trashed(&self, _entry: &TrashEntry) {}
    fn on_cancelled(&self, _path: &Path) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
