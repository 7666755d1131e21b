use crate::audit::{AuditAction, AuditLog, AuditStatus};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::metadata::{self, FileAnalysis};
use crate::mover::{FileSystem, Mover, RealFileSystem};
use crate::paths;
use crate::progress::ProgressReporter;
use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIRM_PROMPT: &str = "Do you wish to proceed with moving this file to trash?";

/// Where a run currently is. `Done`, `Cancelled` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Ready,
    Analyzing,
    AwaitingConfirmation,
    BackingUp,
    Moving,
    Done,
    Cancelled,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Cancelled | RunState::Failed)
    }
}

/// Source of the yes/no answer. The CLI reads stdin; tests answer directly.
pub trait ConfirmationProvider {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

#[derive(Debug, Clone)]
pub struct TrashEntry {
    pub original_path: PathBuf,
    pub backup_path: PathBuf,
    pub trash_path: PathBuf,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug)]
pub enum Outcome {
    Trashed(TrashEntry),
    Cancelled(Box<FileAnalysis>),
}

/// Drives one file through analysis, confirmation, backup and trash.
pub struct TrashSession {
    config: AppConfig,
    trash_dir: PathBuf,
    audit: AuditLog,
    fs: Box<dyn FileSystem>,
    state: RunState,
}

impl TrashSession {
    pub fn new(config: AppConfig) -> Result<Self> {
        let trash_dir = config.trash_dir_path()?;
        let audit = AuditLog::new(config.log_file_path()?);
        Ok(Self {
            config,
            trash_dir,
            audit,
            fs: Box::new(RealFileSystem),
            state: RunState::Ready,
        })
    }

    pub fn with_file_system(mut self, fs: Box<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn trash_dir(&self) -> &Path {
        &self.trash_dir
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Run the whole pipeline for the path the user typed:
    /// 1. Normalise the path and analyse the file (stat, SHA-256, entropy, preview)
    /// 2. Ask for confirmation; declining stops here with nothing touched
    /// 3. Copy the file to a timestamped backup next to it
    /// 4. Move the file into the trash directory
    ///
    /// Every step is written to the audit log.
    pub fn run(
        &mut self,
        raw_path: &str,
        confirm: &mut dyn ConfirmationProvider,
        reporter: &dyn ProgressReporter,
    ) -> Result<Outcome> {
        self.transition(RunState::Analyzing);
        let result = self.drive(raw_path, confirm, reporter);
        let terminal = match &result {
            Ok(Outcome::Trashed(_)) => RunState::Done,
            Ok(Outcome::Cancelled(_)) => RunState::Cancelled,
            Err(e) => {
                debug!("Run failed: {}", e);
                RunState::Failed
            }
        };
        self.transition(terminal);
        result
    }

    fn drive(
        &mut self,
        raw_path: &str,
        confirm: &mut dyn ConfirmationProvider,
        reporter: &dyn ProgressReporter,
    ) -> Result<Outcome> {
        let path = paths::normalize_user_path(raw_path)?;
        self.audit
            .record(AuditStatus::Success, AuditAction::AnalysisStarted, &path, None);

        let analysis = self.analyze(&path, reporter)?;
        reporter.on_analysis_complete(&analysis);

        self.transition(RunState::AwaitingConfirmation);
        let confirmed = match confirm.confirm(CONFIRM_PROMPT) {
            Ok(answer) => answer,
            Err(e) => {
                let detail = format!("confirmation prompt failed: {}", e);
                self.audit.record(
                    AuditStatus::Failure,
                    AuditAction::Cancelled,
                    &path,
                    Some(&detail),
                );
                return Err(Error::Prompt(e));
            }
        };
        if !confirmed {
            info!("Operation cancelled by user");
            self.audit
                .record(AuditStatus::Success, AuditAction::Cancelled, &path, None);
            reporter.on_cancelled(&path);
            return Ok(Outcome::Cancelled(Box::new(analysis)));
        }

        self.transition(RunState::BackingUp);
        // the file may have gone away while the prompt was open
        if !self.fs.exists(&path) {
            self.audit.record(
                AuditStatus::Failure,
                AuditAction::NotFound,
                &path,
                Some("source vanished before backup"),
            );
            return Err(Error::NotFound(path));
        }

        let at = Local::now();
        let backup_path = match Mover::new(self.fs.as_ref()).backup(&path, &at) {
            Ok(backup_path) => backup_path,
            Err(e) => {
                self.audit.record(
                    AuditStatus::Failure,
                    AuditAction::BackupFailed,
                    &path,
                    Some(&e.to_string()),
                );
                return Err(e);
            }
        };
        self.audit.record(
            AuditStatus::Success,
            AuditAction::BackupCreated,
            &path,
            Some(&backup_path.display().to_string()),
        );
        reporter.on_backup_created(&backup_path);

        self.transition(RunState::Moving);
        let mover = Mover::new(self.fs.as_ref());
        let trash_path = match mover.move_to_trash(&path, &backup_path, &self.trash_dir, &at) {
            Ok(trash_path) => trash_path,
            Err(e) => {
                self.audit.record(
                    AuditStatus::Failure,
                    AuditAction::MoveFailed,
                    &path,
                    Some(&e.to_string()),
                );
                return Err(e);
            }
        };
        self.audit.record(
            AuditStatus::Success,
            AuditAction::MovedToTrash,
            &path,
            Some(&trash_path.display().to_string()),
        );

        let entry = TrashEntry {
            original_path: path,
            backup_path,
            trash_path,
            timestamp: at,
        };
        reporter.on_trashed(&entry);
        Ok(Outcome::Trashed(entry))
    }

    fn analyze(&self, path: &Path, reporter: &dyn ProgressReporter) -> Result<FileAnalysis> {
        let result = metadata::analyze(
            path,
            self.config.chunk_size,
            self.config.preview_lines,
            reporter,
        );
        match &result {
            Ok(analysis) => debug!(
                "Analysed {}: {} bytes, entropy {:.4}",
                path.display(),
                analysis.record.size_bytes,
                analysis.record.entropy_bits_per_byte
            ),
            Err(Error::NotFound(_)) => {
                self.audit
                    .record(AuditStatus::Failure, AuditAction::NotFound, path, None)
            }
            Err(e) => self.audit.record(
                AuditStatus::Failure,
                AuditAction::AnalysisFailed,
                path,
                Some(&e.to_string()),
            ),
        }
        result
    }

    fn transition(&mut self, next: RunState) {
        debug!("State {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
