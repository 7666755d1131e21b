use chrono::{DateTime, Local};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStatus {
    Success,
    Failure,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Success => "SUCCESS",
            AuditStatus::Failure => "FAILURE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    AnalysisStarted,
    NotFound,
    AnalysisFailed,
    BackupCreated,
    BackupFailed,
    MovedToTrash,
    MoveFailed,
    Cancelled,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::AnalysisStarted => "ANALYSIS_STARTED",
            AuditAction::NotFound => "NOT_FOUND",
            AuditAction::AnalysisFailed => "ANALYSIS_FAILED",
            AuditAction::BackupCreated => "BACKUP_CREATED",
            AuditAction::BackupFailed => "BACKUP_FAILED",
            AuditAction::MovedToTrash => "MOVED_TO_TRASH",
            AuditAction::MoveFailed => "MOVE_FAILED",
            AuditAction::Cancelled => "CANCELLED",
        }
    }
}

/// One audit event. Rendered as
/// `2024-03-09 14:05:07 | SUCCESS | BACKUP_CREATED   | /tmp/a.txt | /tmp/a_....bak`.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub timestamp: DateTime<Local>,
    pub status: AuditStatus,
    pub action: AuditAction,
    pub path: PathBuf,
    pub detail: Option<String>,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {:7} | {:16} | {}",
            self.timestamp.format(LOG_TIME_FORMAT),
            self.status.as_str(),
            self.action.as_str(),
            self.path.display()
        )?;
        if let Some(detail) = &self.detail {
            // keep one event per line
            write!(f, " | {}", detail.replace(['\n', '\r'], " "))?;
        }
        Ok(())
    }
}

/// Append-only audit log. The file is opened in append mode for every
/// event and closed again straight away.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, line: &LogLine) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }

    /// Record an event now. A log that cannot be written is reported but
    /// never stops the run.
    pub fn record(
        &self,
        status: AuditStatus,
        action: AuditAction,
        path: &Path,
        detail: Option<&str>,
    ) {
        let line = LogLine {
            timestamp: Local::now(),
            status,
            action,
            path: path.to_path_buf(),
            detail: detail.map(str::to_string),
        };
        tracing::info!(action = action.as_str(), status = status.as_str(), "{}", path.display());
        if let Err(e) = self.append(&line) {
            warn!("Could not write to audit log {}: {}", self.path.display(), e);
        }
    }
}
