use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use safe_delete_core::session::CONFIRM_PROMPT;
use safe_delete_core::{
    AppConfig, ConfirmationProvider, Error, FileSystem, Outcome, RealFileSystem, RunState,
    SilentReporter, TrashSession,
};
use tempfile::{tempdir, TempDir};

/// Answers every prompt with a fixed value and remembers what was asked.
struct Answer {
    value: bool,
    asked: Vec<String>,
}

impl Answer {
    fn yes() -> Self {
        Self {
            value: true,
            asked: Vec::new(),
        }
    }

    fn no() -> Self {
        Self {
            value: false,
            asked: Vec::new(),
        }
    }
}

impl ConfirmationProvider for Answer {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        self.asked.push(prompt.to_string());
        Ok(self.value)
    }
}

struct BrokenStdin;

impl ConfirmationProvider for BrokenStdin {
    fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"))
    }
}

/// Test layout:
///   root/
///     work/a.txt        ("hello")
///     trash/            (created on demand)
///     deletion_log.txt
struct Fixture {
    _tmp: TempDir,
    work: PathBuf,
    trash: PathBuf,
    log: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = tempdir().unwrap();
        let work = tmp.path().join("work");
        fs::create_dir_all(&work).unwrap();
        fs::write(work.join("a.txt"), "hello").unwrap();
        Self {
            trash: tmp.path().join("trash"),
            log: tmp.path().join("deletion_log.txt"),
            work,
            _tmp: tmp,
        }
    }

    fn source(&self) -> PathBuf {
        self.work.join("a.txt")
    }

    fn config(&self) -> AppConfig {
        AppConfig {
            trash_dir: self.trash.to_string_lossy().into_owned(),
            log_file: self.log.to_string_lossy().into_owned(),
            ..AppConfig::default()
        }
    }

    fn session(&self) -> TrashSession {
        TrashSession::new(self.config()).unwrap()
    }

    fn log_lines(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn backups(&self) -> Vec<PathBuf> {
        list(&self.work)
            .into_iter()
            .filter(|p| p.to_string_lossy().ends_with(".bak"))
            .collect()
    }

    fn trashed(&self) -> Vec<PathBuf> {
        list(&self.trash)
    }
}

fn list(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries.flatten().map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

#[test]
fn test_confirmed_run_backs_up_and_trashes() {
    let fx = Fixture::new();
    fs::write(&fx.log, "earlier run\n").unwrap();
    let before = fx.log_lines().len();

    let mut session = fx.session();
    let mut answer = Answer::yes();
    let outcome = session
        .run(fx.source().to_str().unwrap(), &mut answer, &SilentReporter)
        .unwrap();

    let entry = match outcome {
        Outcome::Trashed(entry) => entry,
        other => panic!("expected trashed outcome, got {:?}", other),
    };
    assert_eq!(session.state(), RunState::Done);
    assert_eq!(answer.asked, vec![CONFIRM_PROMPT.to_string()]);

    // backup next to the original, named a_<timestamp>.txt.bak
    let backup_name = file_name(&entry.backup_path);
    assert_eq!(entry.backup_path.parent().unwrap(), fx.work);
    assert!(backup_name.starts_with("a_"), "{}", backup_name);
    assert!(backup_name.ends_with(".txt.bak"), "{}", backup_name);
    assert_eq!(fs::read_to_string(&entry.backup_path).unwrap(), "hello");

    // trash copy with the same content
    assert_eq!(entry.trash_path.parent().unwrap(), fx.trash);
    assert!(file_name(&entry.trash_path).ends_with(".txt"));
    assert_eq!(fs::read_to_string(&entry.trash_path).unwrap(), "hello");

    assert!(!fx.source().exists());
    assert_eq!(entry.original_path, fx.source());

    let lines = fx.log_lines();
    assert!(lines.len() >= before + 3, "log gained {} lines", lines.len() - before);
    assert_eq!(lines[0], "earlier run");
    assert!(lines.iter().any(|l| l.contains("BACKUP_CREATED")));
    assert!(lines.iter().any(|l| l.contains("MOVED_TO_TRASH") && l.contains("SUCCESS")));
}

#[test]
fn test_declined_run_touches_nothing() {
    let fx = Fixture::new();
    let mut session = fx.session();

    let outcome = session
        .run(fx.source().to_str().unwrap(), &mut Answer::no(), &SilentReporter)
        .unwrap();

    match outcome {
        Outcome::Cancelled(analysis) => assert_eq!(analysis.record.size_bytes, 5),
        other => panic!("expected cancelled outcome, got {:?}", other),
    }
    assert_eq!(session.state(), RunState::Cancelled);
    assert_eq!(fs::read_to_string(fx.source()).unwrap(), "hello");
    assert!(fx.backups().is_empty());
    assert!(fx.trashed().is_empty());
    assert!(!fx.trash.exists());

    let lines = fx.log_lines();
    assert!(lines.last().unwrap().contains("CANCELLED"));
}

#[test]
fn test_missing_path_is_reported_and_logged() {
    let fx = Fixture::new();
    let missing = fx.work.join("missing.txt");
    let mut session = fx.session();
    let mut answer = Answer::yes();

    let err = session
        .run(missing.to_str().unwrap(), &mut answer, &SilentReporter)
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(ref p) if *p == missing));
    assert!(err.to_string().contains("not found"));
    assert_eq!(session.state(), RunState::Failed);
    assert!(answer.asked.is_empty(), "must not prompt for a missing file");
    assert!(fx.backups().is_empty());
    assert!(!fx.trash.exists());
    assert!(fx.source().exists());

    let lines = fx.log_lines();
    let last = lines.last().unwrap();
    assert!(last.contains("FAILURE") && last.contains("NOT_FOUND"), "{}", last);
}

#[test]
fn test_quoted_path_with_whitespace_is_accepted() {
    let fx = Fixture::new();
    let mut session = fx.session();
    let raw = format!("  \"{}\"  ", fx.source().display());

    let outcome = session.run(&raw, &mut Answer::no(), &SilentReporter).unwrap();
    assert!(matches!(outcome, Outcome::Cancelled(_)));
}

#[test]
fn test_empty_path_fails_without_logging() {
    let fx = Fixture::new();
    let mut session = fx.session();

    let err = session.run("   ", &mut Answer::yes(), &SilentReporter).unwrap_err();
    assert!(matches!(err, Error::EmptyPath));
    assert_eq!(session.state(), RunState::Failed);
    assert!(fx.log_lines().is_empty());
}

#[test]
fn test_prompt_failure_is_terminal() {
    let fx = Fixture::new();
    let mut session = fx.session();

    let err = session
        .run(fx.source().to_str().unwrap(), &mut BrokenStdin, &SilentReporter)
        .unwrap_err();
    assert!(matches!(err, Error::Prompt(_)));
    assert_eq!(session.state(), RunState::Failed);
    assert!(fx.source().exists());
    assert!(fx.backups().is_empty());
}

#[test]
fn test_repeated_runs_never_reuse_names() {
    let fx = Fixture::new();

    let mut first = fx.session();
    let a = match first
        .run(fx.source().to_str().unwrap(), &mut Answer::yes(), &SilentReporter)
        .unwrap()
    {
        Outcome::Trashed(entry) => entry,
        other => panic!("{:?}", other),
    };

    fs::write(fx.source(), "hello again").unwrap();
    let mut second = fx.session();
    let b = match second
        .run(fx.source().to_str().unwrap(), &mut Answer::yes(), &SilentReporter)
        .unwrap()
    {
        Outcome::Trashed(entry) => entry,
        other => panic!("{:?}", other),
    };

    assert_ne!(a.backup_path, b.backup_path);
    assert_ne!(a.trash_path, b.trash_path);
    assert_eq!(fs::read_to_string(&a.trash_path).unwrap(), "hello");
    assert_eq!(fs::read_to_string(&b.trash_path).unwrap(), "hello again");
    assert_eq!(fx.backups().len(), 2);
    assert_eq!(fx.trashed().len(), 2);
}

/// Deletes the source while the prompt is open, then says yes.
struct DeleteThenConfirm(PathBuf);

impl ConfirmationProvider for DeleteThenConfirm {
    fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
        fs::remove_file(&self.0)?;
        Ok(true)
    }
}

#[test]
fn test_source_vanishing_before_backup_fails_cleanly() {
    let fx = Fixture::new();
    let mut session = fx.session();

    let err = session
        .run(
            fx.source().to_str().unwrap(),
            &mut DeleteThenConfirm(fx.source()),
            &SilentReporter,
        )
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(ref p) if *p == fx.source()));
    assert_eq!(session.state(), RunState::Failed);
    assert!(fx.backups().is_empty());
    assert!(!fx.trash.exists());

    let lines = fx.log_lines();
    let last = lines.last().unwrap();
    assert!(last.contains("FAILURE") && last.contains("NOT_FOUND"), "{}", last);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_fails_analysis() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::new();
    fs::set_permissions(fx.source(), fs::Permissions::from_mode(0o000)).unwrap();
    if fs::File::open(fx.source()).is_ok() {
        // running as root, permissions are not enforced
        return;
    }

    let mut session = fx.session();
    let mut answer = Answer::yes();
    let err = session
        .run(fx.source().to_str().unwrap(), &mut answer, &SilentReporter)
        .unwrap_err();

    assert!(matches!(err, Error::Io { ref path, .. } if *path == fx.source()), "{:?}", err);
    assert_eq!(session.state(), RunState::Failed);
    assert!(answer.asked.is_empty(), "must not prompt after a failed analysis");
    assert!(fx.backups().is_empty());
    assert!(!fx.trash.exists());

    let lines = fx.log_lines();
    let last = lines.last().unwrap();
    assert!(last.contains("FAILURE") && last.contains("ANALYSIS_FAILED"), "{}", last);

    fs::set_permissions(fx.source(), fs::Permissions::from_mode(0o644)).unwrap();
    assert_eq!(fs::read_to_string(fx.source()).unwrap(), "hello");
}

/// Real filesystem with switchable faults and a record of what was attempted.
#[derive(Clone, Default)]
struct FaultyFs {
    fail_copy: bool,
    fail_create_dir: bool,
    renames: Rc<Cell<usize>>,
}

impl FileSystem for FaultyFs {
    fn exists(&self, path: &Path) -> bool {
        RealFileSystem.exists(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        if self.fail_copy {
            return Err(io::Error::new(io::ErrorKind::Other, "No space left on device"));
        }
        RealFileSystem.copy(from, to)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.renames.set(self.renames.get() + 1);
        RealFileSystem.rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        RealFileSystem.remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if self.fail_create_dir {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"));
        }
        RealFileSystem.create_dir_all(path)
    }
}

#[test]
fn test_failed_backup_never_moves() {
    let fx = Fixture::new();
    let faulty = FaultyFs {
        fail_copy: true,
        ..FaultyFs::default()
    };
    let renames = faulty.renames.clone();
    let mut session = fx.session().with_file_system(Box::new(faulty));

    let err = session
        .run(fx.source().to_str().unwrap(), &mut Answer::yes(), &SilentReporter)
        .unwrap_err();

    assert!(matches!(err, Error::Backup { .. }), "{:?}", err);
    assert_eq!(session.state(), RunState::Failed);
    assert_eq!(renames.get(), 0, "move attempted after failed backup");
    assert_eq!(fs::read_to_string(fx.source()).unwrap(), "hello");
    assert!(fx.backups().is_empty());
    assert!(fx.trashed().is_empty());
    assert!(fx.log_lines().last().unwrap().contains("BACKUP_FAILED"));
}

#[test]
fn test_failed_move_keeps_backup_and_original() {
    let fx = Fixture::new();
    let faulty = FaultyFs {
        fail_create_dir: true,
        ..FaultyFs::default()
    };
    let mut session = fx.session().with_file_system(Box::new(faulty));

    let err = session
        .run(fx.source().to_str().unwrap(), &mut Answer::yes(), &SilentReporter)
        .unwrap_err();

    let backup_path = match &err {
        Error::Move { backup_path, .. } => backup_path.clone(),
        other => panic!("expected move error, got {:?}", other),
    };
    assert!(err.to_string().contains("backed up"));
    assert_eq!(session.state(), RunState::Failed);
    assert_eq!(fs::read_to_string(&backup_path).unwrap(), "hello");
    assert_eq!(fs::read_to_string(fx.source()).unwrap(), "hello");

    let lines = fx.log_lines();
    assert!(lines.iter().any(|l| l.contains("BACKUP_CREATED")));
    assert!(lines.last().unwrap().contains("MOVE_FAILED"));
}
