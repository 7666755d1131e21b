use crate::entropy::{self, EntropyClass, MAX_ENTROPY};
use crate::error::{Error, Result};
use crate::hasher;
use crate::progress::ProgressReporter;
use chrono::{DateTime, Local};
use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Bytes inspected when building the text preview.
const PREVIEW_PREFIX_LEN: u64 = 64 * 1024;

/// Snapshot of a file taken before anything is touched.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub created_at: Option<DateTime<Local>>,
    pub modified_at: Option<DateTime<Local>>,
    pub sha256_digest: String,
    pub entropy_bits_per_byte: f64,
}

/// Filesystem facts about a path, before any content is read.
#[derive(Debug, Clone)]
pub struct FileStat {
    pub size_bytes: u64,
    pub created_at: Option<DateTime<Local>>,
    pub modified_at: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizeProfile {
    pub size_bytes: u64,
    pub log2_size: f64,
    pub sqrt_size: f64,
    /// sqrt(size) / 10, in arbitrary units.
    pub recreation_effort: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Lines(Vec<String>),
    Empty,
    Binary,
}

/// Everything shown to the user before they confirm.
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub record: FileRecord,
    pub entropy_class: EntropyClass,
    pub size_profile: SizeProfile,
    pub preview: Preview,
}

/// Stat a path. Anything that is not an existing regular file is reported as
/// [`Error::NotFound`].
pub fn inspect(path: &Path) -> Result<FileStat> {
    let metadata = match fs::metadata(path) {
        Ok(m) if m.is_file() => m,
        Ok(_) => return Err(Error::NotFound(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    let modified_at = metadata.modified().ok().map(DateTime::<Local>::from);
    // Linux filesystems may not record a birth time
    let created_at = metadata
        .created()
        .ok()
        .map(DateTime::<Local>::from)
        .or(modified_at);

    Ok(FileStat {
        size_bytes: metadata.len(),
        created_at,
        modified_at,
    })
}

/// Stat, hash, measure entropy and preview a file.
pub fn analyze(
    path: &Path,
    chunk_size: usize,
    preview_lines: usize,
    reporter: &dyn ProgressReporter,
) -> Result<FileAnalysis> {
    let stat = inspect(path)?;
    let sha256_digest = hasher::sha256_file(path, chunk_size, reporter)?;
    let entropy_bits_per_byte = entropy::file_entropy(path, chunk_size)?;
    let preview = preview(path, preview_lines)?;

    let record = FileRecord {
        path: path.to_path_buf(),
        size_bytes: stat.size_bytes,
        created_at: stat.created_at,
        modified_at: stat.modified_at,
        sha256_digest,
        entropy_bits_per_byte,
    };

    Ok(FileAnalysis {
        entropy_class: EntropyClass::classify(entropy_bits_per_byte),
        size_profile: SizeProfile::new(stat.size_bytes),
        preview,
        record,
    })
}

impl SizeProfile {
    pub fn new(size_bytes: u64) -> Self {
        if size_bytes == 0 {
            return Self {
                size_bytes,
                log2_size: 0.0,
                sqrt_size: 0.0,
                recreation_effort: 0.0,
            };
        }
        let size = size_bytes as f64;
        Self {
            size_bytes,
            log2_size: size.log2(),
            sqrt_size: size.sqrt(),
            recreation_effort: size.sqrt() / 10.0,
        }
    }
}

/// First `lines` lines of the file, decoded lossily. A NUL byte in the
/// leading prefix marks the file as binary.
pub fn preview(path: &Path, lines: usize) -> Result<Preview> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut prefix = Vec::new();
    file.take(PREVIEW_PREFIX_LEN)
        .read_to_end(&mut prefix)
        .map_err(|e| Error::io(path, e))?;

    if prefix.contains(&0) {
        return Ok(Preview::Binary);
    }

    let text = String::from_utf8_lossy(&prefix);
    let shown: Vec<String> = text
        .lines()
        .take(lines)
        .map(|line| line.trim_end().to_string())
        .collect();

    if shown.is_empty() {
        Ok(Preview::Empty)
    } else {
        Ok(Preview::Lines(shown))
    }
}

pub fn format_timestamp(at: Option<&DateTime<Local>>) -> String {
    match at {
        Some(at) => at.format(DISPLAY_TIME_FORMAT).to_string(),
        None => "Unknown".to_string(),
    }
}

/// `1234567` -> `1,234,567`
pub fn with_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Path           : {}", self.path.display())?;
        writeln!(f, "Size           : {} bytes", with_thousands(self.size_bytes))?;
        writeln!(f, "Created        : {}", format_timestamp(self.created_at.as_ref()))?;
        writeln!(f, "Last Modified  : {}", format_timestamp(self.modified_at.as_ref()))?;
        writeln!(f, "SHA-256        : {}", self.sha256_digest)?;
        write!(
            f,
            "Entropy        : {:.4} bits/byte (max possible: {:.4})",
            self.entropy_bits_per_byte, MAX_ENTROPY
        )
    }
}

impl fmt::Display for SizeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.size_bytes == 0 {
            return write!(f, "0 bytes (empty file)");
        }
        write!(
            f,
            "{} bytes | log2(size): {:.2} | sqrt(size): {:.2} | recreation effort: {:.1} units",
            with_thousands(self.size_bytes),
            self.log2_size,
            self.sqrt_size,
            self.recreation_effort
        )
    }
}
