use crate::error::{Error, Result};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Upper bound of Shannon entropy over bytes, in bits per byte.
pub const MAX_ENTROPY: f64 = 8.0;

/// 256-bin byte frequency histogram that can be fed chunk by chunk, so the
/// entropy of arbitrarily large files is computed over their full content
/// with memory bounded by the read buffer.
#[derive(Debug, Clone)]
pub struct ByteHistogram {
    counts: [u64; 256],
    total: u64,
}

impl Default for ByteHistogram {
    fn default() -> Self {
        Self {
            counts: [0; 256],
            total: 0,
        }
    }
}

impl ByteHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
        self.total += data.len() as u64;
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// H = -sum(p * log2 p) over non-empty bins. Zero for no data.
    pub fn entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }

        let len = self.total as f64;
        let mut entropy = 0.0;
        for &count in &self.counts {
            if count > 0 {
                let p = count as f64 / len;
                entropy -= p * p.log2();
            }
        }
        // -0.0 for single-symbol input
        entropy.clamp(0.0, MAX_ENTROPY)
    }
}

pub fn shannon_entropy(data: &[u8]) -> f64 {
    let mut histogram = ByteHistogram::new();
    histogram.update(data);
    histogram.entropy()
}

pub fn file_entropy(path: &Path, chunk_size: usize) -> Result<f64> {
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut histogram = ByteHistogram::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];
    loop {
        match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => histogram.update(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io(path, e)),
        }
    }
    Ok(histogram.entropy())
}

/// Rough interpretation of an entropy value, shown next to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntropyClass {
    Encrypted,
    Compressed,
    Mixed,
    Structured,
    Repetitive,
}

impl EntropyClass {
    pub fn classify(entropy: f64) -> Self {
        if entropy > 7.5 {
            EntropyClass::Encrypted
        } else if entropy > 6.5 {
            EntropyClass::Compressed
        } else if entropy > 4.5 {
            EntropyClass::Mixed
        } else if entropy > 2.0 {
            EntropyClass::Structured
        } else {
            EntropyClass::Repetitive
        }
    }
}

impl fmt::Display for EntropyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encrypted => write!(f, "encrypted/random"),
            Self::Compressed => write!(f, "compressed"),
            Self::Mixed => write!(f, "mixed"),
            Self::Structured => write!(f, "structured"),
            Self::Repetitive => write!(f, "repetitive"),
        }
    }
}
