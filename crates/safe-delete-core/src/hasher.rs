use crate::error::{Error, Result};
use crate::progress::ProgressReporter;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Stream a file through SHA-256 in `chunk_size` pieces and return the
/// lowercase hex digest. Progress is reported after every chunk.
pub fn sha256_file(
    path: &Path,
    chunk_size: usize,
    reporter: &dyn ProgressReporter,
) -> Result<String> {
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let total = file.metadata().map(|m| m.len()).unwrap_or(0);
    reporter.on_hash_start(total);

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut bytes_read = 0u64;
    loop {
        let n = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io(path, e)),
        };
        hasher.update(&buffer[..n]);
        bytes_read += n as u64;
        reporter.on_hash_progress(bytes_read);
    }

    let digest = hex::encode(hasher.finalize());
    tracing::debug!("SHA-256 of {}: {}", path.display(), digest);
    reporter.on_hash_complete(&digest);
    Ok(digest)
}

pub fn sha256_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
