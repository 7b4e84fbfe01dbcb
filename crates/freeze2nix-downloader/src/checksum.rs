//! SHA-256 of cached artifacts.

use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{DownloadError, Result};

const BUFFER_SIZE: usize = 128 * 1024;

/// Compute the lowercase hex SHA-256 of a file.
///
/// # Errors
/// Returns I/O error if file cannot be read.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path).map_err(|e| DownloadError::io(path, e))?;
    let mut reader = std::io::BufReader::with_capacity(BUFFER_SIZE, file);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUFFER_SIZE];

    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| DownloadError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// [`sha256_file`] on the blocking pool.
///
/// # Errors
/// Returns I/O error if file cannot be read.
pub async fn sha256_file_async(path: PathBuf) -> Result<String> {
    let task_path = path.clone();
    tokio::task::spawn_blocking(move || sha256_file(&task_path))
        .await
        .map_err(|e| DownloadError::io(path, std::io::Error::other(e)))?
}
