//! Cross-process advisory lock on a cache file
//!
//! The lock lives on a sibling `<file>.lock` which is never read as data.
//! Acquisition polls a non-blocking exclusive lock until a deadline; the lock
//! is released when the guard drops, on every exit path.

use crate::error::{Result, WikiError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Path of the lock file guarding `path`
pub fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

/// Held exclusive lock; released on drop
#[derive(Debug)]
pub struct FileLockGuard {
    file: File,
    path: PathBuf,
}

impl FileLockGuard {
    /// Acquire the lock for `path`, waiting at most `timeout`
    ///
    /// Fails with `LockTimeoutError` when another holder keeps the lock past the bound.
    pub async fn acquire(path: &Path, timeout: Duration, poll_interval: Duration) -> Result<Self> {
        let lock_path = lock_path_for(path);
        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;

        let start = Instant::now();
        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => {
                    debug!(
                        "Acquired lock {:?} after {}ms",
                        lock_path,
                        start.elapsed().as_millis()
                    );
                    return Ok(Self {
                        file,
                        path: lock_path,
                    });
                }
                Err(e) if is_contended(&e) => {
                    if start.elapsed() >= timeout {
                        warn!("Timed out waiting for lock {:?}", lock_path);
                        return Err(WikiError::LockTimeoutError {
                            timeout,
                            path: lock_path.display().to_string(),
                        });
                    }
                    tokio::time::sleep(poll_interval).await;
                }
                Err(e) => return Err(WikiError::Io(e)),
            }
        }
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("Failed to release lock {:?}: {}", self.path, e);
        } else {
            debug!("Released lock {:?}", self.path);
        }
    }
}

fn is_contended(e: &std::io::Error) -> bool {
    e.kind() == std::io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
