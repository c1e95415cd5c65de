//! File locking and atomic writes for note edits
//!
//! - Exclusive advisory locks (fs2/flock) on a per-note lock file
//! - Atomic replace via a temp file in the note's own directory
//! - Lock timeout with a fixed retry interval
//!
//! Lock files live under `<vault>/.taskprio/locks/` so notes never gain
//! sibling files that the vault scanner or Obsidian would pick up.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Default lock timeout in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

/// Retry interval while waiting for a lock
const LOCK_RETRY_INTERVAL_MS: u64 = 50;

/// Directory under the vault root holding lock files
pub const LOCK_DIR: &str = ".taskprio/locks";

fn is_lock_contended(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }

    // Windows reports sharing and lock violations as raw OS errors.
    #[cfg(windows)]
    {
        matches!(err.raw_os_error(), Some(32) | Some(33))
    }
    #[cfg(not(windows))]
    {
        false
    }
}

/// Lock file path guarding the vault-relative note `relative`.
///
/// Path separators are flattened so every note maps to one file in
/// [`LOCK_DIR`].
pub fn lock_path_for(vault_root: &Path, relative: &Path) -> PathBuf {
    let flat: String = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("__")
        .chars()
        .map(|ch| match ch {
            ':' | '\\' | '/' => '_',
            other => other,
        })
        .collect();
    vault_root.join(LOCK_DIR).join(format!("{flat}.lock"))
}

/// A file lock guard that releases the lock when dropped
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire an exclusive lock, waiting up to `timeout_ms`
    ///
    /// The lock file and its parent directory are created if missing.
    pub fn acquire(path: impl AsRef<Path>, timeout_ms: u64) -> Result<Self> {
        let path = path.as_ref();
        let file = open_lock_file(path)?;

        let start = Instant::now();
        let timeout = Duration::from_millis(timeout_ms);
        let retry_interval = Duration::from_millis(LOCK_RETRY_INTERVAL_MS);

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    return Ok(FileLock {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if is_lock_contended(&e) => {
                    if start.elapsed() >= timeout {
                        return Err(Error::LockFailed(path.to_path_buf()));
                    }
                    std::thread::sleep(retry_interval);
                }
                Err(e) => return Err(Error::Io(e)),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?)
}

/// Atomically replace `path` with `data`
///
/// The temp file is created next to the target so the final rename never
/// crosses a filesystem. This does NOT take a lock; callers editing notes
/// hold a [`FileLock`] around the whole read-modify-write.
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| Error::Io(err.error))?;
    Ok(())
}
