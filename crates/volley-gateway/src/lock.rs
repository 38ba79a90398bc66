//! Single-instance enforcement.
//!
//! One running gateway per state directory: two processes broadcasting with
//! the same saved configs would double-send every message. The lock file
//! holds the owning PID for diagnostics; the OS lock itself is what
//! prevents the second instance (so stale files from a crash are harmless).

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use fs2::FileExt;
use tracing::info;

#[derive(Debug)]
pub struct InstanceLock {
    // Held for the lifetime of the process; the lock releases on drop/exit.
    _file: File,
    path: PathBuf,
}

/// Acquire the exclusive instance lock under `state_dir`.
///
/// Fails with a descriptive error (including the holder's PID when
/// readable) if another gateway already owns it.
pub fn acquire(state_dir: &Path) -> Result<InstanceLock> {
    std::fs::create_dir_all(state_dir)
        .with_context(|| format!("creating state dir {}", state_dir.display()))?;
    let path = state_dir.join("volley.lock");

    let mut file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .with_context(|| format!("opening lock file {}", path.display()))?;

    match file.try_lock_exclusive() {
        Ok(()) => {
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            writeln!(&file, "{}", std::process::id())?;
            file.flush()?;
            info!(path = %path.display(), "instance lock acquired");
            Ok(InstanceLock { _file: file, path })
        }
        Err(_) => {
            let mut pid = String::new();
            let _ = file.read_to_string(&mut pid);
            let pid = pid.trim();
            if pid.is_empty() {
                bail!("another instance is already running");
            }
            bail!("another instance is already running (pid {pid})");
        }
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_in_same_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let _lock = acquire(dir.path()).unwrap();

        let err = acquire(dir.path()).unwrap_err();
        assert!(err.to_string().contains("already running"));
    }

    #[test]
    fn lock_is_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        {
            let _lock = acquire(dir.path()).unwrap();
        }
        // Reacquire succeeds once the first lock is gone.
        let _lock = acquire(dir.path()).unwrap();
    }

    #[test]
    fn lock_file_records_our_pid() {
        let dir = tempfile::tempdir().unwrap();
        let _lock = acquire(dir.path()).unwrap();
        let contents = std::fs::read_to_string(dir.path().join("volley.lock")).unwrap();
        assert_eq!(contents.trim(), std::process::id().to_string());
    }
}
