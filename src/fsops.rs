//! Filesystem capability used by the panel, and the deferred removal of
//! folders emptied by a rename.

use crossbeam_channel::{Receiver, bounded};
use jwalk::WalkDir;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::{CLEANUP_ATTEMPTS, CLEANUP_DELAY};
use crate::error::PropsError;

pub trait Filesystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    /// Remove every empty directory at and below `path`.
    /// Returns whether `path` itself is gone afterwards.
    fn remove_empty_tree(&self, path: &Path) -> io::Result<bool>;
}

/// The local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl Filesystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_empty_tree(&self, path: &Path) -> io::Result<bool> {
        remove_empty_tree(path)
    }
}

/// Remove empty directories bottom-up. Directories still holding files are
/// left alone.
pub fn remove_empty_tree(path: &Path) -> io::Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    if !path.is_dir() {
        return Ok(false);
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(path).skip_hidden(false) {
        let entry = entry.map_err(io::Error::other)?;
        if entry.file_type().is_dir() {
            dirs.push((entry.depth, entry.path()));
        }
    }
    // Deepest first so parents are empty by the time we reach them
    dirs.sort_by(|a, b| b.0.cmp(&a.0));

    for (_, dir) in dirs {
        match fs::remove_dir(&dir) {
            Ok(()) => tracing::trace!(dir = %dir.display(), "removed empty directory"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::trace!(dir = %dir.display(), error = %e, "directory kept"),
        }
    }
    Ok(!path.exists())
}

/// Bounded retries with a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: CLEANUP_ATTEMPTS,
            delay: CLEANUP_DELAY,
        }
    }
}

/// Result of a deferred folder removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub dir: PathBuf,
    pub removed: bool,
    pub attempts: u32,
}

/// Remove an emptied folder on a background thread, retrying while the
/// filesystem still holds it. The outcome is sent once on the returned
/// channel; giving up is logged and is not an error.
pub fn spawn_cleanup(
    fs: Arc<dyn Filesystem>,
    dir: PathBuf,
    policy: RetryPolicy,
) -> Receiver<CleanupOutcome> {
    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let outcome = cleanup_with_retries(fs.as_ref(), &dir, policy);
        if !outcome.removed {
            let err = PropsError::FilesystemDeleteFailed {
                path: outcome.dir.clone(),
                attempts: outcome.attempts,
            };
            tracing::warn!(dir = %outcome.dir.display(), attempts = outcome.attempts, "{}", err);
        }
        let _ = tx.send(outcome);
    });
    rx
}

fn cleanup_with_retries(fs: &dyn Filesystem, dir: &Path, policy: RetryPolicy) -> CleanupOutcome {
    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        match fs.remove_empty_tree(dir) {
            Ok(true) => {
                tracing::debug!(dir = %dir.display(), attempt, "removed old folder");
                return CleanupOutcome {
                    dir: dir.to_path_buf(),
                    removed: true,
                    attempts: attempt,
                };
            }
            Ok(false) => {}
            Err(e) => tracing::debug!(dir = %dir.display(), attempt, error = %e, "removal failed"),
        }
        if attempt < attempts {
            thread::sleep(policy.delay);
        }
    }
    CleanupOutcome {
        dir: dir.to_path_buf(),
        removed: false,
        attempts,
    }
}
