//! In-memory doubles for the handle and filesystem capabilities.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{PropsError, PropsResult};
use crate::fsops::Filesystem;
use crate::handle::{PeerEntry, PieceSnapshot, TorrentHandle, TorrentStatus, TrackerEntry};
use crate::models::{FileTable, Priority};

pub(crate) fn table(paths: &[&str]) -> FileTable {
    FileTable::from_paths(
        paths
            .iter()
            .map(|p| (p.split('/').map(String::from).collect(), 100)),
    )
}

pub(crate) fn paths(table: &FileTable) -> Vec<String> {
    table.iter().map(|e| e.path_string()).collect()
}

#[derive(Debug)]
pub(crate) struct MockHandle {
    pub valid: bool,
    pub table: FileTable,
    pub progress: Vec<u64>,
    pub priorities: Vec<Priority>,
    pub first_last: bool,
    pub url_seeds: Vec<String>,
    pub save_path: PathBuf,
    pub status: TorrentStatus,
    pub pieces: PieceSnapshot,
    pub trackers: Vec<TrackerEntry>,
    pub peers: Vec<PeerEntry>,
    pub rechecks: u32,
    pub flushes: u32,
    pub renames: u32,
    /// Fail the n-th `rename_file` call (0 based).
    pub fail_rename_at: Option<u32>,
    pub prioritize_calls: Vec<Vec<Priority>>,
    pub storage_moves: Vec<PathBuf>,
}

impl MockHandle {
    pub fn new(files: &[&str]) -> Self {
        let table = table(files);
        let n = table.len();
        Self {
            valid: true,
            table,
            progress: vec![0; n],
            priorities: vec![Priority::Normal; n],
            first_last: false,
            url_seeds: Vec::new(),
            save_path: PathBuf::from("/save"),
            status: TorrentStatus::default(),
            pieces: PieceSnapshot::default(),
            trackers: Vec::new(),
            peers: Vec::new(),
            rechecks: 0,
            flushes: 0,
            renames: 0,
            fail_rename_at: None,
            prioritize_calls: Vec::new(),
            storage_moves: Vec::new(),
        }
    }

    fn check(&self) -> PropsResult<()> {
        if self.valid {
            Ok(())
        } else {
            Err(PropsError::InvalidHandle)
        }
    }
}

impl TorrentHandle for MockHandle {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn has_metadata(&self) -> PropsResult<bool> {
        self.check()?;
        Ok(!self.table.is_empty())
    }

    fn name(&self) -> PropsResult<String> {
        self.check()?;
        Ok("mock".to_string())
    }

    fn info_hash(&self) -> PropsResult<String> {
        self.check()?;
        Ok("00".repeat(20))
    }

    fn save_path(&self) -> PropsResult<PathBuf> {
        self.check()?;
        Ok(self.save_path.clone())
    }

    fn creation_date(&self) -> PropsResult<Option<i64>> {
        self.check()?;
        Ok(None)
    }

    fn comment(&self) -> PropsResult<Option<String>> {
        self.check()?;
        Ok(None)
    }

    fn files(&self) -> PropsResult<FileTable> {
        self.check()?;
        Ok(self.table.clone())
    }

    fn file_progress(&self) -> PropsResult<Vec<u64>> {
        self.check()?;
        Ok(self.progress.clone())
    }

    fn file_priorities(&self) -> PropsResult<Vec<Priority>> {
        self.check()?;
        Ok(self.priorities.clone())
    }

    fn prioritize_files(&mut self, priorities: &[Priority]) -> PropsResult<()> {
        self.check()?;
        self.priorities = priorities.to_vec();
        self.prioritize_calls.push(priorities.to_vec());
        // Prioritizing files resets the first/last piece mode
        self.first_last = false;
        Ok(())
    }

    fn first_last_piece_first(&self) -> PropsResult<bool> {
        self.check()?;
        Ok(self.first_last)
    }

    fn prioritize_first_last_piece(&mut self, enabled: bool) -> PropsResult<()> {
        self.check()?;
        self.first_last = enabled;
        Ok(())
    }

    fn rename_file(&mut self, index: usize, new_path: &[String]) -> PropsResult<()> {
        self.check()?;
        let call = self.renames;
        self.renames += 1;
        if self.fail_rename_at == Some(call) {
            return Err(PropsError::InvalidHandle);
        }
        self.table.set_path(index, new_path.to_vec());
        Ok(())
    }

    fn move_storage(&mut self, path: &Path) -> PropsResult<()> {
        self.check()?;
        self.storage_moves.push(path.to_path_buf());
        self.save_path = path.to_path_buf();
        Ok(())
    }

    fn url_seeds(&self) -> PropsResult<Vec<String>> {
        self.check()?;
        Ok(self.url_seeds.clone())
    }

    fn add_url_seed(&mut self, url: &str) -> PropsResult<()> {
        self.check()?;
        self.url_seeds.push(url.to_string());
        Ok(())
    }

    fn remove_url_seed(&mut self, url: &str) -> PropsResult<()> {
        self.check()?;
        self.url_seeds.retain(|u| u != url);
        Ok(())
    }

    fn force_recheck(&mut self) -> PropsResult<()> {
        self.check()?;
        self.rechecks += 1;
        Ok(())
    }

    fn flush_cache(&mut self) -> PropsResult<()> {
        self.check()?;
        self.flushes += 1;
        Ok(())
    }

    fn status(&self) -> PropsResult<TorrentStatus> {
        self.check()?;
        Ok(self.status.clone())
    }

    fn pieces(&self) -> PropsResult<PieceSnapshot> {
        self.check()?;
        Ok(self.pieces.clone())
    }

    fn piece_availability(&self) -> PropsResult<Vec<u32>> {
        self.check()?;
        Ok(vec![1; self.pieces.have.len()])
    }

    fn trackers(&self) -> PropsResult<Vec<TrackerEntry>> {
        self.check()?;
        Ok(self.trackers.clone())
    }

    fn peers(&self) -> PropsResult<Vec<PeerEntry>> {
        self.check()?;
        Ok(self.peers.clone())
    }
}

/// A filesystem that only knows which paths exist.
#[derive(Debug, Default)]
pub(crate) struct MemFs {
    pub existing: Mutex<HashSet<PathBuf>>,
    pub created: Mutex<Vec<PathBuf>>,
    pub removed: Mutex<Vec<PathBuf>>,
    pub fail_create: bool,
}

impl MemFs {
    pub fn with(paths: &[&str]) -> Self {
        let fs = Self::default();
        fs.existing
            .lock()
            .unwrap()
            .extend(paths.iter().map(PathBuf::from));
        fs
    }
}

impl Filesystem for MemFs {
    fn exists(&self, path: &Path) -> bool {
        self.existing.lock().unwrap().contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if self.fail_create {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.created.lock().unwrap().push(path.to_path_buf());
        self.existing.lock().unwrap().insert(path.to_path_buf());
        Ok(())
    }

    fn remove_empty_tree(&self, path: &Path) -> io::Result<bool> {
        self.removed.lock().unwrap().push(path.to_path_buf());
        self.existing.lock().unwrap().remove(path);
        Ok(true)
    }
}
