//! The torrent handle capability the panel reads from and writes to.

use serde::Serialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::PropsResult;
use crate::models::{FileTable, Priority};

/// Transfer statistics, as a cheap snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TorrentStatus {
    pub total_failed_bytes: u64,
    pub total_redundant_bytes: u64,
    pub all_time_upload: u64,
    pub all_time_download: u64,
    pub total_payload_upload: u64,
    pub total_payload_download: u64,
    /// Bytes per second, zero or negative when unlimited.
    pub upload_limit: i64,
    pub download_limit: i64,
    pub active_time: Duration,
    pub seeding_time: Duration,
    pub num_connections: u32,
    /// Zero or negative when unlimited.
    pub connections_limit: i64,
    pub is_seed: bool,
    pub is_paused: bool,
    pub is_queued: bool,
    pub is_checking: bool,
    /// 0.0 ..= 1.0
    pub progress: f64,
    pub distributed_copies: f64,
}

/// Piece bitfields of a torrent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PieceSnapshot {
    /// Verified pieces.
    pub have: Vec<bool>,
    /// Pieces with a request in flight.
    pub downloading: Vec<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackerStatus {
    NotContacted,
    Working,
    Updating,
    NotWorking,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerEntry {
    pub tier: usize,
    pub url: String,
    pub status: TrackerStatus,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerEntry {
    pub address: SocketAddr,
    pub client: String,
    pub progress: f64,
    pub download_rate: u64,
    pub upload_rate: u64,
    pub downloaded: u64,
    pub uploaded: u64,
}

/// A live torrent as exposed by the engine.
///
/// Every accessor fails with [`crate::PropsError::InvalidHandle`] once the
/// torrent has gone away.
pub trait TorrentHandle {
    fn is_valid(&self) -> bool;
    fn has_metadata(&self) -> PropsResult<bool>;

    fn name(&self) -> PropsResult<String>;
    /// Hex encoded info hash.
    fn info_hash(&self) -> PropsResult<String>;
    fn save_path(&self) -> PropsResult<PathBuf>;
    /// Seconds since the epoch.
    fn creation_date(&self) -> PropsResult<Option<i64>>;
    fn comment(&self) -> PropsResult<Option<String>>;

    fn files(&self) -> PropsResult<FileTable>;
    /// Downloaded bytes per file index.
    fn file_progress(&self) -> PropsResult<Vec<u64>>;
    fn file_priorities(&self) -> PropsResult<Vec<Priority>>;
    fn prioritize_files(&mut self, priorities: &[Priority]) -> PropsResult<()>;
    fn first_last_piece_first(&self) -> PropsResult<bool>;
    fn prioritize_first_last_piece(&mut self, enabled: bool) -> PropsResult<()>;

    /// Give a file a new path relative to the save path.
    fn rename_file(&mut self, index: usize, new_path: &[String]) -> PropsResult<()>;
    fn move_storage(&mut self, path: &Path) -> PropsResult<()>;

    fn url_seeds(&self) -> PropsResult<Vec<String>>;
    fn add_url_seed(&mut self, url: &str) -> PropsResult<()>;
    fn remove_url_seed(&mut self, url: &str) -> PropsResult<()>;

    fn force_recheck(&mut self) -> PropsResult<()>;
    fn flush_cache(&mut self) -> PropsResult<()>;

    fn status(&self) -> PropsResult<TorrentStatus>;
    fn pieces(&self) -> PropsResult<PieceSnapshot>;
    /// Number of peers having each piece.
    fn piece_availability(&self) -> PropsResult<Vec<u32>>;
    fn trackers(&self) -> PropsResult<Vec<TrackerEntry>>;
    fn peers(&self) -> PropsResult<Vec<PeerEntry>>;
}
