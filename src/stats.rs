//! Formatting of the transfer statistics shown on the main page.

use indicatif::HumanBytes;
use serde::Serialize;
use std::time::Duration;

use crate::config::MAX_RATIO;
use crate::handle::{PieceSnapshot, TorrentStatus};

const INFINITY: &str = "∞";

pub fn friendly_unit(bytes: u64) -> String {
    HumanBytes(bytes).to_string()
}

/// Compact duration: `< 1m`, `5m`, `3h 10m`, `2d 4h`.
pub fn friendly_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        return "0".to_string();
    }
    if secs < 60 {
        return "< 1m".to_string();
    }
    let minutes = secs / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h {}m", hours, minutes % 60);
    }
    format!("{}d {}h", hours / 24, hours % 24)
}

/// Share ratio; torrents that uploaded without downloading count as infinite.
pub fn share_ratio(uploaded: u64, downloaded: u64) -> f64 {
    if downloaded == 0 {
        if uploaded == 0 { 0.0 } else { MAX_RATIO + 1.0 }
    } else {
        uploaded as f64 / downloaded as f64
    }
}

pub fn ratio_text(ratio: f64) -> String {
    if ratio > MAX_RATIO {
        INFINITY.to_string()
    } else {
        format!("{:.2}", ratio)
    }
}

/// Rate limit in bytes per second; zero or less means unlimited.
pub fn limit_text(limit: i64) -> String {
    if limit <= 0 {
        INFINITY.to_string()
    } else {
        format!("{}/s", friendly_unit(limit as u64))
    }
}

pub fn connections_text(connections: u32, limit: i64) -> String {
    if limit > 0 {
        format!("{} ({} max)", connections, limit)
    } else {
        connections.to_string()
    }
}

fn total_text(all_time: u64, session: u64) -> String {
    format!(
        "{} ({} this session)",
        friendly_unit(all_time),
        friendly_unit(session)
    )
}

/// Piece bars, shown while the torrent is still downloading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PiecesView {
    pub pieces: PieceSnapshot,
    pub progress: String,
    /// Present when peers are being tracked.
    pub availability: Option<AvailabilityView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityView {
    pub availability: Vec<u32>,
    pub average: String,
}

/// Main page content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferView {
    pub wasted: String,
    pub uploaded: String,
    pub downloaded: String,
    pub upload_limit: String,
    pub download_limit: String,
    pub time_active: String,
    pub connections: String,
    pub share_ratio: String,
    pub pieces: Option<PiecesView>,
}

impl TransferView {
    /// Availability is only meaningful while the torrent talks to peers.
    pub fn shows_availability(status: &TorrentStatus, has_metadata: bool) -> bool {
        has_metadata && !status.is_paused && !status.is_queued && !status.is_checking
    }

    /// `pieces` and `availability` are ignored for torrents that are seeding.
    pub fn build(
        status: &TorrentStatus,
        has_metadata: bool,
        pieces: PieceSnapshot,
        availability: Vec<u32>,
    ) -> Self {
        let mut time_active = friendly_duration(status.active_time);
        if status.is_seed {
            time_active.push_str(&format!(
                " (Seeded for {})",
                friendly_duration(status.seeding_time)
            ));
        }

        let pieces = (!status.is_seed).then(|| PiecesView {
            pieces,
            progress: format!("{:.1}%", status.progress * 100.0),
            availability: Self::shows_availability(status, has_metadata).then(|| {
                AvailabilityView {
                    availability,
                    average: format!("{:.1}", status.distributed_copies),
                }
            }),
        });

        Self {
            wasted: friendly_unit(status.total_failed_bytes + status.total_redundant_bytes),
            uploaded: total_text(status.all_time_upload, status.total_payload_upload),
            downloaded: total_text(status.all_time_download, status.total_payload_download),
            upload_limit: limit_text(status.upload_limit),
            download_limit: limit_text(status.download_limit),
            time_active,
            connections: connections_text(status.num_connections, status.connections_limit),
            share_ratio: ratio_text(share_ratio(status.all_time_upload, status.all_time_download)),
            pieces,
        }
    }
}
