use anyhow::{Context, Result, anyhow};
use console::{Emoji, style};
use indicatif::HumanBytes;
use serde::Serialize;

use torprops::cli::{OpenArgs, ShowArgs};
use torprops::handle::{PeerEntry, TrackerEntry, TrackerStatus};
use torprops::panel::TorrentHeader;
use torprops::stats::TransferView;
use torprops::tree::FileRow;
use torprops::{PageView, PanelSettings, PropsError};

use crate::{Session, find_node};

static INFO: Emoji<'_, '_> = Emoji("ℹ️ ", "i ");
static FILES: Emoji<'_, '_> = Emoji("📁 ", "f ");
static TRACKERS: Emoji<'_, '_> = Emoji("📡 ", "t ");
static PEERS: Emoji<'_, '_> = Emoji("👥 ", "p ");
static SEEDS: Emoji<'_, '_> = Emoji("🌐 ", "w ");

/// Width of the piece bar, in characters.
const BAR_WIDTH: usize = 60;

#[derive(Serialize)]
struct ShowOutput<'a> {
    header: Option<&'a TorrentHeader>,
    #[serde(flatten)]
    view: &'a PageView,
}

pub fn show(session: &Session, args: ShowArgs) -> Result<()> {
    let handle = session.open(&args.torrent)?;
    let mut panel = session.panel_with(PanelSettings {
        visible: true,
        page: args.page,
    });
    let view = panel
        .load_torrent(&handle)
        .cloned()
        .ok_or_else(|| anyhow!("Nothing to show for this torrent"))?;

    if args.json {
        let output = ShowOutput {
            header: panel.header(),
            view: &view,
        };
        println!("{}", serde_json::to_string_pretty(&output).context("Failed to serialize page")?);
        return Ok(());
    }

    if let Some(header) = panel.header() {
        print_header(header);
    }
    print_view(&view);
    Ok(())
}

pub fn open(session: &Session, args: OpenArgs) -> Result<()> {
    let mut handle = session.open(&args.torrent)?;
    let mut panel = session.panel();
    panel.load_torrent(&handle);
    let node = find_node(&panel, &args.path)?;

    match panel.resolve_open_path(&mut handle, node) {
        Ok(Some(path)) => {
            println!("{}", path.display());
            Ok(())
        }
        Ok(None) => Err(anyhow!("Torrent is not available")),
        Err(e @ PropsError::NotOnDisk { .. }) => Err(anyhow!("{}", e)),
        Err(e) => Err(e).context("Failed to resolve path"),
    }
}

pub fn print_header(header: &TorrentHeader) {
    println!("{} {}", INFO, style("Torrent Properties:").bold());
    println!("{:<15} {}", style("Name:").bold(), style(&header.name).cyan());
    println!("{:<15} {}", style("Info Hash:").bold(), header.info_hash);
    println!("{:<15} {}", style("Save Path:").bold(), header.save_path);
    if let Some(date) = &header.creation_date {
        println!("{:<15} {}", style("Created On:").bold(), date);
    }
    if let Some(comment) = &header.comment {
        println!("{:<15} {}", style("Comment:").bold(), comment);
    }
    println!();
}

pub fn print_view(view: &PageView) {
    match view {
        PageView::Main(transfer) => print_transfer(transfer),
        PageView::Trackers { trackers } => print_trackers(trackers),
        PageView::Peers { peers } => print_peers(peers),
        PageView::UrlSeeds { url_seeds } => {
            println!("{} {}", SEEDS, style("URL Seeds:").bold());
            if url_seeds.is_empty() {
                println!("  {}", style("(none)").dim());
            }
            for url in url_seeds {
                println!("  - {}", style(url).underlined());
            }
        }
        PageView::Files { files } => print_files(files),
    }
}

fn print_transfer(view: &TransferView) {
    println!("{}", style("Transfer:").bold());
    println!("{:<15} {}", style("Time Active:").bold(), view.time_active);
    println!("{:<15} {}", style("Downloaded:").bold(), view.downloaded);
    println!("{:<15} {}", style("Uploaded:").bold(), view.uploaded);
    println!("{:<15} {}", style("Wasted:").bold(), view.wasted);
    println!("{:<15} {}", style("DL Limit:").bold(), view.download_limit);
    println!("{:<15} {}", style("UL Limit:").bold(), view.upload_limit);
    println!("{:<15} {}", style("Connections:").bold(), view.connections);
    println!("{:<15} {}", style("Share Ratio:").bold(), view.share_ratio);

    if let Some(pieces) = &view.pieces {
        println!("{:<15} {}", style("Progress:").bold(), style(&pieces.progress).green());
        println!(
            "{:<15} {}",
            style("Pieces:").bold(),
            piece_bar(&pieces.pieces.have, &pieces.pieces.downloading)
        );
        if let Some(availability) = &pieces.availability {
            println!("{:<15} {}", style("Availability:").bold(), availability.average);
        }
    }
}

/// Compress a bitfield into a fixed width bar: full, partial or empty.
fn piece_bar(have: &[bool], downloading: &[bool]) -> String {
    if have.is_empty() {
        return String::new();
    }
    let width = BAR_WIDTH.min(have.len());
    (0..width)
        .map(|col| {
            let start = col * have.len() / width;
            let end = ((col + 1) * have.len() / width).max(start + 1);
            let done = have[start..end].iter().filter(|&&h| h).count();
            let active = downloading.get(start..end).is_some_and(|d| d.contains(&true));
            if done == end - start {
                '█'
            } else if done > 0 || active {
                '▒'
            } else {
                '·'
            }
        })
        .collect()
}

fn print_trackers(trackers: &[TrackerEntry]) {
    println!("{} {}", TRACKERS, style("Trackers:").bold());
    if trackers.is_empty() {
        println!("  {}", style("(none)").dim());
    }
    for tracker in trackers {
        let status = match tracker.status {
            TrackerStatus::NotContacted => style("Not contacted yet").dim(),
            TrackerStatus::Working => style("Working").green(),
            TrackerStatus::Updating => style("Updating...").yellow(),
            TrackerStatus::NotWorking => style("Not working").red(),
        };
        println!(
            "  [{}] {:<50} {} {}",
            tracker.tier,
            style(&tracker.url).underlined(),
            status,
            tracker.message.as_deref().unwrap_or_default()
        );
    }
}

fn print_peers(peers: &[PeerEntry]) {
    println!("{} {}", PEERS, style("Peers:").bold());
    if peers.is_empty() {
        println!("  {}", style("(none)").dim());
    }
    for peer in peers {
        println!(
            "  {:<22} {:<20} {:>6.1}% {:>12}/s {:>12}/s",
            peer.address,
            peer.client,
            peer.progress * 100.0,
            HumanBytes(peer.download_rate).to_string(),
            HumanBytes(peer.upload_rate).to_string()
        );
    }
}

fn print_files(files: &[FileRow]) {
    println!("{} {}", FILES, style("Files:").bold());
    if files.is_empty() {
        println!("  {}", style("(metadata not available)").dim());
    }
    for row in files {
        let name = format!("{}{}{}", "  ".repeat(row.depth), row.name, if row.is_dir { "/" } else { "" });
        let priority = row
            .priority
            .map(|p| p.to_string())
            .unwrap_or_else(|| "Mixed".to_string());
        println!(
            "  {:<40} {:>12} {:>6.1}%  {}",
            name,
            style(HumanBytes(row.size)).dim(),
            row.progress * 100.0,
            priority
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_bar() {
        assert_eq!(piece_bar(&[], &[]), "");
        assert_eq!(piece_bar(&[true, false, false], &[false, true, false]), "█▒·");

        let have = vec![true; 120];
        assert_eq!(piece_bar(&have, &[]).chars().count(), BAR_WIDTH);
    }
}
