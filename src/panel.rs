//! Headless properties panel.
//!
//! The panel never owns the torrent: every operation receives the active
//! handle explicitly. It keeps the derived file tree, the page being shown
//! and the last view produced for it.

use chrono::DateTime;
use crossbeam_channel::{Receiver, TryRecvError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Config, PanelSettings};
use crate::error::{PropsError, PropsResult};
use crate::fsops::{CleanupOutcome, Filesystem, RetryPolicy, spawn_cleanup};
use crate::handle::{PeerEntry, PieceSnapshot, TorrentHandle, TrackerEntry};
use crate::models::Priority;
use crate::rename::{Renamer, commit};
use crate::stats::TransferView;
use crate::tree::{FileRow, FileTree, NodeId, TreeNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Main,
    Trackers,
    Peers,
    UrlSeeds,
    Files,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Visible,
    Reduced,
}

/// Content of the current page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageView {
    Main(TransferView),
    Trackers { trackers: Vec<TrackerEntry> },
    Peers { peers: Vec<PeerEntry> },
    UrlSeeds { url_seeds: Vec<String> },
    Files { files: Vec<FileRow> },
}

impl PageView {
    pub fn kind(&self) -> PageKind {
        match self {
            PageView::Main(_) => PageKind::Main,
            PageView::Trackers { .. } => PageKind::Trackers,
            PageView::Peers { .. } => PageKind::Peers,
            PageView::UrlSeeds { .. } => PageKind::UrlSeeds,
            PageView::Files { .. } => PageKind::Files,
        }
    }
}

/// Static information captured when a torrent is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TorrentHeader {
    pub name: String,
    pub info_hash: String,
    pub save_path: String,
    pub creation_date: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Nothing to do: same name, or the torrent went away.
    Unchanged,
    Renamed { files: usize, recheck: bool },
}

pub struct PropertiesPanel {
    config: Config,
    fs: Arc<dyn Filesystem>,
    state: PanelState,
    page: PageKind,
    foreground: bool,
    enabled: bool,
    header: Option<TorrentHeader>,
    url_seeds: Vec<String>,
    tree: Option<FileTree>,
    view: Option<PageView>,
    cleanups: Vec<Receiver<CleanupOutcome>>,
}

impl PropertiesPanel {
    pub fn new(config: Config, fs: Arc<dyn Filesystem>) -> Self {
        Self {
            config,
            fs,
            state: PanelState::Visible,
            page: PageKind::Main,
            foreground: true,
            enabled: false,
            header: None,
            url_seeds: Vec::new(),
            tree: None,
            view: None,
            cleanups: Vec::new(),
        }
    }

    /// Restore the persisted page and visibility.
    pub fn with_settings(mut self, settings: PanelSettings) -> Self {
        self.page = settings.page;
        self.state = if settings.visible {
            PanelState::Visible
        } else {
            PanelState::Reduced
        };
        self
    }

    pub fn settings(&self) -> PanelSettings {
        PanelSettings {
            visible: self.state == PanelState::Visible,
            page: self.page,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn page(&self) -> PageKind {
        self.page
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn header(&self) -> Option<&TorrentHeader> {
        self.header.as_ref()
    }

    pub fn url_seeds(&self) -> &[String] {
        &self.url_seeds
    }

    pub fn tree(&self) -> Option<&FileTree> {
        self.tree.as_ref()
    }

    pub fn view(&self) -> Option<&PageView> {
        self.view.as_ref()
    }

    /// Whether the view hosting the panel is the one on screen.
    pub fn set_foreground(&mut self, foreground: bool) {
        self.foreground = foreground;
    }

    pub fn clear(&mut self) {
        tracing::debug!("clearing torrent properties");
        self.header = None;
        self.url_seeds.clear();
        self.tree = None;
        self.view = None;
        self.enabled = false;
    }

    /// Show a new torrent. An invalid handle leaves the panel cleared.
    pub fn load_torrent(&mut self, h: &dyn TorrentHandle) -> Option<&PageView> {
        self.clear();
        if !h.is_valid() {
            return None;
        }
        self.enabled = true;
        match self.load_static(h) {
            Ok(()) | Err(PropsError::InvalidHandle) => {}
            Err(e) => tracing::warn!(error = %e, "could not load torrent properties"),
        }
        self.refresh(h)
    }

    fn load_static(&mut self, h: &dyn TorrentHandle) -> PropsResult<()> {
        let creation_date = h.creation_date()?.map(|date| {
            DateTime::from_timestamp(date, 0)
                .map(|dt| dt.to_string())
                .unwrap_or_else(|| date.to_string())
        });
        self.header = Some(TorrentHeader {
            name: h.name()?,
            info_hash: h.info_hash()?,
            save_path: h.save_path()?.display().to_string(),
            creation_date,
            comment: h.comment()?,
        });
        self.load_url_seeds(h)?;
        if h.has_metadata()? {
            let mut tree = FileTree::build(&h.files()?, &self.config.incomplete_suffix);
            tree.update_priorities(&h.file_priorities()?);
            tree.update_progress(&h.file_progress()?);
            self.tree = Some(tree);
        }
        Ok(())
    }

    fn load_url_seeds(&mut self, h: &dyn TorrentHandle) -> PropsResult<()> {
        self.url_seeds = h.url_seeds()?;
        tracing::debug!(count = self.url_seeds.len(), "loaded url seeds");
        if let Some(PageView::UrlSeeds { url_seeds }) = &mut self.view {
            url_seeds.clone_from(&self.url_seeds);
        }
        Ok(())
    }

    /// The engine moved the torrent's storage.
    pub fn update_save_path(&mut self, h: &dyn TorrentHandle) {
        if !h.is_valid() {
            return;
        }
        let (Ok(hash), Ok(path)) = (h.info_hash(), h.save_path()) else {
            return;
        };
        if let Some(header) = self.header.as_mut().filter(|header| header.info_hash == hash) {
            header.save_path = path.display().to_string();
        }
    }

    pub fn reduce(&mut self) {
        self.state = PanelState::Reduced;
    }

    /// Open the panel again and refresh it.
    pub fn slide(&mut self, h: &dyn TorrentHandle) -> Option<&PageView> {
        if self.state == PanelState::Reduced {
            self.state = PanelState::Visible;
        }
        self.refresh(h)
    }

    /// Selecting the page already on screen folds the panel away.
    pub fn select_page(&mut self, page: PageKind, h: &dyn TorrentHandle) -> Option<&PageView> {
        if self.state == PanelState::Visible && self.page == page {
            self.reduce();
            return None;
        }
        self.state = PanelState::Visible;
        self.page = page;
        self.refresh(h)
    }

    /// Refresh the dynamic data of the current page. Called on every timer
    /// tick; does nothing while the panel is folded or in the background.
    pub fn refresh(&mut self, h: &dyn TorrentHandle) -> Option<&PageView> {
        if !h.is_valid() || !self.foreground || self.state != PanelState::Visible {
            return None;
        }
        match self.build_view(h) {
            Ok(view) => self.view = Some(view),
            Err(PropsError::InvalidHandle) => return None,
            Err(e) => {
                tracing::warn!(error = %e, page = ?self.page, "refresh failed");
                return None;
            }
        }
        self.view.as_ref()
    }

    fn build_view(&mut self, h: &dyn TorrentHandle) -> PropsResult<PageView> {
        let view = match self.page {
            PageKind::Main => {
                let status = h.status()?;
                let has_metadata = h.has_metadata()?;
                let pieces = if status.is_seed {
                    PieceSnapshot::default()
                } else {
                    h.pieces()?
                };
                let availability = if !status.is_seed
                    && TransferView::shows_availability(&status, has_metadata)
                {
                    h.piece_availability()?
                } else {
                    Vec::new()
                };
                PageView::Main(TransferView::build(&status, has_metadata, pieces, availability))
            }
            PageKind::Trackers => PageView::Trackers {
                trackers: h.trackers()?,
            },
            PageKind::Peers => PageView::Peers { peers: h.peers()? },
            PageKind::UrlSeeds => {
                self.load_url_seeds(h)?;
                PageView::UrlSeeds {
                    url_seeds: self.url_seeds.clone(),
                }
            }
            PageKind::Files => {
                if !h.has_metadata()? {
                    return Ok(PageView::Files { files: Vec::new() });
                }
                let priorities = h.file_priorities()?;
                let progress = h.file_progress()?;
                // Metadata may only have arrived after the torrent was loaded
                let mut tree = match self.tree.take() {
                    Some(tree) if !tree.is_empty() => tree,
                    _ => FileTree::build(&h.files()?, &self.config.incomplete_suffix),
                };
                tree.update_priorities(&priorities);
                tree.update_progress(&progress);
                let files = tree.rows();
                self.tree = Some(tree);
                PageView::Files { files }
            }
        };
        Ok(view)
    }

    /// Set the priority of files and folders, then push every file priority
    /// to the engine.
    pub fn set_priority(
        &mut self,
        h: &mut dyn TorrentHandle,
        nodes: &[NodeId],
        priority: Priority,
    ) -> PropsResult<()> {
        let Some(tree) = self.tree.as_mut() else {
            return Ok(());
        };
        for &node in nodes {
            lookup(tree, node)?;
        }
        for &node in nodes {
            tracing::debug!(?priority, path = %tree.path_segments(node).join("/"), "setting priority");
            tree.set_priority(node, priority);
        }
        self.apply_priorities(h)
    }

    /// Push the tree's file priorities to the engine, keeping the first and
    /// last piece mode it had.
    pub fn apply_priorities(&mut self, h: &mut dyn TorrentHandle) -> PropsResult<()> {
        let Some(tree) = self.tree.as_ref() else {
            return Ok(());
        };
        if !h.is_valid() {
            return Ok(());
        }
        let priorities = tree.priorities();
        quiet(|| {
            let first_last = h.first_last_piece_first()?;
            h.prioritize_files(&priorities)?;
            if first_last {
                h.prioritize_first_last_piece(true)?;
            }
            Ok(())
        })
    }

    /// Rename a file of the tree.
    pub fn rename_file(
        &mut self,
        h: &mut dyn TorrentHandle,
        node: NodeId,
        new_name: &str,
    ) -> PropsResult<RenameOutcome> {
        if let Some(tree) = self.tree.as_ref() {
            if !lookup(tree, node)?.is_file() {
                return Err(PropsError::NotAFile {
                    path: tree.path_segments(node).join("/"),
                });
            }
        }
        self.rename(h, node, new_name)
    }

    /// Rename a folder of the tree; every file below it moves along.
    pub fn rename_folder(
        &mut self,
        h: &mut dyn TorrentHandle,
        node: NodeId,
        new_name: &str,
    ) -> PropsResult<RenameOutcome> {
        if let Some(tree) = self.tree.as_ref() {
            if lookup(tree, node)?.is_file() {
                return Err(PropsError::NotADirectory {
                    path: tree.path_segments(node).join("/"),
                });
            }
        }
        self.rename(h, node, new_name)
    }

    /// Rename a file or a folder of the tree.
    pub fn rename(
        &mut self,
        h: &mut dyn TorrentHandle,
        node: NodeId,
        new_name: &str,
    ) -> PropsResult<RenameOutcome> {
        if !h.is_valid() {
            return Ok(RenameOutcome::Unchanged);
        }
        match self.rename_inner(h, node, new_name) {
            Err(PropsError::InvalidHandle) => Ok(RenameOutcome::Unchanged),
            other => other,
        }
    }

    fn rename_inner(
        &mut self,
        h: &mut dyn TorrentHandle,
        node: NodeId,
        new_name: &str,
    ) -> PropsResult<RenameOutcome> {
        let Some(tree) = self.tree.as_mut() else {
            return Err(PropsError::NodeNotFound {
                path: node.to_string(),
            });
        };
        lookup(tree, node)?;
        if node == tree.root() {
            return Err(PropsError::NotADirectory {
                path: String::new(),
            });
        }
        if !h.has_metadata()? {
            return Ok(RenameOutcome::Unchanged);
        }

        let table = h.files()?;
        let save_path = h.save_path()?;
        let renamer = Renamer::new(
            self.fs.as_ref(),
            self.config.case_sensitive(),
            &self.config.incomplete_suffix,
        );
        let plan = match lookup(tree, node)?.file_index() {
            Some(index) => renamer.plan_file(&table, index, new_name, &save_path)?,
            None => renamer.plan_folder(&table, &tree.path_segments(node), new_name, &save_path)?,
        };
        let Some(plan) = plan else {
            return Ok(RenameOutcome::Unchanged);
        };

        commit(&plan, h)?;
        tree.set_name(node, &plan.node_name);
        if plan.recheck {
            tracing::info!("data already present at the destination, forcing a recheck");
            h.force_recheck()?;
        }
        if let Some(dir) = &plan.emptied_dir {
            let policy = RetryPolicy {
                attempts: self.config.cleanup_attempts,
                delay: self.config.cleanup_delay(),
            };
            self.cleanups
                .push(spawn_cleanup(Arc::clone(&self.fs), save_path.join(dir), policy));
        }
        Ok(RenameOutcome::Renamed {
            files: plan.moves.len(),
            recheck: plan.recheck,
        })
    }

    /// Add a URL seed unless it is already known.
    pub fn add_url_seed(&mut self, h: &mut dyn TorrentHandle, url: &str) -> PropsResult<()> {
        let url = url.trim();
        if !h.is_valid() || url.is_empty() {
            return Ok(());
        }
        if self.url_seeds.iter().any(|seed| seed.eq_ignore_ascii_case(url)) {
            return Err(PropsError::UrlSeedExists {
                url: url.to_string(),
            });
        }
        tracing::debug!(url, "adding web seed");
        quiet(|| {
            h.add_url_seed(url)?;
            self.load_url_seeds(&*h)
        })
    }

    pub fn remove_url_seeds(&mut self, h: &mut dyn TorrentHandle, urls: &[String]) -> PropsResult<()> {
        if !h.is_valid() || urls.is_empty() {
            return Ok(());
        }
        quiet(|| {
            for url in urls {
                h.remove_url_seed(url)?;
            }
            self.load_url_seeds(&*h)
        })
    }

    /// Move the torrent's storage to `dir`, creating it when needed.
    /// Returns the path to display.
    pub fn change_save_path(
        &mut self,
        h: &mut dyn TorrentHandle,
        dir: &str,
    ) -> PropsResult<Option<String>> {
        if !h.is_valid() {
            return Ok(None);
        }
        let expanded = shellexpand::full(dir)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| shellexpand::tilde(dir).into_owned());
        let path = std::path::absolute(&expanded)
            .map_err(|e| PropsError::io("resolve save path", expanded.clone(), e))?;
        if !self.fs.exists(&path) {
            self.fs
                .create_dir_all(&path)
                .map_err(|source| PropsError::SavePathCreation {
                    path: path.clone(),
                    source,
                })?;
        }

        let moved = quiet(|| {
            let status = h.status()?;
            if !self.config.use_temp_folder || status.is_seed {
                h.move_storage(&path)?;
            }
            Ok(())
        });
        moved?;
        let display = path.display().to_string();
        if let Some(header) = self.header.as_mut() {
            header.save_path.clone_from(&display);
        }
        Ok(Some(display))
    }

    /// Absolute on-disk location of a tree node.
    pub fn resolve_open_path(
        &self,
        h: &mut dyn TorrentHandle,
        node: NodeId,
    ) -> PropsResult<Option<PathBuf>> {
        let Some(tree) = self.tree.as_ref() else {
            return Ok(None);
        };
        let is_file = lookup(tree, node)?.is_file();
        if !h.is_valid() || !h.has_metadata().unwrap_or(false) {
            return Ok(None);
        }
        let mut path = match h.save_path() {
            Ok(path) => path,
            Err(PropsError::InvalidHandle) => return Ok(None),
            Err(e) => return Err(e),
        };
        path.extend(tree.path_segments(node));
        tracing::debug!(path = %path.display(), "trying to open");
        quiet(|| h.flush_cache())?;
        if self.fs.exists(&path) {
            Ok(Some(path))
        } else {
            Err(PropsError::NotOnDisk {
                kind: if is_file { "file" } else { "folder" },
                path,
            })
        }
    }

    /// Folder removals still running in the background.
    pub fn pending_cleanups(&self) -> usize {
        self.cleanups.len()
    }

    /// Collect the folder removals that have finished.
    pub fn poll_cleanups(&mut self) -> Vec<CleanupOutcome> {
        let mut done = Vec::new();
        self.cleanups.retain(|rx| match rx.try_recv() {
            Ok(outcome) => {
                done.push(outcome);
                false
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Disconnected) => false,
        });
        done
    }

    /// Wait for every pending folder removal, at most `timeout` overall.
    pub fn wait_cleanups(&mut self, timeout: Duration) -> Vec<CleanupOutcome> {
        let deadline = Instant::now() + timeout;
        let mut done = Vec::new();
        for rx in self.cleanups.drain(..) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if let Ok(outcome) = rx.recv_timeout(remaining) {
                done.push(outcome);
            }
        }
        done
    }
}

/// Node ids are only meaningful for the tree they came from.
fn lookup(tree: &FileTree, node: NodeId) -> PropsResult<&TreeNode> {
    tree.node(node).ok_or_else(|| PropsError::NodeNotFound {
        path: node.to_string(),
    })
}

/// Operations on a torrent that went away are silently dropped.
fn quiet<F>(op: F) -> PropsResult<()>
where
    F: FnOnce() -> PropsResult<()>,
{
    match op() {
        Err(PropsError::InvalidHandle) => {
            tracing::debug!("torrent handle became invalid");
            Ok(())
        }
        other => other,
    }
}
