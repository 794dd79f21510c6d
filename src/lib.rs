//! # torprops
//!
//! A library for inspecting and editing the properties of a torrent: its
//! transfer statistics, trackers, URL seeds and file tree.
//!
//! The [`PropertiesPanel`] never owns a torrent. Every operation receives
//! the active [`TorrentHandle`], so the same panel can follow whichever
//! torrent is selected. [`MetainfoHandle`] is a local handle backed by a
//! `.torrent` file and the data on disk.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use torprops::{Config, LocalFs, MetainfoHandle, PropertiesPanel};
//!
//! let mut handle = MetainfoHandle::open(Path::new("album.torrent"), Path::new("/downloads")).unwrap();
//! let mut panel = PropertiesPanel::new(Config::default(), Arc::new(LocalFs));
//! panel.load_torrent(&handle);
//! let node = panel.tree().and_then(|tree| tree.find("album/cover.jpg")).unwrap();
//! panel.rename(&mut handle, node, "front.jpg").unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fsops;
pub mod handle;
pub mod hashing;
pub mod models;
pub mod panel;
pub mod piece;
pub mod rename;
pub mod session;
pub mod stats;
pub mod tree;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use config::{Config, PanelSettings};
pub use error::{PropsError, PropsResult};
pub use fsops::{Filesystem, LocalFs};
pub use handle::TorrentHandle;
pub use models::{FileTable, Priority, Torrent};
pub use panel::{PageKind, PageView, PropertiesPanel, RenameOutcome};
pub use session::MetainfoHandle;
pub use tree::{FileTree, NodeId};
