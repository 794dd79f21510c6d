use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use torprops::cli::{Cli, Command};
use torprops::{Config, LocalFs, MetainfoHandle, NodeId, PanelSettings, PropertiesPanel};

mod edit;
mod inspect;
mod verify;
mod watch;

fn configure_logging(verbose: bool) {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(if verbose { "debug" } else { "warn" })
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Options shared by every command.
pub struct Session {
    pub config: Config,
    /// Where the panel page is remembered.
    pub settings_path: Option<PathBuf>,
    resume: Option<PathBuf>,
    save_path: Option<PathBuf>,
}

impl Session {
    fn new(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => Config::load(),
        };
        Ok(Self {
            config,
            settings_path: PanelSettings::location(cli.config.as_deref()),
            resume: cli.resume.clone(),
            save_path: cli.save_path.clone(),
        })
    }

    /// Open a torrent together with its resume data.
    pub fn open(&self, torrent: &Path) -> Result<MetainfoHandle> {
        let save_path = match &self.save_path {
            Some(path) => path.clone(),
            None => torrent
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let mut handle = MetainfoHandle::open(torrent, &save_path)
            .with_context(|| format!("Failed to open torrent: {}", torrent.display()))?;

        let resume = match &self.resume {
            Some(path) => Some(path.clone()),
            None => {
                let hash = torprops::TorrentHandle::info_hash(&handle)?;
                self.config.resume_path(&hash)
            }
        };
        if let Some(path) = resume {
            handle
                .load_resume(path.clone())
                .with_context(|| format!("Failed to load resume data: {}", path.display()))?;
        }
        Ok(handle)
    }

    pub fn panel(&self) -> PropertiesPanel {
        PropertiesPanel::new(self.config.clone(), Arc::new(LocalFs))
    }

    pub fn panel_with(&self, settings: PanelSettings) -> PropertiesPanel {
        self.panel().with_settings(settings)
    }
}

/// Look up a `/` separated path in the panel's file tree.
pub fn find_node(panel: &PropertiesPanel, path: &str) -> Result<NodeId> {
    panel
        .tree()
        .and_then(|tree| tree.find(path))
        .ok_or_else(|| anyhow!("No file or folder '{}' in this torrent", path))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    configure_logging(cli.verbose);

    let session = Session::new(&cli)?;

    match cli.command {
        Command::Show(args) => inspect::show(&session, args),
        Command::Open(args) => inspect::open(&session, args),
        Command::Rename(args) => edit::rename(&session, args),
        Command::Priority(args) => edit::priority(&session, args),
        Command::Seeds(args) => edit::seeds(&session, args),
        Command::Move(args) => edit::move_storage(&session, args),
        Command::Recheck(args) => verify::recheck(&session, args),
        Command::Watch(args) => watch::watch(&session, args),
    }
}
