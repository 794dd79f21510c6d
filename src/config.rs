use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PropsError, PropsResult};
use crate::panel::PageKind;

/// Suffix the engine appends to files that are still downloading
pub const INCOMPLETE_SUFFIX: &str = ".!qB";

/// Interval between two refreshes of the dynamic data (3 sec)
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(3);

/// Attempts to remove an emptied folder after a folder rename
pub const CLEANUP_ATTEMPTS: u32 = 10;

/// Delay between two removal attempts
pub const CLEANUP_DELAY: Duration = Duration::from_millis(100);

/// Share ratios above this are displayed as infinite
pub const MAX_RATIO: f64 = 100.0;

const APP_NAME: &str = "torprops";
const CONFIG_FILE: &str = "config.toml";
const PANEL_FILE: &str = "panel.toml";

/// User configuration, read from `config.toml` in the platform config dir.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between two refreshes in watch mode.
    pub refresh_interval_secs: u64,
    /// Suffix marking incomplete files on disk.
    pub incomplete_suffix: String,
    /// Removal attempts for emptied folders.
    pub cleanup_attempts: u32,
    /// Milliseconds between two removal attempts.
    pub cleanup_delay_ms: u64,
    /// Force case sensitive (or insensitive) name comparison.
    /// Defaults to the platform convention.
    pub case_sensitive: Option<bool>,
    /// Incomplete torrents live in a temporary folder; their storage is
    /// only moved once they are complete.
    pub use_temp_folder: bool,
    /// Where resume files are kept when `--resume` is not given.
    pub resume_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_secs: REFRESH_INTERVAL.as_secs(),
            incomplete_suffix: INCOMPLETE_SUFFIX.to_string(),
            cleanup_attempts: CLEANUP_ATTEMPTS,
            cleanup_delay_ms: CLEANUP_DELAY.as_millis() as u64,
            case_sensitive: None,
            use_temp_folder: false,
            resume_dir: None,
        }
    }
}

impl Config {
    /// Load the configuration from the default location, falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = config_dir().map(|dir| dir.join(CONFIG_FILE)) else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring configuration");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> PropsResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| PropsError::io("read config", path, e))?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> PropsResult<Self> {
        toml::from_str(content).map_err(|source| PropsError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_millis(self.cleanup_delay_ms)
    }

    /// Name comparison mode for collision checks.
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive.unwrap_or(!cfg!(windows))
    }

    /// Default resume file for a torrent identified by its info hash.
    pub fn resume_path(&self, info_hash_hex: &str) -> Option<PathBuf> {
        let dir = match &self.resume_dir {
            Some(dir) => PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).as_ref()),
            None => data_dir()?.join("resume"),
        };
        Some(dir.join(format!("{}.json", info_hash_hex)))
    }
}

/// Persisted panel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    pub visible: bool,
    pub page: PageKind,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            visible: false,
            page: PageKind::Main,
        }
    }
}

impl PanelSettings {
    /// Settings file beside an explicit config file, or in the user config
    /// directory.
    pub fn location(config_file: Option<&Path>) -> Option<PathBuf> {
        match config_file {
            Some(file) => Some(file.with_file_name(PANEL_FILE)),
            None => config_dir().map(|dir| dir.join(PANEL_FILE)),
        }
    }

    /// Missing or broken files yield the defaults.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save_to(&self, path: &Path) -> PropsResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PropsError::io("create config dir", parent, e))?;
        }
        let content = toml::to_string(self).map_err(|source| PropsError::SettingsWrite {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, content).map_err(|e| PropsError::io("write panel settings", path, e))
    }
}

fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().to_path_buf())
}
