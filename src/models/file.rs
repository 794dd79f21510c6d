use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Represents a file as laid out in the piece stream
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Relative path inside the save directory
    pub path: PathBuf,
    /// Absolute path for reading the file
    pub full_path: PathBuf,
    /// File size in bytes
    pub len: u64,
    /// The byte offset where this file starts in the global stream
    pub start_offset: u64,
    /// Whether this is a padding file (virtual)
    pub is_padding: bool,
}

/// File entry in multi-file mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub length: u64,
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
}

impl FileEntry {
    /// BEP 47 padding files never appear in the file table.
    pub fn is_padding(&self) -> bool {
        self.attr.as_deref().is_some_and(|attr| attr.contains('p'))
    }
}

/// One entry of a torrent's authoritative file table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatFileEntry {
    /// Stable index within the torrent.
    pub index: usize,
    /// Path segments relative to the save path.
    pub path: Vec<String>,
    /// Size in bytes.
    pub size: u64,
}

impl FlatFileEntry {
    /// Path joined with `/`.
    pub fn path_string(&self) -> String {
        self.path.join("/")
    }

    /// Path as a relative filesystem path.
    pub fn rel_path(&self) -> PathBuf {
        self.path.iter().collect()
    }
}

/// The authoritative, order-stable list of a torrent's files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileTable {
    entries: Vec<FlatFileEntry>,
}

impl FileTable {
    /// Build a table from `(path, size)` pairs, numbering them in order.
    pub fn from_paths<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = (Vec<String>, u64)>,
    {
        let entries = paths
            .into_iter()
            .enumerate()
            .map(|(index, (path, size))| FlatFileEntry { index, path, size })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FlatFileEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlatFileEntry> {
        self.entries.iter()
    }

    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// Replace the path of one entry. Returns false when the index is unknown.
    pub fn set_path(&mut self, index: usize, path: Vec<String>) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.path = path;
                true
            }
            None => false,
        }
    }
}

/// Whether a table path stays below the directory it is joined onto: every
/// segment must be a plain name.
pub fn is_contained_path(path: &[String]) -> bool {
    !path.is_empty()
        && path.iter().all(|segment| {
            !segment.is_empty()
                && segment != "."
                && segment != ".."
                && !segment.contains(['/', '\\'])
        })
}

/// File download priority, on the engine's numeric scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum Priority {
    Ignored,
    Normal,
    High,
    Maximum,
}

impl Priority {
    pub fn value(self) -> u8 {
        match self {
            Priority::Ignored => 0,
            Priority::Normal => 1,
            Priority::High => 2,
            Priority::Maximum => 7,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl From<u8> for Priority {
    fn from(value: u8) -> Self {
        match value {
            0 => Priority::Ignored,
            1 => Priority::Normal,
            2..=5 => Priority::High,
            _ => Priority::Maximum,
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.value()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Ignored => "Do not download",
            Priority::Normal => "Normal",
            Priority::High => "High",
            Priority::Maximum => "Maximum",
        };
        f.write_str(label)
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ignored" | "ignore" | "skip" | "0" => Ok(Priority::Ignored),
            "normal" | "1" => Ok(Priority::Normal),
            "high" | "2" => Ok(Priority::High),
            "maximum" | "max" | "7" => Ok(Priority::Maximum),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}
