use serde::{Deserialize, Serialize};
use serde_bencode::value::Value;
use sha1::{Digest, Sha1};

use super::file::{FileEntry, FileTable, is_contained_path};
use crate::error::{PropsError, PropsResult};

/// Info dictionary for the torrent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    #[serde(rename = "piece length")]
    pub piece_length: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pieces: Option<serde_bytes::ByteBuf>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<u8>,

    // Multi-file mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileEntry>>,

    // Single-file mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Torrent metainfo structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Torrent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announce: Option<String>,

    #[serde(rename = "announce-list", default, skip_serializing_if = "Option::is_none")]
    pub announce_list: Option<Vec<Vec<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(rename = "created by", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(rename = "creation date", default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<i64>,

    pub info: Info,

    #[serde(rename = "url-list", default, skip_serializing_if = "Option::is_none")]
    pub url_list: Option<Vec<String>>,
}

impl Torrent {
    /// Decode a bencoded metainfo file.
    pub fn from_bytes(bytes: &[u8]) -> PropsResult<Self> {
        serde_bencode::from_bytes(bytes).map_err(|e| PropsError::Metainfo {
            reason: e.to_string(),
        })
    }

    /// Total payload size, padding included.
    pub fn total_size(&self) -> u64 {
        match (&self.info.files, self.info.length) {
            (Some(files), _) => files.iter().map(|f| f.length).sum(),
            (None, Some(length)) => length,
            (None, None) => 0,
        }
    }

    pub fn num_pieces(&self) -> usize {
        self.info.pieces.as_ref().map_or(0, |p| p.len() / 20)
    }

    /// Every file of the piece stream, padding included, with paths rooted
    /// at the save path.
    pub fn stream_files(&self) -> Vec<(Vec<String>, u64, bool)> {
        match &self.info.files {
            Some(files) => files
                .iter()
                .map(|f| {
                    let mut path = Vec::with_capacity(f.path.len() + 1);
                    path.push(self.info.name.clone());
                    path.extend(f.path.iter().cloned());
                    (path, f.length, f.is_padding())
                })
                .collect(),
            None => vec![(
                vec![self.info.name.clone()],
                self.info.length.unwrap_or(0),
                false,
            )],
        }
    }

    /// Reject file paths that would leave the save path once joined onto it.
    pub fn check_paths(&self) -> PropsResult<()> {
        match self
            .stream_files()
            .into_iter()
            .find(|(path, _, _)| !is_contained_path(path))
        {
            Some((path, _, _)) => Err(PropsError::Metainfo {
                reason: format!("unsafe file path {:?}", path.join("/")),
            }),
            None => Ok(()),
        }
    }

    /// The file table as the engine exposes it: padding files are hidden.
    pub fn file_table(&self) -> FileTable {
        FileTable::from_paths(
            self.stream_files()
                .into_iter()
                .filter(|(_, _, padding)| !*padding)
                .map(|(path, len, _)| (path, len)),
        )
    }

    /// Trackers grouped by tier. Falls back to the single announce URL.
    pub fn tracker_tiers(&self) -> Vec<Vec<String>> {
        match &self.announce_list {
            Some(list) if !list.is_empty() => list.clone(),
            _ => self
                .announce
                .iter()
                .map(|url| vec![url.clone()])
                .collect(),
        }
    }
}

/// Compute the v1 info hash from the raw metainfo bytes.
///
/// The info dictionary is re-encoded from a generic value so that keys the
/// typed model does not know about are kept.
pub fn info_hash_v1(bytes: &[u8]) -> PropsResult<[u8; 20]> {
    let value: Value = serde_bencode::from_bytes(bytes).map_err(|e| PropsError::Metainfo {
        reason: e.to_string(),
    })?;
    let info = match value {
        Value::Dict(mut dict) => dict.remove(&b"info"[..]).ok_or_else(|| PropsError::Metainfo {
            reason: "missing info dictionary".to_string(),
        })?,
        _ => {
            return Err(PropsError::Metainfo {
                reason: "metainfo is not a dictionary".to_string(),
            });
        }
    };
    let encoded = serde_bencode::to_bytes(&info).map_err(|e| PropsError::Metainfo {
        reason: e.to_string(),
    })?;
    let mut hasher = Sha1::new();
    hasher.update(&encoded);
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&hasher.finalize());
    Ok(hash)
}
