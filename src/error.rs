//! Error types for panel operations.
//!
//! Display strings are the messages shown to the user; context lives in the
//! variant fields.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type PropsResult<T> = Result<T, PropsError>;

/// Errors produced by the properties panel and the local engine.
#[derive(Debug, Error)]
pub enum PropsError {
    /// The new name cannot be used as a file system entry name.
    #[error("This file name contains forbidden characters, please choose a different one.")]
    ForbiddenCharacters {
        /// Rejected name.
        name: String,
    },
    /// Another entry already occupies the destination.
    #[error("This name is already in use in this folder. Please use a different name.")]
    NameCollision {
        /// Destination path that collided.
        path: String,
    },
    /// The torrent is no longer available.
    #[error("torrent handle is no longer valid")]
    InvalidHandle,
    /// An emptied directory could not be removed. Logged, never surfaced.
    #[error("could not remove directory")]
    FilesystemDeleteFailed {
        /// Directory that was left behind.
        path: PathBuf,
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// A file operation was requested on a directory node.
    #[error("not a file")]
    NotAFile {
        /// Tree path of the node.
        path: String,
    },
    /// A folder operation was requested on a file node.
    #[error("not a folder")]
    NotADirectory {
        /// Tree path of the node.
        path: String,
    },
    /// No node matches the requested tree path.
    #[error("no such file or folder in torrent: {path}")]
    NodeNotFound {
        /// Requested tree path.
        path: String,
    },
    /// The URL seed is already present.
    #[error("This url seed is already in the list.")]
    UrlSeedExists {
        /// Rejected URL.
        url: String,
    },
    /// The new save path could not be created.
    #[error("Could not create the save path")]
    SavePathCreation {
        /// Path that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The file or folder has not been written to disk yet.
    #[error("This {kind} does not exist yet.")]
    NotOnDisk {
        /// `file` or `folder`.
        kind: &'static str,
        /// Absolute path that was checked.
        path: PathBuf,
    },
    /// IO failure in the local engine.
    #[error("io failure during {operation}")]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The metainfo file could not be decoded or is not usable.
    #[error("invalid torrent file: {reason}")]
    Metainfo {
        /// What is wrong with it.
        reason: String,
    },
    /// Resume data could not be read or written.
    #[error("invalid resume data")]
    Resume {
        /// Resume file involved.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Configuration could not be parsed.
    #[error("invalid configuration")]
    Config {
        /// Configuration file involved.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
    /// Settings could not be serialized.
    #[error("could not save settings")]
    SettingsWrite {
        /// Settings file involved.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::ser::Error,
    },
}

impl PropsError {
    /// Build an [`PropsError::Io`] from an IO error with context.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Whether the error should be shown to the user as a rejection.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            Self::InvalidHandle | Self::FilesystemDeleteFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        let err = PropsError::NameCollision {
            path: "a/b".to_string(),
        };
        assert!(err.is_user_facing());
        assert!(err.to_string().contains("already in use"));

        let err = PropsError::NotOnDisk {
            kind: "folder",
            path: PathBuf::from("/tmp/x"),
        };
        assert_eq!(err.to_string(), "This folder does not exist yet.");

        assert!(!PropsError::InvalidHandle.is_user_facing());
    }
}
