//! Rename reconciliation between the file tree and the torrent's file table.
//!
//! A rename is planned against a snapshot of the file table, validated as a
//! whole, and only then committed to the handle entry by entry. A failing
//! commit rolls back the entries already applied.

use std::path::{Path, PathBuf};

use crate::error::{PropsError, PropsResult};
use crate::fsops::Filesystem;
use crate::handle::TorrentHandle;
use crate::models::FileTable;

/// Characters no supported filesystem accepts in a name.
const FORBIDDEN_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Check that `name` can be used as a single file or folder name.
pub fn validate_name(name: &str) -> PropsResult<()> {
    let trimmed = name.trim();
    let valid = !trimmed.is_empty()
        && trimmed != "."
        && trimmed != ".."
        && !name
            .chars()
            .any(|c| c.is_control() || FORBIDDEN_CHARS.contains(&c));
    if valid {
        Ok(())
    } else {
        Err(PropsError::ForbiddenCharacters {
            name: name.to_string(),
        })
    }
}

/// One file table update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMove {
    pub index: usize,
    pub from: Vec<String>,
    pub to: Vec<String>,
}

/// A validated rename, ready to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub moves: Vec<PathMove>,
    /// New on-disk name of the renamed tree node.
    pub node_name: String,
    /// Data already existed at a destination.
    pub recheck: bool,
    /// Folder left behind by a folder rename, relative to the save path.
    pub emptied_dir: Option<PathBuf>,
}

pub struct Renamer<'a> {
    fs: &'a dyn Filesystem,
    case_sensitive: bool,
    incomplete_suffix: &'a str,
}

impl<'a> Renamer<'a> {
    pub fn new(fs: &'a dyn Filesystem, case_sensitive: bool, incomplete_suffix: &'a str) -> Self {
        Self {
            fs,
            case_sensitive,
            incomplete_suffix,
        }
    }

    /// Plan the rename of file `index` to `new_name`.
    ///
    /// Returns `None` when the path does not change.
    pub fn plan_file(
        &self,
        table: &FileTable,
        index: usize,
        new_name: &str,
        save_path: &Path,
    ) -> PropsResult<Option<RenamePlan>> {
        validate_name(new_name)?;
        let entry = table.get(index).ok_or_else(|| PropsError::NodeNotFound {
            path: format!("#{}", index),
        })?;
        let Some((old_last, parent)) = entry.path.split_last() else {
            return Err(PropsError::NodeNotFound {
                path: format!("#{}", index),
            });
        };

        let mut last = new_name.to_string();
        if !self.incomplete_suffix.is_empty()
            && old_last.ends_with(self.incomplete_suffix)
            && !last.ends_with(self.incomplete_suffix)
        {
            last.push_str(self.incomplete_suffix);
        }
        let mut new_path = parent.to_vec();
        new_path.push(last.clone());

        if new_path == entry.path {
            tracing::debug!(file = %entry.path_string(), "name did not change");
            return Ok(None);
        }

        for other in table.iter().filter(|e| e.index != index) {
            if self.same_path(&other.path, &new_path) || self.is_below(&other.path, &new_path) {
                return Err(PropsError::NameCollision {
                    path: new_path.join("/"),
                });
            }
        }

        // A case-only rename on a case insensitive filesystem finds the
        // source file itself at the destination
        let recheck = !self.same_path(&entry.path, &new_path)
            && self.fs.exists(&on_disk(save_path, &new_path));

        Ok(Some(RenamePlan {
            moves: vec![PathMove {
                index,
                from: entry.path.clone(),
                to: new_path,
            }],
            node_name: last,
            recheck,
            emptied_dir: None,
        }))
    }

    /// Plan the rename of the folder at `folder` (path segments) to
    /// `new_name`. Every file below the folder moves along.
    pub fn plan_folder(
        &self,
        table: &FileTable,
        folder: &[String],
        new_name: &str,
        save_path: &Path,
    ) -> PropsResult<Option<RenamePlan>> {
        validate_name(new_name)?;
        let Some((_, parent)) = folder.split_last() else {
            return Err(PropsError::NotADirectory {
                path: String::new(),
            });
        };
        let mut new_prefix = parent.to_vec();
        new_prefix.push(new_name.to_string());

        if new_prefix == folder {
            tracing::debug!(folder = %folder.join("/"), "name did not change");
            return Ok(None);
        }

        let (affected, others): (Vec<_>, Vec<_>) = table
            .iter()
            .partition(|e| e.path.len() > folder.len() && e.path.starts_with(folder));
        if affected.is_empty() {
            return Err(PropsError::NodeNotFound {
                path: folder.join("/"),
            });
        }

        for other in &others {
            if self.same_path(&other.path, &new_prefix) || self.is_below(&other.path, &new_prefix) {
                return Err(PropsError::NameCollision {
                    path: new_prefix.join("/"),
                });
            }
        }

        let case_only = self.same_path(folder, &new_prefix);
        let mut recheck = false;
        let moves: Vec<PathMove> = affected
            .into_iter()
            .map(|entry| {
                let mut to = new_prefix.clone();
                to.extend_from_slice(&entry.path[folder.len()..]);
                if !recheck && !case_only && self.fs.exists(&on_disk(save_path, &to)) {
                    recheck = true;
                }
                PathMove {
                    index: entry.index,
                    from: entry.path.clone(),
                    to,
                }
            })
            .collect();

        Ok(Some(RenamePlan {
            moves,
            node_name: new_name.to_string(),
            recheck,
            emptied_dir: (!case_only).then(|| folder.iter().collect()),
        }))
    }

    fn same_path(&self, a: &[String], b: &[String]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.same_name(x, y))
    }

    /// Whether `path` lies strictly below the folder `prefix`.
    fn is_below(&self, path: &[String], prefix: &[String]) -> bool {
        path.len() > prefix.len()
            && path
                .iter()
                .zip(prefix)
                .all(|(x, y)| self.same_name(x, y))
    }

    fn same_name(&self, a: &str, b: &str) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a == b || a.to_lowercase() == b.to_lowercase()
        }
    }
}

/// Apply a plan to the handle. Either every move is applied or none is.
pub fn commit(plan: &RenamePlan, handle: &mut dyn TorrentHandle) -> PropsResult<()> {
    for (applied, mv) in plan.moves.iter().enumerate() {
        tracing::debug!(from = %mv.from.join("/"), to = %mv.to.join("/"), "renaming");
        if let Err(e) = handle.rename_file(mv.index, &mv.to) {
            tracing::warn!(error = %e, applied, "rename failed, rolling back");
            for undo in plan.moves[..applied].iter().rev() {
                if let Err(undo_err) = handle.rename_file(undo.index, &undo.from) {
                    tracing::warn!(error = %undo_err, index = undo.index, "rollback failed");
                }
            }
            return Err(e);
        }
    }
    Ok(())
}

fn on_disk(save_path: &Path, segments: &[String]) -> PathBuf {
    let mut path = save_path.to_path_buf();
    path.extend(segments);
    path
}
