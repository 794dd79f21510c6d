//! Local torrent engine: a metainfo file, a save directory and resume data.
//!
//! There is no network behind it. Pieces are only ever marked as verified by
//! a re-check of the data already on disk.

use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PropsError, PropsResult};
use crate::fsops::remove_empty_tree;
use crate::handle::{PeerEntry, PieceSnapshot, TorrentHandle, TorrentStatus, TrackerEntry, TrackerStatus};
use crate::hashing::verify_v1_pieces;
use crate::models::{FileInfo, FileTable, Priority, Torrent, info_hash_v1, is_contained_path};
use crate::piece::{calculate_num_pieces, verified_bytes};

/// Per-torrent state kept between runs, stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeData {
    pub save_path: PathBuf,
    /// Current path of every file, by file index. Empty until a file is renamed.
    pub mapped_files: Vec<Vec<String>>,
    pub file_priorities: Vec<Priority>,
    /// `None` until the list is edited; the metainfo `url-list` applies.
    pub url_seeds: Option<Vec<String>>,
    /// Verified pieces, packed most significant bit first, hex encoded.
    pub pieces: String,
    pub first_last_piece: bool,
    pub total_uploaded: u64,
    pub total_downloaded: u64,
    pub total_failed: u64,
    pub total_redundant: u64,
    pub upload_limit: i64,
    pub download_limit: i64,
    pub connections_limit: i64,
    pub active_time_secs: u64,
    pub seeding_time_secs: u64,
}

/// Pack a piece bitfield the way the wire protocol does.
pub fn pack_bitfield(bits: &[bool]) -> String {
    let bytes: Vec<u8> = bits
        .chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, &bit)| if bit { byte | (0x80 >> i) } else { byte })
        })
        .collect();
    hex::encode(bytes)
}

/// Inverse of [`pack_bitfield`]. Missing bits read as unset.
pub fn unpack_bitfield(packed: &str, len: usize) -> PropsResult<Vec<bool>> {
    let bytes = hex::decode(packed).map_err(|e| PropsError::Metainfo {
        reason: format!("invalid piece bitfield: {}", e),
    })?;
    Ok((0..len)
        .map(|i| bytes.get(i / 8).is_some_and(|byte| byte & (0x80 >> (i % 8)) != 0))
        .collect())
}

/// Placement of one file of the piece stream.
#[derive(Debug, Clone)]
struct Segment {
    /// File table index; `None` for padding.
    index: Option<usize>,
    offset: u64,
    len: u64,
}

pub struct MetainfoHandle {
    metainfo: Torrent,
    info_hash: String,
    table: FileTable,
    layout: Vec<Segment>,
    have: Vec<bool>,
    resume: ResumeData,
    resume_path: Option<PathBuf>,
    valid: bool,
}

impl MetainfoHandle {
    /// Open a `.torrent` file, starting with fresh resume data.
    pub fn open(torrent_file: &Path, default_save_path: &Path) -> PropsResult<Self> {
        let bytes = fs::read(torrent_file)
            .map_err(|e| PropsError::io("read metainfo", torrent_file, e))?;
        let metainfo = Torrent::from_bytes(&bytes)?;
        if metainfo.info.piece_length == 0 {
            return Err(PropsError::Metainfo {
                reason: "piece length is zero".to_string(),
            });
        }
        metainfo.check_paths()?;
        let info_hash = hex::encode(info_hash_v1(&bytes)?);

        let mut offset = 0;
        let mut index = 0;
        let mut layout = Vec::new();
        for (_, len, padding) in metainfo.stream_files() {
            layout.push(Segment {
                index: (!padding).then_some(index),
                offset,
                len,
            });
            offset += len;
            if !padding {
                index += 1;
            }
        }

        let table = metainfo.file_table();
        let num_pieces = calculate_num_pieces(metainfo.total_size(), metainfo.info.piece_length) as usize;
        let resume = ResumeData {
            save_path: default_save_path.to_path_buf(),
            file_priorities: vec![Priority::Normal; table.len()],
            ..ResumeData::default()
        };
        tracing::debug!(
            name = %metainfo.info.name,
            info_hash = %info_hash,
            files = table.len(),
            pieces = num_pieces,
            "opened metainfo"
        );

        Ok(Self {
            metainfo,
            info_hash,
            table,
            layout,
            have: vec![false; num_pieces],
            resume,
            resume_path: None,
            valid: true,
        })
    }

    /// Use `path` for resume data, loading it when it exists.
    pub fn load_resume(&mut self, path: PathBuf) -> PropsResult<()> {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| PropsError::io("read resume data", &path, e))?;
            let resume: ResumeData =
                serde_json::from_str(&content).map_err(|source| PropsError::Resume {
                    path: path.clone(),
                    source,
                })?;
            self.apply_resume(resume)?;
            tracing::debug!(path = %path.display(), "loaded resume data");
        }
        self.resume_path = Some(path);
        Ok(())
    }

    fn apply_resume(&mut self, mut resume: ResumeData) -> PropsResult<()> {
        if resume.save_path.as_os_str().is_empty() {
            resume.save_path.clone_from(&self.resume.save_path);
        }
        let unsafe_path = resume.mapped_files.iter().find(|p| !is_contained_path(p));
        if let Some(bad) = unsafe_path {
            tracing::warn!(path = %bad.join("/"), "ignoring file mapping that leaves the save path");
            resume.mapped_files.clear();
        } else if resume.mapped_files.len() == self.table.len() {
            for (index, path) in resume.mapped_files.iter().enumerate() {
                self.table.set_path(index, path.clone());
            }
        } else if !resume.mapped_files.is_empty() {
            tracing::warn!(
                expected = self.table.len(),
                found = resume.mapped_files.len(),
                "ignoring file mapping that does not match the torrent"
            );
            resume.mapped_files.clear();
        }
        resume.file_priorities.resize(self.table.len(), Priority::Normal);
        self.have = unpack_bitfield(&resume.pieces, self.have.len())?;
        self.resume = resume;
        Ok(())
    }

    pub fn resume_path(&self) -> Option<&Path> {
        self.resume_path.as_deref()
    }

    pub fn metainfo(&self) -> &Torrent {
        &self.metainfo
    }

    pub fn num_pieces(&self) -> usize {
        self.have.len()
    }

    /// Write the resume data, if a resume file was set.
    pub fn persist(&mut self) -> PropsResult<()> {
        let Some(path) = &self.resume_path else {
            return Ok(());
        };
        self.resume.pieces = pack_bitfield(&self.have);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| PropsError::io("create resume directory", parent, e))?;
        }
        let json = serde_json::to_string_pretty(&self.resume).map_err(|source| PropsError::Resume {
            path: path.clone(),
            source,
        })?;
        fs::write(path, json).map_err(|e| PropsError::io("write resume data", path, e))?;
        tracing::debug!(path = %path.display(), "saved resume data");
        Ok(())
    }

    /// The torrent was removed from the session.
    pub fn close(&mut self) {
        self.valid = false;
    }

    /// Hash the data on disk and return the number of verified pieces.
    pub fn recheck(&mut self, pb: Option<&ProgressBar>) -> PropsResult<usize> {
        self.check()?;
        let save_path = &self.resume.save_path;
        let files: Vec<FileInfo> = self
            .layout
            .iter()
            .map(|segment| {
                let rel: PathBuf = match segment.index.and_then(|i| self.table.get(i)) {
                    Some(entry) => entry.rel_path(),
                    None => PathBuf::new(),
                };
                FileInfo {
                    full_path: save_path.join(&rel),
                    path: rel,
                    len: segment.len,
                    start_offset: segment.offset,
                    is_padding: segment.index.is_none(),
                }
            })
            .collect();

        let expected = self
            .metainfo
            .info
            .pieces
            .as_ref()
            .map(|p| p.as_slice())
            .unwrap_or_default();
        self.have = verify_v1_pieces(&files, self.metainfo.info.piece_length, expected, pb);
        let verified = self.have.iter().filter(|&&have| have).count();
        tracing::info!(verified, total = self.have.len(), "recheck finished");
        Ok(verified)
    }

    fn check(&self) -> PropsResult<()> {
        if self.valid {
            Ok(())
        } else {
            Err(PropsError::InvalidHandle)
        }
    }

    fn entry_path(&self, index: usize) -> PropsResult<PathBuf> {
        self.table
            .get(index)
            .map(|entry| self.resume.save_path.join(entry.rel_path()))
            .ok_or_else(|| PropsError::NodeNotFound {
                path: format!("file #{}", index),
            })
    }

    fn store_mapping(&mut self) {
        self.resume.mapped_files = self.table.iter().map(|e| e.path.clone()).collect();
    }

    fn is_seed(&self) -> bool {
        !self.have.is_empty() && self.have.iter().all(|&have| have)
    }
}

/// Move a file, creating the destination's parent directories.
fn move_file(from: &Path, to: &Path) -> PropsResult<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| PropsError::io("create directory", parent, e))?;
    }
    if fs::rename(from, to).is_err() {
        // Different filesystems
        fs::copy(from, to).map_err(|e| PropsError::io("copy file", from, e))?;
        fs::remove_file(from).map_err(|e| PropsError::io("remove file", from, e))?;
    }
    Ok(())
}

impl TorrentHandle for MetainfoHandle {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn has_metadata(&self) -> PropsResult<bool> {
        self.check()?;
        Ok(!self.table.is_empty())
    }

    fn name(&self) -> PropsResult<String> {
        self.check()?;
        Ok(self.metainfo.info.name.clone())
    }

    fn info_hash(&self) -> PropsResult<String> {
        self.check()?;
        Ok(self.info_hash.clone())
    }

    fn save_path(&self) -> PropsResult<PathBuf> {
        self.check()?;
        Ok(self.resume.save_path.clone())
    }

    fn creation_date(&self) -> PropsResult<Option<i64>> {
        self.check()?;
        Ok(self.metainfo.creation_date)
    }

    fn comment(&self) -> PropsResult<Option<String>> {
        self.check()?;
        Ok(self.metainfo.comment.clone())
    }

    fn files(&self) -> PropsResult<FileTable> {
        self.check()?;
        Ok(self.table.clone())
    }

    fn file_progress(&self) -> PropsResult<Vec<u64>> {
        self.check()?;
        let piece_length = self.metainfo.info.piece_length;
        let mut progress = vec![0; self.table.len()];
        for segment in &self.layout {
            if let Some(index) = segment.index {
                progress[index] = verified_bytes(segment.offset, segment.len, piece_length, &self.have);
            }
        }
        Ok(progress)
    }

    fn file_priorities(&self) -> PropsResult<Vec<Priority>> {
        self.check()?;
        Ok(self.resume.file_priorities.clone())
    }

    fn prioritize_files(&mut self, priorities: &[Priority]) -> PropsResult<()> {
        self.check()?;
        let mut priorities = priorities.to_vec();
        priorities.resize(self.table.len(), Priority::Normal);
        self.resume.file_priorities = priorities;
        // File priorities replace piece priorities
        self.resume.first_last_piece = false;
        Ok(())
    }

    fn first_last_piece_first(&self) -> PropsResult<bool> {
        self.check()?;
        Ok(self.resume.first_last_piece)
    }

    fn prioritize_first_last_piece(&mut self, enabled: bool) -> PropsResult<()> {
        self.check()?;
        self.resume.first_last_piece = enabled;
        Ok(())
    }

    fn rename_file(&mut self, index: usize, new_path: &[String]) -> PropsResult<()> {
        self.check()?;
        if !is_contained_path(new_path) {
            return Err(PropsError::ForbiddenCharacters {
                name: new_path.join("/"),
            });
        }
        let from = self.entry_path(index)?;
        let to = new_path
            .iter()
            .fold(self.resume.save_path.clone(), |path, segment| path.join(segment));
        if from.exists() && !to.exists() {
            move_file(&from, &to)?;
            tracing::debug!(from = %from.display(), to = %to.display(), "moved file on disk");
        }
        self.table.set_path(index, new_path.to_vec());
        self.store_mapping();
        Ok(())
    }

    fn move_storage(&mut self, path: &Path) -> PropsResult<()> {
        self.check()?;
        let old = self.resume.save_path.clone();
        if old == path {
            return Ok(());
        }
        let mut top_dirs = Vec::new();
        for entry in self.table.iter() {
            let from = old.join(entry.rel_path());
            if !from.exists() {
                continue;
            }
            let to = path.join(entry.rel_path());
            if to.exists() {
                tracing::warn!(path = %to.display(), "destination exists, file left in place");
                continue;
            }
            move_file(&from, &to)?;
            if entry.path.len() > 1 && !top_dirs.contains(&entry.path[0]) {
                top_dirs.push(entry.path[0].clone());
            }
        }
        for dir in top_dirs {
            if let Err(e) = remove_empty_tree(&old.join(&dir)) {
                tracing::debug!(dir = %dir, error = %e, "old folder kept");
            }
        }
        tracing::info!(from = %old.display(), to = %path.display(), "moved storage");
        self.resume.save_path = path.to_path_buf();
        Ok(())
    }

    fn url_seeds(&self) -> PropsResult<Vec<String>> {
        self.check()?;
        Ok(match &self.resume.url_seeds {
            Some(seeds) => seeds.clone(),
            None => self.metainfo.url_list.clone().unwrap_or_default(),
        })
    }

    fn add_url_seed(&mut self, url: &str) -> PropsResult<()> {
        let mut seeds = self.url_seeds()?;
        if !seeds.iter().any(|seed| seed == url) {
            seeds.push(url.to_string());
        }
        self.resume.url_seeds = Some(seeds);
        Ok(())
    }

    fn remove_url_seed(&mut self, url: &str) -> PropsResult<()> {
        let mut seeds = self.url_seeds()?;
        seeds.retain(|seed| seed != url);
        self.resume.url_seeds = Some(seeds);
        Ok(())
    }

    fn force_recheck(&mut self) -> PropsResult<()> {
        self.recheck(None).map(|_| ())
    }

    fn flush_cache(&mut self) -> PropsResult<()> {
        self.check()
    }

    fn status(&self) -> PropsResult<TorrentStatus> {
        self.check()?;
        let total = self.table.total_size();
        let done: u64 = self.file_progress()?.iter().sum();
        Ok(TorrentStatus {
            total_failed_bytes: self.resume.total_failed,
            total_redundant_bytes: self.resume.total_redundant,
            all_time_upload: self.resume.total_uploaded,
            all_time_download: self.resume.total_downloaded,
            upload_limit: self.resume.upload_limit,
            download_limit: self.resume.download_limit,
            active_time: Duration::from_secs(self.resume.active_time_secs),
            seeding_time: Duration::from_secs(self.resume.seeding_time_secs),
            connections_limit: self.resume.connections_limit,
            is_seed: self.is_seed(),
            is_paused: true,
            progress: if total == 0 { 0.0 } else { done as f64 / total as f64 },
            ..TorrentStatus::default()
        })
    }

    fn pieces(&self) -> PropsResult<PieceSnapshot> {
        self.check()?;
        Ok(PieceSnapshot {
            have: self.have.clone(),
            downloading: vec![false; self.have.len()],
        })
    }

    fn piece_availability(&self) -> PropsResult<Vec<u32>> {
        self.check()?;
        Ok(vec![0; self.have.len()])
    }

    fn trackers(&self) -> PropsResult<Vec<TrackerEntry>> {
        self.check()?;
        Ok(self
            .metainfo
            .tracker_tiers()
            .into_iter()
            .enumerate()
            .flat_map(|(tier, urls)| {
                urls.into_iter().map(move |url| TrackerEntry {
                    tier,
                    url,
                    status: TrackerStatus::NotContacted,
                    message: None,
                })
            })
            .collect())
    }

    fn peers(&self) -> PropsResult<Vec<PeerEntry>> {
        self.check()?;
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::hash_v1_pieces;
    use crate::models::{FileEntry, Info};

    const PIECE: u64 = 8;

    /// Write `files` under `save/name`, and a matching metainfo file.
    fn fixture(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
        let save = dir.join("save");
        let mut infos = Vec::new();
        let mut offset = 0;
        for (path, data) in files {
            let full = save.join(name).join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(&full, data).unwrap();
            infos.push(FileInfo {
                path: PathBuf::from(path),
                full_path: full,
                len: data.len() as u64,
                start_offset: offset,
                is_padding: false,
            });
            offset += data.len() as u64;
        }
        let torrent = Torrent {
            announce: Some("http://tracker.example/announce".to_string()),
            announce_list: None,
            comment: Some("test".to_string()),
            created_by: None,
            creation_date: Some(1_700_000_000),
            info: Info {
                piece_length: PIECE,
                pieces: Some(serde_bytes::ByteBuf::from(hash_v1_pieces(&infos, PIECE).unwrap())),
                name: name.to_string(),
                private: None,
                files: Some(
                    files
                        .iter()
                        .map(|(path, data)| FileEntry {
                            length: data.len() as u64,
                            path: path.split('/').map(String::from).collect(),
                            attr: None,
                        })
                        .collect(),
                ),
                length: None,
                source: None,
            },
            url_list: Some(vec!["http://seed.example/".to_string()]),
        };
        let path = dir.join(format!("{}.torrent", name));
        fs::write(&path, serde_bencode::to_bytes(&torrent).unwrap()).unwrap();
        path
    }

    fn open(dir: &Path) -> MetainfoHandle {
        let torrent = fixture(
            dir,
            "album",
            &[("cd1/01.flac", b"first track!"), ("cd1/02.flac", b"second"), ("cover.jpg", b"jpeg")],
        );
        MetainfoHandle::open(&torrent, &dir.join("save")).unwrap()
    }

    #[test]
    fn test_bitfield_packing() {
        let bits = vec![true, false, true, true, false, false, false, false, true];
        let packed = pack_bitfield(&bits);
        assert_eq!(packed, "b080");
        assert_eq!(unpack_bitfield(&packed, bits.len()).unwrap(), bits);
        assert_eq!(unpack_bitfield("", 3).unwrap(), vec![false; 3]);
        assert!(unpack_bitfield("zz", 3).is_err());
    }

    #[test]
    fn test_open_and_recheck() {
        let tmp = tempfile::tempdir().unwrap();
        let mut handle = open(tmp.path());

        assert_eq!(handle.name().unwrap(), "album");
        assert_eq!(handle.info_hash().unwrap().len(), 40);
        assert_eq!(handle.num_pieces(), 3);
        assert_eq!(handle.url_seeds().unwrap(), vec!["http://seed.example/"]);
        assert_eq!(handle.trackers().unwrap().len(), 1);
        assert!(!handle.status().unwrap().is_seed);

        assert_eq!(handle.recheck(None).unwrap(), 3);
        assert!(handle.status().unwrap().is_seed);
        assert_eq!(handle.file_progress().unwrap(), vec![12, 6, 4]);

        // Corrupt the last file: its piece also covers the end of 02.flac
        fs::write(tmp.path().join("save/album/cover.jpg"), b"JPEG").unwrap();
        handle.force_recheck().unwrap();
        assert_eq!(handle.pieces().unwrap().have, vec![true, true, false]);
        assert_eq!(handle.file_progress().unwrap(), vec![12, 4, 0]);
    }

    #[test]
    fn test_rename_moves_file_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let mut handle = open(tmp.path());
        let new_path: Vec<String> = ["album", "cd1", "track1.flac"].map(String::from).to_vec();

        handle.rename_file(0, &new_path).unwrap();
        assert!(tmp.path().join("save/album/cd1/track1.flac").exists());
        assert!(!tmp.path().join("save/album/cd1/01.flac").exists());
        assert_eq!(handle.files().unwrap().get(0).unwrap().path, new_path);

        // Data still verifies under the new name
        assert_eq!(handle.recheck(None).unwrap(), 3);
    }

    #[test]
    fn test_resume_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let resume = tmp.path().join("resume/album.json");
        let mut handle = open(tmp.path());
        handle.load_resume(resume.clone()).unwrap();
        handle.recheck(None).unwrap();
        handle
            .rename_file(2, &["album".to_string(), "front.jpg".to_string()])
            .unwrap();
        handle.prioritize_first_last_piece(true).unwrap();
        handle.prioritize_files(&[Priority::High, Priority::Ignored, Priority::Normal]).unwrap();
        handle.add_url_seed("http://mirror.example/").unwrap();
        handle.persist().unwrap();

        let mut reopened = open(tmp.path());
        reopened.load_resume(resume).unwrap();
        assert_eq!(reopened.files().unwrap().get(2).unwrap().path_string(), "album/front.jpg");
        assert_eq!(
            reopened.file_priorities().unwrap(),
            vec![Priority::High, Priority::Ignored, Priority::Normal]
        );
        assert!(!reopened.first_last_piece_first().unwrap());
        assert_eq!(reopened.url_seeds().unwrap().len(), 2);
        assert_eq!(reopened.pieces().unwrap().have, vec![true; 3]);
    }

    #[test]
    fn test_open_rejects_paths_outside_save_path() {
        let tmp = tempfile::tempdir().unwrap();
        let victim = tmp.path().join("victim.txt");
        fs::write(&victim, b"keep").unwrap();
        let torrent_file = fixture(tmp.path(), "t", &[("x.txt", b"data")]);
        let mut torrent = Torrent::from_bytes(&fs::read(&torrent_file).unwrap()).unwrap();
        if let Some(files) = torrent.info.files.as_mut() {
            files[0].path = vec!["..".into(), "..".into(), "victim.txt".into()];
        }
        fs::write(&torrent_file, serde_bencode::to_bytes(&torrent).unwrap()).unwrap();

        let err = MetainfoHandle::open(&torrent_file, &tmp.path().join("save")).err();
        assert!(matches!(err, Some(PropsError::Metainfo { .. })));
        assert_eq!(fs::read(&victim).unwrap(), b"keep");
    }

    #[test]
    fn test_resume_mapping_outside_save_path_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let victim = tmp.path().join("victim.txt");
        fs::write(&victim, b"keep").unwrap();
        let resume = tmp.path().join("album.json");
        let data = ResumeData {
            mapped_files: vec![
                vec!["album".into(), "cd1".into(), "01.flac".into()],
                vec!["album".into(), "..".into(), "..".into(), "victim.txt".into()],
                vec!["album".into(), "cover.jpg".into()],
            ],
            ..ResumeData::default()
        };
        fs::write(&resume, serde_json::to_string(&data).unwrap()).unwrap();

        let mut handle = open(tmp.path());
        handle.load_resume(resume).unwrap();
        assert_eq!(handle.files().unwrap().get(1).unwrap().path_string(), "album/cd1/02.flac");

        handle.move_storage(&tmp.path().join("dest")).unwrap();
        assert_eq!(fs::read(&victim).unwrap(), b"keep");
        assert!(tmp.path().join("dest/album/cd1/02.flac").exists());
    }

    #[test]
    fn test_rename_rejects_escaping_path() {
        let tmp = tempfile::tempdir().unwrap();
        let mut handle = open(tmp.path());
        let escape: Vec<String> = ["album", "..", "..", "out.jpg"].map(String::from).to_vec();

        assert!(matches!(
            handle.rename_file(2, &escape),
            Err(PropsError::ForbiddenCharacters { .. })
        ));
        assert!(tmp.path().join("save/album/cover.jpg").exists());
        assert!(!tmp.path().join("out.jpg").exists());
    }

    #[test]
    fn test_move_storage() {
        let tmp = tempfile::tempdir().unwrap();
        let mut handle = open(tmp.path());
        let target = tmp.path().join("elsewhere");

        handle.move_storage(&target).unwrap();
        assert!(target.join("album/cd1/01.flac").exists());
        assert!(target.join("album/cover.jpg").exists());
        assert!(!tmp.path().join("save/album").exists());
        assert_eq!(handle.save_path().unwrap(), target);
    }

    #[test]
    fn test_closed_handle_is_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        let mut handle = open(tmp.path());
        handle.close();
        assert!(!handle.is_valid());
        assert!(matches!(handle.files(), Err(PropsError::InvalidHandle)));
        assert!(matches!(handle.force_recheck(), Err(PropsError::InvalidHandle)));
    }
}
