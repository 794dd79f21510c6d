#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use torprops::hashing::hash_v1_pieces;
use torprops::models::{FileEntry, FileInfo, Info, Torrent};

pub const PIECE_LENGTH: u64 = 8;

/// 22 bytes in 3 pieces of 8 bytes.
pub const ALBUM: &[(&str, &[u8])] = &[
    ("cd1/01.flac", b"first track!"),
    ("cd1/02.flac", b"second"),
    ("cover.jpg", b"jpeg"),
];

/// A torrent with its data already downloaded to `save/<name>`.
pub struct Fixture {
    pub dir: TempDir,
    pub torrent: PathBuf,
    pub save: PathBuf,
    pub resume: PathBuf,
    pub config: PathBuf,
}

impl Fixture {
    pub fn album() -> Self {
        Self::new("album", ALBUM)
    }

    pub fn new(name: &str, files: &[(&str, &[u8])]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let save = dir.path().join("save");
        let torrent = dir.path().join(format!("{}.torrent", name));
        write_torrent(&torrent, &save, name, files);

        let config = dir.path().join("config.toml");
        fs::write(&config, "cleanup_delay_ms = 10\n").unwrap();

        Self {
            resume: dir.path().join("resume.json"),
            torrent,
            save,
            config,
            dir,
        }
    }

    pub fn data(&self, rel: &str) -> PathBuf {
        self.save.join(rel)
    }

    /// The CLI, pointed at this fixture's config, resume file and save path.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_torprops"));
        cmd.env("RUST_LOG", "warn")
            .arg("--config")
            .arg(&self.config)
            .arg("--resume")
            .arg(&self.resume)
            .arg("--save-path")
            .arg(&self.save);
        cmd
    }
}

/// Write the files under `save/name` and a matching multi-file metainfo.
pub fn write_torrent(torrent: &Path, save: &Path, name: &str, files: &[(&str, &[u8])]) {
    let mut infos = Vec::new();
    let mut offset = 0;
    for (path, data) in files {
        let full_path = save.join(name).join(path);
        fs::create_dir_all(full_path.parent().unwrap()).unwrap();
        fs::write(&full_path, data).unwrap();
        infos.push(FileInfo {
            path: PathBuf::from(path),
            full_path,
            len: data.len() as u64,
            start_offset: offset,
            is_padding: false,
        });
        offset += data.len() as u64;
    }

    let metainfo = Torrent {
        announce: Some("http://tracker.example/announce".to_string()),
        announce_list: Some(vec![
            vec!["http://tracker.example/announce".to_string()],
            vec!["udp://backup.example:6969".to_string()],
        ]),
        comment: Some("integration fixture".to_string()),
        created_by: Some("torprops tests".to_string()),
        creation_date: Some(1_700_000_000),
        info: Info {
            piece_length: PIECE_LENGTH,
            pieces: Some(serde_bytes::ByteBuf::from(
                hash_v1_pieces(&infos, PIECE_LENGTH).unwrap(),
            )),
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
        url_list: None,
    };
    fs::write(torrent, serde_bencode::to_bytes(&metainfo).unwrap()).unwrap();
}
