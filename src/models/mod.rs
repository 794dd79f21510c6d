mod file;
mod torrent;

pub use file::{FileEntry, FileInfo, FileTable, FlatFileEntry, Priority, is_contained_path};
pub use torrent::{Info, Torrent, info_hash_v1};
