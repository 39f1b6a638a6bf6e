mod file;
mod torrent;

pub use file::{FileEntry, FileInfo};
pub use torrent::{
    FileListMode, FileMetadata, FileNode, FileTree, Info, InfoHashes, Mode, Node, Torrent,
    TorrentOptions, info_hashes_of,
};
