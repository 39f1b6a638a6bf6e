use serde::Serialize;
use serde_bytes::ByteBuf;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use super::file::FileEntry;
use crate::bencode;
use crate::config::{DEFAULT_PIECE_LENGTH, V1_HASH_LEN};
use crate::error::{Error, Result};
use crate::hashing::{Hash20, Hash32};

/// Which fields the info dictionary carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// v2 fields only
    V2,
    /// v2 fields plus v1 "pieces" and "files"/"length"
    #[default]
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileMetadata {
    pub length: u64,
    #[serde(rename = "pieces root", skip_serializing_if = "Option::is_none")]
    pub pieces_root: Option<ByteBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileNode {
    #[serde(rename = "")]
    pub metadata: FileMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    File(FileNode),
    Directory(BTreeMap<String, Node>),
}

/// The v2 "file tree": path segment to subtree, files keyed by ""
pub type FileTree = BTreeMap<String, Node>;

/// v1 view of the content in a hybrid torrent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FileListMode {
    /// Single-file torrent: only the total length
    #[serde(rename = "length")]
    Single(u64),
    /// Multi-file torrent: flat file list with pad files interleaved
    #[serde(rename = "files")]
    Multi(Vec<FileEntry>),
}

/// Info dictionary for the torrent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    #[serde(rename = "file tree")]
    pub file_tree: FileTree,

    #[serde(rename = "meta version")]
    pub meta_version: u8,

    pub name: String,

    #[serde(rename = "piece length")]
    pub piece_length: u64,

    // v1 fields, hybrid only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pieces: Option<ByteBuf>,

    #[serde(flatten)]
    pub layout: Option<FileListMode>,
}

/// Torrent metainfo structure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Torrent {
    /// Tracker URL, written verbatim even when empty
    pub announce: String,

    pub info: Info,

    /// File root to concatenated piece roots, for files longer than one piece
    #[serde(rename = "piece layers")]
    pub piece_layers: BTreeMap<ByteBuf, ByteBuf>,
}

impl Torrent {
    /// Encode the whole metainfo, ready to be written as a .torrent file
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bencode::encode(self)
    }

    /// Canonical encoding of the info dictionary
    pub fn info_bytes(&self) -> Result<Vec<u8>> {
        bencode::encode(&self.info)
    }

    pub fn info_hash_v1(&self) -> Result<Hash20> {
        Ok(Sha1::digest(self.info_bytes()?).into())
    }

    pub fn info_hash_v2(&self) -> Result<Hash32> {
        Ok(Sha256::digest(self.info_bytes()?).into())
    }

    /// Both info-hashes, hex encoded
    pub fn info_hashes(&self) -> Result<InfoHashes> {
        Ok(InfoHashes::from_info_bytes(&self.info_bytes()?))
    }

    /// Number of v1 pieces, zero for v2-only torrents
    pub fn num_pieces_v1(&self) -> usize {
        self.info.pieces.as_ref().map_or(0, |p| p.len() / V1_HASH_LEN)
    }

    /// Sum of all real file lengths in the file tree
    pub fn total_size(&self) -> u64 {
        fn walk(tree: &FileTree) -> u64 {
            tree.values()
                .map(|node| match node {
                    Node::File(file) => file.metadata.length,
                    Node::Directory(children) => walk(children),
                })
                .sum()
        }
        walk(&self.info.file_tree)
    }
}

/// v1 (SHA1) and v2 (SHA256) info-hashes as lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoHashes {
    pub v1: String,
    pub v2: String,
}

impl InfoHashes {
    pub fn from_info_bytes(info: &[u8]) -> Self {
        Self {
            v1: hex::encode(Sha1::digest(info)),
            v2: hex::encode(Sha256::digest(info)),
        }
    }
}

/// Recompute both info-hashes of an already encoded torrent.
///
/// The info dictionary is decoded and re-encoded canonically, so the result
/// matches the hashes reported when the torrent was created.
pub fn info_hashes_of(torrent: &[u8]) -> Result<InfoHashes> {
    let value = bencode::decode(torrent)?;
    let info = bencode::dict_get(&value, b"info").ok_or(Error::MissingInfo)?;
    Ok(InfoHashes::from_info_bytes(&bencode::encode(info)?))
}

/// Configuration options for building a torrent
#[derive(Debug, Clone)]
pub struct TorrentOptions {
    pub mode: Mode,
    /// Piece length in bytes, a power of two of at least 16 KiB
    pub piece_length: u64,
    pub announce: String,
    /// Overrides the torrent name (defaults to the source basename)
    pub name: Option<String>,
    pub exclude: Vec<String>,
}

impl Default for TorrentOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Hybrid,
            piece_length: DEFAULT_PIECE_LENGTH,
            announce: String::new(),
            name: None,
            exclude: Vec::new(),
        }
    }
}
