//! # v2torrent
//!
//! A library for creating BitTorrent v2 metainfo files, optionally hybrid
//! with the v1 fields so older clients can join the same swarm.
//!
//! The source is walked in sorted order, every file is hashed in 16 KiB
//! blocks into per-piece merkle trees (v2) and SHA1 piece hashes (v1), and
//! the result is assembled into a bencoded metainfo dictionary.
//!
//! ## Example
//!
//! ```no_run
//! use v2torrent::{TorrentBuilder, TorrentOptions};
//! use std::path::PathBuf;
//!
//! let options = TorrentOptions::default();
//! let torrent = TorrentBuilder::new(PathBuf::from("videos"), options).build().unwrap();
//! let hashes = torrent.info_hashes().unwrap();
//! println!("{} {}", hashes.v1, hashes.v2);
//! ```

pub mod bencode;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod hashing;
pub mod models;
pub mod scanner;
pub mod tree;

// Re-export main types for convenience
pub use builder::TorrentBuilder;
pub use error::{Error, Result};
pub use models::{InfoHashes, Mode, Torrent, TorrentOptions, info_hashes_of};
