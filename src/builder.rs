use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::prelude::*;
use serde_bytes::ByteBuf;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::validate_piece_length;
use crate::error::Result;
use crate::hashing::{FileHashes, PieceTail, hash_file};
use crate::models::{FileEntry, FileInfo, FileListMode, Info, Mode, Node, Torrent, TorrentOptions};
use crate::scanner::{Scan, SourceLayout, scan_files};
use crate::tree::{build_file_tree, file_node};

/// Builder for creating torrent files
pub struct TorrentBuilder {
    source: PathBuf,
    output_file: Option<PathBuf>,
    options: TorrentOptions,
    show_progress: bool,
    num_threads: usize,
}

impl TorrentBuilder {
    /// Create a new TorrentBuilder
    pub fn new(source: PathBuf, options: TorrentOptions) -> Self {
        Self {
            source,
            output_file: None,
            options,
            show_progress: false,
            num_threads: num_cpus::get(),
        }
    }

    /// Set the output file path for exclusion from scanning
    pub fn with_output_file(mut self, output: PathBuf) -> Self {
        self.output_file = Some(output);
        self
    }

    /// Enable progress bar
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.show_progress = progress;
        self
    }

    /// Set the number of threads for hashing
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads.max(1);
        self
    }

    /// Build the torrent metadata
    pub fn build(self) -> Result<Torrent> {
        validate_piece_length(self.options.piece_length)?;

        info!(
            source = %self.source.display(),
            piece_length = self.options.piece_length,
            mode = ?self.options.mode,
            "creating torrent"
        );

        let scan = scan_files(
            &self.source,
            self.output_file.as_deref(),
            &self.options.exclude,
        )?;

        info!(
            files = scan.files.len(),
            total_size = scan.total_size(),
            threads = self.num_threads,
            "hashing"
        );

        let hashes = self.hash_content(&scan.files, scan.total_size())?;
        let torrent = self.assemble(scan, hashes);

        info!(
            pieces = torrent.num_pieces_v1(),
            piece_layers = torrent.piece_layers.len(),
            "torrent assembled"
        );

        Ok(torrent)
    }

    /// Hash every file. Files are independent, so they are hashed in parallel;
    /// results come back in walk order.
    fn hash_content(&self, files: &[FileInfo], total_size: u64) -> Result<Vec<FileHashes>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .build()?;

        let pb = if self.show_progress {
            let pb = ProgressBar::new(total_size);
            pb.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
            pb.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.202/94} {bytes}/{total_bytes} ({eta}) {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░"),
            );
            pb.set_message("Hashing...");
            Some(pb)
        } else {
            None
        };

        let piece_length = self.options.piece_length;
        let with_v1 = self.options.mode == Mode::Hybrid;
        let result = pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    let hashes = hash_file(&file.full_path, piece_length, with_v1, pb.as_ref())?;
                    debug!(
                        path = %file.path.join("/"),
                        length = hashes.length,
                        pieces = hashes.piece_roots.len(),
                        "hashed file"
                    );
                    Ok(hashes)
                })
                .collect::<Result<Vec<_>>>()
        });

        if let Some(p) = pb {
            p.finish_with_message("Hashing complete");
        }
        result
    }

    fn assemble(&self, scan: Scan, hashes: Vec<FileHashes>) -> Torrent {
        let piece_length = self.options.piece_length;

        // Single-piece files are left out: their layer would only restate the root
        let mut piece_layers = BTreeMap::new();
        for file in hashes.iter().filter(|file| file.length > piece_length) {
            if let Some(root) = file.root {
                piece_layers.insert(
                    ByteBuf::from(root.to_vec()),
                    ByteBuf::from(file.piece_layer()),
                );
            }
        }

        let leaves: Vec<Node> = hashes
            .iter()
            .map(|file| file_node(file.length, file.root))
            .collect();
        let file_tree = match &scan.layout {
            SourceLayout::SingleFile => BTreeMap::from([(scan.name.clone(), leaves[0].clone())]),
            SourceLayout::Directory(layout) => build_file_tree(layout, &|index| leaves[index].clone()),
        };

        let (pieces, layout) = match self.options.mode {
            Mode::Hybrid => {
                let total_length: u64 = hashes.iter().map(|file| file.length).sum();
                let (pieces, entries) = resolve_v1_pieces(&scan.files, hashes);
                let layout = if scan.is_single_file() {
                    FileListMode::Single(total_length)
                } else {
                    FileListMode::Multi(entries)
                };
                (Some(ByteBuf::from(pieces)), Some(layout))
            }
            Mode::V2 => (None, None),
        };

        let name = self.options.name.clone().unwrap_or(scan.name);

        Torrent {
            announce: self.options.announce.clone(),
            info: Info {
                file_tree,
                meta_version: 2,
                name,
                piece_length,
                pieces,
                layout,
            },
            piece_layers,
        }
    }
}

/// Concatenate v1 piece hashes in file order and build the v1 file list.
///
/// A file ending mid-piece leaves a [`PieceTail`] behind. If another file
/// follows, the tail is completed with zeros and a pad file entry covering
/// the same gap goes into the list ahead of that file; after the last file
/// the tail is finalized unpadded.
pub fn resolve_v1_pieces(files: &[FileInfo], hashes: Vec<FileHashes>) -> (Vec<u8>, Vec<FileEntry>) {
    let mut pieces = Vec::new();
    let mut entries = Vec::with_capacity(files.len() * 2);
    let mut pending: Option<PieceTail> = None;

    for (file, hashed) in files.iter().zip(hashes) {
        if let Some(tail) = pending.take() {
            entries.push(FileEntry::padding(tail.gap()));
            pieces.extend_from_slice(&tail.pad());
        }
        for piece in &hashed.pieces_v1 {
            pieces.extend_from_slice(piece);
        }
        entries.push(FileEntry::new(file.path.clone(), hashed.length));
        pending = hashed.tail;
    }

    if let Some(tail) = pending {
        pieces.extend_from_slice(&tail.finish());
    }

    (pieces, entries)
}
