use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use indicatif::ProgressBar;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use super::io::read_block;
use super::merkle::{Hash32, pad_leaves, root_hash, zero_piece_root};
use crate::config::{BLOCK_SIZE, V1_HASH_LEN, V2_HASH_LEN, blocks_per_piece};
use crate::error::{Error, Result};

/// A 20-byte SHA1 v1 piece hash
pub type Hash20 = [u8; V1_HASH_LEN];

/// The still-open v1 hash of a file's final short piece.
///
/// When another file follows in a multi-file torrent, the piece is completed
/// with `gap` zero bytes (the pad file) before it is finalized. Otherwise the
/// piece is simply shorter and is finalized as-is.
pub struct PieceTail {
    hasher: Sha1,
    gap: u64,
}

impl PieceTail {
    /// Bytes missing up to the next piece boundary
    pub fn gap(&self) -> u64 {
        self.gap
    }

    /// Finalize the piece as if followed by `gap` zero bytes
    pub fn pad(mut self) -> Hash20 {
        let zeros = [0u8; BLOCK_SIZE];
        let mut remaining = self.gap;
        while remaining > 0 {
            let n = remaining.min(BLOCK_SIZE as u64) as usize;
            self.hasher.update(&zeros[..n]);
            remaining -= n as u64;
        }
        self.hasher.finalize().into()
    }

    /// Finalize the piece without padding
    pub fn finish(self) -> Hash20 {
        self.hasher.finalize().into()
    }
}

impl fmt::Debug for PieceTail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PieceTail").field("gap", &self.gap).finish()
    }
}

/// Hashes of a single file, both v1 and v2
#[derive(Debug)]
pub struct FileHashes {
    pub length: u64,
    /// v1 hashes of the file's full pieces, in order. Empty when v1 hashing is off.
    pub pieces_v1: Vec<Hash20>,
    /// v2 piece roots, unpadded
    pub piece_roots: Vec<Hash32>,
    /// File merkle root ("pieces root"), absent for empty files
    pub root: Option<Hash32>,
    /// Open v1 hash of the final piece if it is short
    pub tail: Option<PieceTail>,
}

impl FileHashes {
    /// Concatenated piece roots, as stored in the "piece layers" dictionary
    pub fn piece_layer(&self) -> Vec<u8> {
        let mut layer = Vec::with_capacity(self.piece_roots.len() * V2_HASH_LEN);
        for root in &self.piece_roots {
            layer.extend_from_slice(root);
        }
        layer
    }
}

/// Hash one file on disk
pub fn hash_file(
    path: &Path,
    piece_length: u64,
    with_v1: bool,
    progress: Option<&ProgressBar>,
) -> Result<FileHashes> {
    let file = File::open(path).map_err(|e| Error::read(path, e))?;
    hash_reader(file, piece_length, with_v1, progress).map_err(|e| Error::read(path, e))
}

/// Hash a byte stream piece by piece.
///
/// Every piece yields a v2 root from its 16 KiB block leaves. Full pieces
/// yield a finalized v1 hash; a trailing short piece is returned as a
/// [`PieceTail`] so the caller can decide whether it gets padded.
/// Without `with_v1` only the v2 hashes are computed.
pub fn hash_reader<R: Read>(
    mut reader: R,
    piece_length: u64,
    with_v1: bool,
    progress: Option<&ProgressBar>,
) -> std::io::Result<FileHashes> {
    let blocks_per_piece = blocks_per_piece(piece_length);
    let mut buffer = vec![0u8; BLOCK_SIZE];

    let mut length = 0u64;
    let mut pieces_v1: Vec<Hash20> = Vec::new();
    let mut piece_roots: Vec<Hash32> = Vec::new();
    let mut tail = None;

    loop {
        let mut v1_hasher = with_v1.then(Sha1::new);
        let mut leaves: Vec<Hash32> = Vec::with_capacity(blocks_per_piece);
        let mut piece_bytes = 0u64;

        while leaves.len() < blocks_per_piece {
            let n = read_block(&mut reader, &mut buffer)?;
            if n == 0 {
                break;
            }
            let block = &buffer[..n];
            leaves.push(Sha256::digest(block).into());
            if let Some(hasher) = v1_hasher.as_mut() {
                hasher.update(block);
            }
            piece_bytes += n as u64;

            if let Some(pb) = progress {
                pb.inc(n as u64);
            }

            if n < BLOCK_SIZE {
                break;
            }
        }

        if leaves.is_empty() {
            break;
        }
        length += piece_bytes;

        if leaves.len() < blocks_per_piece {
            // A file smaller than one piece only pads to the next power of
            // two; the last piece of a larger file pads to a full piece.
            let required = if piece_roots.is_empty() {
                leaves.len().next_power_of_two()
            } else {
                blocks_per_piece
            };
            pad_leaves(&mut leaves, required);
        }
        piece_roots.push(root_hash(&leaves));

        if piece_bytes < piece_length {
            tail = v1_hasher.map(|hasher| PieceTail {
                hasher,
                gap: piece_length - piece_bytes,
            });
            break;
        }
        if let Some(hasher) = v1_hasher {
            pieces_v1.push(hasher.finalize().into());
        }
    }

    let root = match piece_roots.len() {
        0 => None,
        1 => Some(piece_roots[0]),
        n => {
            let mut layer = piece_roots.clone();
            layer.resize(n.next_power_of_two(), zero_piece_root(blocks_per_piece));
            Some(root_hash(&layer))
        }
    };

    Ok(FileHashes {
        length,
        pieces_v1,
        piece_roots,
        root,
        tail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::merkle::{ZERO_LEAF, hash_pair};
    use std::io::Cursor;

    fn leaf(data: &[u8]) -> Hash32 {
        Sha256::digest(data).into()
    }

    fn sha1(data: &[u8]) -> Hash20 {
        Sha1::digest(data).into()
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn hash(data: &[u8], piece_length: u64) -> FileHashes {
        hash_reader(Cursor::new(data), piece_length, true, None).unwrap()
    }

    #[test]
    fn test_empty_file() {
        let hashes = hash(&[], 16384);
        assert_eq!(hashes.length, 0);
        assert!(hashes.pieces_v1.is_empty());
        assert!(hashes.piece_roots.is_empty());
        assert!(hashes.root.is_none());
        assert!(hashes.tail.is_none());
    }

    #[test]
    fn test_single_block_piece() {
        let data = pattern(16384);
        let hashes = hash(&data, 16384);

        assert_eq!(hashes.length, 16384);
        assert_eq!(hashes.pieces_v1, vec![sha1(&data)]);
        // One leaf: the root is the leaf itself
        assert_eq!(hashes.root, Some(leaf(&data)));
        assert!(hashes.tail.is_none());
    }

    #[test]
    fn test_exactly_one_piece() {
        let data = pattern(65536);
        let hashes = hash(&data, 65536);

        assert_eq!(hashes.pieces_v1, vec![sha1(&data)]);
        let leaves: Vec<Hash32> = data.chunks(BLOCK_SIZE).map(leaf).collect();
        assert_eq!(hashes.root, Some(root_hash(&leaves)));
        assert!(hashes.tail.is_none());
    }

    #[test]
    fn test_short_single_piece_pads_to_own_power_of_two() {
        // 3 blocks in a 16-block piece: padded to 4 leaves, not 16
        let data = pattern(40000);
        let hashes = hash(&data, 1 << 18);

        let mut leaves: Vec<Hash32> = data.chunks(BLOCK_SIZE).map(leaf).collect();
        assert_eq!(leaves.len(), 3);
        leaves.push(ZERO_LEAF);

        assert_eq!(hashes.root, Some(root_hash(&leaves)));
        assert!(hashes.pieces_v1.is_empty());
        let tail = hashes.tail.unwrap();
        assert_eq!(tail.gap(), (1 << 18) - 40000);
        assert_eq!(tail.finish(), sha1(&data));
    }

    #[test]
    fn test_trailing_short_piece_pads_to_full_piece() {
        // Two blocks per piece, one full piece plus a 100 byte tail
        let data = pattern(32768 + 100);
        let hashes = hash(&data, 32768);

        let leaves: Vec<Hash32> = data.chunks(BLOCK_SIZE).map(leaf).collect();
        let first = hash_pair(&leaves[0], &leaves[1]);
        let second = hash_pair(&leaves[2], &ZERO_LEAF);

        assert_eq!(hashes.piece_roots, vec![first, second]);
        assert_eq!(hashes.root, Some(hash_pair(&first, &second)));
        assert_eq!(hashes.pieces_v1, vec![sha1(&data[..32768])]);
        assert_eq!(hashes.tail.as_ref().map(PieceTail::gap), Some(32768 - 100));
    }

    #[test]
    fn test_piece_layer_padded_with_zero_pieces() {
        // Three full pieces: the layer is balanced with one all-zero piece
        let data = pattern(3 * 32768);
        let hashes = hash(&data, 32768);

        assert_eq!(hashes.pieces_v1.len(), 3);
        assert_eq!(hashes.piece_roots.len(), 3);
        assert!(hashes.tail.is_none());

        let pad = zero_piece_root(2);
        let expected = hash_pair(
            &hash_pair(&hashes.piece_roots[0], &hashes.piece_roots[1]),
            &hash_pair(&hashes.piece_roots[2], &pad),
        );
        assert_eq!(hashes.root, Some(expected));
        assert_eq!(hashes.piece_layer().len(), 3 * 32);
        assert_eq!(&hashes.piece_layer()[32..64], &hashes.piece_roots[1][..]);
    }

    #[test]
    fn test_full_pieces_plus_tail_count() {
        let data = pattern(5 * 16384 + 1);
        let hashes = hash(&data, 16384);
        // k full pieces are finalized now, the tail is finalized by the caller
        assert_eq!(hashes.pieces_v1.len(), 5);
        assert_eq!(hashes.piece_roots.len(), 6);
        assert!(hashes.tail.is_some());
    }

    #[test]
    fn test_tail_padding_matches_zero_filled_piece() {
        let data = pattern(20000);
        let hashes = hash(&data, 16384);
        let tail = hashes.tail.unwrap();
        assert_eq!(tail.gap(), 12768);

        let mut padded = data[16384..].to_vec();
        padded.resize(16384, 0);
        assert_eq!(tail.pad(), sha1(&padded));
    }

    #[test]
    fn test_v2_only_skips_v1() {
        let data = pattern(3 * 16384 + 7);
        let both = hash(&data, 16384);
        let v2 = hash_reader(Cursor::new(&data), 16384, false, None).unwrap();

        assert!(v2.pieces_v1.is_empty());
        assert!(v2.tail.is_none());
        assert_eq!(v2.length, both.length);
        assert_eq!(v2.piece_roots, both.piece_roots);
        assert_eq!(v2.root, both.root);
    }
}
