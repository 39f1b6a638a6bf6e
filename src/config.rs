use crate::error::{Error, Result};

/// Block size for V2 hashing (16 KiB)
pub const BLOCK_SIZE: usize = 16384;

/// Piece length used when the caller does not pick one (64 KiB)
pub const DEFAULT_PIECE_LENGTH: u64 = 1 << DEFAULT_PIECE_EXP;

/// Default piece length as a power of two
pub const DEFAULT_PIECE_EXP: u32 = 16;

/// Smallest accepted piece length power (2^14 = one block)
pub const MIN_PIECE_EXP: u32 = 14;

/// Largest accepted piece length power (2^27 = 128 MiB)
pub const MAX_PIECE_EXP: u32 = 27;

/// Size of a v1 (SHA1) piece hash
pub const V1_HASH_LEN: usize = 20;

/// Size of a v2 (SHA256) hash
pub const V2_HASH_LEN: usize = 32;

/// Largest accepted piece length in bytes
pub const MAX_PIECE_LENGTH: u64 = 1 << MAX_PIECE_EXP;

/// Check that a piece length is a power of two between one block and
/// [`MAX_PIECE_LENGTH`].
pub fn validate_piece_length(piece_length: u64) -> Result<()> {
    if !(BLOCK_SIZE as u64..=MAX_PIECE_LENGTH).contains(&piece_length)
        || !piece_length.is_power_of_two()
    {
        return Err(Error::InvalidPieceLength(piece_length));
    }
    Ok(())
}

/// Number of 16 KiB blocks in a piece. The length must already be validated.
pub fn blocks_per_piece(piece_length: u64) -> usize {
    (piece_length / BLOCK_SIZE as u64) as usize
}
