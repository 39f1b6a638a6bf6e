use sha2::{Digest, Sha256};

use crate::config::V2_HASH_LEN;

/// A 32-byte SHA256 node in a v2 merkle tree
pub type Hash32 = [u8; V2_HASH_LEN];

/// Leaf used to pad a short leaf set
pub const ZERO_LEAF: Hash32 = [0u8; V2_HASH_LEN];

/// Hash a pair of sibling nodes into their parent
pub fn hash_pair(left: &Hash32, right: &Hash32) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Compute the merkle root of a power-of-two number of leaves.
///
/// Panics if `leaves` is empty or its length is not a power of two; callers
/// pad leaf sets before reducing them.
pub fn root_hash(leaves: &[Hash32]) -> Hash32 {
    assert!(
        leaves.len().is_power_of_two(),
        "merkle leaf count must be a non-zero power of two, got {}",
        leaves.len()
    );

    let mut layer = leaves.to_vec();
    while layer.len() > 1 {
        layer = layer
            .chunks_exact(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }
    layer[0]
}

/// Extend `leaves` with zero leaves until it holds `count` entries
pub fn pad_leaves(leaves: &mut Vec<Hash32>, count: usize) {
    if leaves.len() < count {
        leaves.resize(count, ZERO_LEAF);
    }
}

/// Root of a piece whose leaves are all zero.
///
/// Equal to `root_hash(&[ZERO_LEAF; blocks_per_piece])`, computed one level at a time.
pub fn zero_piece_root(blocks_per_piece: usize) -> Hash32 {
    debug_assert!(blocks_per_piece.is_power_of_two());
    let mut node = ZERO_LEAF;
    for _ in 0..blocks_per_piece.trailing_zeros() {
        node = hash_pair(&node, &node);
    }
    node
}
