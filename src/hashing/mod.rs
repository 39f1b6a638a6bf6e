pub(crate) mod io;
mod file;
pub mod merkle;

pub use file::{FileHashes, Hash20, PieceTail, hash_file, hash_reader};
pub use merkle::{Hash32, root_hash};
