use clap::Parser;
use std::path::PathBuf;

use crate::config::{DEFAULT_PIECE_EXP, MAX_PIECE_EXP, MIN_PIECE_EXP};
use crate::models::{Mode, TorrentOptions};

#[derive(Parser, Debug)]
#[command(
    name = "v2torrent",
    version,
    about = "Create BitTorrent v2 and hybrid v1/v2 metainfo files"
)]
pub struct Args {
    /// The file or directory to create a torrent from
    #[arg(value_name = "TARGET")]
    pub source: PathBuf,

    /// Tracker announce URL, embedded verbatim (may be empty)
    #[arg(short = 'a', long = "announce", value_name = "URL", default_value = "")]
    pub announce: String,

    /// Set the piece length to 2^N bytes (e.g., 18 for 256KB)
    #[arg(
        short = 'l',
        long = "piece-length",
        value_name = "N",
        default_value_t = DEFAULT_PIECE_EXP,
        value_parser = clap::value_parser!(u32).range(MIN_PIECE_EXP as i64..=MAX_PIECE_EXP as i64)
    )]
    pub piece_length: u32,

    /// Set the name of the torrent (defaults to basename of target)
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Set the output file path (defaults to <name>.torrent)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Exclude files matching pattern (glob) - can be comma-separated
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Overwrite output file if it exists
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Number of threads for hashing (defaults to number of CPU cores)
    #[arg(short = 't', long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// Create a v2-only torrent (no v1 compatibility fields)
    #[arg(long = "v2-only")]
    pub v2_only: bool,

    /// Show a progress bar while hashing
    #[arg(long = "progress")]
    pub progress: bool,

    /// Print the result as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    /// Convert CLI arguments to TorrentOptions
    pub fn into_options(self) -> TorrentOptions {
        TorrentOptions {
            mode: if self.v2_only { Mode::V2 } else { Mode::Hybrid },
            piece_length: 1u64 << self.piece_length,
            announce: self.announce,
            name: self.name,
            exclude: self.exclude,
        }
    }
}
