use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use v2torrent::TorrentBuilder;
use v2torrent::cli::Args;

#[derive(Serialize)]
struct Report<'a> {
    name: &'a str,
    output: String,
    piece_length: u64,
    total_size: u64,
    info_hash_v1: &'a str,
    info_hash_v2: &'a str,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let force = args.force;
    let json = args.json;
    let progress = args.progress;
    let threads = args.threads;
    let source = args.source.clone();

    // Determine output file path
    let output_path = args.output.clone().unwrap_or_else(|| {
        let name = args.name.clone().unwrap_or_else(|| {
            source
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("output")
                .to_string()
        });
        PathBuf::from(format!("{}.torrent", name))
    });

    // Convert args to options
    let options = args.into_options();

    // Build the torrent
    let mut builder = TorrentBuilder::new(source.clone(), options)
        .with_output_file(output_path.clone())
        .with_progress(progress);

    if let Some(t) = threads {
        builder = builder.with_threads(t);
    }

    let torrent = builder
        .build()
        .with_context(|| format!("Failed to create torrent from {}", source.display()))?;

    // Serialize to bencode
    let bencode_data = torrent
        .to_bytes()
        .context("Failed to serialize torrent to bencode")?;
    let hashes = torrent
        .info_hashes()
        .context("Failed to compute info hashes")?;

    let mut output_file = if force {
        File::create(&output_path).context("Failed to create output file")?
    } else {
        File::options()
            .write(true)
            .create_new(true)
            .open(&output_path)
            .with_context(|| {
                format!(
                    "Failed to create output file (use -f to overwrite): {}",
                    output_path.display()
                )
            })?
    };

    output_file
        .write_all(&bencode_data)
        .context("Failed to write torrent file")?;

    if json {
        let report = Report {
            name: &torrent.info.name,
            output: output_path.display().to_string(),
            piece_length: torrent.info.piece_length,
            total_size: torrent.total_size(),
            info_hash_v1: &hashes.v1,
            info_hash_v2: &hashes.v2,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        eprintln!("Created: {}", style(output_path.display()).green());
        println!("{:<14} {}", style("Info hash v1:").bold(), hashes.v1);
        println!("{:<14} {}", style("Info hash v2:").bold(), hashes.v2);
    }

    Ok(())
}
