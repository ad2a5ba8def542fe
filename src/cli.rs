//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Record a segmented stream into a single file.
///
/// Segstitch reads a playlist of media segments, fetches them over several
/// concurrent lanes and writes their bodies, strictly in playlist order, to
/// one output file.
#[derive(Parser, Debug)]
#[command(name = "segstitch")]
#[command(author, version, about)]
pub struct Args {
    /// Playlist URL (http/https) or path to a local playlist file
    pub source: String,

    /// Output file for the stitched recording
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Base URL segment names are resolved against (required for local playlists)
    #[arg(short = 'b', long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Number of concurrent fetch lanes (1-256)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u16).range(1..=256))]
    pub lanes: Option<u16>,

    /// Read granularity for segment bodies, in bytes
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: Option<u64>,

    /// Connect timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// Read timeout per request in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,

    /// Keep the partially written output (renamed to *.partial) when a run aborts
    #[arg(long)]
    pub keep_partial: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,
}
