use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode response frames from a capture file or stdin.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file holding raw response bytes. `-` reads stdin.
    #[arg(default_value = "-")]
    pub input: PathBuf,
    /// Input is hex text; whitespace is ignored.
    #[arg(long)]
    pub hex: bool,
    /// Feed the decoder at most this many bytes per read.
    #[arg(long, default_value_t = 8192, value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: u64,
    /// Reject frames whose declared body is longer than this.
    #[arg(long, value_name = "BYTES")]
    pub max_body_length: Option<usize>,
    /// Treat each response as the answer to this query when computing outcomes.
    #[arg(long, value_name = "CQL")]
    pub query: Option<String>,
    /// Stop after N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show build details.
    #[arg(long)]
    pub extended: bool,
}
