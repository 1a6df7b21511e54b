use clap::{Args, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use markframe_codec::DEFAULT_MAX_PAYLOAD;

use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod inspect;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode input bytes into marker-terminated frames.
    Encode(EncodeArgs),
    /// Decode a frame stream back into payloads.
    Decode(DecodeArgs),
    /// Report per-frame statistics for a frame stream.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: Option<OutputFormat>) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args),
        Command::Decode(args) => decode::run(args, format.unwrap_or(OutputFormat::Raw)),
        Command::Inspect(args) => {
            inspect::run(args, format.unwrap_or_else(OutputFormat::default_for_stdout))
        }
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Read input from file instead of stdin ("-" for stdin).
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<PathBuf>,
    /// Write frames to file instead of stdout ("-" for stdout).
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Split input into frames of at most this many bytes.
    #[arg(long, value_name = "BYTES")]
    pub frame_size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Read frames from file instead of stdin ("-" for stdin).
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<PathBuf>,
    /// Write payloads to file instead of stdout ("-" for stdout).
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Largest payload accepted; bigger frames are discarded.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_frame_size: usize,
    /// Fail with DATA_INVALID when any frame was discarded.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Read frames from file instead of stdin ("-" for stdin).
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<PathBuf>,
    /// Largest payload accepted; bigger frames are discarded.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_frame_size: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn is_stdio(path: Option<&Path>) -> bool {
    path.is_none_or(|p| p.as_os_str() == "-")
}

pub(crate) fn open_input(path: Option<&Path>) -> CliResult<Box<dyn Read>> {
    match path {
        Some(p) if !is_stdio(path) => {
            let file =
                File::open(p).map_err(|err| io_error(&format!("open {}", p.display()), err))?;
            Ok(Box::new(file))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

pub(crate) fn open_output(path: Option<&Path>) -> CliResult<Box<dyn Write>> {
    match path {
        Some(p) if !is_stdio(path) => {
            let file =
                File::create(p).map_err(|err| io_error(&format!("create {}", p.display()), err))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
