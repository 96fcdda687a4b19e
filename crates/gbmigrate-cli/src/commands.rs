use clap::{Args, Parser, Subcommand, ValueEnum};
use gbmigrate_core::SourceEncoding;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gbmigrate")]
#[command(about = "Convert GB2312-encoded sources to UTF-8 with a signature", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./Config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Walk directory trees and convert every GB2312 file found
    Convert(ConvertArgs),
    /// Convert a single file
    ConvertFile {
        path: PathBuf,
    },
    /// Serve the conversion endpoint and the storage directory over HTTP
    Serve(ServeArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Root directories (replace `root_paths` from the configuration)
    pub roots: Vec<String>,

    /// File name suffix to include, repeatable (e.g. --ext .cpp --ext .h)
    #[arg(long = "ext")]
    pub extensions: Vec<String>,

    /// Glob of paths to skip, repeatable
    #[arg(long = "ignore")]
    pub ignore_patterns: Vec<String>,

    /// Minimum detector confidence (exclusive)
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Codec used to read legacy files
    #[arg(long, value_enum)]
    pub source_encoding: Option<CliSourceEncoding>,

    /// Classify only, write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON instead of coloured lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Directory offered for listing and download
    #[arg(long)]
    pub storage_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliSourceEncoding {
    Gb2312,
    Detected,
}

impl From<CliSourceEncoding> for SourceEncoding {
    fn from(encoding: CliSourceEncoding) -> Self {
        match encoding {
            CliSourceEncoding::Gb2312 => Self::Gb2312,
            CliSourceEncoding::Detected => Self::Detected,
        }
    }
}
