use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

pub const STDIN_MARKER: &str = "-";

/// Process one extension request document and print the response envelope.
#[derive(Debug, Clone, Parser)]
#[command(name = "extension-server", version)]
pub struct Args {
    /// TOML configuration file.
    #[arg(long, short = 'c')]
    pub config: PathBuf,

    /// Request document, or `-` for stdin.
    #[arg(long, short = 'r', default_value = STDIN_MARKER)]
    pub request: String,

    /// Directory for the log file. Without it only stderr is used.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<LevelFilter>,
}

/// Where the request document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSource {
    Stdin,
    File(PathBuf),
}

impl Args {
    pub fn request_source(&self) -> RequestSource {
        if self.request == STDIN_MARKER {
            RequestSource::Stdin
        } else {
            RequestSource::File(PathBuf::from(&self.request))
        }
    }
}
