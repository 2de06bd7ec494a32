use std::path::PathBuf;

use clap::{Parser, Subcommand};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    ", ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "hive-console", version = VERSION)]
pub(crate) struct Args {
    #[command(subcommand)]
    pub(crate) cmd: Option<Command>,

    /// Base URL of the host backend, e.g. http://192.168.1.10:5000
    #[arg(long, global = true)]
    pub(crate) server: Option<String>,

    /// Optional console config file (TOML)
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true)]
    pub(crate) timeout_ms: Option<u64>,

    /// Delay before re-polling status after start/stop, in milliseconds
    #[arg(long, global = true)]
    pub(crate) refresh_delay_ms: Option<u64>,

    /// Poll status periodically (milliseconds, 0 disables)
    #[arg(long, global = true)]
    pub(crate) poll_interval_ms: Option<u64>,

    /// Maximum number of log panel lines (0 keeps everything)
    #[arg(long, global = true)]
    pub(crate) log_capacity: Option<usize>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub(crate) enum Command {
    /// Interactive terminal UI (default)
    Tui,

    /// Print host status
    Status,

    /// Start the host process
    Start,

    /// Stop the host process
    Stop,

    /// Create a new session and print its code
    Session,

    /// Upload a track to the host
    Upload {
        /// Path to the audio file
        path: PathBuf,
    },

    /// Schedule synchronized playback of an uploaded track
    Schedule {
        /// URL returned by a previous upload
        #[arg(long)]
        track_url: Option<String>,

        /// Seconds until playback starts (defaults to the configured delay)
        #[arg(long)]
        delay: Option<String>,
    },
}
