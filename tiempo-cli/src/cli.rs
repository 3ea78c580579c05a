use clap::Parser;
use std::path::PathBuf;

/// Define CLI arguments
#[derive(Parser)]
#[command(
    version,
    about = "ECMWF forecast timelapse frame refresher",
    long_about = "Fetches the full set of ECMWF forecast chart frames (T+006h to T+240h)\n\
                  from the remote image server, revalidating unchanged frames with\n\
                  conditional HTTP requests and keeping an on-disk cache that survives\n\
                  restarts. Frames near the current offset are fetched first."
)]
pub struct CliArgs {
    /// Directory for cached frames and validator metadata
    #[arg(
        short = 'c',
        long,
        help = "Cache directory for frame PNGs and validator metadata (default: ./cache)"
    )]
    pub cache_dir: Option<PathBuf>,

    /// Maximum number of simultaneous downloads
    #[arg(
        short = 'j',
        long,
        default_value_t = 4,
        help = "Maximum number of simultaneous downloads (minimum 1)"
    )]
    pub concurrency: usize,

    /// Forecast-hour offset to prioritize
    #[arg(
        long,
        default_value_t = 6,
        help = "Forecast-hour offset currently being viewed; it and its neighbors are fetched first"
    )]
    pub current: u16,

    /// Neighbor prefetch radius
    #[arg(
        long,
        default_value_t = 2,
        help = "How many frames ahead/behind the current offset to prefetch first"
    )]
    pub radius: usize,

    /// Ignore cached validators and re-download everything
    #[arg(
        short,
        long,
        help = "Bypass conditional revalidation and force a full re-download"
    )]
    pub force: bool,

    /// Repeat the refresh on an interval
    #[arg(
        short = 'i',
        long,
        help = "Refresh repeatedly every N minutes instead of exiting after one pass"
    )]
    pub interval: Option<u64>,

    /// Overall HTTP request timeout in seconds
    #[arg(long, default_value_t = 30, help = "Overall HTTP request timeout in seconds")]
    pub timeout: u64,

    /// Connection timeout in seconds
    #[arg(long, default_value_t = 10, help = "HTTP connection timeout in seconds")]
    pub connect_timeout: u64,

    /// Override the image server URL template
    #[arg(
        long,
        help = "URL template with a {hour} substitution point (zero-padded to three digits)"
    )]
    pub url_template: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable detailed debug logging")]
    pub verbose: bool,
}
