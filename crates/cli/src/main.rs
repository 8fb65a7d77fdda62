// ABOUTME: CLI for building podcast feeds with castgen-feed.
// ABOUTME: Loads podcast.yml from a content directory and writes or prints the RSS feed.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use castgen_feed::podcast::DEFAULT_CONFIG_FILE;
use castgen_feed::{MediaProber, PodcastBuilder, SortOrder, TracingObserver};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Build an RSS 2.0 / iTunes podcast feed from a content directory.
#[derive(Parser, Debug)]
#[command(name = "castgen")]
#[command(about = "Generate a podcast feed from podcast.yml and media files", long_about = None)]
struct Args {
    /// Directory containing the configuration file and the media files.
    content_dir: PathBuf,

    /// Output file path (default: <CONTENT_DIR>/feed.xml).
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print the feed to stdout instead of writing a file.
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Configuration file name inside the content directory.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// List the oldest episodes first.
    #[arg(long)]
    ascending: bool,

    /// Skip ffprobe/ffmpeg/exiftool; every item must then declare its duration.
    #[arg(long)]
    no_probe: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,
}

fn init_logging(args: &Args) {
    let level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let prober = if args.no_probe {
        MediaProber::without_tools()
    } else {
        MediaProber::default()
    };
    let order = if args.ascending {
        SortOrder::Ascending
    } else {
        SortOrder::Descending
    };

    let mut podcast = PodcastBuilder::new()
        .config_file_name(&args.config)
        .sort_order(order)
        .probe_durations(!args.no_probe)
        .prober(prober)
        .observer(Arc::new(TracingObserver))
        .load(&args.content_dir)
        .with_context(|| format!("loading {}", args.content_dir.display()))?;

    if args.stdout {
        let xml = podcast.build()?;
        io::stdout().write_all(xml.as_bytes())?;
        return Ok(());
    }

    let path = podcast.save(args.output.as_deref())?;
    tracing::info!("feed written to {}", path.display());
    Ok(())
}
