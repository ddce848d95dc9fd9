//! Comic-Sync main entry point
//!
//! This is the command-line interface for the Comic-Sync catalog mirror.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comic_sync::config::{load_or_default, Config};
use comic_sync::output::{format_search_results, print_report};
use comic_sync::select::{apply_selection, TerminalSelector};
use comic_sync::Syncer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Comic-Sync: search, download and update a local comic library
///
/// Issues are stored as one PDF per issue under one folder per series. Each
/// series folder remembers where it came from, so `update` can fetch newly
/// published issues later.
#[derive(Parser, Debug)]
#[command(name = "comic-sync")]
#[command(version)]
#[command(about = "Search, download and update comics", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Library root directory (overrides the configuration)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the catalog and optionally download the results
    Search {
        /// Search term
        term: String,

        /// Download every series found
        #[arg(short, long)]
        download: bool,

        /// Pick the series to download interactively
        #[arg(short, long, requires = "download")]
        select: bool,

        /// Print each series URL next to its title
        #[arg(long)]
        with_url: bool,
    },

    /// Download newly published issues of every series in the library
    Update,

    /// Download one series, or one issue with --issue
    Download {
        /// URL of the series or issue page
        #[arg(long)]
        url: String,

        /// Series folder name, or the issue file path with --issue
        #[arg(short = 'f', value_name = "TARGET")]
        target: String,

        /// Download a single issue to TARGET
        #[arg(short, long)]
        issue: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(&cli)?;

    match cli.command {
        Command::Search {
            term,
            download,
            select,
            with_url,
        } => handle_search(config, &term, download, select, with_url).await,
        Command::Update => handle_update(config).await,
        Command::Download { url, target, issue } => {
            handle_download(config, &url, &target, issue).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("comic_sync=info,warn"),
            1 => EnvFilter::new("comic_sync=debug,info"),
            2 => EnvFilter::new("comic_sync=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, if any, and applies command-line overrides
fn load_configuration(cli: &Cli) -> Result<Config> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }

    let mut config = load_or_default(cli.config.as_deref()).context("Invalid configuration")?;

    if let Some(root) = &cli.root {
        config.library.root = root.to_string_lossy().into_owned();
    }

    tracing::debug!("Library root: {}", config.library.root);
    Ok(config)
}

/// Handles `search`: lists the results or downloads them
async fn handle_search(
    config: Config,
    term: &str,
    download: bool,
    select: bool,
    with_url: bool,
) -> Result<()> {
    let syncer = Syncer::new(config).context("Failed to set up the syncer")?;
    let series = syncer
        .search(term)
        .await
        .with_context(|| format!("Search for '{}' failed", term))?;

    if !download {
        print!("{}", format_search_results(&series, with_url));
        return Ok(());
    }

    if series.is_empty() {
        println!("No comics found.");
        return Ok(());
    }

    let series = if select {
        apply_selection(series, &TerminalSelector::default())
            .context("Selection cancelled")?
    } else {
        series
    };

    if series.is_empty() {
        println!("Nothing selected.");
        return Ok(());
    }

    let report = syncer.download_series(series).await?;
    print_report(&report);
    Ok(())
}

/// Handles `update`: syncs every series in the library
async fn handle_update(config: Config) -> Result<()> {
    let syncer = Syncer::new(config).context("Failed to set up the syncer")?;

    let report = syncer
        .update_library()
        .await
        .context("Failed to read the library")?;

    print_report(&report);
    Ok(())
}

/// Handles `download`: one series into a folder, or one issue into a file
async fn handle_download(config: Config, url: &str, target: &str, issue: bool) -> Result<()> {
    let syncer = Syncer::new(config).context("Failed to set up the syncer")?;

    let result = if issue {
        syncer.sync_issue(url, &PathBuf::from(target)).await
    } else {
        syncer.sync_series(url, target).await
    };
    let report = result.with_context(|| format!("Failed to download {}", url))?;

    print_report(&report);
    Ok(())
}
