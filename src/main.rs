//! Route-Trawler main entry point
//!
//! This is the command-line interface for the Route-Trawler page capturer.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use route_trawler::config::{load_config_or_default, Config};
use route_trawler::crawler::{crawl, feed, profile_targets, search};
use route_trawler::output::{generate_markdown_report, print_statistics, CrawlReport};
use route_trawler::validate_seed;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Route-Trawler: a same-domain page capturer
///
/// Route-Trawler visits every same-origin page reachable from a seed URL,
/// once each and one at a time, and stores a capture of every page it
/// renders. It can also capture a username's social profiles or the media
/// of a single feed page.
#[derive(Parser, Debug)]
#[command(name = "route-trawler")]
#[command(version)]
#[command(about = "A same-domain page capturer", long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["crawl", "search", "feed"])))]
struct Cli {
    /// Crawl every same-origin page reachable from this URL
    #[arg(short, long, value_name = "URL")]
    crawl: Option<String>,

    /// Capture the configured profile pages of this username
    #[arg(short, long, value_name = "USERNAME")]
    search: Option<String>,

    /// Capture a feed page and the media it references
    #[arg(short, long, value_name = "URL")]
    feed: Option<String>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Emulate a phone browser
    #[arg(short = 'i', long)]
    mobile: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and target and show what would be visited
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if cli.mobile {
        config.user_agent.mobile = true;
    }

    if cli.dry_run {
        return handle_dry_run(&cli, &config);
    }

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            trigger.cancel();
        }
    });

    let mut report = if let Some(seed) = &cli.crawl {
        crawl(&config, seed, cancel)
            .await
            .with_context(|| format!("Crawl of {} failed", seed))?
    } else if let Some(username) = &cli.search {
        search(&config, username, cancel)
            .await
            .with_context(|| format!("Profile search for {} failed", username))?
    } else if let Some(url) = &cli.feed {
        feed(&config, url, cancel)
            .await
            .with_context(|| format!("Feed extraction from {} failed", url))?
    } else {
        anyhow::bail!("one of --crawl, --search or --feed is required");
    };
    report.config_hash = Some(config_hash);

    finish(&report, &config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("route_trawler=info,warn"),
            1 => EnvFilter::new("route_trawler=debug,info"),
            2 => EnvFilter::new("route_trawler=trace,debug"),
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

/// Prints the statistics and writes the markdown report if one is configured
fn finish(report: &CrawlReport, config: &Config) -> Result<()> {
    print_statistics(report);

    if let Some(path) = &config.output.report_path {
        generate_markdown_report(report, Path::new(path))
            .with_context(|| format!("Failed to write report to {}", path))?;
        println!("\nReport written to {}", path);
    }

    Ok(())
}

/// Handles the --dry-run mode: validates config and target without visiting
fn handle_dry_run(cli: &Cli, config: &Config) -> Result<()> {
    println!("=== Route-Trawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Pacing: {}ms", config.crawler.pacing_ms);
    match config.crawler.navigation_timeout() {
        Some(timeout) => println!("  Navigation timeout: {}s", timeout.as_secs()),
        None => println!("  Navigation timeout: none"),
    }
    println!(
        "  Seed counts toward completion: {}",
        config.crawler.count_seed_toward_completion
    );
    println!("  Deny patterns: {}", config.crawler.deny_patterns.join(", "));

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Mobile: {}", config.user_agent.mobile);

    println!("\nOutput:");
    println!("  Capture directory: {}", config.output.capture_dir);
    if let Some(path) = &config.output.report_path {
        println!("  Report: {}", path);
    }

    if let Some(seed) = &cli.crawl {
        let seed = validate_seed(seed)?;
        println!("\n✓ Would crawl same-origin pages from {}", seed);
    } else if let Some(username) = &cli.search {
        let targets = profile_targets(username, &config.profiles)?;
        println!("\nProfiles ({}):", targets.len());
        for target in &targets {
            println!("  - {}: {}", target.key, target.route);
        }
        println!("\n✓ Would capture {} profile pages", targets.len());
    } else if let Some(url) = &cli.feed {
        let url = validate_seed(url)?;
        println!("\nMedia selectors: {}", config.feed.media_selectors.join(", "));
        println!("\n✓ Would extract media from {}", url);
    }

    println!("✓ Configuration is valid");
    Ok(())
}
