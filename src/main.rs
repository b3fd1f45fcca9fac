//! Sumi-Sift main entry point
//!
//! This is the command-line interface for the Sumi-Sift content harvester.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};
use sumi_sift::config::{load_config_with_hash, validate, Config};
use sumi_sift::crawler::run_pipeline;
use sumi_sift::output::{render, write_json, OutputFormat};
use sumi_sift::url::{host_key, normalize_url};
use tracing_subscriber::EnvFilter;

/// Sumi-Sift: a platform-aware content harvester
///
/// Sumi-Sift fingerprints a site's publishing platform, discovers article
/// links from sitemaps, feeds, and in-page links, and extracts each page as
/// classified markdown. Every request is paced, retried with backoff, and
/// guarded by a per-host circuit breaker.
#[derive(Parser, Debug)]
#[command(name = "sumi-sift")]
#[command(version)]
#[command(about = "A platform-aware content harvester", long_about = None)]
struct Cli {
    /// Seed URL of the site to harvest
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Links to consider beyond the seed page
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Stop after this many items
    #[arg(long, value_name = "N")]
    max_articles: Option<usize>,

    /// Output format: json, markdown, or text
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Re-render thin pages in a headless browser
    #[arg(long)]
    render_js: bool,

    /// Fixed user agent (disables rotation)
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Minimum delay between requests to a host, in milliseconds
    #[arg(long, value_name = "MS")]
    delay: Option<u64>,

    /// Minimum extracted content length in characters
    #[arg(long, value_name = "N")]
    min_content_length: Option<usize>,

    /// Links processed concurrently
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Directory receiving the JSON result document
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Do not write the JSON result document
    #[arg(long)]
    no_save: bool,

    /// Validate configuration and show the effective settings without running
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let format: OutputFormat = config
        .output
        .format
        .parse()
        .context("Invalid output format")?;

    if cli.dry_run {
        handle_dry_run(&cli.url, &config)?;
        return Ok(());
    }

    let save = config.output.save;
    let directory = PathBuf::from(&config.output.directory);

    let report = run_pipeline(config, &cli.url)
        .await
        .with_context(|| format!("Failed to harvest {}", cli.url))?;

    let rendered = render(&report.result, format).context("Failed to render result")?;
    println!("{}", rendered);

    if save {
        let path = save_result(&report.result, &directory)?;
        tracing::info!("Saved result to {}", path.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the formatted result.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sift=info,warn"),
            1 => EnvFilter::new("sumi_sift=debug,info"),
            2 => EnvFilter::new("sumi_sift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the optional config file and layers command-line overrides on top
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(n) = cli.max_pages {
        config.pipeline.max_additional_pages = n;
    }
    if let Some(n) = cli.max_articles {
        config.pipeline.max_articles = n;
    }
    if let Some(format) = &cli.format {
        config.output.format = format.clone();
    }
    if let Some(secs) = cli.timeout {
        config.network.timeout_secs = secs;
    }
    if cli.render_js {
        config.pipeline.render_js = true;
    }
    if let Some(agent) = &cli.user_agent {
        config.network.user_agent = Some(agent.clone());
    }
    if let Some(ms) = cli.delay {
        config.network.min_delay_ms = ms;
    }
    if let Some(n) = cli.min_content_length {
        config.pipeline.min_content_length = n;
    }
    if let Some(n) = cli.concurrency {
        config.pipeline.concurrency = n;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.display().to_string();
    }
    if cli.no_save {
        config.output.save = false;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Writes the JSON document named after the seed host
fn save_result(result: &sumi_sift::SiteResult, directory: &Path) -> anyhow::Result<PathBuf> {
    let host = normalize_url(&result.site)
        .map(|url| host_key(&url))
        .unwrap_or_else(|_| "site".to_string());

    write_json(result, directory, &host, Utc::now())
        .with_context(|| format!("Failed to write result to {}", directory.display()))
}

/// Handles the --dry-run mode: validates the seed and shows the effective settings
fn handle_dry_run(seed: &str, config: &Config) -> anyhow::Result<()> {
    let seed_url = normalize_url(seed).with_context(|| format!("Invalid seed URL {}", seed))?;

    println!("=== Sumi-Sift Dry Run ===\n");
    println!("Seed: {}", seed_url);

    println!("\nPipeline:");
    println!("  Max additional pages: {}", config.pipeline.max_additional_pages);
    println!("  Max articles: {}", config.pipeline.max_articles);
    println!("  Concurrency: {}", config.pipeline.concurrency);
    println!(
        "  Content length: {}..{} chars",
        config.pipeline.min_content_length, config.pipeline.max_content_length
    );
    println!("  JS rendering: {}", config.pipeline.render_js);

    println!("\nNetwork:");
    println!("  Timeout: {}s", config.network.timeout_secs);
    println!(
        "  Delay: {}ms + up to {}ms jitter",
        config.network.min_delay_ms, config.network.jitter_ms
    );
    match &config.network.user_agent {
        Some(agent) => println!("  User agent: {}", agent),
        None => println!(
            "  User agent: rotating every {} request(s)",
            config.network.rotate_every
        ),
    }

    println!("\nRetry:");
    println!(
        "  {} attempt(s), {}ms base delay x{}, capped at {}ms",
        config.retry.max_attempts,
        config.retry.base_delay_ms,
        config.retry.factor,
        config.retry.max_delay_ms
    );

    println!("\nCircuit breaker:");
    println!(
        "  Opens after {} failure(s), {}s cooldown (x{}, max {}s)",
        config.circuit_breaker.failure_threshold,
        config.circuit_breaker.cooldown_secs,
        config.circuit_breaker.cooldown_multiplier,
        config.circuit_breaker.max_cooldown_secs
    );

    println!("\nOutput:");
    println!("  Format: {}", config.output.format);
    if config.output.save {
        println!("  Directory: {}", config.output.directory);
    } else {
        println!("  Saving disabled");
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}
