//! SiteLens main entry point
//!
//! This is the command-line interface for the SiteLens SEO auditor.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use sitelens::config::{default_config, load_config_with_hash, Config};
use sitelens::output::{self, ExportFormat};
use sitelens::Auditor;
use tracing_subscriber::EnvFilter;

/// SiteLens: an on-page SEO auditor
///
/// SiteLens audits a page's SEO signals, optionally crawls the site for
/// structural issues, and serves the same audits over an HTTP API.
#[derive(Parser, Debug)]
#[command(name = "sitelens")]
#[command(version = "1.0.0")]
#[command(about = "An on-page SEO auditor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file; built-in defaults when omitted
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to bind, overriding the config file
        #[arg(long)]
        bind: Option<String>,
    },

    /// Audit one page and print or save the report
    Audit {
        /// Absolute URL of the page
        url: String,

        /// Link depth; values above 1 add a site crawl
        #[arg(long)]
        depth: Option<u32>,

        /// Report format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Template name shown in PDF reports
        #[arg(long, default_value = "default")]
        template: String,

        /// Write the report here instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Crawl a site and print pages and issues as JSON
    Crawl {
        /// Absolute URL of the start page
        url: String,

        /// Maximum link hops from the start page
        #[arg(long)]
        depth: Option<u32>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_ref())?;

    match cli.command {
        Command::Serve { bind } => handle_serve(config, bind).await,
        Command::Audit {
            url,
            depth,
            format,
            template,
            output,
        } => handle_audit(&config, &url, depth, format, &template, output).await,
        Command::Crawl {
            url,
            depth,
            max_pages,
        } => handle_crawl(config, &url, depth, max_pages).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitelens=info,warn"),
            1 => EnvFilter::new("sitelens=debug,info"),
            2 => EnvFilter::new("sitelens=trace,tower_http=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config file, or the defaults when none is given
fn load(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given; using defaults");
        return Ok(default_config()?);
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the `serve` command
async fn handle_serve(
    mut config: Config,
    bind: Option<String>,
) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if config.performance.api_key.is_none() {
        tracing::warn!("PAGESPEED_API_KEY is not set; audits will have no performance data");
    }

    sitelens::server::serve(&config)
        .await
        .context("HTTP server failed")
}

/// Handles the `audit` command
async fn handle_audit(
    config: &Config,
    url: &str,
    depth: Option<u32>,
    format: ExportFormat,
    template: &str,
    output_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let depth = depth.unwrap_or(config.crawler.default_depth);
    let auditor = Auditor::new(config)?;

    let record = match auditor.audit(url, depth).await {
        Ok(record) => record,
        Err(e) => {
            tracing::error!("Audit failed: {}", e);
            return Err(e.into());
        }
    };

    let page_url = url::Url::parse(url.trim()).context("Invalid URL")?;
    let export = output::export(
        &record.to_value(),
        format,
        template,
        &page_url,
        chrono::Local::now().naive_local(),
    )?;

    match output_path {
        Some(path) => {
            std::fs::write(&path, &export.body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Report written to: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&export.body)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Handles the `crawl` command
async fn handle_crawl(
    mut config: Config,
    url: &str,
    depth: Option<u32>,
    max_pages: Option<usize>,
) -> anyhow::Result<()> {
    if let Some(max_pages) = max_pages {
        config.crawler.max_pages = max_pages.max(1);
    }
    let depth = depth.unwrap_or(config.crawler.default_depth);

    match sitelens::crawler::crawl(&config, url, depth).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
