use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use feedscout::config::{parse_blog_paths, ConfigError, DiscoveryConfig};
use feedscout::feed::{build_client, discover_all, ExitStatus};
use feedscout::util::{validate_url, UrlValidationError};

/// Section paths given on the command line, already split.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BlogPaths(Vec<String>);

fn parse_blog_paths_arg(raw: &str) -> Result<BlogPaths, ConfigError> {
    parse_blog_paths(raw).map(BlogPaths)
}

/// Keeps the URL exactly as typed; results echo it back.
fn parse_site_url(raw: &str) -> Result<String, UrlValidationError> {
    validate_url(raw).map(|_| raw.to_owned())
}

#[derive(Parser, Debug)]
#[command(
    name = "feedscout",
    version,
    about = "Discover RSS/Atom feeds for websites and print them as JSON",
    after_help = "Exit status: 0 if any feed was found, 1 if none were found, 2 on errors."
)]
struct Args {
    /// Site URLs to scan (absolute http:// or https://)
    #[arg(required = true, value_name = "URL", value_parser = parse_site_url)]
    urls: Vec<String>,

    /// Only scan the given URLs, not their blog/news sections
    #[arg(long = "no-blogs", visible_alias = "skip-blogs")]
    no_blogs: bool,

    /// Maximum number of blog sections to scan per site [default: 5]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    max_blogs: Option<u64>,

    /// Section paths to scan instead of guessing, separated by ',' or '|'
    #[arg(long, value_name = "PATHS", value_parser = parse_blog_paths_arg)]
    blog_paths: Option<BlogPaths>,

    /// Per-site deadline in milliseconds [default: 10000]
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Load settings from a TOML file; flags override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log progress to stderr and include diagnostics in the output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn discovery_config(&self) -> Result<DiscoveryConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => DiscoveryConfig::load(path)?,
            None => DiscoveryConfig::default(),
        };

        if self.no_blogs {
            config.skip_blog_sections = true;
        }
        if let Some(max) = self.max_blogs {
            config.max_blog_sections = usize::try_from(max).unwrap_or(usize::MAX);
        }
        if let Some(BlogPaths(paths)) = &self.blog_paths {
            config.blog_section_paths = Some(paths.clone());
        }
        if let Some(ms) = self.timeout {
            config.timeout_ms = ms;
        }
        if self.verbose {
            config.verbose_diagnostics = true;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("feedscout=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<DiscoveryConfig> {
    args.discovery_config().context("Failed to load configuration")
}

/// Report printed when the run fails before any site could be scanned.
fn failure_document(error: &anyhow::Error) -> String {
    let document = serde_json::json!({
        "success": false,
        "error": format!("{error:#}"),
        "results": [],
    });
    format!("{document:#}")
}

async fn run(args: Args) -> Result<ExitStatus> {
    let config = load_config(&args)?;
    tracing::debug!(?config, urls = args.urls.len(), "Starting discovery");

    let client = build_client().context("Failed to create HTTP client")?;
    let report = discover_all(&client, &args.urls, &config).await;

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{json}");

    Ok(report.exit_status())
}

#[tokio::main]
async fn main() -> ExitCode {
    // clap exits 0 for --help/--version and 2 for usage errors
    let args = Args::parse();

    // Without --verbose no subscriber is installed, so nothing reaches stderr
    let verbose = args.verbose;
    if verbose {
        init_logging();
    }

    match run(args).await {
        Ok(status) => ExitCode::from(status.code() as u8),
        Err(e) => {
            if verbose {
                eprintln!("Error: {e:#}");
            }
            println!("{}", failure_document(&e));
            ExitCode::from(ExitStatus::Failed.code() as u8)
        }
    }
}
