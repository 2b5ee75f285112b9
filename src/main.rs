//! Backlink Scout main entry point
//!
//! This is the command-line interface for finding internal links and
//! keyword-based linking opportunities on WordPress sites.

use anyhow::{bail, Context};
use backlink_scout::config::{load_config_or_default, validate, Config};
use backlink_scout::crawler::{parse_keyword_list, Coordinator, MatchCriteria};
use backlink_scout::output::{print_matches, print_summary, CsvOutputHandler, OutputHandler};
use backlink_scout::url::parse_target_url;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Backlink Scout: internal link discovery for WordPress sites
///
/// Reads the site's wp-sitemap.xml, fetches every listed page and reports
/// the pages whose article content links to the target URL(s). With
/// --keywords it instead reports sentences mentioning the keywords on pages
/// that do not link to the target yet.
#[derive(Parser, Debug)]
#[command(name = "backlink-scout")]
#[command(version)]
#[command(about = "Find internal links to target pages on WordPress sites", long_about = None)]
struct Cli {
    /// Target URL(s); several may be given separated by spaces or commas
    #[arg(value_name = "TARGET", required = true, num_args = 1..)]
    targets: Vec<String>,

    /// Comma-separated keywords; switches to keyword mode (one target only)
    #[arg(short, long, value_name = "KEYWORDS")]
    keywords: Option<String>,

    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory the CSV reports are written to (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resolve the sitemaps and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.display().to_string();
        validate(&config).context("Invalid output directory")?;
    }

    let criteria = build_criteria(&cli)?;

    let coordinator = Coordinator::new(&config).context("Failed to build HTTP client")?;
    let pages = coordinator.discover_pages(&criteria).await;

    if cli.dry_run {
        handle_dry_run(&config, &criteria, &pages);
        return Ok(());
    }

    if pages.is_empty() {
        tracing::error!("No pages found to crawl");
        return Ok(());
    }

    let result = coordinator.crawl(pages, &criteria).await;

    if result.is_empty() {
        tracing::info!("No matches found; no report written");
    } else {
        let handler = CsvOutputHandler::new(&config.output.directory);
        let written = handler
            .write_result(&result)
            .context("Failed to write CSV report")?;

        if !cli.quiet {
            print_matches(&result);
            println!();
        }
        for path in &written {
            println!("Report saved to: {}", path.display());
        }
    }

    if !cli.quiet {
        println!();
        print_summary(&result.summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("backlink_scout=info,warn"),
            1 => EnvFilter::new("backlink_scout=debug,info"),
            2 => EnvFilter::new("backlink_scout=trace,debug"),
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

/// Validates the command-line targets and keywords into match criteria
fn build_criteria(cli: &Cli) -> anyhow::Result<MatchCriteria> {
    let targets: Vec<String> = cli
        .targets
        .iter()
        .flat_map(|arg| arg.split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            parse_target_url(t)
                .map(|_| t.to_string())
                .with_context(|| format!("Invalid target URL: {}", t))
        })
        .collect::<anyhow::Result<_>>()?;

    if targets.is_empty() {
        bail!("No target URLs provided");
    }

    match &cli.keywords {
        None => Ok(MatchCriteria::links(targets)),
        Some(list) => {
            if targets.len() != 1 {
                bail!("Keyword mode takes exactly one target URL, got {}", targets.len());
            }

            let keywords = parse_keyword_list(list);
            if keywords.is_empty() {
                bail!("No keywords provided");
            }

            MatchCriteria::keywords(&targets[0], &keywords).context("Invalid keyword")
        }
    }
}

/// Handles the --dry-run mode: shows the resolved crawl plan
fn handle_dry_run(config: &Config, criteria: &MatchCriteria, pages: &[String]) {
    println!("=== Backlink Scout Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Sitemap concurrency: {}",
        config.crawler.sitemap_concurrency
    );
    println!("  Page concurrency: {}", config.crawler.page_concurrency);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    match config.crawler.crawl_deadline_secs {
        Some(secs) => println!("  Crawl deadline: {}s", secs),
        None => println!("  Crawl deadline: none"),
    }
    println!("  User agent: {}", config.user_agent.header_value());
    println!("  Output directory: {}", config.output.directory);

    println!("\nMode: {}", criteria.mode_name());
    println!("Targets:");
    for target in criteria.targets() {
        println!("  - {}", target);
    }
    if let MatchCriteria::Keywords { keywords, .. } = criteria {
        println!("Keywords:");
        for keyword in keywords {
            println!("  - {}", keyword.keyword());
        }
    }

    let crawled = pages.len().min(config.crawler.max_pages);
    println!("\n✓ Sitemaps list {} candidate pages", pages.len());
    println!("✓ Would crawl {} pages", crawled);
}
