//! Shiori main entry point
//!
//! This is the command-line interface for the Shiori documentation crawler.

use clap::{Parser, Subcommand};
use shiori::config::{load_config_with_hash, Config};
use shiori::crawler::crawl;
use shiori::index::{DocumentIndex, TantivyIndex};
use shiori::output::{print_report, print_totals};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shiori: a documentation crawler and full-text indexer
///
/// Shiori downloads documentation sites for offline use and indexes their
/// text so pages can be found with exact or fuzzy queries.
#[derive(Parser, Debug)]
#[command(name = "shiori")]
#[command(version)]
#[command(about = "A documentation crawler and full-text indexer", long_about = None)]
struct Cli {
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
    /// Crawl the configured documentation sets into the index
    Crawl {
        /// Path to TOML configuration file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Only crawl the [[docs]] entry with this name
        #[arg(long, value_name = "NAME")]
        doc: Option<String>,

        /// Override crawler.max-depth
        #[arg(long, value_name = "N")]
        max_depth: Option<u32>,

        /// Validate config and show what would be crawled without actually crawling
        #[arg(long)]
        dry_run: bool,
    },

    /// Search the index built by previous crawls
    Search {
        /// Path to TOML configuration file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Query-language search, or a single term with --fuzzy
        #[arg(value_name = "QUERY")]
        query: String,

        /// Match terms within a small edit distance instead of parsing a query
        #[arg(long)]
        fuzzy: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl {
            config,
            doc,
            max_depth,
            dry_run,
        } => {
            let mut config = load(&config)?;
            select_docs(&mut config, doc.as_deref(), max_depth)?;

            if dry_run {
                handle_dry_run(&config);
                Ok(())
            } else {
                handle_crawl(config).await
            }
        }
        Command::Search {
            config,
            query,
            fuzzy,
        } => {
            let config = load(&config)?;
            handle_search(&config, &query, fuzzy)
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
            0 => EnvFilter::new("shiori=info,warn"),
            1 => EnvFilter::new("shiori=debug,info"),
            2 => EnvFilter::new("shiori=trace,debug"),
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

/// Loads and validates the configuration, logging its hash
fn load(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Applies the --doc and --max-depth overrides
fn select_docs(
    config: &mut Config,
    doc: Option<&str>,
    max_depth: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(name) = doc {
        if config.doc(name).is_none() {
            return Err(format!("No [[docs]] entry named '{}'", name).into());
        }
        config.docs.retain(|d| d.name == name);
    }

    if let Some(depth) = max_depth {
        config.crawler.max_depth = depth;
    }

    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Shiori Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    println!(
        "  Retries: {} (backoff {}ms)",
        config.crawler.max_retries, config.crawler.retry_backoff_ms
    );

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);

    println!("\nOutput:");
    println!("  Downloads: {}", config.output.download_path);
    println!("  Index: {}", config.output.index_path);

    println!("\nDoc Sets ({}):", config.docs.len());
    for doc in &config.docs {
        println!("  - {} {}: {}", doc.name, doc.version, doc.url);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} doc sets", config.docs.len());
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Doc sets: {}, max depth: {}",
        config.docs.len(),
        config.crawler.max_depth
    );

    match crawl(config).await {
        Ok(reports) => {
            for report in &reports {
                print_report(report);
                println!();
            }
            print_totals(&reports);
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the search command: prints one matching path per line
///
/// The index is opened read-only so searching works during a crawl.
fn handle_search(
    config: &Config,
    query: &str,
    fuzzy: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let location = Path::new(&config.output.index_path);
    let index = TantivyIndex::open_reader(location, &config.index)?;
    tracing::debug!("Searching {} documents", index.num_docs()?);

    let paths = if fuzzy {
        index.fuzzy_query(query)?
    } else {
        index.query(query)?
    };
    index.close()?;

    if paths.is_empty() {
        tracing::info!("No documents match '{}'", query);
    }
    for path in paths {
        println!("{}", path);
    }

    Ok(())
}
