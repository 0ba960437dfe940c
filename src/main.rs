//! Commentary-Harvest main entry point
//!
//! Command-line interface for the crawl and the two batch passes that run
//! after it.

use anyhow::Context;
use clap::{Parser, Subcommand};
use commentary_harvest::compose::compose;
use commentary_harvest::config::{load_config_with_hash, Config};
use commentary_harvest::crawler::crawl;
use commentary_harvest::logging::{setup_logging, DiagnosticPolicy};
use commentary_harvest::reconcile::reconcile;
use std::path::{Path, PathBuf};

/// Commentary-Harvest: a polite commentary crawler
///
/// Crawls the book index, every book page and every chapter page of a
/// commentary site and writes one SQL insert per chapter, grouped into one
/// file per book.
#[derive(Parser, Debug)]
#[command(name = "commentary-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite commentary crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults if omitted)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

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
    /// Crawl the site and write the roster and per-book statement files
    Crawl {
        /// Books to crawl (all books if none are given)
        #[arg(value_name = "NAME")]
        names: Vec<String>,

        /// Book to crawl; may be repeated
        #[arg(short = 'b', long = "books", value_name = "NAME")]
        books: Vec<String>,
    },

    /// Concatenate the per-book statement files into one script
    Compose,

    /// Write chapter count updates from exported seed data
    Count,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            setup_logging(
                cli.verbose,
                cli.quiet,
                &DiagnosticPolicy::from_config(&config.logging),
            );
            tracing::info!(
                "Configuration loaded from {} (hash: {})",
                path.display(),
                hash
            );
            config
        }
        None => {
            let config = Config::default();
            setup_logging(
                cli.verbose,
                cli.quiet,
                &DiagnosticPolicy::from_config(&config.logging),
            );
            tracing::info!("Using built-in configuration");
            config
        }
    };

    match cli.command {
        Command::Crawl { names, books } => {
            let selection: Vec<String> = names.into_iter().chain(books).collect();
            handle_crawl(&config, selection).await
        }
        Command::Compose => handle_compose(&config),
        Command::Count => handle_count(&config),
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, selection: Vec<String>) -> anyhow::Result<()> {
    if selection.is_empty() {
        tracing::info!("Crawling every book on {}", config.site.index_url);
    } else {
        tracing::info!("Crawling {} selected books: {}", selection.len(), selection.join(", "));
    }

    let report = crawl(config, selection).await.context("Crawl failed")?;

    println!("✓ {} books in roster: {}", report.books, config.output.books_path);
    println!(
        "✓ {} commentaries written to: {}",
        report.leaves_emitted, config.output.commentaries_dir
    );
    if !report.is_clean() {
        println!(
            "! {} skipped, {} failed book pages, {} identity mismatches (see log)",
            report.leaves_skipped, report.failed_branches, report.identity_mismatches
        );
    }

    Ok(())
}

/// Handles the compose pass
fn handle_compose(config: &Config) -> anyhow::Result<()> {
    let output = Path::new(&config.output.combined_path);
    let report = compose(Path::new(&config.output.commentaries_dir), output)
        .context("Failed to compose commentary script")?;

    println!(
        "✓ Composed {} files ({} bytes) into: {}",
        report.inputs.len(),
        report.bytes,
        output.display()
    );
    Ok(())
}

/// Handles the chapter count pass
fn handle_count(config: &Config) -> anyhow::Result<()> {
    let output = Path::new(&config.output.counts_path);
    let report = reconcile(
        Path::new(&config.output.seed_books_path),
        Path::new(&config.output.seed_data_dir),
        output,
    )
    .context("Failed to reconcile chapter counts")?;

    println!(
        "✓ {} count updates written to: {}",
        report.counts.len(),
        output.display()
    );
    Ok(())
}
