//! # doc-mirror CLI (`docmirror`)
//!
//! ```bash
//! docmirror --config ./config/docmirror.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docmirror init` | Create the SQLite database and schema |
//! | `docmirror sync <doc>` | Mirror new and changed pages of a document |
//! | `docmirror status <doc>` | Show cached page count and recent extractions |
//! | `docmirror get <doc> <page>` | Print one cached page |
//!
//! Logging is controlled with `RUST_LOG` (default `warn`). Per-page progress
//! is controlled with `--progress`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use doc_mirror::ingest::{SyncOptions, SyncReport};
use doc_mirror::progress::ProgressMode;
use doc_mirror::{config, get, ingest, migrate, stats};

/// doc-mirror: keep a markdown mirror and SQLite cache of a remote
/// document's pages up to date.
#[derive(Parser)]
#[command(name = "docmirror", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docmirror.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite file and the `pages` table. Safe to run repeatedly.
    Init,

    /// Mirror a document's pages.
    ///
    /// Lists the document's pages, skips those whose cache record is newer
    /// than the remote update time, and writes the rest to the mirror
    /// directory and the cache.
    Sync {
        /// Remote document id.
        doc_id: String,

        /// Re-extract every page regardless of the cache.
        #[arg(long)]
        force: bool,

        /// Maximum number of pages to process after filtering.
        #[arg(long)]
        limit: Option<usize>,

        /// Skip pages that have a parent page.
        #[arg(long)]
        exclude_subpages: bool,

        /// Keep pages named like hidden, private, draft, temp or test pages.
        #[arg(long)]
        include_hidden: bool,

        /// Minimum trimmed content length; overrides `mirror.min_content_length`.
        #[arg(long)]
        min_length: Option<usize>,

        /// Progress output: `auto`, `human`, `json` or `off`.
        #[arg(long, default_value = "auto", value_parser = ProgressMode::parse)]
        progress: ProgressMode,

        /// Print the run summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show what is cached for a document.
    Status {
        /// Remote document id.
        doc_id: String,

        /// Number of recent extractions to list.
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },

    /// Print one cached page.
    Get {
        doc_id: String,
        page_id: String,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(report: &SyncReport) {
    println!("sync {} ({})", report.doc_id, report.doc_name);
    println!("  created:  {}", report.created);
    println!("  updated:  {}", report.updated);
    println!("  skipped:  {}", report.skipped);
    println!("  errored:  {}", report.errored);
    if report.filtered_out > 0 {
        println!("  filtered: {}", report.filtered_out);
    }
    println!("  output:   {}", report.output_dir.display());
    for page in report.pages.iter() {
        if let doc_mirror::PageOutcome::Errored(ref message) = page.outcome {
            println!("  error: {} ({}): {}", page.page_name, page.page_id, message);
        }
    }
    println!("ok");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sync {
            doc_id,
            force,
            limit,
            exclude_subpages,
            include_hidden,
            min_length,
            progress,
            json,
        } => {
            let opts = SyncOptions {
                force,
                limit,
                exclude_subpages,
                include_hidden,
                min_content_length: min_length,
            };
            let reporter = progress.reporter();
            let report = ingest::run_sync(&cfg, &doc_id, &opts, reporter.as_ref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_summary(&report);
            }
        }
        Commands::Status { doc_id, limit } => {
            stats::run_status(&cfg, &doc_id, limit).await?;
        }
        Commands::Get {
            doc_id,
            page_id,
            json,
        } => {
            get::run_get(&cfg, &doc_id, &page_id, json).await?;
        }
    }

    Ok(())
}
