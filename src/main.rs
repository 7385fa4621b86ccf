// src/main.rs
mod extractors;
mod pivot;
mod screener;
mod storage;
mod utils;

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use screener::models::UrlFormat;
use screener::{client, discovery, fetcher};
use storage::workbook::{self, WorkbookOutcome};
use storage::{links, OnExisting, PageStore};
use utils::AppError;

/// Scrapes company pages from screener.in and builds year-wise financial workbooks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect company URLs from a screen's result pages
    Discover(DiscoverArgs),
    /// Download company pages into a directory, one file per company
    Fetch(FetchArgs),
    /// Compare a URL list with the downloaded pages
    Status(StatusArgs),
    /// Extract financial tables from saved pages into a workbook
    Parse(ParseArgs),
}

#[derive(Args, Debug)]
struct DiscoverArgs {
    /// Screen URL, `screener.in/...` path, or screen path like `123/my-screen`
    #[arg(short, long)]
    url: String,

    /// Number of result pages to walk (default: all)
    #[arg(short, long)]
    pages: Option<u32>,

    /// Format of the URL list
    #[arg(short, long, value_enum, default_value = "txt")]
    format: UrlFormat,

    /// Folder for the URL list
    #[arg(short, long, default_value = "./links")]
    out_dir: PathBuf,

    /// Pause between result pages, in milliseconds
    #[arg(long, default_value = "4000")]
    delay_ms: u64,
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// URL list (.txt, one per line, or .csv with a URL column)
    #[arg(short, long)]
    links: PathBuf,

    /// Directory for the downloaded pages
    #[arg(long, default_value = "./company_html")]
    html_dir: PathBuf,

    /// What to do with pages already in the directory
    #[arg(long, value_enum, default_value = "suffix")]
    on_existing: OnExisting,

    /// Pages fetched between pauses
    #[arg(long, default_value = "10")]
    batch_size: usize,

    /// Pause between batches, in milliseconds
    #[arg(long, default_value = "4000")]
    delay_ms: u64,
}

#[derive(Args, Debug)]
struct StatusArgs {
    /// URL list (.txt or .csv)
    #[arg(short, long)]
    links: PathBuf,

    /// Directory holding the downloaded pages
    #[arg(long, default_value = "./company_html")]
    html_dir: PathBuf,

    /// Report file
    #[arg(short, long, default_value = "./company_links_status.txt")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Directory holding the downloaded pages
    #[arg(long, default_value = "./company_html")]
    html_dir: PathBuf,

    /// Output directory for the workbook
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Debug mode - save the extracted records of each page as JSON
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let cli = Cli::parse();
    tracing::info!("Starting with args: {:?}", cli);

    match cli.command {
        Command::Discover(args) => run_discover(args).await,
        Command::Fetch(args) => run_fetch(args).await,
        Command::Status(args) => run_status(args),
        Command::Parse(args) => run_parse(args),
    }
}

async fn run_discover(args: DiscoverArgs) -> Result<(), AppError> {
    let base = discovery::normalize_screen_url(&args.url);
    tracing::info!("Base URL: {}", discovery::page_url(&base, 1));

    if args.pages == Some(0) {
        return Err(AppError::Config("--pages must be at least 1".to_string()));
    }

    let http = client::build_client()?;
    let urls = discovery::discover_company_urls(
        &http,
        &base,
        args.pages,
        Duration::from_millis(args.delay_ms),
    )
    .await?;

    if urls.is_empty() {
        tracing::warn!("No URLs collected.");
        return Ok(());
    }

    fs::create_dir_all(&args.out_dir)?;
    let path = args.out_dir.join(discovery::output_file_name(&base, args.format));
    links::write_url_list(&path, &urls, args.format)?;
    tracing::info!("All {} URLs have been saved to '{}'", urls.len(), path.display());
    Ok(())
}

async fn run_fetch(args: FetchArgs) -> Result<(), AppError> {
    let urls = links::read_url_list(&args.links)?;
    if urls.is_empty() {
        return Err(AppError::Config(format!("No URLs found in {}", args.links.display())));
    }
    tracing::info!("Loaded {} URLs from {}", urls.len(), args.links.display());

    let store = PageStore::new(&args.html_dir)?;
    fetcher::prepare_destination(&store, args.on_existing)?;

    let http = client::build_client()?;
    let politeness = fetcher::Politeness {
        batch_size: args.batch_size,
        batch_delay: Duration::from_millis(args.delay_ms),
    };
    let summary = fetcher::fetch_pages(&http, &urls, &store, args.on_existing, politeness).await;

    tracing::info!(
        "Fetching finished. Saved: {}, Failures: {}, Skipped: {}",
        summary.saved,
        summary.failed,
        summary.skipped
    );

    if summary.nothing_saved() {
        return Err(AppError::Processing(format!("Failed to fetch any of {} pages", summary.failed)));
    }
    Ok(())
}

fn run_status(args: StatusArgs) -> Result<(), AppError> {
    let urls = links::read_url_list(&args.links)?;
    let store = PageStore::open(&args.html_dir)?;

    let statuses = links::link_statuses(&urls, &store)?;
    let (downloaded, pending) = links::write_status_report(&args.out, &statuses)?;

    tracing::info!("Statuses recorded in {}", args.out.display());
    tracing::info!("Total Downloaded: {}", downloaded);
    tracing::info!("Total Pending: {}", pending);
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), AppError> {
    let store = PageStore::open(&args.html_dir)?;
    let debug_dir = args.debug.then(|| args.output_dir.join("debug"));

    // One bad page never stops the batch
    let (collected, summary) = extractors::collect_pages(&store, debug_dir.as_deref())?;

    if collected.is_empty() {
        return Err(AppError::Processing(format!(
            "No company data extracted from {} files",
            summary.failed
        )));
    }

    let sheets = pivot::organize_sheets(&collected);

    fs::create_dir_all(&args.output_dir)?;
    let path = workbook::timestamped_path(&args.output_dir);
    match workbook::write_with_fallback(&path, &sheets)? {
        WorkbookOutcome::Written(path) => {
            tracing::info!("Wrote {} sheets to {}", sheets.len(), path.display());
            Ok(())
        }
        WorkbookOutcome::Fallback { backup, cause } => {
            tracing::error!("Workbook not written, error log at {}", backup.display());
            Err(AppError::Storage(cause))
        }
    }
}
