use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::error;

use media_scraper_lib::infrastructure::logging::{init_logging_with_config, log_system_info};
use media_scraper_lib::{AppConfig, AppState, ConfigManager, MediaQuery, StorageMode};

/// Scrape image and video URLs from web pages and browse what was stored.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (toml, json or yaml)
    #[arg(long, global = true, env = "MEDIA_SCRAPER_CONFIG")]
    config: Option<PathBuf>,

    /// Keep results in memory instead of SQLite
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape pages, wait for every worker, then print the newest assets
    Scrape {
        /// Pages to scrape
        urls: Vec<String>,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List stored assets without scraping anything
    Media {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    /// Only list assets of this type (IMAGE or VIDEO)
    #[arg(long = "type")]
    kind: Option<String>,

    /// Substring of the originating page URL; requires --type
    #[arg(long)]
    search: Option<String>,

    /// Zero-based result page
    #[arg(long)]
    page: Option<u32>,

    /// Result page size
    #[arg(long)]
    size: Option<u32>,

    /// Sort as "property,direction", e.g. "id,desc"
    #[arg(long)]
    sort: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {path:?}")),
        None => ConfigManager::new()?.load_config(),
    }
}

fn run(cli: Cli) -> Result<()> {
    let filter = match &cli.command {
        Command::Scrape { filter, .. } | Command::Media { filter } => filter.clone(),
    };
    let query = MediaQuery::from_params(filter.kind.as_deref(), filter.search.as_deref())?;

    let config = load_config(cli.config.as_ref())?;
    init_logging_with_config(&config.logging)?;
    log_system_info();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("media-scraper")
        .build()
        .context("Failed to build tokio runtime")?;

    let storage = if cli.memory {
        StorageMode::Memory
    } else {
        StorageMode::Sqlite
    };

    runtime.block_on(async move {
        let state = AppState::initialize(config, storage).await?;

        if let Command::Scrape { urls, .. } = cli.command {
            let receipt = state.coordinator.submit(urls)?;
            eprintln!(
                "Processing {} pages in the background (batch {})",
                receipt.accepted, receipt.batch_id
            );
        }
        state.shutdown_executor().await;

        print_page(&state, &query, &filter).await?;
        state.close().await;
        Ok::<(), anyhow::Error>(())
    })
}

async fn print_page(state: &AppState, query: &MediaQuery, filter: &FilterArgs) -> Result<()> {
    let request = state
        .queries
        .page_request(filter.page, filter.size, filter.sort.as_deref());
    let page = state.queries.query(query, request).await?;
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}
