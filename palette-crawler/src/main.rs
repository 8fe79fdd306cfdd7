//! palette-crawler - Photo search crawler
//!
//! Queries the Flickr search API for each configured term, downloads the
//! thumbnail of every result, and keeps the ones that pass deduplication,
//! metadata checks, image analysis and color-histogram admission.
//!
//! Startup is fail-fast: an unusable database, missing credentials or a
//! rejected API key abort the run before any photo is processed. After
//! that, per-photo failures are logged and counted only.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use palette_common::config::{LoggingConfig, RootFolderInitializer, RootFolderResolver};
use palette_common::time::{now, secs_to_duration};
use palette_crawler::config::{load_crawl_settings, load_search_terms, resolve_api_key};
use palette_crawler::db::SqlitePhotoStore;
use palette_crawler::services::{DictionaryWordList, FlickrClient, HttpTransport, SearchOptions};
use palette_crawler::workflow::{Crawler, IngestionPipeline, PipelineConfig, ShutdownSignal};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const MODULE_NAME: &str = "palette-crawler";

/// Command-line arguments for palette-crawler
#[derive(Parser, Debug)]
#[command(name = "palette-crawler")]
#[command(about = "Crawls photo search results into a color-balanced SQLite store")]
#[command(version)]
struct Args {
    /// Root folder holding palette.db and the image tree
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML config file (defaults to <config_dir>/palette/palette-crawler.toml)
    #[arg(short, long, env = "PALETTE_CONFIG")]
    config: Option<PathBuf>,

    /// Search terms file, one term per line
    #[arg(short, long)]
    terms: Option<PathBuf>,

    /// Pages fetched per search term
    #[arg(long)]
    pages: Option<u32>,

    /// Results per page
    #[arg(long)]
    per_page: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = RootFolderResolver::new(MODULE_NAME)
        .with_cli_arg(args.root_folder.clone())
        .with_config_file(args.config.clone());
    let toml_config = resolver.load_toml().unwrap_or_default();

    init_tracing(&toml_config.logging)?;
    info!("{}", palette_crawler::build_ident());

    if let Err(e) = run(args, resolver, toml_config).await {
        error!("Crawler aborted: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(
    args: Args,
    resolver: RootFolderResolver,
    toml_config: palette_common::config::TomlConfig,
) -> Result<()> {
    // Step 1: Root folder and database
    let initializer = RootFolderInitializer::new(resolver.resolve());
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    let pool = palette_common::db::init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    // Step 2: Crawl settings with CLI overrides
    let mut settings = resolver
        .config_file_path()
        .map(|path| load_crawl_settings(&path))
        .unwrap_or_default();
    if let Some(terms) = args.terms {
        settings.search_terms_file = terms;
    }
    if let Some(pages) = args.pages {
        settings.pages_per_term = pages;
    }
    if let Some(per_page) = args.per_page {
        settings.per_page = per_page;
    }

    // Step 3: Authenticate with the upstream source
    let api_key = resolve_api_key(&toml_config).context("Cannot authenticate")?;
    let client = FlickrClient::new(
        api_key,
        SearchOptions {
            licenses: settings.licenses.clone(),
            sort: settings.sort.clone(),
            per_page: settings.per_page,
        },
    )?;
    client
        .verify_credentials()
        .await
        .context("Cannot authenticate")?;

    // Step 4: Inputs
    let word_list = DictionaryWordList::load(&settings.dictionary_path)
        .context("Failed to load dictionary")?;
    let terms = load_search_terms(&settings.search_terms_file)
        .context("Failed to load search terms")?;
    info!(terms = terms.len(), "Search terms loaded");

    // Step 5: Pipeline seeded from the store
    let store = Arc::new(SqlitePhotoStore::new(pool.clone()));
    let pipeline = IngestionPipeline::seeded(
        PipelineConfig::from_settings(initializer.root_folder().to_path_buf(), &settings),
        Arc::new(word_list),
        Arc::new(HttpTransport::new()?),
        store.clone(),
    )
    .await
    .context("Failed to seed pipeline from store")?;

    // Step 6: Shutdown on Ctrl+C or sentinel file
    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, finishing current page");
            ctrl_c_token.cancel();
        }
    });
    let quit = Arc::new(ShutdownSignal::new(settings.quit_sentinel.clone(), cancel.clone()));

    let mut crawler = Crawler::new(
        Arc::new(client),
        pipeline,
        quit,
        secs_to_duration(settings.page_pause_secs),
        settings.pages_per_term,
    )
    .with_cancellation(cancel);

    let started = now();
    let stats = crawler.run(&terms).await;

    let stored = store.count_photos().await?;
    let elapsed = now() - started;
    info!(
        stored,
        elapsed_secs = elapsed.num_seconds(),
        "Shutdown complete: {}",
        stats.display_string()
    );
    pool.close().await;

    Ok(())
}

/// `RUST_LOG` wins over the TOML `[logging]` level
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let file_layer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}
