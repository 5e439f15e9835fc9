//! Anime Browser CLI application.

use anime_browser::{console, view, AnySource, Browser, ListView};
use anyhow::{bail, Context, Result};
use catalog_api::{CacheManager, CachedCatalog, CatalogApi, CatalogClient};
use clap::{Parser, Subcommand};
use shared::{Config, Database, ListStatus, LogConfig, UserLists};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

type Api = Arc<CachedCatalog<CatalogClient>>;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of the anime list
    Browse {
        /// Location query string, e.g. "kind=tv&sort=score&order=desc&page=2"
        #[arg(short, long, default_value = "")]
        query: String,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse interactively, one command per line
    Interactive {
        /// Initial location query string
        #[arg(short, long, default_value = "")]
        query: String,
    },

    /// Show details of one anime
    Show {
        anime_id: u64,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// List known genres
    Genres,

    /// Manage personal lists
    List {
        #[command(subcommand)]
        command: ListCommand,
    },

    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ListCommand {
    /// Put an anime into a list (watching, planned, completed, dropped, on_hold)
    Set { anime_id: u64, status: ListStatus },

    /// Remove an anime from the lists
    Remove { anime_id: u64 },

    /// Record watched episodes
    Progress { anime_id: u64, episodes: u32 },

    /// Show list entries
    Show {
        #[arg(short, long)]
        status: Option<ListStatus>,
    },

    /// Count entries per list
    Stats,
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    /// Delete every cached response
    Clear,

    /// Show cache statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    shared::logging::init(LogConfig::from_config(&config, "anime-browser", args.verbose))?;

    info!(config_file = %args.config.display(), "Loaded configuration");

    // Initialize cache
    let cache = CacheManager::from_config(&config).context("Failed to initialize cache")?;

    if let Command::Cache { command } = &args.command {
        return run_cache(&cache, command);
    }

    // Initialize API client
    let client = CatalogClient::new(&config.catalog.base_url, config.catalog.timeout_seconds)
        .context("Failed to create catalogue client")?;
    let api: Api = Arc::new(CachedCatalog::new(client, cache));

    match args.command {
        Command::Browse { query, json } => browse(&config, api, &query, json).await,
        Command::Interactive { query } => {
            let mut browser = browser(&config, api.clone(), &query).await;
            let delay = Duration::from_millis(config.browser.search_debounce_ms);
            console::run(&mut browser, &api, delay).await
        }
        Command::Show { anime_id, json } => show(&api, anime_id, json).await,
        Command::Genres => {
            let browser = browser(&config, api, "").await;
            if browser.genres().is_empty() {
                bail!("No genres available");
            }
            print!("{}", view::genre_table(browser.genres()));
            Ok(())
        }
        Command::List { command } => run_list(&config, &api, command).await,
        Command::Cache { .. } => Ok(()),
    }
}

/// Browser positioned at `/anime?{query}` with genre labels loaded
async fn browser(config: &Config, api: Api, query: &str) -> Browser<AnySource<Api>> {
    let source = AnySource::new(config.catalog.strategy, api.clone(), config.catalog.catalog_limit);
    let location = format!("{}?{}", anime_browser::controller::LIST_PATH, query);

    let mut browser = Browser::new(source, &config.browser, &location);
    browser.load_genres(&api).await;

    info!(
        strategy = ?config.catalog.strategy,
        location = browser.location(),
        "Browser ready"
    );
    browser
}

async fn browse(config: &Config, api: Api, query: &str, json: bool) -> Result<()> {
    let mut browser = browser(config, api, query).await;
    let list = browser.load().await;

    if json {
        let body = match &list {
            ListView::Items(page) => serde_json::json!({
                "location": browser.location(),
                "filters": browser.filters(),
                "result": page,
            }),
            ListView::Empty => serde_json::json!({
                "location": browser.location(),
                "filters": browser.filters(),
                "result": null,
            }),
            ListView::Error(message) => bail!("{}", message),
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("{}", browser.location());
    println!("{}", view::filters(browser.filters(), browser.genres()));
    print!("{}", view::list(&list, browser.genres()));

    if let ListView::Error(message) = list {
        bail!(message);
    }
    Ok(())
}

async fn show(api: &Api, anime_id: u64, json: bool) -> Result<()> {
    let anime = api
        .fetch_anime(anime_id)
        .await
        .with_context(|| format!("Failed to load anime {}", anime_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&anime)?);
        return Ok(());
    }

    let genres = match api.fetch_genres().await {
        Ok(genres) => shared::GenreCatalog::new(genres),
        Err(e) => {
            warn!(error = %e, "Failed to load genres");
            shared::GenreCatalog::default()
        }
    };
    print!("{}", view::detail(&anime, &genres));
    Ok(())
}

async fn run_list(config: &Config, api: &Api, command: ListCommand) -> Result<()> {
    let db_path = config.database_path();
    info!(db_path = %db_path.display(), "Opening database");
    let database = Database::open(&db_path).context("Failed to open database")?;
    let lists = UserLists::new(database);

    match command {
        ListCommand::Set { anime_id, status } => {
            let anime = api
                .fetch_anime(anime_id)
                .await
                .with_context(|| format!("Failed to load anime {}", anime_id))?;
            let entry = lists.set_status(anime_id, anime.display_title(), status)?;
            print!("{}", view::list_entries(&[entry]));
        }
        ListCommand::Remove { anime_id } => {
            if !lists.remove(anime_id)? {
                bail!("Anime {} is not in any list", anime_id);
            }
            println!("Removed {}", anime_id);
        }
        ListCommand::Progress { anime_id, episodes } => {
            if !lists.set_progress(anime_id, episodes)? {
                bail!("Anime {} is not in any list", anime_id);
            }
            if let Some(entry) = lists.get(anime_id)? {
                print!("{}", view::list_entries(&[entry]));
            }
        }
        ListCommand::Show { status } => {
            let entries = match status {
                Some(status) => lists.by_status(status)?,
                None => lists.all()?,
            };
            print!("{}", view::list_entries(&entries));
        }
        ListCommand::Stats => {
            print!("{}", view::list_stats(&lists.get_stats()?));
        }
    }

    Ok(())
}

fn run_cache(cache: &CacheManager, command: &CacheCommand) -> Result<()> {
    match command {
        CacheCommand::Clear => {
            cache.clear().context("Failed to clear cache")?;
            println!("Cache cleared");
        }
        CacheCommand::Stats => {
            let stats = cache.stats().context("Failed to get cache stats")?;
            println!("files:   {}", stats.total_files);
            println!("expired: {}", stats.expired_files);
            println!("size:    {} KB", stats.total_size_bytes / 1_000);
        }
    }
    Ok(())
}
