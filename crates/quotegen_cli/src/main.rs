//! Command-line front end for quotegen.
//!
//! # Responsibility
//! - Wire configuration, logging, storage and sync for one invocation.
//! - Render picks and status lines as plain text.

use clap::{Parser, Subcommand};
use log::info;
use quotegen_core::{
    default_log_level, init_logging, CategoryFilter, HttpRemoteSource, Pick,
    PresentationSelector, QuoteConfig, QuoteKey, QuoteService, QuoteStore, SqliteKvStore,
    SyncOutcome, SyncScheduler, SyncStatus,
};
use rand::rngs::StdRng;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

type CliResult<T> = Result<T, Box<dyn Error>>;
type CliService = QuoteService<Arc<SqliteKvStore>, Arc<SqliteKvStore>, StdRng>;

#[derive(Debug, Parser)]
#[command(name = "quotegen", version, about = "Random quote generator")]
struct Cli {
    /// Config file (TOML). Defaults to the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides `data_dir` from the config file.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Starts a fresh session, forgetting the last viewed quote.
    #[arg(long)]
    new_session: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show a random quote, optionally switching the category filter.
    Show {
        /// Only show quotes from this category.
        #[arg(long, conflicts_with = "all")]
        category: Option<String>,
        /// Clear the category filter.
        #[arg(long)]
        all: bool,
    },
    /// Show the last viewed quote of this session, or a random one.
    Restore,
    /// Add a quote.
    Add {
        text: String,
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Edit the first quote matching text and category.
    Edit {
        text: String,
        category: String,
        #[arg(long, default_value = "")]
        new_text: String,
        #[arg(long, default_value = "")]
        new_category: String,
    },
    /// Delete the first quote matching text and category.
    Delete { text: String, category: String },
    /// List category filter options.
    Categories,
    /// List every quote.
    List,
    /// Write a timestamped JSON export.
    Export {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Merge quotes from a JSON export file.
    Import { file: PathBuf },
    /// Reset quotes to the default list.
    Clear,
    /// Fetch and merge remote quotes once.
    Sync,
    /// Run periodic sync until interrupted.
    Watch {
        /// Stop after this many completed attempts.
        #[arg(long)]
        ticks: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = load_config(&cli)?;
    let level = config
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    if let Err(err) = init_logging(&level, config.log_dir()) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let mut service = open_service(&config, cli.new_session)?;

    match cli.command {
        Command::Show { category, all } => {
            let pick = match (category, all) {
                (Some(name), _) => service.select_category(CategoryFilter::named(name))?,
                (None, true) => service.select_category(CategoryFilter::All)?,
                (None, false) => service.show_random()?,
            };
            render_pick(&pick);
        }
        Command::Restore => render_pick(&service.restore_or_pick()?),
        Command::Add { text, category } => {
            let refreshed = service.add_quote(&text, &category)?;
            println!("added quote to `{}`", refreshed.value.category);
            render_pick(&refreshed.pick);
        }
        Command::Edit {
            text,
            category,
            new_text,
            new_category,
        } => {
            let key = QuoteKey::new(&text, &category);
            let refreshed = service.edit_quote(&key, &new_text, &new_category)?;
            println!("updated: \"{}\" ({})", refreshed.value.text, refreshed.value.category);
        }
        Command::Delete { text, category } => {
            let refreshed = service.delete_quote(&QuoteKey::new(&text, &category))?;
            println!("deleted: \"{}\"", refreshed.value.text);
        }
        Command::Categories => {
            let selected = service.selected_category().clone();
            for filter in service.category_filters()? {
                let marker = if filter == selected { "*" } else { " " };
                match &filter {
                    CategoryFilter::All => println!("{marker} (all categories, --all)"),
                    CategoryFilter::Named(name) => println!("{marker} {name}"),
                }
            }
        }
        Command::List => {
            for quote in service.quotes()? {
                println!("[{}] {}", quote.category, quote.text);
            }
        }
        Command::Export { dir } => {
            let dir = dir.unwrap_or_else(|| config.export_dir());
            let path = service.export_to_dir(&dir)?;
            println!("exported to {}", path.display());
        }
        Command::Import { file } => {
            let refreshed = service.import_file(&file)?;
            println!("imported {} quote(s)", refreshed.value);
        }
        Command::Clear => {
            service.clear_storage()?;
            println!("storage cleared; default quotes restored");
        }
        Command::Sync => {
            let scheduler = scheduler_for(&service, &config)?;
            render_outcome(&scheduler.sync_now().await);
        }
        Command::Watch { ticks } => watch(&service, &config, ticks).await?,
    }

    Ok(())
}

fn load_config(cli: &Cli) -> CliResult<QuoteConfig> {
    let path = cli.config.clone().unwrap_or_else(QuoteConfig::default_path);
    let mut config = QuoteConfig::load(&path)?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    std::fs::create_dir_all(&config.data_dir)?;
    // Log init requires an absolute directory.
    config.data_dir = std::fs::canonicalize(&config.data_dir)?;
    Ok(config)
}

fn open_service(config: &QuoteConfig, new_session: bool) -> CliResult<CliService> {
    let durable = Arc::new(SqliteKvStore::open(config.db_path())?);
    let session = if new_session {
        SqliteKvStore::open_session(config.session_db_path())?
    } else {
        SqliteKvStore::attach_session(config.session_db_path())?
    };
    let store = Arc::new(Mutex::new(QuoteStore::load(durable)));
    let selector = PresentationSelector::new(Arc::new(session));
    Ok(QuoteService::new(store, selector)?)
}

fn scheduler_for(
    service: &CliService,
    config: &QuoteConfig,
) -> CliResult<SyncScheduler<Arc<SqliteKvStore>>> {
    let source = HttpRemoteSource::new(&config.sync)?;
    info!("event=cli_sync module=cli status=start endpoint={}", source.endpoint());
    Ok(SyncScheduler::new(service.shared_store(), Arc::new(source)))
}

async fn watch(service: &CliService, config: &QuoteConfig, ticks: Option<usize>) -> CliResult<()> {
    let scheduler = scheduler_for(service, config)?;
    let mut status = scheduler.status();
    scheduler.start(config.sync.interval());
    println!(
        "syncing every {}s; press Ctrl-C to stop",
        config.sync.interval_secs
    );

    let mut completed = 0usize;
    loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                render_status(&current);
                if matches!(current, SyncStatus::Synced { .. } | SyncStatus::Failed { .. }) {
                    completed += 1;
                    if ticks.is_some_and(|limit| completed >= limit) {
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    scheduler.stop();
    Ok(())
}

fn render_pick(pick: &Pick) {
    match pick {
        Pick::Shown(quote) => {
            println!("\"{}\"", quote.text);
            println!("  Category: {}", quote.category);
        }
        Pick::Empty { filter } => {
            println!("No quotes found for \"{filter}\". You can add one.");
        }
    }
}

fn render_outcome(outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::Merged { added } => println!("sync ok: {added} new quote(s)"),
        SyncOutcome::Skipped => println!("sync skipped: previous attempt still running"),
        SyncOutcome::Failed { message } => println!("sync failed: {message}"),
    }
}

fn render_status(status: &SyncStatus) {
    match status {
        SyncStatus::Idle => {}
        SyncStatus::Syncing => println!("syncing..."),
        SyncStatus::Synced { added } => println!("synced: {added} new quote(s)"),
        SyncStatus::Failed { message } => println!("sync failed: {message}"),
    }
}
