//! Headless shell: capture loop plus one-shot history commands.

use crate::app::HistoryApp;
use crate::backend::spawn_backend;
use crate::clipboard::{write_with_retry, RetryPolicy, SystemClipboard};
use crate::context::AppContext;
use crate::error::HistoryError;
use crate::query::{fetch_page, Page, PageRequest};
use crate::startup::wait_until;
use crate::watcher::{spawn_watcher, ClipboardWatcher, DedupWriter, PollingWatcher};
use clap::{Parser, Subcommand};
use clipstash_core::text::normalize_whitespace;
use clipstash_core::{AppError, Config, Database, Entry, EntryId, Filters, HistoryStore};
use crossbeam_channel::unbounded;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

const PREVIEW_CHARS: usize = 60;

#[derive(Parser)]
#[command(name = "clipstash", about = "Clipboard history manager", version)]
struct Cli {
    /// Database directory (overrides CLIPSTASH_DB_PATH)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Record clipboard changes until stdin closes (default)
    Watch,
    /// Print one page of history, newest first
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        favorites: bool,
        #[arg(long)]
        offset: Option<String>,
        #[arg(short, long)]
        limit: Option<String>,
    },
    /// Toggle an entry's favorite flag
    Favorite { id: EntryId },
    Delete { id: EntryId },
    /// Delete every entry
    Clear,
    /// Copy an entry back to the clipboard
    Copy { id: EntryId },
}

/// Parse arguments, initialize tracing and run the selected command.
///
/// # Errors
/// Returns the first store, clipboard or startup failure.
pub fn run() -> Result<(), HistoryError> {
    let cli = Cli::parse();
    crate::init_tracing();

    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => run_watch(config),
        Commands::List {
            search,
            favorites,
            offset,
            limit,
        } => {
            let store = open_store(&config)?;
            let filters = Filters::new(search.unwrap_or_default(), favorites);
            let request =
                PageRequest::from_raw(filters, offset.as_deref(), limit.as_deref(), config.page_size);
            let page = fetch_page(store.as_ref(), &request)
                .map_err(|err| HistoryError::store("List", err))?;
            print_output(format_page_output(&page, cli.json))
        }
        Commands::Favorite { id } => {
            let store = open_store(&config)?;
            let is_favorite = store
                .toggle_favorite(id)
                .map_err(|err| HistoryError::store("Toggle favorite", err))?;
            print_output(Ok(format_favorite_output(id, is_favorite)))
        }
        Commands::Delete { id } => {
            let store = open_store(&config)?;
            let existed = store
                .delete_by_id(id)
                .map_err(|err| HistoryError::store("Delete", err))?;
            if !existed {
                return Err(HistoryError::store("Delete", AppError::NotFound));
            }
            print_output(Ok(format!("Deleted entry {}", id)))
        }
        Commands::Clear => {
            let store = open_store(&config)?;
            let removed = store
                .delete_all()
                .map_err(|err| HistoryError::store("Clear history", err))?;
            print_output(Ok(format!("Cleared {} entries", removed)))
        }
        Commands::Copy { id } => {
            let db = Database::open(&config.db_path)
                .map_err(|err| HistoryError::store("Open history", err))?;
            let entry = db
                .entries
                .get(id)
                .map_err(|err| HistoryError::store("Copy", err))?
                .ok_or_else(|| HistoryError::store("Copy", AppError::NotFound))?;
            let mut clipboard = SystemClipboard::new()?;
            write_with_retry(&mut clipboard, &entry.content, RetryPolicy::from_config(&config))?;
            print_output(Ok(format!("Copied entry {}", id)))
        }
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn HistoryStore>, HistoryError> {
    Database::open(&config.db_path)
        .map(|db| db.store())
        .map_err(|err| HistoryError::store("Open history", err))
}

fn print_output(output: Result<String, String>) -> Result<(), HistoryError> {
    match output {
        Ok(text) => {
            if !text.is_empty() {
                println!("{}", text);
            }
            Ok(())
        }
        Err(message) => Err(HistoryError::QueryFailed {
            operation: "Format output".to_string(),
            message,
        }),
    }
}

fn spawn_error(err: io::Error) -> HistoryError {
    HistoryError::QueryFailed {
        operation: "Start worker thread".to_string(),
        message: err.to_string(),
    }
}

fn run_watch(config: Config) -> Result<(), HistoryError> {
    let context = AppContext::new(config);
    let db_path = context.config.db_path.clone();
    let backend = spawn_backend(context.store.clone(), move || {
        Database::open(&db_path).map(|db| db.store())
    })
    .map_err(spawn_error)?;

    let (signal_tx, signal_rx) = unbounded();
    let mut app = HistoryApp::new(backend, &context.config).with_watcher_signals(signal_rx);
    wait_until(
        "history store to open",
        Duration::from_millis(context.config.startup_timeout_ms),
        Duration::from_millis(25),
        || {
            app.poll();
            app.is_store_ready() || app.error().is_some()
        },
    )?;
    if let Some(message) = app.error() {
        return Err(HistoryError::QueryFailed {
            operation: "Open history".to_string(),
            message: message.to_string(),
        });
    }

    let stop = Arc::new(AtomicBool::new(false));
    let interval = Duration::from_millis(context.config.poll_interval_ms);
    let writer = DedupWriter::new(context.store.clone(), signal_tx, &context.config);
    let watcher = spawn_watcher(
        move || {
            let clipboard = SystemClipboard::new()?;
            Ok(Box::new(PollingWatcher::new(Box::new(clipboard), interval))
                as Box<dyn ClipboardWatcher>)
        },
        writer,
        Arc::clone(&stop),
    )
    .map_err(spawn_error)?;

    let stdin_stop = Arc::clone(&stop);
    thread::Builder::new()
        .name("clipstash-stdin".to_string())
        .spawn(move || {
            let _ = io::copy(&mut io::stdin().lock(), &mut io::sink());
            stdin_stop.store(true, Ordering::Relaxed);
        })
        .map_err(spawn_error)?;

    info!(db = %context.config.db_path, "watching clipboard; close stdin to stop");
    let mut newest: Option<EntryId> = app.flattened_items().first().map(|entry| entry.id);
    while !stop.load(Ordering::Relaxed) {
        if watcher.is_finished() {
            return Err(HistoryError::ClipboardApiUnavailable(
                "clipboard monitor exited".to_string(),
            ));
        }
        app.poll();
        if let Some(entry) = app.flattened_items().first() {
            if newest != Some(entry.id) {
                newest = Some(entry.id);
                println!("{}", format_entry_row(entry));
            }
        }
        thread::sleep(interval);
    }

    let _ = watcher.join();
    Ok(())
}

fn preview(content: &str) -> String {
    let flat = normalize_whitespace(content);
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let truncated: String = flat.chars().take(PREVIEW_CHARS - 3).collect();
    format!("{}...", truncated)
}

fn format_entry_row(entry: &Entry) -> String {
    format!(
        "{:>6} {} {} {}",
        entry.id,
        if entry.is_favorite { "*" } else { " " },
        entry.created_at.format("%Y-%m-%d %H:%M:%S"),
        preview(&entry.content)
    )
}

fn format_page_output(page: &Page, json: bool) -> Result<String, String> {
    if json {
        let value = serde_json::json!({
            "offset": page.offset,
            "items": page.items,
            "next_offset": page.next_offset,
        });
        return serde_json::to_string_pretty(&value)
            .map_err(|err| format!("response encoding error: {}", err));
    }

    let mut rows: Vec<String> = page.items.iter().map(format_entry_row).collect();
    if let Some(next) = page.next_offset {
        rows.push(format!("-- more: --offset {}", next));
    }
    Ok(rows.join("\n"))
}

fn format_favorite_output(id: EntryId, is_favorite: bool) -> String {
    if is_favorite {
        format!("Entry {} is now a favorite", id)
    } else {
        format!("Entry {} is no longer a favorite", id)
    }
}
