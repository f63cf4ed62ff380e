//! LearnFlow client: the library controller, its cache and remote store,
//! and the `learnflow` command-line entry point.

pub mod args;
pub mod cache;
pub mod config;
pub mod error;
pub mod library;
pub mod remote;

use std::fs;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::{Args, Command};
use crate::cache::LocalCache;
use crate::config::Config;
use crate::library::Library;
use crate::remote::{OfflineRemote, RemoteStore, RestRemote};

pub use error::LibraryError;

pub async fn run(args: Args) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    tracing::debug!(data_dir = %config.data_dir.display(), "Opening cache");
    let cache = LocalCache::open(&config.data_dir)
        .with_context(|| format!("failed to open cache at {}", config.data_dir.display()))?;

    match &config.remote {
        Some(remote) => {
            tracing::info!(url = %remote.url, "Using remote store");
            execute(Library::open(RestRemote::new(remote), cache), args.command).await
        }
        None => {
            tracing::info!("No remote configured, working offline");
            execute(Library::open(OfflineRemote, cache), args.command).await
        }
    }
}

async fn execute<R: RemoteStore>(mut library: Library<R>, command: Command) -> anyhow::Result<()> {
    library.load().await;
    if let Some(warning) = library.warning() {
        tracing::warn!("{warning}");
    }

    match command {
        Command::Stats => {
            let stats = library.stats();
            println!("Total:    {}", stats.total);
            println!("Mastered: {}", stats.mastered);
            println!("Learning: {}", stats.learning);
            println!("New:      {}", stats.fresh);
            println!("Progress: {:.0}%", stats.progress());
            println!("Units:    {}", library.units().join(", "));
        }
        Command::Due => {
            let due = library.due_cards();
            println!("{} card(s) due", due.len());
            for card in due {
                println!("[box {}] {} - {}", card.leitner_box, card.front, card.back);
            }
        }
        Command::Import { format, path } => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let count = library.import_cards(format, &content).await?;
            println!("Imported {count} card(s)");
            if let Some(warning) = library.warning() {
                tracing::warn!("{warning}");
            }
        }
        Command::Export { format, output } => {
            let content = library.export_cards(format)?;
            let path = output.unwrap_or_else(|| format.file_name().into());
            fs::write(&path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported {} card(s) to {}", library.cards().len(), path.display());
        }
    }

    Ok(())
}
